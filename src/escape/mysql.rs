//! MySQL string forms.

use super::{bit_digits, hex_digits, Content};
use crate::dialect::{lookup, MYSQL_STRING_ESCAPES};
use crate::error::Error;
use crate::lexer::StringKind;

pub(super) fn escape_body(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match lookup(MYSQL_STRING_ESCAPES, c) {
            Some(esc) => out.push_str(esc),
            None => out.push(c),
        }
    }
    out
}

pub(super) fn quote_string(text: &str) -> String {
    format!("'{}'", escape_body(text))
}

pub(super) fn blob_literal(bytes: &[u8]) -> String {
    format!("X'{}'", hex_digits(bytes))
}

/// Contents for an open `'`, `"`, `X'` or `B'` literal.
pub(super) fn in_string(kind: StringKind, content: Content<'_>) -> Result<String, Error> {
    match (kind, content) {
        (StringKind::Hex, c) => Ok(hex_digits(c.bytes())),
        (StringKind::Bit, c) => Ok(bit_digits(c.bytes())),
        (StringKind::Single | StringKind::Double, Content::Text(t)) => Ok(escape_body(&t)),
        // Bytes read back one character per byte.
        (StringKind::Single | StringKind::Double, Content::Bytes(b)) => {
            let latin1: String = b.iter().map(|&byte| char::from(byte)).collect();
            Ok(escape_body(&latin1))
        }
        (StringKind::Escaped | StringKind::Unicode, _) => Err(Error::Unescapable {
            context: format!("{} string (not a mysql construct)", kind.opener()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    #[test]
    fn control_characters_and_quotes() {
        assert_eq!(quote_string("Hello, World!\n"), "'Hello, World!\\n'");
        assert_eq!(quote_string("a'b\"c\\d\0\u{1a}"), "'a\\'b\\\"c\\\\d\\0\\Z'");
    }

    #[test]
    fn blobs() {
        assert_eq!(blob_literal(&[0xde, 0xad, 0x01]), "X'dead01'");
        let latin = in_string(StringKind::Single, Content::Bytes(&[b'a', b'\'', 0xe9])).unwrap();
        assert_eq!(latin, "a\\'\u{e9}");
        assert_eq!(in_string(StringKind::Bit, Content::Bytes(&[5])).unwrap(), "00000101");
        assert_eq!(in_string(StringKind::Hex, Content::Text(Cow::Borrowed("A"))).unwrap(), "41");
    }
}

//! Postgres string forms.
//!
//! Plain `'...'` literals only double the quote. Anything that needs a
//! backslash escape switches the free-standing form to `E'...'`.

use super::{bit_digits, hex_digits, Content};
use crate::dialect::{lookup, PG_ESCAPE_STRING_ESCAPES};
use crate::error::Error;
use crate::lexer::StringKind;

fn needs_escape_form(c: char) -> bool {
    c != '\'' && lookup(PG_ESCAPE_STRING_ESCAPES, c).is_some()
}

pub(super) fn escape_body(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match lookup(PG_ESCAPE_STRING_ESCAPES, c) {
            Some(esc) => out.push_str(esc),
            None => out.push(c),
        }
    }
    out
}

fn double_quotes(text: &str) -> String {
    text.replace('\'', "''")
}

pub(super) fn quote_string(text: &str) -> String {
    if text.chars().any(needs_escape_form) {
        format!("E'{}'", escape_body(text))
    } else {
        format!("'{}'", double_quotes(text))
    }
}

pub(super) fn blob_literal(bytes: &[u8]) -> String {
    format!("'\\x{}'::bytea", hex_digits(bytes))
}

/// `\XXXX` / `\+XXXXXX` for the quote, backslash and control characters;
/// everything else is literal.
pub(crate) fn unicode_escape(text: &str, quote: char) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c == quote || c == '\\' || c.is_control() {
            let n = u32::from(c);
            if n <= 0xFFFF {
                out.push_str(&format!("\\{:04X}", n));
            } else {
                out.push_str(&format!("\\+{:06X}", n));
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Contents for an open `'`, `E'`, `U&'`, `X'` or `B'` literal.
pub(super) fn in_string(kind: StringKind, content: Content<'_>) -> Result<String, Error> {
    match kind {
        StringKind::Hex => Ok(hex_digits(content.bytes())),
        StringKind::Bit => Ok(bit_digits(content.bytes())),
        StringKind::Single => Ok(double_quotes(&content.into_text())),
        StringKind::Escaped => Ok(escape_body(&content.into_text())),
        StringKind::Unicode => Ok(unicode_escape(&content.into_text(), '\'')),
        StringKind::Double => Err(Error::Unescapable {
            context: "\" string (not a postgres construct)".into(),
        }),
    }
}

/// Dollar-quoted bodies have no escapes, so the value must not be able to
/// close the quote or finish a closing tag with the text after it.
pub(super) fn in_dollar_quote(tag: &str, text: &str) -> Result<String, Error> {
    let closing = format!("${}$", tag);
    if text.contains(&closing) {
        return Err(Error::MergeHazard(format!("value contains the closing {} delimiter", closing)));
    }
    for (i, _) in closing.char_indices().skip(1) {
        if text.ends_with(&closing[..i]) {
            return Err(Error::MergeHazard(format!(
                "value ends with {:?}, a partial {} delimiter",
                &closing[..i],
                closing
            )));
        }
    }
    Ok(text.to_string())
}

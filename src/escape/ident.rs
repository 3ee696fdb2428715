//! Identifier quoting and the grammar trusted fragments must satisfy in identifier position.

use super::postgres::unicode_escape;
use crate::dialect::Dialect;
use crate::error::Error;
use crate::lexer::IdentKind;
use once_cell::sync::Lazy;
use regex::Regex;

static BARE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\p{L}_][\p{L}\p{N}_$]*$").expect("bare identifier pattern"));

static QUALIFIED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\p{L}_][\p{L}\p{N}_$]*(?:\.[\p{L}_][\p{L}\p{N}_$]*)+$").expect("qualified identifier pattern")
});

/// Quoted identifier, e.g. `` `db`.`users` `` or `"users"`.
pub fn quote(dialect: Dialect, name: &str, forbid_qualified: bool) -> Result<String, Error> {
    quote_with(dialect, dialect.patterns().ident_quote, name, forbid_qualified)
}

/// Contents for an identifier whose opening quote is already in the text.
pub fn delimited(dialect: Dialect, kind: IdentKind, name: &str, forbid_qualified: bool) -> Result<String, Error> {
    if kind == IdentKind::Unicode {
        // U&"..." names are never split.
        validate_part(dialect, name, name)?;
        return Ok(unicode_escape(name, '"'));
    }
    let quoted = quote_with(dialect, kind.quote(), name, forbid_qualified)?;
    Ok(quoted[1..quoted.len() - 1].to_string())
}

/// A trusted fragment used as a name must look like one.
pub fn check_fragment(text: &str, forbid_qualified: bool) -> Result<(), Error> {
    if BARE.is_match(text) {
        Ok(())
    } else if QUALIFIED.is_match(text) {
        if forbid_qualified {
            Err(Error::QualifiedIdentifier { text: text.to_string() })
        } else {
            Ok(())
        }
    } else {
        Err(Error::malformed(text, "trusted fragment is not an identifier"))
    }
}

fn quote_with(dialect: Dialect, q: char, name: &str, forbid_qualified: bool) -> Result<String, Error> {
    let sep = dialect.patterns().qualifier;
    if name.is_empty() {
        return Err(Error::malformed(name, "empty identifier"));
    }
    if forbid_qualified || !name.contains(sep) {
        validate_part(dialect, name, name)?;
        return Ok(quote_part(q, name));
    }
    let parts = name
        .split(sep)
        .map(|part| {
            validate_part(dialect, name, part)?;
            Ok(quote_part(q, part))
        })
        .collect::<Result<Vec<_>, Error>>()?;
    Ok(parts.join(&sep.to_string()))
}

fn quote_part(q: char, part: &str) -> String {
    let doubled: String = [q, q].iter().collect();
    format!("{q}{}{q}", part.replace(q, &doubled))
}

fn validate_part(dialect: Dialect, whole: &str, part: &str) -> Result<(), Error> {
    if part.is_empty() {
        return Err(Error::malformed(whole, "empty part in qualified name"));
    }
    if part.contains('\0') {
        return Err(Error::malformed(whole, "identifier contains NUL"));
    }
    if dialect == Dialect::MySql {
        if part.ends_with(' ') {
            return Err(Error::malformed(whole, "mysql identifiers cannot end with a space"));
        }
        if part.chars().any(|c| u32::from(c) > 0xFFFF) {
            return Err(Error::malformed(whole, "character outside the basic multilingual plane"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_are_doubled() {
        assert_eq!(quote(Dialect::MySql, "a`b", false).unwrap(), "`a``b`");
        assert_eq!(quote(Dialect::Postgres, "a\"b'c", false).unwrap(), "\"a\"\"b'c\"");
    }

    #[test]
    fn qualified_names_split_unless_forbidden() {
        assert_eq!(quote(Dialect::MySql, "db.users", false).unwrap(), "`db`.`users`");
        assert_eq!(quote(Dialect::MySql, "db.users", true).unwrap(), "`db.users`");
        assert_eq!(
            delimited(Dialect::Postgres, IdentKind::Double, "s.t", false).unwrap(),
            "s\".\"t"
        );
        assert!(matches!(quote(Dialect::Postgres, "a..b", false), Err(Error::MalformedIdentifier { .. })));
    }

    #[test]
    fn unicode_identifiers_use_numeric_escapes() {
        assert_eq!(
            delimited(Dialect::Postgres, IdentKind::Unicode, "a\"b.c\\", false).unwrap(),
            "a\\0022b.c\\005C"
        );
    }

    #[test]
    fn mysql_grammar() {
        assert!(matches!(quote(Dialect::MySql, "", false), Err(Error::MalformedIdentifier { .. })));
        assert!(matches!(quote(Dialect::MySql, "name ", false), Err(Error::MalformedIdentifier { .. })));
        assert!(matches!(quote(Dialect::MySql, "\u{1F600}", false), Err(Error::MalformedIdentifier { .. })));
        assert_eq!(quote(Dialect::Postgres, "\u{1F600}", false).unwrap(), "\"\u{1F600}\"");
    }

    #[test]
    fn fragments_in_identifier_position() {
        assert!(check_fragment("users", false).is_ok());
        assert!(check_fragment("public.users", false).is_ok());
        assert!(matches!(check_fragment("public.users", true), Err(Error::QualifiedIdentifier { .. })));
        assert!(matches!(check_fragment("1 OR 1", false), Err(Error::MalformedIdentifier { .. })));
    }
}

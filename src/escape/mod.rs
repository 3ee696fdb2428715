//! Value escaping in two modes.
//!
//! *Free-standing* output is a complete SQL expression with its own quotes.
//! *Delimited* output is raw text for the inside of a quote that the
//! literal text already opened; only the characters meaningful to that
//! exact construct are escaped.

pub mod date;
pub mod ident;
mod mysql;
mod postgres;

use crate::config::EscapeOptions;
use crate::dialect::Dialect;
use crate::error::Error;
use crate::lexer::{IdentKind, LexState};
use crate::trust::Trust;
use crate::value::{classify, Shape, Value};
use std::borrow::Cow;
use std::fmt::Write;

/// What a value contributes to a string context.
pub(crate) enum Content<'a> {
    Text(Cow<'a, str>),
    Bytes(&'a [u8]),
}

impl<'a> Content<'a> {
    fn bytes(&self) -> &[u8] {
        match self {
            Content::Text(t) => t.as_bytes(),
            Content::Bytes(b) => *b,
        }
    }

    /// Bytes become Postgres `\x` hex text.
    fn into_text(self) -> Cow<'a, str> {
        match self {
            Content::Text(t) => t,
            Content::Bytes(b) => Cow::Owned(format!("\\x{}", hex_digits(b))),
        }
    }
}

fn hex_digits(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{:02x}", b);
    }
    out
}

fn bit_digits(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 8);
    for b in bytes {
        let _ = write!(out, "{:08b}", b);
    }
    out
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Nesting {
    Top,
    InList,
}

/// A self-delimited SQL expression for `value`.
pub fn escape_free_standing(
    dialect: Dialect,
    value: &Value,
    options: &EscapeOptions,
    trust: &dyn Trust,
) -> Result<String, Error> {
    render(dialect, value, options, trust, Nesting::Top)
}

/// Raw text for the inside of `context`, which must be the state the lexer
/// reported for this slot. Top level falls through to free-standing output.
pub fn escape_delimited(
    dialect: Dialect,
    value: &Value,
    context: &LexState,
    options: &EscapeOptions,
    trust: &dyn Trust,
) -> Result<String, Error> {
    match context {
        LexState::None => escape_free_standing(dialect, value, options, trust),
        LexState::StringLiteral(kind) => {
            let content = content(dialect, value, options, trust)?;
            match dialect {
                Dialect::MySql => mysql::in_string(*kind, content),
                Dialect::Postgres => postgres::in_string(*kind, content),
            }
        }
        LexState::Identifier(kind) => identifier(dialect, *kind, value, options, trust),
        LexState::DollarQuote { tag } if dialect == Dialect::Postgres => {
            let text = content(dialect, value, options, trust)?.into_text();
            postgres::in_dollar_quote(tag, &text)
        }
        LexState::DollarQuote { .. }
        | LexState::LineComment
        | LexState::BlockComment { .. }
        | LexState::EscapeContinuation { .. } => Err(Error::Unescapable {
            context: context.describe(),
        }),
    }
}

fn quote_string(dialect: Dialect, text: &str) -> String {
    match dialect {
        Dialect::MySql => mysql::quote_string(text),
        Dialect::Postgres => postgres::quote_string(text),
    }
}

fn blob_literal(dialect: Dialect, bytes: &[u8]) -> String {
    match dialect {
        Dialect::MySql => mysql::blob_literal(bytes),
        Dialect::Postgres => postgres::blob_literal(bytes),
    }
}

fn render(
    dialect: Dialect,
    value: &Value,
    options: &EscapeOptions,
    trust: &dyn Trust,
    nesting: Nesting,
) -> Result<String, Error> {
    let sql = match classify(value, trust) {
        Shape::Null | Shape::DateTime(None) => "NULL".to_string(),
        Shape::Bool(b) => b.to_string(),
        Shape::Number(n) => n,
        Shape::Text(s) => quote_string(dialect, s),
        Shape::DateTime(Some(d)) => quote_string(dialect, &date::format(d, &options.time_zone)),
        Shape::Blob(b) => blob_literal(dialect, b),
        Shape::Sequence(items) => list(dialect, items, options, trust, nesting)?,
        Shape::Mapping(pairs) => assignments(dialect, pairs, options, trust)?,
        Shape::TrustedFragment(s) => s.to_string(),
        Shape::TrustedIdentifier(s) => ident::quote(dialect, s, options.forbid_qualified)?,
        Shape::Other {
            fields: Some(pairs), ..
        } if !options.stringify_objects => assignments(dialect, pairs, options, trust)?,
        Shape::Other { text, .. } => quote_string(dialect, text),
    };
    Ok(sql)
}

/// `a, b, c`. At the top, nested sequences become `(..)` row groups;
/// anything deeper is flattened into its row.
fn list(
    dialect: Dialect,
    items: &[Value],
    options: &EscapeOptions,
    trust: &dyn Trust,
    nesting: Nesting,
) -> Result<String, Error> {
    let inner = options.stringified();
    let parts = items
        .iter()
        .map(|item| match (nesting, item) {
            (Nesting::Top, Value::Sequence(row)) => {
                Ok(format!("({})", list(dialect, row, &inner, trust, Nesting::InList)?))
            }
            _ => render(dialect, item, &inner, trust, Nesting::InList),
        })
        .collect::<Result<Vec<_>, Error>>()?;
    Ok(parts.join(", "))
}

/// `` `k` = v, ... ``, skipping callables.
fn assignments(
    dialect: Dialect,
    pairs: &[(String, Value)],
    options: &EscapeOptions,
    trust: &dyn Trust,
) -> Result<String, Error> {
    let inner = options.stringified();
    let parts = pairs
        .iter()
        .filter(|(_, v)| !v.is_callable())
        .map(|(k, v)| {
            Ok(format!(
                "{} = {}",
                ident::quote(dialect, k, options.forbid_qualified)?,
                render(dialect, v, &inner, trust, Nesting::Top)?
            ))
        })
        .collect::<Result<Vec<_>, Error>>()?;
    Ok(parts.join(", "))
}

/// Plain text of a scalar-like shape; gives the shape back otherwise.
fn scalar_text<'a>(shape: Shape<'a>, options: &EscapeOptions) -> Result<Cow<'a, str>, Shape<'a>> {
    match shape {
        Shape::Null | Shape::DateTime(None) => Ok(Cow::Borrowed("NULL")),
        Shape::Bool(b) => Ok(Cow::Borrowed(if b { "true" } else { "false" })),
        Shape::Number(n) => Ok(Cow::Owned(n)),
        Shape::Text(s) | Shape::TrustedFragment(s) | Shape::TrustedIdentifier(s) => Ok(Cow::Borrowed(s)),
        Shape::DateTime(Some(d)) => Ok(Cow::Owned(date::format(d, &options.time_zone))),
        Shape::Other { text, fields: None } => Ok(Cow::Borrowed(text)),
        Shape::Other { text, .. } if options.stringify_objects => Ok(Cow::Borrowed(text)),
        other => Err(other),
    }
}

/// What goes inside a string context. Lists and mappings contribute their
/// free-standing rendering as text.
fn content<'a>(
    dialect: Dialect,
    value: &'a Value,
    options: &EscapeOptions,
    trust: &dyn Trust,
) -> Result<Content<'a>, Error> {
    match scalar_text(classify(value, trust), options) {
        Ok(text) => Ok(Content::Text(text)),
        Err(Shape::Blob(b)) => Ok(Content::Bytes(b)),
        Err(_) => Ok(Content::Text(Cow::Owned(escape_free_standing(dialect, value, options, trust)?))),
    }
}

fn identifier(
    dialect: Dialect,
    kind: IdentKind,
    value: &Value,
    options: &EscapeOptions,
    trust: &dyn Trust,
) -> Result<String, Error> {
    match classify(value, trust) {
        Shape::TrustedFragment(s) => {
            ident::check_fragment(s, options.forbid_qualified)?;
            ident::delimited(dialect, kind, s, options.forbid_qualified)
        }
        // `SELECT "${cols}"` lists each name as its own identifier.
        Shape::Sequence(items) => {
            let sep = format!("{}, {}", kind.quote(), kind.opener());
            let parts = items
                .iter()
                .map(|item| identifier(dialect, kind, item, options, trust))
                .collect::<Result<Vec<_>, Error>>()?;
            Ok(parts.join(&sep))
        }
        shape => match scalar_text(shape, options) {
            Ok(text) => ident::delimited(dialect, kind, &text, options.forbid_qualified),
            Err(_) => Err(Error::Unescapable {
                context: format!("{} identifier (value has no name form)", kind.opener()),
            }),
        },
    }
}

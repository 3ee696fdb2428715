//! Spacing that keeps a free-standing value from fusing with its neighbours.

use crate::dialect::{is_sql_space, Dialect};
use crate::lexer::LexState;

/// Where a single space must go around a free-standing value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Spacing {
    pub before: bool,
    pub after: bool,
}

fn fuses(dialect: Dialect, a: char, b: char) -> bool {
    dialect.patterns().merge_hazards.contains(&(a, b))
}

fn is_quote(c: char) -> bool {
    matches!(c, '\'' | '"' | '`')
}

/// Quote, `X'`-style prefix or `U&` at the start of `s`.
fn opens_quote(dialect: Dialect, s: &str) -> bool {
    let mut it = s.chars();
    match (it.next(), it.next()) {
        (Some(q), _) if is_quote(q) => true,
        (Some(p), Some('\'')) => dialect.string_prefixes().contains(&p),
        (Some('U' | 'u'), Some('&')) => dialect == Dialect::Postgres,
        _ => false,
    }
}

/// Could the end of a value turn a following quote into a prefixed literal?
fn ends_in_prefix(dialect: Dialect, c: char) -> bool {
    dialect.string_prefixes().contains(&c) || (dialect == Dialect::Postgres && c == '&')
}

/// `before` is everything assembled so far, `next` the literal chunk after the value.
pub(crate) fn spacing(dialect: Dialect, before: &str, escaped: &str, next: &str) -> Spacing {
    let prev = before.chars().next_back();
    let follow = next.chars().next();
    let (first, last) = match (escaped.chars().next(), escaped.chars().next_back()) {
        (Some(f), Some(l)) => (f, l),
        _ => {
            // Nothing rendered: the surrounding text must not fuse either.
            let before = match (prev, follow) {
                (Some(a), Some(b)) => {
                    fuses(dialect, a, b)
                        || (dialect.is_word_char(a) && dialect.is_word_char(b))
                        || (is_quote(b) && ends_in_prefix(dialect, a))
                        || (dialect.is_word_char(a) && opens_quote(dialect, next))
                        || (dialect == Dialect::Postgres && b == '$' && dialect.is_word_char(a))
                }
                _ => false,
            };
            return Spacing { before, after: false };
        }
    };
    let before = prev.is_some_and(|a| {
        fuses(dialect, a, first)
            || (is_quote(first) && ends_in_prefix(dialect, a))
            || (dialect.is_word_char(a) && opens_quote(dialect, escaped))
    });
    let after = follow.is_some_and(|b| {
        fuses(dialect, last, b)
            || (is_quote(b) && ends_in_prefix(dialect, last))
            || (dialect == Dialect::Postgres && b == '$' && dialect.is_word_char(last))
    });
    Spacing { before, after }
}

/// Would a Postgres value starting with `'` continue the string that `before`
/// ends in? `tail` is the lexer state after `before`.
pub(crate) fn continues_string(before: &str, tail: &LexState, escaped: &str) -> bool {
    if !escaped.starts_with('\'') {
        return false;
    }
    if matches!(tail, LexState::EscapeContinuation { newline: true, .. }) {
        return true;
    }
    let trimmed = before.trim_end_matches(is_sql_space);
    trimmed.ends_with('\'') && before[trimmed.len()..].contains(|c: char| c == '\n' || c == '\r')
}

//! Postgres-family transitions.
//!
//! Strings: `'...'` (doubled quotes only), `E'...'` (backslash escapes),
//! `U&'...'`, `X'...'`, `B'...'`, `N'...'`, and `$tag$...$tag$`.
//! Identifiers: `"..."` and `U&"..."`. Block comments nest. There is no
//! `#` comment.

use super::{Cursor, IdentKind, LexState, StringKind};
use crate::dialect::{is_pg_ident_char, is_sql_space, is_tag_char, is_tag_start, POSTGRES};
use crate::error::{excerpt, Error};

pub(super) fn step(mut state: LexState, chunk: &str, after_slot: bool) -> Result<LexState, Error> {
    if after_slot {
        match &state {
            LexState::EscapeContinuation { .. } => {
                return Err(Error::AmbiguousContinuation { near: excerpt(chunk) });
            }
            LexState::None if leading_continuation(chunk) => {
                return Err(Error::AmbiguousContinuation { near: excerpt(chunk) });
            }
            _ => {}
        }
    }
    let mut cur = Cursor::new(chunk);
    loop {
        let next = match &state {
            LexState::None => top_level(&mut cur)?,
            LexState::LineComment => {
                line_comment(&mut cur, 0)?;
                Some(LexState::None)
            }
            LexState::BlockComment { depth } => block_comment(&mut cur, *depth),
            LexState::StringLiteral(kind) => string_body(&mut cur, *kind)?,
            LexState::Identifier(kind) => ident_body(&mut cur, *kind),
            LexState::DollarQuote { tag } => dollar_body(&mut cur, tag)?,
            LexState::EscapeContinuation { kind, newline } => continuation(&mut cur, *kind, *newline)?,
        };
        match next {
            Some(s) => state = s,
            None => return Ok(state),
        }
    }
}

fn top_level(cur: &mut Cursor<'_>) -> Result<Option<LexState>, Error> {
    while let Some(c) = cur.peek() {
        let start = cur.pos();
        match c {
            '-' if cur.peek_nth(1) == Some('-') => {
                cur.eat("--");
                line_comment(cur, start)?;
            }
            '/' if cur.peek_nth(1) == Some('*') => {
                cur.eat("/*");
                return Ok(Some(LexState::BlockComment { depth: 1 }));
            }
            '\'' => {
                cur.bump();
                return Ok(Some(LexState::StringLiteral(StringKind::Single)));
            }
            c if c == POSTGRES.ident_quote => {
                cur.bump();
                return Ok(Some(LexState::Identifier(IdentKind::Double)));
            }
            '$' if POSTGRES.dollar_quotes => match dollar_tag(cur)? {
                Some(tag) => return Ok(Some(LexState::DollarQuote { tag })),
                None => {
                    cur.bump();
                }
            },
            c if is_tag_start(c) => {
                if let Some(state) = prefixed(cur) {
                    return Ok(Some(state));
                }
                // Whole words, so a `$` inside `a$b` never looks like a tag.
                while cur.peek().is_some_and(is_pg_ident_char) {
                    cur.bump();
                }
            }
            _ => {
                cur.bump();
            }
        }
    }
    Ok(None)
}

/// String and identifier prefixes at the start of a word.
fn prefixed(cur: &mut Cursor<'_>) -> Option<LexState> {
    let state = if cur.eat_ignore_case("U&'") {
        LexState::StringLiteral(StringKind::Unicode)
    } else if cur.eat_ignore_case("U&\"") {
        LexState::Identifier(IdentKind::Unicode)
    } else if cur.eat_ignore_case("E'") {
        LexState::StringLiteral(StringKind::Escaped)
    } else if cur.eat_ignore_case("X'") {
        LexState::StringLiteral(StringKind::Hex)
    } else if cur.eat_ignore_case("B'") {
        LexState::StringLiteral(StringKind::Bit)
    } else if cur.eat_ignore_case("N'") {
        LexState::StringLiteral(StringKind::Single)
    } else {
        return None;
    };
    Some(state)
}

/// Reads `$tag$` at the cursor. `None` when the `$` is not a tag opener
/// (a positional parameter like `$1`, or a lone operator character).
fn dollar_tag(cur: &mut Cursor<'_>) -> Result<Option<String>, Error> {
    let rest = cur.rest();
    let mut close = None;
    for (i, ch) in rest[1..].char_indices() {
        if ch == '$' {
            close = Some(i + 1);
            break;
        }
        let ok = if i == 0 { is_tag_start(ch) } else { is_tag_char(ch) };
        if !ok {
            return Ok(None);
        }
    }
    match close {
        Some(end) => {
            let tag = rest[1..end].to_string();
            cur.eat(&rest[..=end]);
            Ok(Some(tag))
        }
        None => Err(Error::MergeHazard(format!(
            "possible dollar-quote tag {:?} is cut off by an interpolation",
            excerpt(rest)
        ))),
    }
}

fn line_comment(cur: &mut Cursor<'_>, start: usize) -> Result<(), Error> {
    if cur.skip_line() {
        Ok(())
    } else {
        Err(Error::UnterminatedLineComment {
            near: excerpt(cur.tail_from(start)),
        })
    }
}

fn block_comment(cur: &mut Cursor<'_>, mut depth: u32) -> Option<LexState> {
    if cur.is_done() {
        return None;
    }
    while let Some(c) = cur.bump() {
        if POSTGRES.nested_block_comments && c == '/' && cur.eat("*") {
            depth += 1;
        } else if c == '*' && cur.eat("/") {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                return Some(LexState::None);
            }
        }
    }
    Some(LexState::BlockComment { depth })
}

fn string_body(cur: &mut Cursor<'_>, kind: StringKind) -> Result<Option<LexState>, Error> {
    match kind {
        StringKind::Hex | StringKind::Bit => {
            while let Some(c) = cur.bump() {
                if c == '\'' {
                    return Ok(Some(LexState::None));
                }
            }
            Ok(None)
        }
        StringKind::Single | StringKind::Unicode | StringKind::Escaped => {
            let backslashes = kind == StringKind::Escaped;
            while let Some(c) = cur.bump() {
                if backslashes && c == '\\' {
                    if cur.bump().is_none() {
                        return Err(Error::MergeHazard(
                            "backslash at end of chunk inside E' string would escape the next value".into(),
                        ));
                    }
                } else if c == '\'' {
                    if cur.peek() == Some('\'') {
                        cur.bump();
                    } else if kind == StringKind::Single {
                        return Ok(Some(LexState::None));
                    } else {
                        return Ok(Some(LexState::EscapeContinuation { kind, newline: false }));
                    }
                }
            }
            Ok(None)
        }
        StringKind::Double => Err(Error::Unescapable {
            context: "\" string (not a postgres construct)".into(),
        }),
    }
}

fn ident_body(cur: &mut Cursor<'_>, kind: IdentKind) -> Option<LexState> {
    let quote = kind.quote();
    while let Some(c) = cur.bump() {
        if c == quote {
            if cur.peek() == Some(quote) {
                cur.bump();
            } else {
                return Some(LexState::None);
            }
        }
    }
    None
}

fn dollar_body(cur: &mut Cursor<'_>, tag: &str) -> Result<Option<LexState>, Error> {
    let closing = format!("${}$", tag);
    let rest = cur.rest();
    if let Some(i) = rest.find(&closing) {
        cur.eat(&rest[..i + closing.len()]);
        return Ok(Some(LexState::None));
    }
    for (i, _) in closing.char_indices().skip(1) {
        if rest.ends_with(&closing[..i]) {
            return Err(Error::MergeHazard(format!(
                "chunk ends with {:?}, a partial {} delimiter",
                &closing[..i],
                closing
            )));
        }
    }
    cur.eat(rest);
    Ok(None)
}

/// After an `E'` or `U&'` string: whitespace with a newline then `'`
/// continues the same literal.
fn continuation(cur: &mut Cursor<'_>, kind: StringKind, newline_before: bool) -> Result<Option<LexState>, Error> {
    let mut newline = newline_before;
    loop {
        match cur.peek() {
            // Chunk ended: stay in continuation so the next chunk is rejected.
            None if newline == newline_before => return Ok(None),
            None => return Ok(Some(LexState::EscapeContinuation { kind, newline })),
            Some(c) if is_sql_space(c) => {
                if c == '\n' || c == '\r' {
                    newline = true;
                }
                cur.bump();
            }
            Some('-') if cur.peek_nth(1) == Some('-') => {
                let start = cur.pos();
                cur.eat("--");
                line_comment(cur, start)?;
                newline = true;
            }
            Some('\'') if newline => {
                cur.bump();
                return Ok(Some(LexState::StringLiteral(kind)));
            }
            Some(_) => return Ok(Some(LexState::None)),
        }
    }
}

/// Does a chunk begin with whitespace holding a newline and then `'`?
fn leading_continuation(chunk: &str) -> bool {
    let mut cur = Cursor::new(chunk);
    let mut newline = false;
    loop {
        match cur.peek() {
            Some(c) if is_sql_space(c) => {
                if c == '\n' || c == '\r' {
                    newline = true;
                }
                cur.bump();
            }
            Some('-') if cur.peek_nth(1) == Some('-') => {
                if !cur.skip_line() {
                    return false;
                }
                newline = true;
            }
            Some('\'') => return newline,
            _ => return false,
        }
    }
}

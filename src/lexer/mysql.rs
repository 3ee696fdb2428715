//! MySQL-family transitions.
//!
//! Strings may be `'...'` or `"..."` with backslash and doubled-quote
//! escapes. Backtick identifiers only double the backtick. `#` and `-- `
//! open line comments; block comments do not nest, and `/*!` / `/*+`
//! bodies are live SQL.

use super::{Cursor, IdentKind, LexState, StringKind};
use crate::dialect::{is_mysql_ident_char, MYSQL};
use crate::error::{excerpt, Error};

pub(super) fn step(mut state: LexState, chunk: &str) -> Result<LexState, Error> {
    let mut cur = Cursor::new(chunk);
    loop {
        let next = match &state {
            LexState::None => top_level(&mut cur)?,
            LexState::LineComment => {
                line_comment(&mut cur, 0)?;
                Some(LexState::None)
            }
            LexState::BlockComment { .. } => block_comment(&mut cur),
            LexState::StringLiteral(kind) => string_body(&mut cur, *kind)?,
            LexState::Identifier(kind) => ident_body(&mut cur, *kind),
            LexState::DollarQuote { .. } | LexState::EscapeContinuation { .. } => {
                return Err(Error::Unescapable {
                    context: format!("{} (not a mysql construct)", state),
                })
            }
        };
        match next {
            Some(s) => state = s,
            None => return Ok(state),
        }
    }
}

/// Scan inert text. Returns the construct that opens, or `None` at chunk end.
fn top_level(cur: &mut Cursor<'_>) -> Result<Option<LexState>, Error> {
    while let Some(c) = cur.peek() {
        let start = cur.pos();
        match c {
            '#' if MYSQL.hash_comment => {
                cur.bump();
                line_comment(cur, start)?;
            }
            '-' if cur.peek_nth(1) == Some('-') && dash_opens_comment(cur.peek_nth(2)) => {
                cur.eat("--");
                line_comment(cur, start)?;
            }
            '/' if cur.peek_nth(1) == Some('*') => {
                cur.eat("/*");
                match cur.peek() {
                    // Executable comments and optimizer hints run as SQL.
                    Some('!') | Some('+') => {
                        cur.bump();
                    }
                    _ => return Ok(Some(LexState::BlockComment { depth: 1 })),
                }
            }
            '\'' => {
                cur.bump();
                return Ok(Some(LexState::StringLiteral(StringKind::Single)));
            }
            '"' => {
                cur.bump();
                return Ok(Some(LexState::StringLiteral(StringKind::Double)));
            }
            c if c == MYSQL.ident_quote => {
                cur.bump();
                return Ok(Some(LexState::Identifier(IdentKind::Backtick)));
            }
            'x' | 'X' | 'b' | 'B' if cur.peek_nth(1) == Some('\'') && !cur.prev().is_some_and(is_mysql_ident_char) => {
                cur.bump();
                cur.bump();
                let kind = if c.eq_ignore_ascii_case(&'x') {
                    StringKind::Hex
                } else {
                    StringKind::Bit
                };
                return Ok(Some(LexState::StringLiteral(kind)));
            }
            _ => {
                cur.bump();
            }
        }
    }
    Ok(None)
}

/// `--` needs whitespace or a control character after it. At chunk end we
/// cannot know what follows, so it counts as a comment.
fn dash_opens_comment(next: Option<char>) -> bool {
    if !MYSQL.dash_comment_needs_space {
        return true;
    }
    match next {
        None => true,
        Some(c) => c.is_whitespace() || c.is_control(),
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

fn block_comment(cur: &mut Cursor<'_>) -> Option<LexState> {
    while let Some(c) = cur.bump() {
        if c == '*' && cur.eat("/") {
            return Some(LexState::None);
        }
    }
    None
}

fn string_body(cur: &mut Cursor<'_>, kind: StringKind) -> Result<Option<LexState>, Error> {
    let quote = kind.quote();
    if matches!(kind, StringKind::Hex | StringKind::Bit) {
        while let Some(c) = cur.bump() {
            if c == quote {
                return Ok(Some(LexState::None));
            }
        }
        return Ok(None);
    }
    while let Some(c) = cur.bump() {
        if c == '\\' {
            if cur.bump().is_none() {
                return Err(Error::MergeHazard(format!(
                    "backslash at end of chunk inside {} string would escape the next value",
                    kind.opener()
                )));
            }
        } else if c == quote {
            if cur.peek() == Some(quote) {
                cur.bump();
            } else {
                return Ok(Some(LexState::None));
            }
        }
    }
    Ok(None)
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

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(chunk: &str) -> Result<LexState, Error> {
        step(LexState::None, chunk)
    }

    #[test]
    fn plain_text_stays_top_level() {
        assert_eq!(lex("SELECT a - b / c FROM t WHERE x = ").unwrap(), LexState::None);
    }

    #[test]
    fn open_quotes_are_reported() {
        assert_eq!(lex("WHERE a = '").unwrap(), LexState::StringLiteral(StringKind::Single));
        assert_eq!(lex("WHERE a = \"").unwrap(), LexState::StringLiteral(StringKind::Double));
        assert_eq!(lex("SELECT `").unwrap(), LexState::Identifier(IdentKind::Backtick));
        assert_eq!(lex("SELECT X'").unwrap(), LexState::StringLiteral(StringKind::Hex));
        assert_eq!(lex("SELECT b'").unwrap(), LexState::StringLiteral(StringKind::Bit));
    }

    #[test]
    fn prefix_letters_inside_identifiers_are_not_prefixes() {
        assert_eq!(lex("SELECT max'").unwrap(), LexState::StringLiteral(StringKind::Single));
    }

    #[test]
    fn escapes_inside_strings() {
        assert_eq!(lex("'it''s' ").unwrap(), LexState::None);
        assert_eq!(lex(r"'it\'s' ").unwrap(), LexState::None);
        assert_eq!(lex(r"'it\'s").unwrap(), LexState::StringLiteral(StringKind::Single));
        assert_eq!(lex("\"say \"\"hi\"\"\"").unwrap(), LexState::None);
    }

    #[test]
    fn backticks_ignore_backslashes() {
        assert_eq!(lex(r"SELECT `a\` ").unwrap(), LexState::None);
        assert_eq!(lex("SELECT `a``b").unwrap(), LexState::Identifier(IdentKind::Backtick));
    }

    #[test]
    fn trailing_backslash_is_a_merge_hazard() {
        assert!(matches!(lex(r"'abc\"), Err(Error::MergeHazard(_))));
    }

    #[test]
    fn comments() {
        assert_eq!(lex("SELECT 1 # it's fine\n").unwrap(), LexState::None);
        assert_eq!(lex("SELECT 1 -- it's fine\n").unwrap(), LexState::None);
        assert_eq!(lex("SELECT 1--'").unwrap(), LexState::StringLiteral(StringKind::Single));
        assert_eq!(lex("SELECT /* ' */ 1").unwrap(), LexState::None);
        assert_eq!(lex("SELECT /* ' ").unwrap(), LexState::BlockComment { depth: 1 });
        assert_eq!(lex("/* /* */ '").unwrap(), LexState::StringLiteral(StringKind::Single));
    }

    #[test]
    fn executable_comments_are_live() {
        assert_eq!(lex("SELECT /*!50000 '").unwrap(), LexState::StringLiteral(StringKind::Single));
        assert_eq!(lex("SELECT /*+ BKA(t) */ 1").unwrap(), LexState::None);
    }

    #[test]
    fn unterminated_line_comments_fail() {
        assert!(matches!(lex("SELECT 1 # tail"), Err(Error::UnterminatedLineComment { .. })));
        assert!(matches!(lex("SELECT 1 --"), Err(Error::UnterminatedLineComment { .. })));
    }

    #[test]
    fn continues_from_previous_state() {
        let s = step(LexState::StringLiteral(StringKind::Single), "abc' AND b = `").unwrap();
        assert_eq!(s, LexState::Identifier(IdentKind::Backtick));
        let s = step(LexState::BlockComment { depth: 1 }, " still */ '").unwrap();
        assert_eq!(s, LexState::StringLiteral(StringKind::Single));
    }
}

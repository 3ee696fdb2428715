//! Incremental lexers that track only quoting and comment state.
//!
//! A [`Lexer`] consumes the literal chunks of one template in order and
//! reports, after each chunk, which construct is still open. That state is
//! the context for the interpolation slot that follows the chunk. Each
//! dialect provides a pure transition `step(state, chunk) -> Result<state>`;
//! the `Lexer` wrapper only adds ordering and sticky failure.

mod mysql;
mod postgres;

use crate::dialect::Dialect;
use crate::error::Error;
use std::fmt;

/// Sub-variant of an open string literal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StringKind {
    /// `'...'`
    Single,
    /// `"..."` (MySQL only; Postgres uses `"` for identifiers)
    Double,
    /// Postgres `E'...'` with C-style backslash escapes.
    Escaped,
    /// Postgres `U&'...'` with `\XXXX` escapes.
    Unicode,
    /// `X'...'`
    Hex,
    /// `B'...'`
    Bit,
}

impl StringKind {
    /// Opening delimiter as written in SQL.
    pub fn opener(self) -> &'static str {
        match self {
            StringKind::Single => "'",
            StringKind::Double => "\"",
            StringKind::Escaped => "E'",
            StringKind::Unicode => "U&'",
            StringKind::Hex => "X'",
            StringKind::Bit => "B'",
        }
    }

    /// Closing quote character.
    pub fn quote(self) -> char {
        match self {
            StringKind::Double => '"',
            _ => '\'',
        }
    }
}

/// Sub-variant of an open delimited identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IdentKind {
    /// MySQL `` `...` ``
    Backtick,
    /// Postgres `"..."`
    Double,
    /// Postgres `U&"..."`
    Unicode,
}

impl IdentKind {
    pub fn opener(self) -> &'static str {
        match self {
            IdentKind::Backtick => "`",
            IdentKind::Double => "\"",
            IdentKind::Unicode => "U&\"",
        }
    }

    pub fn quote(self) -> char {
        match self {
            IdentKind::Backtick => '`',
            IdentKind::Double | IdentKind::Unicode => '"',
        }
    }
}

/// The construct open at a point in the literal text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum LexState {
    /// Top level of a statement.
    #[default]
    None,
    LineComment,
    BlockComment { depth: u32 },
    StringLiteral(StringKind),
    Identifier(IdentKind),
    DollarQuote { tag: String },
    /// Postgres: an `E'` or `U&'` string just closed and only whitespace
    /// followed; a `'` after a newline would continue it.
    EscapeContinuation { kind: StringKind, newline: bool },
}

impl LexState {
    pub fn is_none(&self) -> bool {
        matches!(self, LexState::None)
    }

    /// Opening delimiter of the open construct, for error messages.
    pub fn describe(&self) -> String {
        match self {
            LexState::None => "top level".into(),
            LexState::LineComment => "--".into(),
            LexState::BlockComment { .. } => "/*".into(),
            LexState::StringLiteral(kind) => kind.opener().into(),
            LexState::Identifier(kind) => kind.opener().into(),
            LexState::DollarQuote { tag } => format!("${}$", tag),
            LexState::EscapeContinuation { kind, .. } => format!("{} continuation", kind.opener()),
        }
    }
}

impl fmt::Display for LexState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

enum Scan {
    Open(LexState),
    Failed(Error),
}

/// Stateful scanner for one sequence of literal chunks. Never reuse across templates.
pub struct Lexer {
    dialect: Dialect,
    scan: Scan,
    fed: usize,
}

impl Lexer {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            scan: Scan::Open(LexState::None),
            fed: 0,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Consume one literal chunk and return the state after it, or pass `None`
    /// to assert that nothing is left open. Once an error is returned, every
    /// later call returns the same error.
    pub fn feed(&mut self, chunk: Option<&str>) -> Result<LexState, Error> {
        let state = match &self.scan {
            Scan::Failed(e) => return Err(e.clone()),
            Scan::Open(s) => s.clone(),
        };
        let next = match chunk {
            Some(text) => step(self.dialect, state, text, self.fed > 0),
            None => finish(state),
        };
        self.fed += 1;
        match next {
            Ok(state) => {
                tracing::trace!(dialect = %self.dialect, chunk = self.fed, state = %state, "lexed chunk");
                self.scan = Scan::Open(state.clone());
                Ok(state)
            }
            Err(e) => {
                tracing::debug!(dialect = %self.dialect, chunk = self.fed, error = %e, "lexer failed");
                self.scan = Scan::Failed(e.clone());
                Err(e)
            }
        }
    }
}

/// Fresh lexer for `dialect`.
pub fn make_lexer(dialect: Dialect) -> Lexer {
    Lexer::new(dialect)
}

/// Pure transition: the state after `chunk` given the state before it.
/// `after_slot` is true for every chunk but the first.
pub fn step(dialect: Dialect, state: LexState, chunk: &str, after_slot: bool) -> Result<LexState, Error> {
    match dialect {
        Dialect::MySql => mysql::step(state, chunk),
        Dialect::Postgres => postgres::step(state, chunk, after_slot),
    }
}

fn finish(state: LexState) -> Result<LexState, Error> {
    match state {
        LexState::None | LexState::EscapeContinuation { .. } => Ok(LexState::None),
        open => Err(Error::unclosed(open.describe())),
    }
}

/// Character cursor over one chunk.
pub(crate) struct Cursor<'a> {
    text: &'a str,
    pos: usize,
    prev: Option<char>,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            prev: None,
        }
    }

    pub(crate) fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub(crate) fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    pub(crate) fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        self.prev = Some(c);
        Some(c)
    }

    /// Consume `s` if the remaining text starts with it.
    pub(crate) fn eat(&mut self, s: &str) -> bool {
        if self.rest().starts_with(s) {
            self.pos += s.len();
            self.prev = s.chars().last().or(self.prev);
            true
        } else {
            false
        }
    }

    /// Consume `s` ignoring ASCII case.
    pub(crate) fn eat_ignore_case(&mut self, s: &str) -> bool {
        let rest = self.rest();
        if rest.len() >= s.len() && rest.is_char_boundary(s.len()) && rest[..s.len()].eq_ignore_ascii_case(s) {
            self.eat(&rest[..s.len()])
        } else {
            false
        }
    }

    pub(crate) fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    pub(crate) fn is_done(&self) -> bool {
        self.pos >= self.text.len()
    }

    pub(crate) fn prev(&self) -> Option<char> {
        self.prev
    }

    /// Skip through the next line terminator. False if the chunk ends first.
    pub(crate) fn skip_line(&mut self) -> bool {
        while let Some(c) = self.bump() {
            if c == '\n' || c == '\r' {
                return true;
            }
        }
        false
    }

    /// Text from `start` (a byte offset) to the end, for messages.
    pub(crate) fn tail_from(&self, start: usize) -> &'a str {
        &self.text[start.min(self.text.len())..]
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }
}

//! Dialect selection and the constant character tables each lexer and escaper reads.

use serde::{Deserialize, Serialize};
use std::fmt;

/// SQL lexical/escaping convention.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[serde(alias = "mariadb")]
    MySql,
    #[serde(alias = "pg", alias = "postgresql")]
    Postgres,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::MySql => f.write_str("mysql"),
            Dialect::Postgres => f.write_str("postgres"),
        }
    }
}

/// Fixed lexical facts about a dialect. No behavior, only data.
#[derive(Debug)]
pub struct Patterns {
    /// `#` starts a line comment.
    pub hash_comment: bool,
    /// `/* /* */ */` counts depth.
    pub nested_block_comments: bool,
    /// `--` only opens a comment when followed by whitespace or a control character.
    pub dash_comment_needs_space: bool,
    /// `$tag$ ... $tag$` strings.
    pub dollar_quotes: bool,
    /// Quote character around delimited identifiers.
    pub ident_quote: char,
    /// Character pairs that fuse into a different token when an interpolation puts them side by side.
    pub merge_hazards: &'static [(char, char)],
    /// Separator between parts of a qualified name.
    pub qualifier: char,
}

pub const MYSQL: Patterns = Patterns {
    hash_comment: true,
    nested_block_comments: false,
    dash_comment_needs_space: true,
    dollar_quotes: false,
    ident_quote: '`',
    merge_hazards: &[('\'', '\''), ('"', '"'), ('`', '`'), ('-', '-'), ('/', '*'), ('*', '/')],
    qualifier: '.',
};

pub const POSTGRES: Patterns = Patterns {
    hash_comment: false,
    nested_block_comments: true,
    dash_comment_needs_space: false,
    dollar_quotes: true,
    ident_quote: '"',
    merge_hazards: &[('\'', '\''), ('"', '"'), ('$', '$'), ('-', '-'), ('/', '*'), ('*', '/')],
    qualifier: '.',
};

impl Dialect {
    pub fn patterns(self) -> &'static Patterns {
        match self {
            Dialect::MySql => &MYSQL,
            Dialect::Postgres => &POSTGRES,
        }
    }

    /// Characters that continue an unquoted word in this dialect.
    pub fn is_word_char(self, c: char) -> bool {
        match self {
            Dialect::MySql => is_mysql_ident_char(c),
            Dialect::Postgres => is_pg_ident_char(c),
        }
    }

    /// Letters that turn a following quote into a prefixed literal (`X'..'`, `E'..'`).
    pub fn string_prefixes(self) -> &'static [char] {
        match self {
            Dialect::MySql => &['x', 'X', 'b', 'B', 'n', 'N'],
            Dialect::Postgres => &['e', 'E', 'x', 'X', 'b', 'B', 'n', 'N'],
        }
    }
}

/// MySQL backslash escapes inside `'...'` and `"..."`.
pub const MYSQL_STRING_ESCAPES: &[(char, &str)] = &[
    ('\0', "\\0"),
    ('\u{8}', "\\b"),
    ('\t', "\\t"),
    ('\n', "\\n"),
    ('\r', "\\r"),
    ('\u{1a}', "\\Z"),
    ('"', "\\\""),
    ('\'', "\\'"),
    ('\\', "\\\\"),
];

/// Postgres `E'...'` escapes. A quote is doubled rather than backslashed so
/// `backslash_quote` settings never matter.
pub const PG_ESCAPE_STRING_ESCAPES: &[(char, &str)] = &[
    ('\0', "\\x00"),
    ('\u{8}', "\\b"),
    ('\t', "\\t"),
    ('\n', "\\n"),
    ('\r', "\\r"),
    ('\u{1a}', "\\x1a"),
    ('\'', "''"),
    ('\\', "\\\\"),
];

/// Looks up `c` in one of the escape tables above.
pub fn lookup(table: &'static [(char, &'static str)], c: char) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == c).map(|(_, v)| *v)
}

/// Postgres identifier continuation: letters, digits, `_`, `$`, and any non-ASCII character.
pub fn is_pg_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$' || !c.is_ascii()
}

/// First character of a dollar-quote tag.
pub fn is_tag_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// Later characters of a dollar-quote tag.
pub fn is_tag_char(c: char) -> bool {
    is_tag_start(c) || c.is_ascii_digit()
}

/// MySQL unquoted identifier characters.
pub fn is_mysql_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$' || ('\u{80}'..='\u{ffff}').contains(&c)
}

/// Whitespace as both lexers understand it.
pub fn is_sql_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\u{b}' | '\u{c}')
}

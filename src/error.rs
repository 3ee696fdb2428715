//! Typed errors for lexing, escaping, and interpolation.

use thiserror::Error;

/// Problems loading [`EscapeOptions`](crate::EscapeOptions).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
    #[error("config load: {0}")]
    Load(String),
}

/// Every failure the engine can report. `Clone` so a failed lexer can replay it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("unclosed {construct} at end of input")]
    Unclosed { construct: String },
    #[error("unterminated line comment near {near:?}")]
    UnterminatedLineComment { near: String },
    #[error("merge hazard: {0}")]
    MergeHazard(String),
    #[error("potential for ambiguous string continuation near {near:?}")]
    AmbiguousContinuation { near: String },
    #[error("malformed identifier {text:?}: {reason}")]
    MalformedIdentifier { text: String, reason: &'static str },
    #[error("qualified identifier {text:?} not allowed here")]
    QualifiedIdentifier { text: String },
    #[error("cannot escape a value into {context}")]
    Unescapable { context: String },
    #[error("expected {expected} values, got {got}")]
    Arity { expected: usize, got: usize },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("template cache: {0}")]
    Cache(&'static str),
}

impl Error {
    pub(crate) fn unclosed(construct: impl Into<String>) -> Self {
        Error::Unclosed {
            construct: construct.into(),
        }
    }

    pub(crate) fn malformed(text: &str, reason: &'static str) -> Self {
        Error::MalformedIdentifier {
            text: text.to_string(),
            reason,
        }
    }
}

/// Short excerpt of literal text for error messages.
pub(crate) fn excerpt(text: &str) -> String {
    const MAX: usize = 24;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        let tail: String = text.chars().rev().take(MAX).collect::<Vec<_>>().into_iter().rev().collect();
        format!("...{}", tail)
    }
}

//! Lex a template once, then fill its slots as often as needed.

use super::hazard::{continues_string, spacing};
use crate::config::EscapeOptions;
use crate::dialect::Dialect;
use crate::error::{excerpt, Error};
use crate::escape::{escape_delimited, escape_free_standing};
use crate::lexer::{make_lexer, step, LexState};
use crate::trust::{Trust, TrustedSql};
use crate::value::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Literal chunks plus the lexed context of every slot between them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    dialect: Dialect,
    chunks: Vec<String>,
    contexts: Vec<LexState>,
}

impl Template {
    /// Lexes `chunks` in order. Fails if any chunk is malformed or something
    /// is still open after the last one.
    pub fn new<S: AsRef<str>>(dialect: Dialect, chunks: &[S]) -> Result<Self, Error> {
        let mut chunks: Vec<String> = chunks.iter().map(|c| c.as_ref().to_string()).collect();
        if chunks.is_empty() {
            chunks.push(String::new());
        }
        let mut lexer = make_lexer(dialect);
        let mut contexts = Vec::with_capacity(chunks.len() - 1);
        for (i, chunk) in chunks.iter().enumerate() {
            let state = lexer.feed(Some(chunk.as_str()))?;
            if i + 1 < chunks.len() {
                contexts.push(state);
            }
        }
        lexer.feed(None)?;
        tracing::debug!(dialect = %dialect, slots = contexts.len(), "lexed template");
        Ok(Self {
            dialect,
            chunks,
            contexts,
        })
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    /// Context of each slot, in order.
    pub fn contexts(&self) -> &[LexState] {
        &self.contexts
    }

    pub fn slots(&self) -> usize {
        self.contexts.len()
    }

    /// Escape `values` into the slots and mint the result.
    pub fn interpolate(&self, values: &[Value], options: &EscapeOptions, trust: &dyn Trust) -> Result<TrustedSql, Error> {
        if values.len() != self.contexts.len() {
            return Err(Error::Arity {
                expected: self.contexts.len(),
                got: values.len(),
            });
        }
        let mut out = self.chunks[0].clone();
        let mut tail = self.track(LexState::None, &out)?;
        for (i, (value, context)) in values.iter().zip(&self.contexts).enumerate() {
            let next = &self.chunks[i + 1];
            let piece = if context.is_none() {
                let escaped = escape_free_standing(self.dialect, value, options, trust)?;
                if self.dialect == Dialect::Postgres && continues_string(&out, &tail, &escaped) {
                    return Err(Error::AmbiguousContinuation { near: excerpt(&escaped) });
                }
                let space = spacing(self.dialect, &out, &escaped, next);
                let mut piece = String::with_capacity(escaped.len() + 2);
                if space.before {
                    piece.push(' ');
                }
                piece.push_str(&escaped);
                if space.after {
                    piece.push(' ');
                }
                piece
            } else {
                escape_delimited(self.dialect, value, context, options, trust)?
            };
            tail = self.track(tail, &piece)?;
            out.push_str(&piece);
            tail = self.track(tail, next)?;
            out.push_str(next);
        }
        tracing::debug!(dialect = %self.dialect, sql = %out, "interpolated");
        Ok(trust.mint(out))
    }

    /// Postgres lexer state after appending `piece`. Only Postgres strings
    /// continue across lines, so other dialects stay at top level.
    fn track(&self, state: LexState, piece: &str) -> Result<LexState, Error> {
        match self.dialect {
            Dialect::Postgres => step(self.dialect, state, piece, false),
            Dialect::MySql => Ok(state),
        }
    }
}

type CacheKey = (Dialect, Vec<String>);

/// Lexed templates keyed by dialect and literal chunks.
///
/// Entries are never evicted; callers bound the cache with [`TemplateCache::clear`].
#[derive(Debug, Default)]
pub struct TemplateCache {
    templates: RwLock<HashMap<CacheKey, Arc<Template>>>,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached template for `chunks`, lexing it on first use. Lexing
    /// failures are returned and not cached.
    pub fn get_or_lex<S: AsRef<str>>(&self, dialect: Dialect, chunks: &[S]) -> Result<Arc<Template>, Error> {
        let key: CacheKey = (dialect, chunks.iter().map(|c| c.as_ref().to_string()).collect());
        if let Some(t) = self.templates.read().map_err(|_| Error::Cache("lock poisoned"))?.get(&key) {
            return Ok(Arc::clone(t));
        }
        let template = Arc::new(Template::new(dialect, key.1.as_slice())?);
        let mut guard = self.templates.write().map_err(|_| Error::Cache("lock poisoned"))?;
        Ok(Arc::clone(guard.entry(key).or_insert(template)))
    }

    pub fn len(&self) -> Result<usize, Error> {
        Ok(self.templates.read().map_err(|_| Error::Cache("lock poisoned"))?.len())
    }

    pub fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.len()? == 0)
    }

    pub fn clear(&self) -> Result<(), Error> {
        self.templates.write().map_err(|_| Error::Cache("lock poisoned"))?.clear();
        Ok(())
    }
}

/// Lex and fill in one call.
pub fn interpolate<S: AsRef<str>>(
    dialect: Dialect,
    chunks: &[S],
    values: &[Value],
    options: &EscapeOptions,
    trust: &dyn Trust,
) -> Result<TrustedSql, Error> {
    Template::new(dialect, chunks)?.interpolate(values, options, trust)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::StringKind;
    use crate::trust::Notary;

    fn run(dialect: Dialect, chunks: &[&str], values: Vec<Value>) -> Result<String, Error> {
        interpolate(dialect, chunks, &values, &EscapeOptions::default(), &Notary::new()).map(TrustedSql::into_string)
    }

    #[test]
    fn adjacent_strings_get_a_space() {
        assert_eq!(run(Dialect::MySql, &["", "", ""], vec!["a".into(), "b".into()]).unwrap(), "'a' 'b'");
        assert_eq!(run(Dialect::MySql, &["'a''b'"], vec![]).unwrap(), "'a''b'");
    }

    #[test]
    fn contexts_pick_the_escaping_mode() {
        let sql = run(
            Dialect::MySql,
            &["SELECT * FROM `", "` WHERE name = '", "' AND id = ", ""],
            vec!["my`table".into(), "O'Brien".into(), 7.into()],
        )
        .unwrap();
        assert_eq!(sql, "SELECT * FROM `my``table` WHERE name = 'O\\'Brien' AND id = 7");
    }

    #[test]
    fn arity_is_checked() {
        let err = run(Dialect::Postgres, &["SELECT ", ""], vec![]).unwrap_err();
        assert_eq!(err, Error::Arity { expected: 1, got: 0 });
    }

    #[test]
    fn lex_errors_surface_before_escaping() {
        assert!(matches!(
            run(Dialect::Postgres, &["SELECT 'open"], vec![]),
            Err(Error::Unclosed { .. })
        ));
        assert!(matches!(
            run(Dialect::MySql, &["SELECT 1 -- ", "\n"], vec![1.into()]),
            Err(Error::UnterminatedLineComment { .. })
        ));
    }

    #[test]
    fn cache_reuses_templates() {
        let cache = TemplateCache::new();
        let a = cache.get_or_lex(Dialect::Postgres, &["SELECT E'", "'"]).unwrap();
        let b = cache.get_or_lex(Dialect::Postgres, &["SELECT E'", "'"]).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.contexts(), &[LexState::StringLiteral(StringKind::Escaped)]);
        assert_eq!(cache.len().unwrap(), 1);
        cache.get_or_lex(Dialect::MySql, &["SELECT E'", "'"]).unwrap();
        assert_eq!(cache.len().unwrap(), 2);
        assert!(cache.get_or_lex(Dialect::MySql, &["'"]).is_err());
        assert_eq!(cache.len().unwrap(), 2);
        cache.clear().unwrap();
        assert!(cache.is_empty().unwrap());
    }

    #[test]
    fn empty_values_cannot_turn_a_word_into_a_string_prefix() {
        let sql = run(
            Dialect::Postgres,
            &["SELECT E", "'", "'"],
            vec![Value::seq(Vec::<Value>::new()), "\\' OR 1=1 --".into()],
        )
        .unwrap();
        assert_eq!(sql, "SELECT E '\\'' OR 1=1 --'");
        let relexed = Template::new(Dialect::Postgres, &[sql.as_str(), ""]).unwrap();
        assert_eq!(relexed.contexts(), &[LexState::None]);
    }

    #[test]
    fn values_never_continue_a_string_across_a_newline() {
        for chunks in [["SELECT ", "\n", ""], ["SELECT ", " -- sep\n", ""]] {
            let err = run(Dialect::Postgres, &chunks, vec!["a\n".into(), "b".into()]).unwrap_err();
            assert!(matches!(err, Error::AmbiguousContinuation { .. }), "{:?}", err);
        }
        let err = run(Dialect::Postgres, &["SELECT ", "\n", ""], vec!["a".into(), "b".into()]).unwrap_err();
        assert!(matches!(err, Error::AmbiguousContinuation { .. }));
        let err = run(Dialect::Postgres, &["SELECT 'a'\n", ""], vec![vec![0xcau8, 0xfe].into()]).unwrap_err();
        assert!(matches!(err, Error::AmbiguousContinuation { .. }));
        assert_eq!(
            run(Dialect::Postgres, &["SELECT ", ", ", ""], vec!["a\n".into(), "b".into()]).unwrap(),
            "SELECT E'a\\n', 'b'"
        );
        assert_eq!(
            run(Dialect::MySql, &["SELECT ", "\n", ""], vec!["a".into(), "b".into()]).unwrap(),
            "SELECT 'a'\n'b'"
        );
    }

    #[test]
    fn negative_numbers_after_minus() {
        assert_eq!(run(Dialect::Postgres, &["SELECT 1 -", ""], vec![(-1).into()]).unwrap(), "SELECT 1 - -1");
    }
}

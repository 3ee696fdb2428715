//! sqlctx: contextual SQL escaping for MySQL and Postgres.
//!
//! Literal chunks are lexed to learn what each interpolation slot sits
//! inside (top level, a string, an identifier, a dollar quote), and each
//! value is escaped for exactly that position.
//!
//! ```
//! use sqlctx::{interpolate, Dialect, EscapeOptions, Notary, Value};
//!
//! let notary = Notary::new();
//! let sql = interpolate(
//!     Dialect::MySql,
//!     &["SELECT * FROM t WHERE name = '", "' AND id IN (", ")"],
//!     &[Value::from("O'Brien"), Value::seq([1, 2, 3])],
//!     &EscapeOptions::default(),
//!     &notary,
//! )
//! .unwrap();
//! assert_eq!(sql.as_str(), "SELECT * FROM t WHERE name = 'O\\'Brien' AND id IN (1, 2, 3)");
//! ```

pub mod config;
pub mod dialect;
pub mod error;
pub mod escape;
pub mod lexer;
pub mod sql;
pub mod trust;
pub mod value;

pub use config::EscapeOptions;
pub use dialect::Dialect;
pub use error::{ConfigError, Error};
pub use escape::{escape_delimited, escape_free_standing};
pub use lexer::{make_lexer, IdentKind, LexState, Lexer, StringKind};
pub use sql::{interpolate, Template, TemplateCache};
pub use trust::{Notary, Trust, TrustKind, TrustedSql};
pub use value::{Object, Value};

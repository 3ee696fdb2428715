//! Trusted SQL values and the capability that vouches for them.
//!
//! The escaper never decides on its own that text is safe. It asks a
//! [`Trust`] implementation whether a [`TrustedSql`] was minted by it, and
//! hands finished statements back to the same implementation for minting.

use crate::error::Error;
use std::fmt;
use uuid::Uuid;

/// What a trusted value may stand in for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrustKind {
    /// Raw SQL spliced verbatim at the top level.
    Fragment,
    /// A name, escaped only as an identifier.
    Identifier,
}

/// Text certified by a [`Trust`] implementation. The seal ties it to the
/// minting instance; a value built with someone else's seal is not trusted.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TrustedSql {
    kind: TrustKind,
    text: String,
    seal: Uuid,
}

impl TrustedSql {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> TrustKind {
        self.kind
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for TrustedSql {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl AsRef<str> for TrustedSql {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// Verify and mint trusted values.
pub trait Trust: Send + Sync {
    fn is_trusted(&self, value: &TrustedSql) -> bool;
    fn mint(&self, text: String) -> TrustedSql;
}

/// Default [`Trust`]: every instance has its own random seal.
#[derive(Clone, Debug)]
pub struct Notary {
    seal: Uuid,
}

impl Notary {
    pub fn new() -> Self {
        Self { seal: Uuid::new_v4() }
    }

    /// Vouch for raw SQL text.
    pub fn fragment(&self, text: impl Into<String>) -> TrustedSql {
        self.seal(TrustKind::Fragment, text.into())
    }

    /// Vouch for a name. Rejects empty names and NUL, which no dialect accepts.
    pub fn identifier(&self, name: impl Into<String>) -> Result<TrustedSql, Error> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::malformed(&name, "empty identifier"));
        }
        if name.contains('\0') {
            return Err(Error::malformed(&name, "identifier contains NUL"));
        }
        Ok(self.seal(TrustKind::Identifier, name))
    }

    fn seal(&self, kind: TrustKind, text: String) -> TrustedSql {
        TrustedSql {
            kind,
            text,
            seal: self.seal,
        }
    }
}

impl Default for Notary {
    fn default() -> Self {
        Self::new()
    }
}

impl Trust for Notary {
    fn is_trusted(&self, value: &TrustedSql) -> bool {
        value.seal == self.seal
    }

    fn mint(&self, text: String) -> TrustedSql {
        self.fragment(text)
    }
}

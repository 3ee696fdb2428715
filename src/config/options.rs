//! Escaping options: defaults, JSON, and environment loading.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

pub const ENV_TIME_ZONE: &str = "SQLCTX_TIME_ZONE";
pub const ENV_STRINGIFY_OBJECTS: &str = "SQLCTX_STRINGIFY_OBJECTS";
pub const ENV_FORBID_QUALIFIED: &str = "SQLCTX_FORBID_QUALIFIED";

/// Knobs that change how values render.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EscapeOptions {
    /// Render plain objects through their text instead of `key = value` pairs.
    #[serde(alias = "stringifyObjects")]
    pub stringify_objects: bool,
    /// `local`, `Z`, an offset like `+05:00`, `+0200` or `+01`; anything else is UTC.
    #[serde(alias = "timeZone")]
    pub time_zone: String,
    /// Reject dotted names where an identifier is expected.
    #[serde(alias = "forbidQualified")]
    pub forbid_qualified: bool,
}

impl Default for EscapeOptions {
    fn default() -> Self {
        Self {
            stringify_objects: false,
            time_zone: "local".into(),
            forbid_qualified: false,
        }
    }
}

impl EscapeOptions {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::Load(e.to_string()))
    }

    /// Defaults overridden by `SQLCTX_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut opts = Self::default();
        if let Some(tz) = lookup(ENV_TIME_ZONE) {
            opts.time_zone = tz;
        }
        if let Some(v) = lookup(ENV_STRINGIFY_OBJECTS) {
            opts.stringify_objects = parse_flag(ENV_STRINGIFY_OBJECTS, &v)?;
        }
        if let Some(v) = lookup(ENV_FORBID_QUALIFIED) {
            opts.forbid_qualified = parse_flag(ENV_FORBID_QUALIFIED, &v)?;
        }
        tracing::debug!(?opts, "loaded escape options");
        Ok(opts)
    }

    pub fn with_time_zone(mut self, tz: impl Into<String>) -> Self {
        self.time_zone = tz.into();
        self
    }

    pub fn forbidding_qualified(mut self) -> Self {
        self.forbid_qualified = true;
        self
    }

    /// Copy with `stringify_objects` forced on, for values nested in mappings.
    pub fn stringified(&self) -> Self {
        Self {
            stringify_objects: true,
            ..self.clone()
        }
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}

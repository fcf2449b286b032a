//! Configuration types shared by the gateway client and the CLI.
//!
//! String values in configuration files may reference environment variables
//! through [`LiteralOrEnv`], which keeps the developer token out of the file:
//!
//! ```json
//! {
//!   "base_url": "https://api-bakong.nbc.gov.kh/v1/",
//!   "token": "$BAKONG_TOKEN"
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::str::FromStr;
use url::Url;

/// Production Bakong Open API.
pub const DEFAULT_BAKONG_API: &str = "https://api-bakong.nbc.gov.kh/v1/";

/// Environment variable overriding the gateway base URL.
pub const ENV_BAKONG_API: &str = "BAKONG_API";
/// Environment variable holding the Bakong developer token.
pub const ENV_BAKONG_TOKEN: &str = "BAKONG_TOKEN";

/// A value given either literally or as a `$VAR` / `${VAR}` reference,
/// resolved once while deserializing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralOrEnv<T>(T);

impl<T> LiteralOrEnv<T> {
    pub fn from_literal(value: T) -> Self {
        Self(value)
    }

    pub fn into_inner(self) -> T {
        self.0
    }

    /// Name of the referenced variable, if `s` is a reference at all.
    fn env_var_name(s: &str) -> Option<&str> {
        if let Some(braced) = s.strip_prefix("${").and_then(|r| r.strip_suffix('}')) {
            return Some(braced);
        }
        s.strip_prefix('$')
            .filter(|name| !name.is_empty())
            .filter(|name| name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'))
    }

    /// Resolves `raw` and parses it as `T`.
    pub fn resolve(raw: &str) -> Result<Self, String>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let value = match Self::env_var_name(raw) {
            Some(name) => std::env::var(name).map_err(|_| {
                format!("environment variable '{name}' not found (referenced as '{raw}')")
            })?,
            None => raw.to_string(),
        };
        value
            .parse::<T>()
            .map(LiteralOrEnv)
            .map_err(|e| format!("failed to parse value: {e}"))
    }
}

impl<T> Deref for LiteralOrEnv<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'de, T> Deserialize<'de> for LiteralOrEnv<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::resolve(&raw).map_err(serde::de::Error::custom)
    }
}

impl<T: Serialize> Serialize for LiteralOrEnv<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

/// Connection settings for the Bakong Open API.
///
/// A missing `base_url` falls back to `$BAKONG_API`, then to the production
/// endpoint. A `$BAKONG_API` that is set but unparsable is an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GatewayConfigFile")]
pub struct GatewayConfig {
    pub base_url: LiteralOrEnv<Url>,
    pub token: Option<LiteralOrEnv<String>>,
    /// Per-request timeout, in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// The gateway environment variables hold values that cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayConfigError {
    #[error("environment variable '{name}' is not a valid URL ('{value}'): {source}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        source: url::ParseError,
    },
    #[error("environment variable '{name}' is not valid unicode")]
    NotUnicode { name: &'static str },
}

/// On-disk shape of [`GatewayConfig`], before environment fallbacks apply.
#[derive(Deserialize)]
struct GatewayConfigFile {
    #[serde(default)]
    base_url: Option<LiteralOrEnv<Url>>,
    #[serde(default = "config_defaults::default_token")]
    token: Option<LiteralOrEnv<String>>,
    #[serde(default)]
    timeout_secs: Option<u64>,
}

impl TryFrom<GatewayConfigFile> for GatewayConfig {
    type Error = GatewayConfigError;

    fn try_from(file: GatewayConfigFile) -> Result<Self, Self::Error> {
        let base_url = match file.base_url {
            Some(base_url) => base_url,
            None => config_defaults::default_base_url()?,
        };
        Ok(Self {
            base_url,
            token: file.token,
            timeout_secs: file.timeout_secs,
        })
    }
}

impl GatewayConfig {
    /// Settings taken from `$BAKONG_API` and `$BAKONG_TOKEN` alone.
    pub fn from_env() -> Result<Self, GatewayConfigError> {
        Ok(Self {
            base_url: config_defaults::default_base_url()?,
            token: config_defaults::default_token(),
            timeout_secs: None,
        })
    }

    /// The developer token, if one is configured and non-empty.
    pub fn token(&self) -> Option<&str> {
        self.token
            .as_deref()
            .map(String::as_str)
            .filter(|t| !t.is_empty())
    }
}

mod config_defaults {
    use super::*;
    use std::env::VarError;

    /// `$BAKONG_API` when set, the production endpoint when unset.
    pub fn default_base_url() -> Result<LiteralOrEnv<Url>, GatewayConfigError> {
        base_url_from(std::env::var(ENV_BAKONG_API))
    }

    pub(super) fn base_url_from(
        var: Result<String, VarError>,
    ) -> Result<LiteralOrEnv<Url>, GatewayConfigError> {
        let url = match var {
            Ok(value) => Url::parse(&value).map_err(|source| GatewayConfigError::InvalidUrl {
                name: ENV_BAKONG_API,
                value,
                source,
            })?,
            Err(VarError::NotPresent) => {
                Url::parse(DEFAULT_BAKONG_API).expect("default Bakong API URL is valid")
            }
            Err(VarError::NotUnicode(_)) => {
                return Err(GatewayConfigError::NotUnicode {
                    name: ENV_BAKONG_API,
                });
            }
        };
        Ok(LiteralOrEnv::from_literal(url))
    }

    /// `$BAKONG_TOKEN`, if set.
    pub fn default_token() -> Option<LiteralOrEnv<String>> {
        std::env::var(ENV_BAKONG_TOKEN)
            .ok()
            .map(LiteralOrEnv::from_literal)
    }
}

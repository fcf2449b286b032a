//! Configuration for the `khqr` command line tool.
//!
//! Values come from three places, highest priority first: command line flags,
//! the optional JSON file given with `--config` (or `$CONFIG`), and
//! environment variables (`$BAKONG_API`, `$BAKONG_TOKEN`).
//!
//! ```json
//! {
//!   "gateway": { "base_url": "https://api-bakong.nbc.gov.kh/v1/", "token": "$BAKONG_TOKEN" },
//!   "merchant": {
//!     "bank_account": "your_name@wing",
//!     "merchant_name": "Your Name",
//!     "merchant_city": "Phnom Penh",
//!     "currency": "KHR"
//!   }
//! }
//! ```

use clap::{Args, Parser, Subcommand};
use khqr_types::config::{GatewayConfig, GatewayConfigError, LiteralOrEnv};
use khqr_types::fields::AmountPadding;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// CLI arguments for the `khqr` tool.
#[derive(Parser, Debug)]
#[command(name = "khqr", version)]
#[command(about = "Build Bakong KHQR payloads and check their payment status")]
pub struct CliArgs {
    /// Path to the JSON configuration file
    #[arg(long, short, env = "CONFIG", global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Assemble a KHQR payload
    Create(CreateArgs),
    /// Print the MD5 digest of a payload
    Md5 {
        /// The payload string
        qr: String,
    },
    /// Exchange a payload for a deep link
    Deeplink(DeeplinkArgs),
    /// Check whether a payment has been made
    Check {
        /// MD5 digest of the payload
        md5: String,
    },
    /// Check several payments at once and list the paid ones
    CheckBulk {
        /// MD5 digests of the payloads
        #[arg(required = true)]
        md5: Vec<String>,
    },
}

#[derive(Args, Debug, Default)]
pub struct CreateArgs {
    /// Bakong account reference, e.g. `your_name@wing`
    #[arg(long)]
    pub bank_account: Option<String>,
    #[arg(long)]
    pub merchant_name: Option<String>,
    #[arg(long)]
    pub merchant_city: Option<String>,
    /// Amount, e.g. `10000` or `12.50`; ignored for static payloads
    #[arg(long)]
    pub amount: Option<String>,
    /// `USD` or `KHR`
    #[arg(long)]
    pub currency: Option<String>,
    #[arg(long)]
    pub store_label: Option<String>,
    #[arg(long)]
    pub mobile_number: Option<String>,
    #[arg(long)]
    pub bill_number: Option<String>,
    #[arg(long)]
    pub terminal_label: Option<String>,
    /// Build a reusable payload without an amount
    #[arg(long = "static")]
    pub static_qr: bool,
    /// Pad the amount with zeros instead of spaces
    #[arg(long)]
    pub zero_pad_amount: bool,
    /// Also print the MD5 digest of the payload
    #[arg(long)]
    pub with_md5: bool,
}

#[derive(Args, Debug)]
pub struct DeeplinkArgs {
    /// The payload string
    pub qr: String,
    /// URL the payer's app returns to
    #[arg(long)]
    pub callback: Option<String>,
    #[arg(long)]
    pub app_icon_url: Option<String>,
    #[arg(long)]
    pub app_name: Option<String>,
}

/// Merchant defaults for `khqr create`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MerchantDefaults {
    pub bank_account: Option<LiteralOrEnv<String>>,
    pub merchant_name: Option<String>,
    pub merchant_city: Option<String>,
    pub currency: Option<String>,
    pub store_label: Option<String>,
    pub mobile_number: Option<String>,
    pub terminal_label: Option<String>,
    #[serde(default)]
    pub amount_padding: AmountPadding,
}

/// Tool configuration.
#[derive(Debug, Clone)]
pub struct Config {
    gateway: GatewayConfig,
    merchant: MerchantDefaults,
}

#[derive(Deserialize)]
struct ConfigFile {
    #[serde(default)]
    gateway: Option<GatewayConfig>,
    #[serde(default)]
    merchant: MerchantDefaults,
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {0}: {1}")]
    FileRead(PathBuf, std::io::Error),
    #[error("Failed to parse config file: {0}")]
    JsonParse(#[from] serde_json::Error),
    #[error(transparent)]
    Gateway(#[from] GatewayConfigError),
}

impl Config {
    pub fn gateway(&self) -> &GatewayConfig {
        &self.gateway
    }

    pub fn merchant(&self) -> &MerchantDefaults {
        &self.merchant
    }

    /// Loads the file at `path`, or falls back to environment defaults when
    /// no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Ok(Self {
                gateway: GatewayConfig::from_env()?,
                merchant: MerchantDefaults::default(),
            }),
        }
    }

    fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::FileRead(path.to_path_buf(), e))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_json::from_str(content)?;
        let gateway = match file.gateway {
            Some(gateway) => gateway,
            None => GatewayConfig::from_env()?,
        };
        Ok(Self {
            gateway,
            merchant: file.merchant,
        })
    }
}

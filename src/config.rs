//! Runtime settings from the environment (and `.env`, if present).
//!
//! Regulation percentages live here rather than in the engine so that a rate
//! change is a configuration change.

use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::domain::RegulationParams;
use crate::error::{AppError, ValidationError};

pub const ENV_ALLOWANCE_RATE: &str = "TARIFFA_ALLOWANCE_RATE";
pub const ENV_GUILD_RATE: &str = "TARIFFA_GUILD_RATE";
pub const ENV_TAX_RATE: &str = "TARIFFA_TAX_RATE";
pub const ENV_DATA_DIR: &str = "TARIFFA_DATA_DIR";
pub const ENV_SENDER: &str = "TARIFFA_SENDER";
pub const ENV_LOG: &str = "TARIFFA_LOG";

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_SENDER: &str = "studio@example.com";
const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Clone)]
pub struct Settings {
    pub params: RegulationParams,
    pub data_dir: PathBuf,
    /// Sender address used by the notification channel.
    pub sender: String,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            params: RegulationParams::default(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            sender: DEFAULT_SENDER.to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup (used by `from_env` and tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let params = RegulationParams {
            allowance_rate: rate(&lookup, ENV_ALLOWANCE_RATE, "allowance_rate", defaults.params.allowance_rate)?,
            guild_rate: rate(&lookup, ENV_GUILD_RATE, "guild_rate", defaults.params.guild_rate)?,
            tax_rate: rate(&lookup, ENV_TAX_RATE, "tax_rate", defaults.params.tax_rate)?,
        };
        params.validate()?;

        Ok(Self {
            params,
            data_dir: non_empty(lookup(ENV_DATA_DIR))
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            sender: non_empty(lookup(ENV_SENDER)).unwrap_or(defaults.sender),
            log_filter: non_empty(lookup(ENV_LOG)).unwrap_or(defaults.log_filter),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn rate<F>(lookup: &F, key: &str, name: &'static str, default: Decimal) -> Result<Decimal, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = non_empty(lookup(key)) else {
        return Ok(default);
    };
    Decimal::from_str(&raw).map_err(|_| {
        AppError::from(ValidationError::InvalidRate {
            name,
            value: raw.clone(),
        })
    })
}

use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::qualification::models::Thresholds;

/// Which CRM backend stores qualified leads.
#[derive(Debug, Clone, PartialEq)]
pub enum CrmConfig {
    Airtable {
        api_key: String,
        base_id: String,
        table_name: String,
    },
    Postgres {
        database_url: String,
    },
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or invalid.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub crm: CrmConfig,
    pub thresholds: Thresholds,
    pub llm_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let thresholds = Thresholds::new(
            parse_env("HIGH_SCORE_THRESHOLD", 80.0)?,
            parse_env("MEDIUM_SCORE_THRESHOLD", 60.0)?,
        )
        .context("Invalid score thresholds")?;

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            crm: resolve_crm(
                optional_env("AIRTABLE_API_KEY"),
                optional_env("AIRTABLE_BASE_ID"),
                optional_env("AIRTABLE_TABLE_NAME"),
                optional_env("DATABASE_URL"),
            )?,
            thresholds,
            llm_timeout: Duration::from_secs(parse_env("LLM_TIMEOUT_SECS", 30u64)?),
            port: parse_env("PORT", 8000u16)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Airtable wins when both of its credentials are present; otherwise PostgreSQL.
fn resolve_crm(
    airtable_api_key: Option<String>,
    airtable_base_id: Option<String>,
    airtable_table_name: Option<String>,
    database_url: Option<String>,
) -> Result<CrmConfig> {
    match (airtable_api_key, airtable_base_id, database_url) {
        (Some(api_key), Some(base_id), _) => Ok(CrmConfig::Airtable {
            api_key,
            base_id,
            table_name: airtable_table_name.unwrap_or_else(|| "Leads".to_string()),
        }),
        (None, None, Some(database_url)) => Ok(CrmConfig::Postgres { database_url }),
        (Some(_), None, _) | (None, Some(_), _) => {
            bail!("AIRTABLE_API_KEY and AIRTABLE_BASE_ID must be set together")
        }
        (None, None, None) => {
            bail!("Either AIRTABLE_API_KEY + AIRTABLE_BASE_ID or DATABASE_URL must be set")
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has invalid value '{raw}'")),
        None => Ok(default),
    }
}

//! Process configuration loaded from the environment.
//!
//! Variables are read from the process environment after an optional `.env`
//! file in the working directory has been applied.

use serde::Deserialize;
use thiserror::Error;

const DEFAULT_APP_HOST: &str = "0.0.0.0";
const DEFAULT_APP_PORT: u16 = 8080;
const DEFAULT_DB_DSN: &str = "subscriptions.db";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Env(#[from] envy::Error),
    #[error("DB_DSN is empty; set it in .env or the process environment")]
    EmptyDsn,
}

/// Server settings. Field names map to upper-case environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default = "default_app_host")]
    pub app_host: String,
    #[serde(default = "default_app_port")]
    pub app_port: u16,
    /// SQLite file path, or `:memory:`.
    #[serde(default = "default_db_dsn")]
    pub db_dsn: String,
    #[serde(default)]
    pub log_level: Option<String>,
    /// Absolute directory for rolling log files; stderr only when unset.
    #[serde(default)]
    pub log_dir: Option<String>,
}

impl Config {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::validated(envy::from_env::<Config>()?)
    }

    /// Reads configuration from explicit `(NAME, value)` pairs.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self::validated(envy::from_iter::<_, Config>(vars)?)
    }

    fn validated(config: Config) -> Result<Self, ConfigError> {
        if config.db_dsn.trim().is_empty() {
            return Err(ConfigError::EmptyDsn);
        }
        Ok(config)
    }

    /// Address the HTTP listener binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.app_host, self.app_port)
    }

    /// DSN with any `user:password@` section masked, safe to log.
    pub fn redacted_dsn(&self) -> String {
        let dsn = self.db_dsn.as_str();
        let Some(scheme_end) = dsn.find("://") else {
            return dsn.to_string();
        };
        let authority_start = scheme_end + 3;
        match dsn[authority_start..].find('@') {
            Some(at) => format!(
                "{}***{}",
                &dsn[..authority_start],
                &dsn[authority_start + at..]
            ),
            None => dsn.to_string(),
        }
    }
}

/// Applies `.env` from the working directory if present.
///
/// Returns `false` when no file was found; that is not an error.
pub fn load_dotenv() -> bool {
    dotenvy::dotenv().is_ok()
}

fn default_app_host() -> String {
    DEFAULT_APP_HOST.to_string()
}

fn default_app_port() -> u16 {
    DEFAULT_APP_PORT
}

fn default_db_dsn() -> String {
    DEFAULT_DB_DSN.to_string()
}

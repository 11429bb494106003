mod file_config;

pub use file_config::FileConfig;

use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::fmt;
use std::path::PathBuf;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub internal_api_key: Option<String>,
    pub store_url: Option<String>,
    pub store_service_key: Option<String>,
    pub db_path: Option<PathBuf>,
}

#[derive(Clone, PartialEq)]
pub enum StoreSettings {
    /// Hosted PostgREST database.
    Rest { url: String, service_key: String },
    /// Local SQLite file.
    Sqlite { db_path: PathBuf },
}

impl fmt::Debug for StoreSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreSettings::Rest { url, .. } => f
                .debug_struct("Rest")
                .field("url", url)
                .field("service_key", &"<redacted>")
                .finish(),
            StoreSettings::Sqlite { db_path } => {
                f.debug_struct("Sqlite").field("db_path", db_path).finish()
            }
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub internal_api_key: String,
    pub store: StoreSettings,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("metrics_port", &self.metrics_port)
            .field("logging_level", &self.logging_level)
            .field("internal_api_key", &"<redacted>")
            .field("store", &self.store)
            .finish()
    }
}

/// Trimmed value, or None when nothing but whitespace is left.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);
        if port == metrics_port {
            bail!("port and metrics_port must differ (both are {})", port);
        }

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let internal_api_key = non_empty(file.internal_api_key)
            .or_else(|| non_empty(cli.internal_api_key.clone()))
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "internal_api_key must be specified via --internal-api-key, INTERNAL_API_KEY or in config file"
                )
            })?;

        let store_url = non_empty(file.store_url).or_else(|| non_empty(cli.store_url.clone()));
        let store_service_key = non_empty(file.store_service_key)
            .or_else(|| non_empty(cli.store_service_key.clone()));
        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone());

        let store = match (store_url, db_path) {
            (Some(url), _) => {
                let service_key = store_service_key.ok_or_else(|| {
                    anyhow::anyhow!(
                        "store_service_key must be specified when store_url is set (--store-service-key or SUPABASE_SERVICE_KEY)"
                    )
                })?;
                StoreSettings::Rest { url, service_key }
            }
            (None, Some(db_path)) => {
                if let Some(parent) = db_path.parent() {
                    if !parent.as_os_str().is_empty() && !parent.is_dir() {
                        bail!("Database directory does not exist: {:?}", parent);
                    }
                }
                StoreSettings::Sqlite { db_path }
            }
            (None, None) => {
                bail!("A job store must be specified via --store-url or --db-path, or in config file")
            }
        };

        Ok(Self {
            port,
            metrics_port,
            logging_level,
            internal_api_key,
            store,
        })
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}

use anyhow::{Context, Result};
use clap::Parser;
use jobboard_server::config::{AppConfig, CliConfig, FileConfig, StoreSettings};
use jobboard_server::server::{metrics, ServerConfig};
use jobboard_server::{run_server, JobStore, RequestsLoggingLevel, RestJobStore, SqliteJobStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    if path_buf.is_absolute() {
        return Ok(path_buf);
    }
    let cwd = std::env::current_dir().with_context(|| format!("Error resolving path: {}", s))?;
    Ok(cwd.join(path_buf))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to a TOML config file. Its values override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Base URL of the hosted jobs database.
    #[clap(long, env = "SUPABASE_URL")]
    pub store_url: Option<String>,

    /// Service key for the hosted jobs database.
    #[clap(long, env = "SUPABASE_SERVICE_KEY", hide_env_values = true)]
    pub store_service_key: Option<String>,

    /// Shared secret required to create jobs.
    #[clap(long, env = "INTERNAL_API_KEY", hide_env_values = true)]
    pub internal_api_key: Option<String>,

    /// Path to a SQLite database file, used when no store URL is given.
    #[clap(long, value_parser = parse_path)]
    pub db_path: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            port: self.port,
            metrics_port: self.metrics_port,
            logging_level: self.logging_level.clone(),
            internal_api_key: self.internal_api_key.clone(),
            store_url: self.store_url.clone(),
            store_service_key: self.store_service_key.clone(),
            db_path: self.db_path.clone(),
        }
    }
}

fn open_job_store(settings: &StoreSettings) -> Result<Arc<dyn JobStore>> {
    Ok(match settings {
        StoreSettings::Rest { url, service_key } => {
            info!("Using hosted job store at {}", url);
            Arc::new(RestJobStore::new(url.as_str(), service_key.as_str())?)
        }
        StoreSettings::Sqlite { db_path } => {
            info!("Opening SQLite job database at {:?}...", db_path);
            Arc::new(SqliteJobStore::new(db_path)?)
        }
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let app_config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;
    info!("Resolved config: {:?}", app_config);

    let job_store = open_job_store(&app_config.store)?;

    info!("Initializing metrics...");
    metrics::init_metrics();

    let server_config = ServerConfig {
        requests_logging_level: app_config.logging_level,
        port: app_config.port,
        metrics_port: app_config.metrics_port,
        internal_api_key: app_config.internal_api_key,
    };
    run_server(server_config, job_store).await
}

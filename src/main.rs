//! seniors-api HTTP service & CLI
//!
//! Dual-mode application:
//! - Server Mode (default): HTTP API over the placement roster
//! - CLI Mode: one-shot queries printed as JSON
//!
//! Operations:
//! - `query` - filter records by text, program, campus, organization, package
//! - `get` - look up one record by roll number
//! - `search` - ranked name search
//! - `filters` - values for the filter dropdowns

mod cli;
mod config;
mod error;
mod http;
mod query;
mod server;
mod store;
mod websearch;

#[cfg(test)]
mod tests_http_surface;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use error::AppError;
use query::{Criteria, QueryEngine};
use serde::Serialize;
use std::sync::Arc;
use store::{DatasetKey, DatasetRegistry, DatasetSource};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        run_cli_mode().await
    } else {
        init_logging("info");
        run_server_mode(Config::load(None)?, cli::ServeArgs::default()).await
    }
}

/// `RUST_LOG` wins over the level implied by flags
fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr) // Log to stderr to keep stdout clean
        .init();
}

/// Run in CLI mode
async fn run_cli_mode() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    init_logging(log_level);

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data.data_dir = dir;
    }

    let engine = build_engine(&config);
    let result = match cli.command {
        Some(Commands::Serve(args)) => return run_server_mode(config, args).await,
        None => return run_server_mode(config, cli::ServeArgs::default()).await,
        Some(Commands::Query(args)) => execute_query(&engine, &args),
        Some(Commands::Get(args)) => execute_get(&engine, &args),
        Some(Commands::Search(args)) => execute_search(&engine, &args),
        Some(Commands::Filters(args)) => {
            let key = DatasetKey::from_param(args.academic_year.as_deref());
            engine.list_filter_values(&key).and_then(|v| to_json(&v))
        }
    };

    match result {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

/// Run in server mode; CLI flags override the configuration
async fn run_server_mode(mut config: Config, args: cli::ServeArgs) -> Result<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.data.preload |= args.preload;

    info!(
        "Starting seniors-api with data directory {}",
        config.data.data_dir.display()
    );
    server::run(config).await
}

fn build_engine(config: &Config) -> QueryEngine {
    let registry = DatasetRegistry::new(DatasetSource::from_config(&config.data));
    QueryEngine::new(Arc::new(registry), config.data.academic_years.clone())
}

fn execute_query(engine: &QueryEngine, args: &cli::QueryArgs) -> Result<String, AppError> {
    let criteria = Criteria::try_from(args)?;
    let key = DatasetKey::from_param(args.academic_year.as_deref());
    to_json(&engine.query(&key, &criteria)?)
}

fn execute_get(engine: &QueryEngine, args: &cli::GetArgs) -> Result<String, AppError> {
    let key = DatasetKey::from_param(args.dataset.academic_year.as_deref());
    match engine.get_by_id(&args.roll_no, &key)? {
        Some(record) => to_json(&record),
        None => to_json(&serde_json::json!({ "error": "not found" })),
    }
}

fn execute_search(engine: &QueryEngine, args: &cli::SearchArgs) -> Result<String, AppError> {
    let key = DatasetKey::from_param(args.academic_year.as_deref());
    to_json(&engine.search_by_name(&args.name, args.limit, &key)?)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value).map_err(|e| AppError::Internal(e.to_string()))
}

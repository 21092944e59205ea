//! # vendctl
//!
//! Command-line front end for the vending backend.
//!
//! ## Startup Sequence
//! 1. Parse arguments
//! 2. Load configuration (defaults → vendctl.toml → `VEND_*`)
//! 3. Initialize tracing (stderr, so stdout stays pure JSON)
//! 4. Answer config-only commands, or open the database & run migrations
//! 5. Execute the command and print the JSON result

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use vend_db::Database;

use crate::cli::Command;
use crate::config::AppConfig;
use crate::error::ApiError;

/// Outcome of one vendctl invocation.
#[derive(Debug)]
pub enum Outcome {
    /// Print as JSON on stdout.
    Json(Value),
    /// Print verbatim on stdout.
    Text(&'static str),
}

/// Runs vendctl with the given arguments (program name excluded).
pub async fn run<I, S>(args: I) -> Result<Outcome, ApiError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let invocation = cli::parse(args)?;
    if invocation.command == Command::Help {
        return Ok(Outcome::Text(cli::USAGE));
    }

    let config = AppConfig::load(invocation.config_path)?;
    init_tracing(&config.logging.filter);

    if let Some(result) = commands::execute_local(&config, &invocation.command) {
        return result.map(Outcome::Json);
    }

    let db = Database::new(config.database.db_config()).await?;
    debug!(command = ?invocation.command, "Executing command");

    let result = commands::execute(&db, &config, invocation.command).await;
    db.close().await;

    result.map(Outcome::Json)
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `VEND_LOG=debug` (or `[logging] filter`) - Show debug messages
/// - `VEND_LOG=vend_db=trace` - Trace the storage crate only
/// - Default: INFO level
fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));

    // A second init (tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

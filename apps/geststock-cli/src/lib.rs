//! # GestStock CLI Library
//!
//! Command-line front end for GestStock.
//!
//! ## Module Organization
//! ```text
//! geststock_cli/
//! ├── lib.rs          ◄─── You are here (startup & run)
//! ├── cli.rs          ◄─── clap argument definitions
//! ├── commands.rs     ◄─── One handler per command
//! ├── config.rs       ◄─── Environment configuration
//! ├── i18n.rs         ◄─── French / English labels
//! └── error.rs        ◄─── CLI error type and exit codes
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod i18n;

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use geststock_store::{Inventory, JsonFileStore, StoreConfig};

use cli::Cli;
use commands::App;
use config::CliConfig;
use error::{CliError, CliResult};

/// Runs the CLI and returns the process exit code.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Application Startup                               │
/// │                                                                         │
/// │  1. Parse Arguments ──────────────────────────────────────────────────► │
/// │                                                                         │
/// │  2. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter, to stderr                     │
/// │     • Default: geststock=info, can be overridden with RUST_LOG          │
/// │                                                                         │
/// │  3. Load Configuration ───────────────────────────────────────────────► │
/// │     • GESTSTOCK_* variables, --data-dir wins over GESTSTOCK_DATA_DIR    │
/// │                                                                         │
/// │  4. Open Store ───────────────────────────────────────────────────────► │
/// │     • JSON files in the data directory                                  │
/// │     • Schema check, collections loaded                                  │
/// │                                                                         │
/// │  5. Execute Command ──────────────────────────────────────────────────► │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let json = cli.json;
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, json);
            ExitCode::from(err.exit_code())
        }
    }
}

fn execute(cli: Cli) -> CliResult<()> {
    let mut config = CliConfig::from_env();
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    info!(data_dir = %config.data_dir.display(), "Starting GestStock");

    let store = JsonFileStore::open(StoreConfig::new(&config.data_dir))?;
    let inventory = Inventory::open(store)?;

    let mut app = App::new(inventory, config, cli.json);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    app.execute(cli.command, &mut out)?;
    out.flush()?;
    Ok(())
}

fn report_error(err: &CliError, json: bool) {
    if json {
        match serde_json::to_string_pretty(err) {
            Ok(text) => eprintln!("{}", text),
            Err(_) => eprintln!("{}", err),
        }
    } else {
        eprintln!("{}", err);
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=geststock_core=trace` - Trace the ledger only
/// - Default: INFO for the geststock_* crates, WARN for everything else
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,geststock=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

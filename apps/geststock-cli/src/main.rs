//! # GestStock Entry Point
//!
//! ## Startup Sequence
//! 1. Parse arguments
//! 2. Initialize tracing (logging)
//! 3. Load configuration from the environment
//! 4. Open the JSON store in the data directory
//! 5. Run the command

use std::process::ExitCode;

fn main() -> ExitCode {
    // The actual setup is in lib.rs for better testability
    geststock_cli::run()
}

//! fwlog CLI
//!
//! Emits records through the context-scoped logger, for trying out
//! configuration and redaction from a shell.

use clap::{Parser, Subcommand};
use fwlog_logging::diagnostics::{self, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "fwlog")]
#[command(about = "fwlog - Context-scoped structured logging", long_about = None)]
struct Cli {
    /// Print the facility's own diagnostics to stderr
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Emit a single record inside a request context
    Emit(commands::emit::EmitArgs),
    /// Run concurrent simulated requests, each with its own logger
    Simulate(commands::simulate::SimulateArgs),
}

fn main() {
    let cli = Cli::parse();

    diagnostics::init(if cli.verbose {
        Profile::Development
    } else {
        Profile::Test
    });

    let result = match cli.command {
        Commands::Emit(args) => commands::emit::execute(args),
        Commands::Simulate(args) => commands::simulate::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

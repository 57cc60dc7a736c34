//! Command-line interface for ormkit.
//!
//! The CLI works on setup files and never needs adapters: it validates
//! declarations and shows what a resolution pass would do.
//!
//! # Available Commands
//!
//! - `plan` - Resolve a setup file's build order and connector names
//! - `name` - Show the component names a naming strategy derives for files
//!
//! # Global Options
//!
//! - `--verbose` - Enable debug output
//! - `--quiet` - Suppress all output except errors
//!
//! Without either flag the log filter comes from `RUST_LOG`, defaulting to
//! warnings only.
//!
//! ```bash
//! ormkit plan ormkit.toml
//! ormkit --verbose plan --format json
//! ormkit name app/relations/users.rb --root app
//! ```

mod name;
mod plan;

pub use name::NameCommand;
pub use plan::{OutputFormat, PlanCommand};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Main CLI structure for ormkit.
#[derive(Parser, Debug)]
#[command(
    name = "ormkit",
    about = "Inspect component registry setups",
    version,
    long_about = "ormkit validates declarative component setups: it computes the order \
                  gateways, datasets, schemas, relations, commands and mappers would be \
                  built in, and the connectors derived between relations."
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (equivalent to `RUST_LOG=debug`).
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a setup file and print its resolution plan
    Plan(PlanCommand),

    /// Print component names derived from definition file paths
    Name(NameCommand),
}

impl Cli {
    /// Execute the parsed command.
    pub fn execute(self) -> Result<()> {
        init_logging(self.log_filter());

        match self.command {
            Commands::Plan(cmd) => cmd.execute(),
            Commands::Name(cmd) => cmd.execute(),
        }
    }

    /// Log filter directive implied by the verbosity flags.
    ///
    /// `None` means `RUST_LOG` decides.
    #[must_use]
    pub fn log_filter(&self) -> Option<&'static str> {
        if self.verbose {
            Some("debug")
        } else if self.quiet {
            Some("error")
        } else {
            None
        }
    }
}

fn init_logging(directive: Option<&str>) {
    let filter = match directive {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

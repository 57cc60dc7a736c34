//! `ormkit plan`: validate a setup file without building anything.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

use crate::adapter::AdapterSet;
use crate::config::{SetupFile, setup_file_from_env};
use crate::core::ComponentKind;
use crate::resolver::{Plan, Resolver};

/// Output format of `ormkit plan`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human readable listing
    #[default]
    Text,
    /// JSON document
    Json,
}

/// Compute the build order and connectors of a setup file.
#[derive(Args, Debug)]
pub struct PlanCommand {
    /// Setup file (defaults to `$ORMKIT_SETUP`, then `./ormkit.toml`)
    setup: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct PlanReport {
    setup: String,
    order: Vec<PlanStep>,
    connectors: Vec<String>,
}

#[derive(Debug, Serialize)]
struct PlanStep {
    path: String,
    kind: ComponentKind,
    tier: u8,
    depends_on: Vec<String>,
}

impl PlanCommand {
    /// Run the command.
    pub fn execute(self) -> Result<()> {
        let path = setup_file_from_env(self.setup.as_deref());
        let setup = SetupFile::load(&path)?;
        let decls = setup.into_declarations()?;

        let plan = Resolver::new(decls, AdapterSet::new()).plan()?;
        let report = PlanReport::new(path.display().to_string(), plan);

        match self.format {
            OutputFormat::Text => report.print(),
            OutputFormat::Json => {
                let json =
                    serde_json::to_string_pretty(&report).context("Failed to serialize plan")?;
                println!("{json}");
            }
        }
        Ok(())
    }
}

impl PlanReport {
    fn new(setup: String, plan: Plan) -> Self {
        Self {
            setup,
            order: plan
                .order
                .iter()
                .zip(&plan.dependencies)
                .map(|(key, dependencies)| PlanStep {
                    path: key.path(),
                    kind: key.kind,
                    tier: key.kind.tier(),
                    depends_on: dependencies.iter().map(|dependency| dependency.path()).collect(),
                })
                .collect(),
            connectors: plan.connectors,
        }
    }

    fn print(&self) {
        println!("{} {}", "Plan for".bold(), self.setup);
        println!();
        println!("{}", "Build order:".cyan().bold());
        for (i, step) in self.order.iter().enumerate() {
            println!("  {:>3}. {} {}", i + 1, step.path, format!("(tier {})", step.tier).dimmed());
            if !step.depends_on.is_empty() {
                println!("       {} {}", "needs".dimmed(), step.depends_on.join(", "));
            }
        }

        if !self.connectors.is_empty() {
            println!();
            println!("{}", "Connectors:".cyan().bold());
            for connector in &self.connectors {
                println!("  {connector}");
            }
        }

        println!();
        println!(
            "{} {} components, {} connectors",
            "✓".green(),
            self.order.len(),
            self.connectors.len()
        );
    }
}

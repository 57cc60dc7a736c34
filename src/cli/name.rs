//! `ormkit name`: derive component names from definition files.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::naming::{CustomNamespace, NamingStrategy, NoNamespace, WithNamespace};

/// Print the component name of each file.
#[derive(Args, Debug)]
pub struct NameCommand {
    /// Definition files
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Prefix every name with this namespace
    #[arg(long, conflicts_with = "root")]
    namespace: Option<String>,

    /// Use the directories below this root as the namespace
    #[arg(long)]
    root: Option<PathBuf>,
}

impl NameCommand {
    /// Run the command.
    pub fn execute(self) -> Result<()> {
        let strategy = self.strategy();
        for file in &self.files {
            println!("{}\t{}", file.display(), strategy.component_name(file));
        }
        Ok(())
    }

    fn strategy(&self) -> Box<dyn NamingStrategy> {
        match (&self.namespace, &self.root) {
            (Some(namespace), _) => Box::new(CustomNamespace::new(namespace.clone())),
            (None, Some(root)) => Box::new(WithNamespace::new(root.clone())),
            (None, None) => Box::new(NoNamespace),
        }
    }
}

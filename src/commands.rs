//! CLI commands for crossforge
//!
//! Thin command structs over the orchestrator, for scripting and CI use.

use anyhow::Result;
use crossforge_build_engine::{Orchestrator, Outcome};
use crossforge_core::{Config, Error};
use crossforge_toolchain::{android, mingw, Abi, Toolchain};
use tracing::info;

use crate::registry;

/// Resolve a target name, either an Android ABI or a MinGW triplet, into
/// a toolchain descriptor
pub async fn resolve_toolchain(config: &Config, target: &str) -> Result<Toolchain> {
    if let Some(abi) = Abi::from_name(target) {
        Ok(android::toolchain(config, abi).await?)
    } else if target.contains("mingw") {
        Ok(mingw::toolchain(config, target).await?)
    } else {
        Err(Error::UnknownTarget(target.to_string()).into())
    }
}

/// Build every stale dependency for one target
pub struct BuildCommand {
    pub target: String,
}

impl BuildCommand {
    /// Execute the build command
    pub async fn execute(&self, config: &Config) -> Result<()> {
        let toolchain = resolve_toolchain(config, &self.target).await?;
        let recipes = registry::all();

        info!(
            "Processing {} dependencies for {}",
            recipes.len(),
            self.target
        );

        let orchestrator = Orchestrator::new(config.jobs());
        let outcomes = orchestrator.run(&recipes, &toolchain).await?;

        for (name, outcome) in &outcomes {
            match outcome {
                Outcome::Built => println!("  built      {}", name),
                Outcome::UpToDate => println!("  up to date {}", name),
            }
        }
        println!("Sysroot ready at {}", toolchain.install_prefix.display());

        Ok(())
    }
}

/// Report which dependencies are installed and fresh, without building
pub struct StatusCommand {
    pub target: String,
}

impl StatusCommand {
    /// Execute the status command
    pub async fn execute(&self, config: &Config) -> Result<()> {
        let toolchain = resolve_toolchain(config, &self.target).await?;
        let orchestrator = Orchestrator::new(config.jobs());

        println!("Dependency status for {}:", self.target);
        for recipe in registry::all() {
            let fresh = recipe
                .is_installed(orchestrator.client(), &toolchain)
                .await?;
            if fresh {
                println!("✓ {} {}", recipe.name(), recipe.version());
            } else {
                println!("✗ {} {}", recipe.name(), recipe.version());
            }
        }

        Ok(())
    }
}

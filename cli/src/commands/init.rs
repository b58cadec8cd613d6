//! Init Command - Write a deployment file

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use crate::config::{default_config_path, default_data_dir, BackendKind, DeploymentConfig};

/// Write a default deployment file
#[derive(Args)]
pub struct InitCommand {
    /// Backend recorded in the new deployment
    #[arg(short, long, value_enum, default_value = "clear")]
    backend: BackendKind,

    /// Force overwrite existing configuration
    #[arg(short, long)]
    force: bool,
}

impl InitCommand {
    pub async fn execute(self, config: Option<PathBuf>, data_dir: Option<PathBuf>) -> anyhow::Result<()> {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);
        let config_path = config.unwrap_or_else(|| default_config_path(&data_dir));

        if config_path.exists() && !self.force {
            anyhow::bail!(
                "Deployment already exists at {}. Use --force to overwrite.",
                config_path.display()
            );
        }

        let mut deployment = DeploymentConfig::default();
        deployment.pool.backend = self.backend;
        deployment.save(&config_path)?;

        info!(path = %config_path.display(), "deployment written");

        println!();
        println!("✅ Deployment written to {}", config_path.display());
        println!();
        println!("Reserves:");
        for reserve in &deployment.reserves {
            println!(
                "  {:<6} collateral={:<5} borrowable={:<5} factor={} bps",
                reserve.asset, reserve.is_collateral, reserve.borrowing_enabled, reserve.collateral_factor
            );
        }
        println!();
        println!("To run the sample scenario:");
        println!("  cipherlend simulate --config {}", config_path.display());

        Ok(())
    }
}

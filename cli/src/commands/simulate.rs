//! Simulate Command - Run a supply/borrow/repay scenario against a deployment
//!
//! The simulator holds the client key, so it can open every balance it
//! prints. A real ledger never does.

use std::path::PathBuf;

use anyhow::Context;
use cipherlend_fhe::{ClearBackend, Codec, FheBackend, KeyPair, TfheBackend};
use cipherlend_lending::{Address, AssetId, LendingPool};
use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::config::{default_config_path, default_data_dir, BackendKind, DeploymentConfig};

/// Run the sample scenario on a fresh pool
#[derive(Args, Clone)]
pub struct SimulateCommand {
    /// Override the deployment's backend
    #[arg(short, long, value_enum)]
    backend: Option<BackendKind>,

    /// Account label acting in the scenario
    #[arg(long, default_value = "alice")]
    user: String,

    /// Collateral to supply
    #[arg(long, default_value_t = 1_000)]
    supply: u64,

    /// Amount to request as a loan
    #[arg(long, default_value_t = 500)]
    borrow: u64,

    /// Reserve to borrow from (first borrowable reserve by default)
    #[arg(long)]
    borrow_asset: Option<String>,

    /// Partial repayment made before repaying everything
    #[arg(long, default_value_t = 250)]
    repay: u64,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

/// Balances after one scenario step, opened with the client key
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: String,
    pub supplied_collateral: u64,
    pub borrowed: u64,
    pub debt_asset: Option<String>,
    pub reserve_total_borrowed: u64,
    pub reserve_available_liquidity: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub backend: BackendKind,
    pub collateral_asset: String,
    pub borrow_asset: String,
    pub steps: Vec<StepReport>,
    pub events: usize,
}

impl SimulateCommand {
    pub async fn execute(self, config: Option<PathBuf>, data_dir: Option<PathBuf>) -> anyhow::Result<()> {
        let deployment = match config {
            Some(path) => DeploymentConfig::load(&path)?,
            None => {
                let path = default_config_path(&data_dir.unwrap_or_else(default_data_dir));
                if path.exists() {
                    DeploymentConfig::load(&path)?
                } else {
                    info!("no deployment file found, using defaults");
                    DeploymentConfig::default()
                }
            }
        };

        let json = self.json;
        // Key generation and TFHE evaluation are CPU bound.
        let report = tokio::task::spawn_blocking(move || self.run(&deployment))
            .await
            .context("simulation task panicked")??;

        if json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_report(&report);
        }
        Ok(())
    }

    pub fn run(&self, deployment: &DeploymentConfig) -> anyhow::Result<SimulationReport> {
        let backend = self.backend.unwrap_or(deployment.pool.backend);
        info!(?backend, "starting simulation");

        match backend {
            BackendKind::Clear => {
                let pool = deployment.deploy(ClearBackend)?;
                self.scenario(deployment, backend, pool, &ClearBackend)
            }
            BackendKind::Tfhe => {
                info!("generating TFHE keys");
                let keys = KeyPair::generate(&deployment.fhe_config())?;
                let pool = deployment.deploy(TfheBackend::new(keys.server.clone()))?;
                self.scenario(deployment, backend, pool, &keys.client)
            }
        }
    }

    fn scenario<B: FheBackend, C: Codec<B>>(
        &self,
        deployment: &DeploymentConfig,
        backend: BackendKind,
        mut pool: LendingPool<B>,
        codec: &C,
    ) -> anyhow::Result<SimulationReport> {
        let collateral_label = deployment
            .pool
            .collateral_asset
            .clone()
            .context("deployment has no collateral asset")?;
        let borrow_label = match &self.borrow_asset {
            Some(label) => label.clone(),
            None => deployment
                .first_borrowable()
                .map(|r| r.asset.clone())
                .context("deployment has no borrowable reserve")?,
        };

        let user = Address::from_label(&self.user);
        let collateral = AssetId::from_label(&collateral_label);
        let debt = AssetId::from_label(&borrow_label);
        let snapshot = Snapshot {
            deployment,
            user,
            collateral,
            debt,
            codec,
        };
        let mut steps = Vec::new();

        pool.supply(user, collateral, &codec.seal(self.supply)?)?;
        pool.set_user_use_reserve_as_collateral(user, collateral, true)?;
        steps.push(snapshot.take(&pool, format!("supply {} {}", self.supply, collateral_label))?);

        pool.borrow(user, debt, &codec.seal(self.borrow)?)?;
        steps.push(snapshot.take(&pool, format!("borrow {} {}", self.borrow, borrow_label))?);

        pool.repay(user, debt, &codec.seal(self.repay)?, false)?;
        steps.push(snapshot.take(&pool, format!("repay {} {}", self.repay, borrow_label))?);

        let outstanding = codec.open(pool.user_borrowed_balance(&user, &debt))?;
        pool.repay(user, debt, &codec.seal(outstanding)?, true)?;
        steps.push(snapshot.take(&pool, format!("repay all ({} {})", outstanding, borrow_label))?);

        Ok(SimulationReport {
            backend,
            collateral_asset: collateral_label,
            borrow_asset: borrow_label,
            steps,
            events: pool.events().len(),
        })
    }
}

struct Snapshot<'a, C> {
    deployment: &'a DeploymentConfig,
    user: Address,
    collateral: AssetId,
    debt: AssetId,
    codec: &'a C,
}

impl<C> Snapshot<'_, C> {
    fn take<B: FheBackend>(&self, pool: &LendingPool<B>, step: String) -> anyhow::Result<StepReport>
    where
        C: Codec<B>,
    {
        let reserve = pool.reserve_data(&self.debt)?;
        let debt_asset = pool
            .user_position(&self.user)
            .and_then(|p| p.current_debt_asset.asset().copied())
            .map(|id| self.label(&id));

        Ok(StepReport {
            step,
            supplied_collateral: self
                .codec
                .open(pool.user_supplied_balance(&self.user, &self.collateral))?,
            borrowed: self.codec.open(pool.user_borrowed_balance(&self.user, &self.debt))?,
            debt_asset,
            reserve_total_borrowed: self.codec.open(&reserve.total_borrowed)?,
            reserve_available_liquidity: self.codec.open(&reserve.available_liquidity)?,
        })
    }

    fn label(&self, id: &AssetId) -> String {
        self.deployment
            .reserves
            .iter()
            .find(|r| &r.asset_id() == id)
            .map(|r| r.asset.clone())
            .unwrap_or_else(|| id.to_string())
    }
}

fn print_report(report: &SimulationReport) {
    println!();
    println!(
        "Backend: {:?}   Collateral: {}   Borrowing: {}",
        report.backend, report.collateral_asset, report.borrow_asset
    );
    println!();
    println!(
        "{:<28} {:>12} {:>10} {:>8} {:>14} {:>10}",
        "step", "collateral", "borrowed", "debt", "reserve debt", "liquidity"
    );
    for step in &report.steps {
        println!(
            "{:<28} {:>12} {:>10} {:>8} {:>14} {:>10}",
            step.step,
            step.supplied_collateral,
            step.borrowed,
            step.debt_asset.as_deref().unwrap_or("-"),
            step.reserve_total_borrowed,
            step.reserve_available_liquidity,
        );
    }
    println!();
    println!("{} events emitted", report.events);
}

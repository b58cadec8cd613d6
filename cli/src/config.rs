//! Deployment Configuration
//!
//! Describes a pool to stand up: admin accounts, oracle, reserves and the
//! designated collateral asset. Loaded from and saved to TOML.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use cipherlend_fhe::{FheBackend, FheConfig};
use cipherlend_lending::{
    Address, AssetId, LendingError, LendingPool, PriceOracle, ReserveConfig, Role, RoleRegistry,
    PRICE_SCALE,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("Deployment rejected by the ledger: {0}")]
    Ledger(#[from] LendingError),
}

/// Which arithmetic the pool runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Plaintext values, no confidentiality
    Clear,
    /// TFHE-rs ciphertexts
    Tfhe,
}

/// Full deployment description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentConfig {
    #[serde(default)]
    pub admins: AdminSettings,

    #[serde(default)]
    pub oracle: OracleSettings,

    #[serde(default)]
    pub pool: PoolSettings,

    #[serde(default)]
    pub reserves: Vec<ReserveSettings>,
}

/// Account labels for each admin role. Labels are hashed into addresses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSettings {
    pub default_admin: String,
    pub pool_admin: String,
    pub risk_admin: String,
    pub emergency_admin: String,
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            default_admin: "admin".to_string(),
            pool_admin: "admin".to_string(),
            risk_admin: "admin".to_string(),
            emergency_admin: "admin".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleSettings {
    /// Price used for assets without a feed, scaled by 10^8
    pub fallback_price: u64,
    pub feeder: String,
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            fallback_price: PRICE_SCALE,
            feeder: "feeder".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSettings {
    pub backend: BackendKind,
    /// Label of the reserve users borrow against
    pub collateral_asset: Option<String>,
    /// FHE security parameter
    pub security_bits: u32,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            backend: BackendKind::Clear,
            collateral_asset: None,
            security_bits: FheConfig::default().security_bits,
        }
    }
}

/// One listed asset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReserveSettings {
    pub asset: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub borrowing_enabled: bool,
    #[serde(default)]
    pub is_collateral: bool,
    /// Basis points
    #[serde(default)]
    pub collateral_factor: u16,
    #[serde(default)]
    pub supply_cap: u64,
    #[serde(default)]
    pub borrow_cap: u64,
    /// Feed price scaled by 10^8; the oracle fallback when absent
    pub price: Option<u64>,
}

fn default_true() -> bool {
    true
}

impl ReserveSettings {
    pub fn asset_id(&self) -> AssetId {
        AssetId::from_label(&self.asset)
    }

    pub fn reserve_config(&self) -> ReserveConfig {
        ReserveConfig {
            active: self.active,
            borrowing_enabled: self.borrowing_enabled,
            is_collateral: self.is_collateral,
            is_paused: false,
            collateral_factor: self.collateral_factor,
            supply_cap: self.supply_cap,
            borrow_cap: self.borrow_cap,
        }
    }
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            admins: AdminSettings::default(),
            oracle: OracleSettings::default(),
            pool: PoolSettings {
                collateral_asset: Some("WETH".to_string()),
                ..Default::default()
            },
            reserves: vec![
                ReserveSettings {
                    asset: "WETH".to_string(),
                    active: true,
                    borrowing_enabled: false,
                    is_collateral: true,
                    collateral_factor: 7_500,
                    supply_cap: 0,
                    borrow_cap: 0,
                    price: Some(PRICE_SCALE),
                },
                ReserveSettings {
                    asset: "USDC".to_string(),
                    active: true,
                    borrowing_enabled: true,
                    is_collateral: false,
                    collateral_factor: 0,
                    supply_cap: 0,
                    borrow_cap: 0,
                    price: Some(PRICE_SCALE),
                },
            ],
        }
    }
}

impl DeploymentConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    pub fn fhe_config(&self) -> FheConfig {
        FheConfig {
            security_bits: self.pool.security_bits,
        }
    }

    pub fn reserve(&self, label: &str) -> Option<&ReserveSettings> {
        self.reserves.iter().find(|r| r.asset == label)
    }

    /// First reserve that can be borrowed
    pub fn first_borrowable(&self) -> Option<&ReserveSettings> {
        self.reserves.iter().find(|r| r.borrowing_enabled && r.active)
    }

    /// Validate configuration
    fn validate(&self) -> Result<(), ConfigError> {
        self.fhe_config()
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        let mut seen = HashSet::new();
        for reserve in &self.reserves {
            if !seen.insert(reserve.asset.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "Reserve {} listed twice",
                    reserve.asset
                )));
            }
            reserve
                .reserve_config()
                .validate()
                .map_err(|e| ConfigError::Invalid(format!("Reserve {}: {}", reserve.asset, e)))?;
        }

        if let Some(label) = &self.pool.collateral_asset {
            match self.reserve(label) {
                Some(reserve) if reserve.is_collateral => {}
                Some(_) => {
                    return Err(ConfigError::Invalid(format!(
                        "Collateral asset {} is not a collateral reserve",
                        label
                    )))
                }
                None => {
                    return Err(ConfigError::Invalid(format!(
                        "Collateral asset {} is not listed",
                        label
                    )))
                }
            }
        }

        Ok(())
    }

    /// Stand up a pool on `backend` with every admin step applied.
    pub fn deploy<B: FheBackend>(&self, backend: B) -> Result<LendingPool<B>, ConfigError> {
        self.validate()?;

        let admin = Address::from_label(&self.admins.default_admin);
        let pool_admin = Address::from_label(&self.admins.pool_admin);
        let risk_admin = Address::from_label(&self.admins.risk_admin);
        let feeder = Address::from_label(&self.oracle.feeder);

        let mut oracle = PriceOracle::new(admin, self.oracle.fallback_price);
        oracle.add_feeder(&admin, feeder)?;

        let mut pool = LendingPool::new(backend, oracle, RoleRegistry::new(admin));
        pool.grant_role(&admin, Role::PoolAdmin, pool_admin)?;
        pool.grant_role(&admin, Role::RiskAdmin, risk_admin)?;
        pool.grant_role(&admin, Role::EmergencyAdmin, Address::from_label(&self.admins.emergency_admin))?;

        for reserve in &self.reserves {
            let asset = reserve.asset_id();
            let mut config = reserve.reserve_config();
            // caps are risk settings and go through the risk admin below
            config.supply_cap = 0;
            config.borrow_cap = 0;
            pool.init_reserve(pool_admin, asset, config)?;
            if reserve.supply_cap > 0 {
                pool.set_supply_cap(risk_admin, asset, reserve.supply_cap)?;
            }
            if reserve.borrow_cap > 0 {
                pool.set_borrow_cap(risk_admin, asset, reserve.borrow_cap)?;
            }
            if let Some(price) = reserve.price {
                pool.oracle_mut().set_price(&feeder, asset, price)?;
            }
            info!(asset = %reserve.asset, id = %asset, "reserve listed");
        }

        if let Some(label) = &self.pool.collateral_asset {
            pool.set_collateral_asset(pool_admin, AssetId::from_label(label))?;
        }

        Ok(pool)
    }
}

/// Get default data directory
pub fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("finance", "cipherlend", "cipherlend")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".cipherlend"))
}

/// Get default config file path
pub fn default_config_path(data_dir: &Path) -> PathBuf {
    data_dir.join("deployment.toml")
}

//! Boundary configuration
//!
//! All environment- and file-driven defaults are resolved here into one
//! explicit struct; the pipeline itself never reads the process
//! environment. Per-network lookup-table addresses are configuration, not
//! compiled-in constants, so a new network is a config edit rather than a
//! code change.

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use crate::budget::ScaleFactors;
use crate::confirm::RetryPolicy;
use crate::network::NetworkId;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Per-network endpoints and published lookup tables
    pub networks: HashMap<NetworkId, NetworkConfig>,

    /// Budget scaling
    #[serde(default)]
    pub budget: BudgetConfig,

    /// Visibility retry policy
    #[serde(default)]
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// RPC endpoint URL
    pub rpc_url: String,

    /// Base58 address of the network's published lookup table, if any
    #[serde(default)]
    pub lookup_table: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetConfig {
    /// Multiplier applied to the raw fee estimate
    #[serde(default = "default_price_scale")]
    pub price_scale: f64,

    /// Multiplier applied to the simulated compute units
    #[serde(default = "default_limit_scale")]
    pub limit_scale: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

// Default value functions
fn default_price_scale() -> f64 {
    1.0
}
fn default_limit_scale() -> f64 {
    1.1
}
fn default_max_attempts() -> u32 {
    10
}
fn default_initial_delay_ms() -> u64 {
    5_000
}
fn default_max_delay_ms() -> u64 {
    30_000
}
fn default_backoff_multiplier() -> f64 {
    2.0
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            price_scale: default_price_scale(),
            limit_scale: default_limit_scale(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` loaded first
    pub fn from_file_with_env(path: &str) -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_file(path)
    }

    /// Reject values that would misbehave downstream
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.budget.price_scale < 1.0 || self.budget.limit_scale < 1.0 {
            anyhow::bail!(
                "scale factors must be >= 1 (price_scale={}, limit_scale={})",
                self.budget.price_scale,
                self.budget.limit_scale
            );
        }
        if self.retry.max_attempts == 0 {
            anyhow::bail!("retry.max_attempts must be > 0");
        }
        if self.retry.backoff_multiplier <= 1.0 {
            anyhow::bail!(
                "retry.backoff_multiplier must be > 1, got {}",
                self.retry.backoff_multiplier
            );
        }
        // Fail at load time rather than on first use.
        self.lookup_table_registry()?;
        Ok(())
    }

    /// Parse the configured lookup-table addresses into a registry for the
    /// resolver; networks without a published table are simply absent
    pub fn lookup_table_registry(&self) -> anyhow::Result<HashMap<NetworkId, Pubkey>> {
        let mut registry = HashMap::new();
        for (network, net) in &self.networks {
            if let Some(address) = &net.lookup_table {
                let pubkey = Pubkey::from_str(address).map_err(|e| {
                    anyhow::anyhow!("invalid lookup table address for {network}: {e}")
                })?;
                registry.insert(*network, pubkey);
            }
        }
        Ok(registry)
    }

    pub fn scale_factors(&self) -> ScaleFactors {
        ScaleFactors {
            price_scale: self.budget.price_scale,
            limit_scale: self.budget.limit_scale,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry.max_attempts,
            initial_delay: Duration::from_millis(self.retry.initial_delay_ms),
            max_delay: Duration::from_millis(self.retry.max_delay_ms),
            backoff_multiplier: self.retry.backoff_multiplier,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            networks: HashMap::from([
                (
                    NetworkId::Mainnet,
                    NetworkConfig {
                        rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
                        lookup_table: Some(
                            "AokBxha6VMLLgf97B5VYHEtqztamWmYERBmmFvjuTzJB".to_string(),
                        ),
                    },
                ),
                (
                    NetworkId::Testnet,
                    NetworkConfig {
                        rpc_url: "https://api.devnet.solana.com".to_string(),
                        lookup_table: Some(
                            "9thqPdbR27A1yLWw2spwJLySemiGMXxPnEvfmXVk4KuK".to_string(),
                        ),
                    },
                ),
            ]),
            budget: BudgetConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

//! Network identities and the RPC capability consumed by the pipeline
//!
//! Every component in [`crate::budget`] talks to the ledger through the
//! [`LedgerRpc`] trait rather than a concrete client, so the whole pipeline
//! can be exercised against a mock. [`SolanaRpc`] is the live adapter over
//! the nonblocking `solana-client`; it does direct pass-through with no
//! retry of its own.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use solana_client::{
    nonblocking::rpc_client::RpcClient,
    rpc_config::RpcSimulateTransactionConfig,
};
use solana_sdk::{
    account::Account,
    address_lookup_table::{state::AddressLookupTable, AddressLookupTableAccount},
    commitment_config::CommitmentConfig,
    pubkey::Pubkey,
    transaction::VersionedTransaction,
};
use std::collections::HashMap;
use std::fmt;

use crate::budget::errors::BudgetError;
use crate::budget::fees::PriorityFeeSample;
use crate::config::Config;

/// Which of the deployed networks a call targets
///
/// Drives the RPC endpoint, the published lookup-table address and the
/// fee-history window used for a request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum NetworkId {
    Mainnet,
    Testnet,
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkId::Mainnet => write!(f, "mainnet"),
            NetworkId::Testnet => write!(f, "testnet"),
        }
    }
}

/// Outcome of a non-committing dry run
#[derive(Debug, Clone, Default)]
pub struct SimulationOutcome {
    /// Execution error reported by the ledger, if the run aborted
    pub err: Option<String>,
    /// Compute units the run consumed, when the host reports a figure
    pub units_consumed: Option<u64>,
    /// Program log output, for diagnostics
    pub logs: Option<Vec<String>>,
}

/// The ledger operations the pipeline needs from a connection
///
/// Connection handles are borrowed from the provider, never owned by the
/// pipeline; no method here retries internally.
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// Per-slot priority-fee samples for the recent history window,
    /// optionally scoped to the given addresses
    async fn recent_priority_fees(
        &self,
        targets: &[Pubkey],
    ) -> Result<Vec<PriorityFeeSample>, BudgetError>;

    /// Fetch and decode an address lookup table; `None` when the address
    /// resolves to nothing
    async fn lookup_table(
        &self,
        address: &Pubkey,
    ) -> Result<Option<AddressLookupTableAccount>, BudgetError>;

    /// Dry-run a transaction without committing it
    async fn simulate(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<SimulationOutcome, BudgetError>;

    /// Raw account fetch; `None` when the account is not (yet) visible
    async fn account(&self, address: &Pubkey) -> Result<Option<Account>, BudgetError>;
}

/// Live adapter over the nonblocking Solana RPC client
pub struct SolanaRpc {
    client: RpcClient,
    commitment: CommitmentConfig,
}

impl std::fmt::Debug for SolanaRpc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolanaRpc")
            .field("url", &self.client.url())
            .field("commitment", &self.commitment)
            .finish()
    }
}

impl SolanaRpc {
    pub fn new(url: String) -> Self {
        let commitment = CommitmentConfig::confirmed();
        Self {
            client: RpcClient::new_with_commitment(url, commitment),
            commitment,
        }
    }

    pub fn url(&self) -> String {
        self.client.url()
    }
}

#[async_trait]
impl LedgerRpc for SolanaRpc {
    async fn recent_priority_fees(
        &self,
        targets: &[Pubkey],
    ) -> Result<Vec<PriorityFeeSample>, BudgetError> {
        let fees = self
            .client
            .get_recent_prioritization_fees(targets)
            .await
            .map_err(|e| BudgetError::Rpc(e.to_string()))?;

        Ok(fees
            .into_iter()
            .map(|f| PriorityFeeSample {
                slot: f.slot,
                fee: f.prioritization_fee,
            })
            .collect())
    }

    async fn lookup_table(
        &self,
        address: &Pubkey,
    ) -> Result<Option<AddressLookupTableAccount>, BudgetError> {
        let response = self
            .client
            .get_account_with_commitment(address, self.commitment)
            .await
            .map_err(|e| BudgetError::Rpc(e.to_string()))?;

        let Some(account) = response.value else {
            return Ok(None);
        };

        let table = AddressLookupTable::deserialize(&account.data).map_err(|e| {
            BudgetError::LookupTableAccountMissing {
                address: *address,
                reason: e.to_string(),
            }
        })?;

        Ok(Some(AddressLookupTableAccount {
            key: *address,
            addresses: table.addresses.to_vec(),
        }))
    }

    async fn simulate(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<SimulationOutcome, BudgetError> {
        let config = RpcSimulateTransactionConfig {
            sig_verify: false,
            replace_recent_blockhash: true,
            commitment: Some(self.commitment),
            ..Default::default()
        };

        let response = self
            .client
            .simulate_transaction_with_config(transaction, config)
            .await
            .map_err(|e| BudgetError::Rpc(e.to_string()))?;

        let value = response.value;
        Ok(SimulationOutcome {
            err: value.err.map(|e| e.to_string()),
            units_consumed: value.units_consumed,
            logs: value.logs,
        })
    }

    async fn account(&self, address: &Pubkey) -> Result<Option<Account>, BudgetError> {
        let response = self
            .client
            .get_account_with_commitment(address, self.commitment)
            .await
            .map_err(|e| BudgetError::Rpc(e.to_string()))?;
        Ok(response.value)
    }
}

/// Hands out live RPC connections per network
///
/// Endpoint URLs come from [`Config`]; connections are cheap handles and
/// are created per call rather than pooled.
pub struct ConnectionProvider {
    endpoints: HashMap<NetworkId, String>,
}

impl ConnectionProvider {
    pub fn new(config: &Config) -> Self {
        let endpoints = config
            .networks
            .iter()
            .map(|(id, net)| (*id, net.rpc_url.clone()))
            .collect();
        Self { endpoints }
    }

    pub fn connection(&self, network: NetworkId) -> Result<SolanaRpc, BudgetError> {
        let url = self
            .endpoints
            .get(&network)
            .ok_or(BudgetError::UnsupportedNetwork(network))?;
        tracing::debug!(network = %network, url = %url, "opening rpc connection");
        Ok(SolanaRpc::new(url.clone()))
    }
}

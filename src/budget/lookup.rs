//! Per-network address lookup table resolution
//!
//! Each deployed network publishes one table of frequently used accounts so
//! transactions can reference them by short index instead of full address.
//! The table address is injected configuration, not discovered at runtime,
//! and the fetched contents are a pure function of the network for a fixed
//! deployment, so results are memoized for the process lifetime.

use dashmap::DashMap;
use solana_sdk::{address_lookup_table::AddressLookupTableAccount, pubkey::Pubkey};
use std::collections::HashMap;
use tracing::debug;

use crate::budget::errors::BudgetError;
use crate::network::{LedgerRpc, NetworkId};

/// Resolves and caches the published lookup table per network
pub struct LookupTableResolver {
    registry: HashMap<NetworkId, Pubkey>,
    cache: DashMap<NetworkId, AddressLookupTableAccount>,
}

impl LookupTableResolver {
    pub fn new(registry: HashMap<NetworkId, Pubkey>) -> Self {
        Self {
            registry,
            cache: DashMap::new(),
        }
    }

    /// The configured table address for a network, if any
    pub fn table_address(&self, network: NetworkId) -> Option<Pubkey> {
        self.registry.get(&network).copied()
    }

    /// Fetch the network's published table, memoizing the result
    ///
    /// Concurrent first-access races may fetch twice; the duplicate write is
    /// idempotent and one result is discarded.
    pub async fn resolve(
        &self,
        rpc: &dyn LedgerRpc,
        network: NetworkId,
    ) -> Result<AddressLookupTableAccount, BudgetError> {
        let address = self
            .registry
            .get(&network)
            .copied()
            .ok_or(BudgetError::UnsupportedNetwork(network))?;

        if let Some(table) = self.cache.get(&network) {
            return Ok(table.clone());
        }

        let table = rpc
            .lookup_table(&address)
            .await?
            .ok_or(BudgetError::LookupTableNotFound { address })?;

        debug!(
            network = %network,
            address = %address,
            entries = table.addresses.len(),
            "lookup table resolved"
        );
        self.cache.insert(network, table.clone());
        Ok(table)
    }
}

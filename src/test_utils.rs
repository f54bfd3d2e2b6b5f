//! Test Utilities Module
//!
//! Deterministic in-memory stand-in for the ledger RPC, so the whole
//! augmentation pipeline can be exercised without a network.
//!
//! Only compiled when running tests or when the `test_utils` feature is
//! enabled.

#![cfg(any(test, feature = "test_utils"))]

use async_trait::async_trait;
use solana_sdk::{
    account::Account,
    address_lookup_table::AddressLookupTableAccount,
    pubkey::Pubkey,
    transaction::VersionedTransaction,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::budget::errors::BudgetError;
use crate::budget::fees::PriorityFeeSample;
use crate::network::{LedgerRpc, SimulationOutcome};

/// Build a lookup table with `entries` fresh addresses
pub fn mock_table(address: Pubkey, entries: usize) -> AddressLookupTableAccount {
    AddressLookupTableAccount {
        key: address,
        addresses: (0..entries).map(|_| Pubkey::new_unique()).collect(),
    }
}

/// Scripted [`LedgerRpc`] implementation
///
/// Every call is recorded so tests can assert call counts (e.g. "resolve
/// for an unconfigured network makes no network call").
#[derive(Default)]
pub struct MockRpc {
    fees: Option<Result<Vec<PriorityFeeSample>, String>>,
    tables: HashMap<Pubkey, Result<AddressLookupTableAccount, String>>,
    simulation: Option<SimulationOutcome>,
    accounts: HashMap<Pubkey, (Account, usize)>,

    fee_targets: Mutex<Vec<Vec<Pubkey>>>,
    lookup_calls: AtomicUsize,
    simulate_calls: AtomicUsize,
    account_calls: AtomicUsize,
}

impl MockRpc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fees(mut self, samples: Vec<PriorityFeeSample>) -> Self {
        self.fees = Some(Ok(samples));
        self
    }

    pub fn with_fee_error(mut self, message: &str) -> Self {
        self.fees = Some(Err(message.to_string()));
        self
    }

    pub fn with_lookup_table(mut self, address: Pubkey, table: AddressLookupTableAccount) -> Self {
        self.tables.insert(address, Ok(table));
        self
    }

    pub fn with_lookup_error(mut self, address: Pubkey, reason: &str) -> Self {
        self.tables.insert(address, Err(reason.to_string()));
        self
    }

    pub fn with_simulation(mut self, outcome: SimulationOutcome) -> Self {
        self.simulation = Some(outcome);
        self
    }

    /// Make the account visible starting with the `visible_from`-th fetch
    /// (1-based); earlier fetches see it as absent
    pub fn with_account_after(mut self, address: Pubkey, account: Account, visible_from: usize) -> Self {
        self.accounts.insert(address, (account, visible_from));
        self
    }

    /// Targets passed to each `recent_priority_fees` call, in order
    pub fn fee_targets(&self) -> Vec<Vec<Pubkey>> {
        self.fee_targets.lock().unwrap().clone()
    }

    pub fn lookup_calls(&self) -> usize {
        self.lookup_calls.load(Ordering::SeqCst)
    }

    pub fn simulate_calls(&self) -> usize {
        self.simulate_calls.load(Ordering::SeqCst)
    }

    pub fn account_calls(&self) -> usize {
        self.account_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerRpc for MockRpc {
    async fn recent_priority_fees(
        &self,
        targets: &[Pubkey],
    ) -> Result<Vec<PriorityFeeSample>, BudgetError> {
        self.fee_targets.lock().unwrap().push(targets.to_vec());
        match &self.fees {
            Some(Ok(samples)) => Ok(samples.clone()),
            Some(Err(message)) => Err(BudgetError::Rpc(message.clone())),
            None => Ok(Vec::new()),
        }
    }

    async fn lookup_table(
        &self,
        address: &Pubkey,
    ) -> Result<Option<AddressLookupTableAccount>, BudgetError> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        match self.tables.get(address) {
            Some(Ok(table)) => Ok(Some(table.clone())),
            Some(Err(reason)) => Err(BudgetError::LookupTableAccountMissing {
                address: *address,
                reason: reason.clone(),
            }),
            None => Ok(None),
        }
    }

    async fn simulate(
        &self,
        _transaction: &VersionedTransaction,
    ) -> Result<SimulationOutcome, BudgetError> {
        self.simulate_calls.fetch_add(1, Ordering::SeqCst);
        match &self.simulation {
            Some(outcome) => Ok(outcome.clone()),
            None => Err(BudgetError::Rpc("no simulation scripted".to_string())),
        }
    }

    async fn account(&self, address: &Pubkey) -> Result<Option<Account>, BudgetError> {
        let call = self.account_calls.fetch_add(1, Ordering::SeqCst) + 1;
        match self.accounts.get(address) {
            Some((account, visible_from)) if call >= *visible_from => Ok(Some(account.clone())),
            _ => Ok(None),
        }
    }
}

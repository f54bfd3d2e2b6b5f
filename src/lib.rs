//! txforge - compute-budget aware transaction preparation for Solana
//!
//! Takes an assembled, not-yet-priced instruction sequence, recommends a
//! priority-fee price from recent network activity, measures the real
//! compute-unit cost by simulation, and rewrites the sequence with explicit
//! price/limit directives and the network's address lookup table. A bounded
//! retry guard confirms side effects despite replica propagation delay.
//!
//! Public entry points are [`budget::augment`] and
//! [`confirm::await_visible`]; the sub-operations ([`budget::estimate`],
//! [`budget::LookupTableResolver::resolve`], [`budget::simulated_units`])
//! are exposed for independent use. Signing and submission stay with the
//! caller; this crate never holds keys.

pub mod budget;
pub mod config;
pub mod confirm;
pub mod network;

// Compiled only for tests or with the `test_utils` feature
pub mod test_utils;

pub use budget::{
    augment, estimate, simulated_units, BudgetError, ComputeBudget, InstructionSequence,
    LookupTableResolver, PriorityFeeSample, ScaleFactors,
};
pub use config::Config;
pub use confirm::{await_account_visible, await_visible, RetryPolicy, VisibilityError};
pub use network::{ConnectionProvider, LedgerRpc, NetworkId, SimulationOutcome, SolanaRpc};

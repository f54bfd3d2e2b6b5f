//! Error types for the compute-budget augmentation pipeline
//!
//! The taxonomy separates fatal configuration problems from transient
//! network conditions so callers can pick a targeted remedy instead of a
//! generic failure. Nothing in this module is retried internally; the first
//! failure always propagates to the caller.

use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

use crate::network::NetworkId;

/// Error type for all budget augmentation operations
#[derive(Error, Debug)]
pub enum BudgetError {
    /// The requested network is absent from the deployment configuration
    ///
    /// Raised before any network call is made; this is a configuration
    /// problem (no RPC endpoint or no published lookup table), not an RPC
    /// condition.
    #[error("unsupported network '{0}'")]
    UnsupportedNetwork(NetworkId),

    /// Caller-supplied scale factors would under-provision the budget
    #[error("invalid scale factors: {0}")]
    InvalidScaleFactors(String),

    /// Fee history contained no usable samples
    ///
    /// Zero-fee slots are excluded before averaging; if nothing survives
    /// the filter there is no basis for a price and the caller must widen
    /// the window or fall back to its own policy.
    #[error("no non-zero priority fee samples in the recent history window")]
    FeeHistoryUnavailable,

    /// The configured lookup table address resolves to nothing on-ledger
    ///
    /// Indicates a misconfigured or never-published table.
    #[error("lookup table {address} not found on ledger")]
    LookupTableNotFound { address: Pubkey },

    /// The lookup table account exists but its data could not be read
    ///
    /// Distinct from [`BudgetError::LookupTableNotFound`]: this is a
    /// transient RPC or replication condition worth retrying by the caller.
    #[error("lookup table account {address} could not be read: {reason}")]
    LookupTableAccountMissing { address: Pubkey, reason: String },

    /// The dry run itself aborted
    ///
    /// The business instructions are invalid independent of fees; wraps the
    /// underlying execution error.
    #[error("simulation failed: {0}")]
    SimulationFailed(String),

    /// Simulation succeeded but reported no compute-unit figure
    ///
    /// Treated as a distinct, retryable condition rather than assumed zero.
    #[error("simulation returned no compute unit figure")]
    ComputeUnitsUnavailable,

    /// The instruction set could not be compiled into a v0 message
    #[error("message compilation failed: {0}")]
    Compile(String),

    /// Transport-level RPC failure
    #[error("rpc error: {0}")]
    Rpc(String),
}

impl BudgetError {
    /// Check if retrying the operation might succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::LookupTableAccountMissing { .. } => true,
            Self::ComputeUnitsUnavailable => true,
            Self::Rpc(_) => true,
            Self::FeeHistoryUnavailable => true,

            Self::UnsupportedNetwork(_) => false,
            Self::InvalidScaleFactors(_) => false,
            Self::LookupTableNotFound { .. } => false,
            Self::SimulationFailed(_) => false,
            Self::Compile(_) => false,
        }
    }

    /// Error category for metrics and log fields
    pub fn category(&self) -> &'static str {
        match self {
            Self::UnsupportedNetwork(_) => "config",
            Self::InvalidScaleFactors(_) => "config",
            Self::FeeHistoryUnavailable => "fee_history",
            Self::LookupTableNotFound { .. } => "lookup_table",
            Self::LookupTableAccountMissing { .. } => "lookup_table",
            Self::SimulationFailed(_) => "simulation",
            Self::ComputeUnitsUnavailable => "simulation",
            Self::Compile(_) => "compile",
            Self::Rpc(_) => "rpc",
        }
    }
}

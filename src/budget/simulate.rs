//! Compute-unit measurement via a non-committing dry run
//!
//! The exact business instruction list (minus budget directives) is
//! compiled into a v0 message as if signed by the payer, using the resolved
//! lookup tables for address compression, and dry-run against the ledger's
//! simulation endpoint. The blockhash is a placeholder; the host replaces
//! it during simulation.

use solana_sdk::{
    address_lookup_table::AddressLookupTableAccount,
    hash::Hash,
    instruction::Instruction,
    message::{v0, VersionedMessage},
    pubkey::Pubkey,
    signature::Signature,
    transaction::VersionedTransaction,
};
use tracing::debug;

use crate::budget::errors::BudgetError;
use crate::network::LedgerRpc;

/// Measure the compute units the instruction list will actually consume
///
/// A dry run that aborts propagates as [`BudgetError::SimulationFailed`]
/// since it means the instructions are invalid independent of fees; a run
/// that succeeds without reporting a usage figure is the distinct,
/// retryable [`BudgetError::ComputeUnitsUnavailable`].
pub async fn simulated_units(
    rpc: &dyn LedgerRpc,
    instructions: &[Instruction],
    payer: &Pubkey,
    lookup_tables: &[AddressLookupTableAccount],
) -> Result<u64, BudgetError> {
    let transaction = build_simulation_transaction(instructions, payer, lookup_tables)?;

    let outcome = rpc.simulate(&transaction).await?;
    if let Some(err) = outcome.err {
        if let Some(logs) = &outcome.logs {
            debug!(?logs, "simulation aborted");
        }
        return Err(BudgetError::SimulationFailed(err));
    }

    let units = outcome
        .units_consumed
        .ok_or(BudgetError::ComputeUnitsUnavailable)?;
    debug!(units, payer = %payer, "simulation measured compute units");
    Ok(units)
}

/// Compile an unsigned v0 transaction suitable for simulation
///
/// The single default signature satisfies the payer's required-signature
/// slot; simulation runs with signature verification disabled.
fn build_simulation_transaction(
    instructions: &[Instruction],
    payer: &Pubkey,
    lookup_tables: &[AddressLookupTableAccount],
) -> Result<VersionedTransaction, BudgetError> {
    let message = v0::Message::try_compile(payer, instructions, lookup_tables, Hash::default())
        .map_err(|e| BudgetError::Compile(e.to_string()))?;

    Ok(VersionedTransaction {
        signatures: vec![Signature::default()],
        message: VersionedMessage::V0(message),
    })
}

//! Priority-fee estimation from recent network activity
//!
//! The host returns one sample per recently processed slot (window bounded
//! by the RPC node, typically ~150 slots). Idle slots report a zero fee and
//! would bias the average downward, causing underpayment exactly when the
//! network is busy, so they are excluded before averaging.

use solana_sdk::pubkey::Pubkey;
use tracing::debug;

use crate::budget::errors::BudgetError;
use crate::network::LedgerRpc;

/// One per-slot priority-fee observation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityFeeSample {
    pub slot: u64,
    /// Micro-lamports per compute unit paid in this slot
    pub fee: u64,
}

/// Recommend a price in micro-lamports per compute unit
///
/// `target` optionally scopes the fee history to one account or program;
/// when omitted the unscoped recent history is used. A failed fetch
/// surfaces immediately; this call is idempotent and safe to retry at a
/// higher layer.
pub async fn estimate(
    rpc: &dyn LedgerRpc,
    target: Option<&Pubkey>,
) -> Result<u64, BudgetError> {
    let targets: Vec<Pubkey> = target.into_iter().copied().collect();
    let samples = rpc.recent_priority_fees(&targets).await?;

    let estimate = average_excluding_zeros(&samples)?;
    debug!(
        samples = samples.len(),
        target = ?target,
        estimate,
        "priority fee estimated"
    );
    Ok(estimate)
}

/// Arithmetic mean of the non-zero samples, rounded half up
fn average_excluding_zeros(samples: &[PriorityFeeSample]) -> Result<u64, BudgetError> {
    let nonzero: Vec<u64> = samples.iter().map(|s| s.fee).filter(|&f| f > 0).collect();
    if nonzero.is_empty() {
        return Err(BudgetError::FeeHistoryUnavailable);
    }

    let sum: u64 = nonzero.iter().sum();
    let count = nonzero.len() as u64;
    // Fees are integral; ties round half up.
    Ok((sum + count / 2) / count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockRpc;

    fn samples(fees: &[u64]) -> Vec<PriorityFeeSample> {
        fees.iter()
            .enumerate()
            .map(|(i, &fee)| PriorityFeeSample {
                slot: 1000 + i as u64,
                fee,
            })
            .collect()
    }

    #[test]
    fn test_zero_samples_excluded_from_average() {
        assert_eq!(average_excluding_zeros(&samples(&[0, 0, 10, 20])).unwrap(), 15);
    }

    #[test]
    fn test_all_zero_history_is_an_error() {
        let err = average_excluding_zeros(&samples(&[0, 0, 0])).unwrap_err();
        assert!(matches!(err, BudgetError::FeeHistoryUnavailable));
    }

    #[test]
    fn test_empty_history_is_an_error() {
        let err = average_excluding_zeros(&[]).unwrap_err();
        assert!(matches!(err, BudgetError::FeeHistoryUnavailable));
    }

    #[test]
    fn test_ties_round_half_up() {
        // mean 1.5 -> 2
        assert_eq!(average_excluding_zeros(&samples(&[1, 2])).unwrap(), 2);
        // mean 7/3 = 2.33 -> 2
        assert_eq!(average_excluding_zeros(&samples(&[1, 2, 4])).unwrap(), 2);
        // mean 8/3 = 2.67 -> 3
        assert_eq!(average_excluding_zeros(&samples(&[2, 2, 4])).unwrap(), 3);
    }

    #[tokio::test]
    async fn test_estimate_scopes_to_target() {
        let rpc = MockRpc::new().with_fees(samples(&[0, 10, 20]));
        let target = Pubkey::new_unique();

        let price = estimate(&rpc, Some(&target)).await.unwrap();
        assert_eq!(price, 15);
        assert_eq!(rpc.fee_targets(), vec![vec![target]]);
    }

    #[tokio::test]
    async fn test_estimate_unscoped() {
        let rpc = MockRpc::new().with_fees(samples(&[30]));
        let price = estimate(&rpc, None).await.unwrap();
        assert_eq!(price, 30);
        assert_eq!(rpc.fee_targets(), vec![Vec::<Pubkey>::new()]);
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        let rpc = MockRpc::new().with_fee_error("503 busy");
        let err = estimate(&rpc, None).await.unwrap_err();
        assert!(matches!(err, BudgetError::Rpc(_)));
    }
}

//! Budget augmentation orchestration
//!
//! Takes an assembled, not-yet-priced instruction sequence and produces the
//! final sequence ready for signing: resolve the network's lookup table,
//! estimate a priority-fee price from recent activity, measure the real
//! compute cost by simulation, then prepend the two budget directives.
//!
//! There is no partial or best-effort augmentation. Under-pricing wastes
//! the submission slot and over-pricing wastes funds, so any sub-step
//! failure aborts the whole call before anything can be signed.

use solana_sdk::pubkey::Pubkey;
use tracing::info;

use crate::budget::errors::BudgetError;
use crate::budget::fees;
use crate::budget::lookup::LookupTableResolver;
use crate::budget::sequence::{
    ComputeBudget, InstructionSequence, ScaleFactors, MAX_COMPUTE_UNIT_LIMIT,
};
use crate::budget::simulate;
use crate::network::{LedgerRpc, NetworkId};

/// Price and size the sequence, returning a new sequence with the budget
/// directives first and the lookup table attached exactly once
///
/// The input sequence is borrowed and never mutated, so intermediate
/// sequences stay reusable for composing further conditional groups.
pub async fn augment(
    rpc: &dyn LedgerRpc,
    resolver: &LookupTableResolver,
    network: NetworkId,
    sequence: &InstructionSequence,
    payer: &Pubkey,
    scale: ScaleFactors,
) -> Result<InstructionSequence, BudgetError> {
    scale.validate()?;

    let table = resolver.resolve(rpc, network).await?;
    let fee_estimate = fees::estimate(rpc, None).await?;
    let units_consumed =
        simulate::simulated_units(rpc, sequence.instructions(), payer, &[table.clone()]).await?;

    let budget = scaled_budget(fee_estimate, units_consumed, scale);
    info!(
        network = %network,
        fee_estimate,
        units_consumed,
        price = budget.price,
        units = budget.units,
        "sequence augmented with compute budget"
    );

    let [price_ix, limit_ix] = budget.instructions();
    Ok(InstructionSequence::new(vec![price_ix, limit_ix])
        .append(sequence.clone())
        .with_lookup_table(table))
}

/// Apply headroom factors to the raw estimate and measured units
///
/// One consistent rounding rule: the final product is rounded, never the
/// factor. Price rounds down (we already average up from history), the
/// limit rounds up and is clamped to the ledger's per-transaction cap.
fn scaled_budget(fee_estimate: u64, units_consumed: u64, scale: ScaleFactors) -> ComputeBudget {
    let price = (fee_estimate as f64 * scale.price_scale).floor() as u64;
    let units = (units_consumed as f64 * scale.limit_scale).ceil() as u64;
    ComputeBudget {
        price,
        units: units.min(MAX_COMPUTE_UNIT_LIMIT as u64) as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::SimulationOutcome;
    use crate::test_utils::{mock_table, MockRpc};
    use proptest::prelude::*;
    use solana_sdk::instruction::{AccountMeta, Instruction};
    use std::collections::HashMap;

    fn business_sequence(n: usize) -> InstructionSequence {
        InstructionSequence::new(
            (0..n)
                .map(|i| {
                    Instruction::new_with_bytes(
                        Pubkey::new_unique(),
                        &[i as u8],
                        vec![AccountMeta::new(Pubkey::new_unique(), false)],
                    )
                })
                .collect(),
        )
    }

    fn pipeline_rpc(address: Pubkey, fees: &[u64], units: u64) -> MockRpc {
        MockRpc::new()
            .with_fees(
                fees.iter()
                    .enumerate()
                    .map(|(i, &fee)| crate::budget::fees::PriorityFeeSample {
                        slot: i as u64,
                        fee,
                    })
                    .collect(),
            )
            .with_lookup_table(address, mock_table(address, 4))
            .with_simulation(SimulationOutcome {
                err: None,
                units_consumed: Some(units),
                logs: None,
            })
    }

    fn resolver_for(address: Pubkey) -> LookupTableResolver {
        LookupTableResolver::new(HashMap::from([(NetworkId::Mainnet, address)]))
    }

    #[tokio::test]
    async fn test_directives_precede_untouched_input() {
        let address = Pubkey::new_unique();
        let rpc = pipeline_rpc(address, &[0, 10, 20], 100_000);
        let resolver = resolver_for(address);
        let input = business_sequence(3);

        let augmented = augment(
            &rpc,
            &resolver,
            NetworkId::Mainnet,
            &input,
            &Pubkey::new_unique(),
            ScaleFactors::default(),
        )
        .await
        .unwrap();

        assert_eq!(augmented.len(), input.len() + 2);
        let budget_program = solana_sdk::compute_budget::id();
        assert_eq!(augmented.instructions()[0].program_id, budget_program);
        assert_eq!(augmented.instructions()[1].program_id, budget_program);
        // Suffix equals the input element-for-element; the input itself is
        // untouched.
        assert_eq!(&augmented.instructions()[2..], input.instructions());
        assert_eq!(input.len(), 3);
        assert!(input.lookup_tables().is_empty());
    }

    #[tokio::test]
    async fn test_lookup_table_attached_exactly_once() {
        let address = Pubkey::new_unique();
        let rpc = pipeline_rpc(address, &[10], 50_000);
        let resolver = resolver_for(address);

        let augmented = augment(
            &rpc,
            &resolver,
            NetworkId::Mainnet,
            &business_sequence(1),
            &Pubkey::new_unique(),
            ScaleFactors::default(),
        )
        .await
        .unwrap();

        assert_eq!(augmented.lookup_tables().len(), 1);
        assert_eq!(augmented.lookup_tables()[0].key, address);
    }

    #[tokio::test]
    async fn test_scaled_directive_values() {
        let address = Pubkey::new_unique();
        let rpc = pipeline_rpc(address, &[100], 100_000);
        let resolver = resolver_for(address);

        let augmented = augment(
            &rpc,
            &resolver,
            NetworkId::Mainnet,
            &business_sequence(1),
            &Pubkey::new_unique(),
            ScaleFactors {
                price_scale: 1.5,
                limit_scale: 2.0,
            },
        )
        .await
        .unwrap();

        // price = floor(100 * 1.5), limit = ceil(100_000 * 2.0)
        let expected = ComputeBudget {
            price: 150,
            units: 200_000,
        };
        let [price_ix, limit_ix] = expected.instructions();
        assert_eq!(augmented.instructions()[0], price_ix);
        assert_eq!(augmented.instructions()[1], limit_ix);
    }

    #[test]
    fn test_default_limit_scale_absorbs_variance() {
        let budget = scaled_budget(100, 100_000, ScaleFactors::default());
        assert_eq!(budget.price, 100);
        // 1.1 is not exact in binary; ceil may land one unit above.
        assert!(budget.units == 110_000 || budget.units == 110_001);
    }

    #[tokio::test]
    async fn test_invalid_scale_aborts_before_any_network_call() {
        let address = Pubkey::new_unique();
        let rpc = pipeline_rpc(address, &[10], 50_000);
        let resolver = resolver_for(address);

        let err = augment(
            &rpc,
            &resolver,
            NetworkId::Mainnet,
            &business_sequence(1),
            &Pubkey::new_unique(),
            ScaleFactors {
                price_scale: 0.5,
                limit_scale: 1.1,
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, BudgetError::InvalidScaleFactors(_)));
        assert_eq!(rpc.lookup_calls(), 0);
        assert!(rpc.fee_targets().is_empty());
    }

    #[tokio::test]
    async fn test_simulation_failure_aborts_whole_augmentation() {
        let address = Pubkey::new_unique();
        let rpc = MockRpc::new()
            .with_fees(vec![crate::budget::fees::PriorityFeeSample { slot: 1, fee: 10 }])
            .with_lookup_table(address, mock_table(address, 2))
            .with_simulation(SimulationOutcome {
                err: Some("ProgramFailedToComplete".to_string()),
                units_consumed: None,
                logs: None,
            });
        let resolver = resolver_for(address);

        let err = augment(
            &rpc,
            &resolver,
            NetworkId::Mainnet,
            &business_sequence(1),
            &Pubkey::new_unique(),
            ScaleFactors::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, BudgetError::SimulationFailed(_)));
    }

    #[test]
    fn test_limit_clamped_to_ledger_cap() {
        let budget = scaled_budget(
            10,
            2_000_000,
            ScaleFactors {
                price_scale: 1.0,
                limit_scale: 1.5,
            },
        );
        assert_eq!(budget.units, MAX_COMPUTE_UNIT_LIMIT);
    }

    proptest! {
        // Directive values never decrease when either factor grows.
        #[test]
        fn prop_scaling_is_monotonic(
            estimate in 0u64..10_000_000,
            units in 0u64..1_400_000,
            scale_a in 1.0f64..4.0,
            scale_b in 1.0f64..4.0,
        ) {
            let (lo, hi) = if scale_a <= scale_b {
                (scale_a, scale_b)
            } else {
                (scale_b, scale_a)
            };
            let low = scaled_budget(estimate, units, ScaleFactors { price_scale: lo, limit_scale: lo });
            let high = scaled_budget(estimate, units, ScaleFactors { price_scale: hi, limit_scale: hi });
            prop_assert!(high.price >= low.price);
            prop_assert!(high.units >= low.units);
        }

        // Scaling with factors >= 1 never shrinks the raw values.
        #[test]
        fn prop_scaling_never_underprovisions(
            estimate in 0u64..10_000_000,
            units in 1u64..1_272_727,
            price_scale in 1.0f64..4.0,
            limit_scale in 1.0f64..1.1,
        ) {
            let budget = scaled_budget(estimate, units, ScaleFactors { price_scale, limit_scale });
            prop_assert!(budget.price >= estimate);
            prop_assert!(u64::from(budget.units) >= units);
        }
    }
}

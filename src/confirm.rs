//! Bounded-retry visibility guard for eventually consistent reads
//!
//! A freshly created on-ledger record is not guaranteed to be visible to a
//! read immediately after the write transaction confirms; replicas may lag
//! the leader. This guard polls a caller-supplied probe with exponential
//! backoff until the value appears or the policy is exhausted. It is the
//! only component in the crate with an intrinsic notion of giving up.

use solana_sdk::{account::Account, pubkey::Pubkey};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::network::LedgerRpc;

/// Bounds for the visibility poll
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    /// 10 attempts, 5s start, 30s cap, doubling
    fn default() -> Self {
        Self {
            max_attempts: 10,
            initial_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = self.backoff_multiplier.powi(attempt as i32);
        let delay = self.initial_delay.mul_f64(factor);
        delay.min(self.max_delay)
    }
}

/// Terminal failure of the visibility poll
#[derive(Error, Debug)]
pub enum VisibilityError {
    /// The probe never produced a value within the policy's budget
    ///
    /// `last_error` is `None` when every attempt came back cleanly absent,
    /// and carries the transport error when the final attempt failed, so
    /// the caller can log the true cause.
    #[error("not visible after {attempts} attempts{}", .last_error.as_ref().map(|e| format!(" (last error: {e})")).unwrap_or_default())]
    Timeout {
        attempts: u32,
        last_error: Option<String>,
    },
}

/// Poll `probe` until it yields a value or the policy is exhausted
///
/// `Ok(None)` is the expected "not yet replicated" state, not an error. A
/// transport failure from the probe is treated the same as absence for
/// retry purposes, since transient RPC failures are indistinguishable from
/// replication lag; the distinction is preserved in the terminal error.
pub async fn await_visible<T, F, Fut>(
    mut probe: F,
    policy: &RetryPolicy,
) -> Result<T, VisibilityError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<Option<T>>>,
{
    let mut last_error: Option<String> = None;

    for attempt in 0..policy.max_attempts {
        match probe().await {
            Ok(Some(value)) => {
                debug!(attempt = attempt + 1, "probe succeeded");
                return Ok(value);
            }
            Ok(None) => {
                last_error = None;
                debug!(attempt = attempt + 1, "not yet visible");
            }
            Err(e) => {
                last_error = Some(e.to_string());
                warn!(attempt = attempt + 1, error = %e, "probe failed, retrying");
            }
        }

        // No sleep after the final attempt.
        if attempt + 1 < policy.max_attempts {
            tokio::time::sleep(policy.delay_for_attempt(attempt)).await;
        }
    }

    Err(VisibilityError::Timeout {
        attempts: policy.max_attempts,
        last_error,
    })
}

/// Wait until a newly created account replicates
///
/// The concrete probe used after confirmed writes that create accounts
/// (e.g. a multisig before its signer set can be verified).
pub async fn await_account_visible(
    rpc: &dyn LedgerRpc,
    address: &Pubkey,
    policy: &RetryPolicy,
) -> Result<Account, VisibilityError> {
    await_visible(
        || async move { rpc.account(address).await.map_err(anyhow::Error::from) },
        policy,
    )
    .await
}

use std::future::Future;
use std::time::Duration;

use eyre::Result;
use log::{info, warn};

use super::types::{AttemptResult, FailureReason, TransferOutcome};

/// Fixed-count retry with a fixed pause between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, not the number of re-tries after the first
    pub max_retries: u32,
    /// Pause between two attempts
    pub retry_delay: Duration,
}

impl RetryPolicy {
    /// Creates a retry policy
    pub const fn new(max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            max_retries,
            retry_delay,
        }
    }
}

/// Runs `attempt` until it succeeds or `max_retries` attempts are used up.
///
/// Every failure is retried the same way, including `below_minimum` and
/// `insufficient_balance`: deciding that those end the run is left to the
/// caller. An `Err` from `attempt` is recorded as `network_error`; this
/// function never returns an error itself.
///
/// # Arguments
/// * `label` - Name of the transfer used in log lines
/// * `policy` - Attempt count and delay
/// * `attempt` - Produces one transfer attempt per call
///
/// # Returns
/// The first success, or the last recorded failure. `max_retries_exceeded` is
/// returned only when no attempt was made at all.
pub async fn execute_with_retry<F, Fut>(
    label: &str,
    policy: RetryPolicy,
    mut attempt: F,
) -> TransferOutcome
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<AttemptResult>>,
{
    let mut last_outcome: Option<TransferOutcome> = None;

    for index in 1..=policy.max_retries {
        info!("{label} - Attempt {index}/{}", policy.max_retries);

        let result = match attempt().await {
            Ok(result) => result,
            Err(e) => {
                warn!("{label} error: {e}");
                AttemptResult::failure(FailureReason::NetworkError)
            }
        };

        if result.is_success() {
            if index > 1 {
                info!("{label} succeeded on attempt {index}");
            }
            return TransferOutcome {
                result,
                attempts_used: index,
            };
        }

        last_outcome = Some(TransferOutcome {
            result,
            attempts_used: index,
        });

        if index < policy.max_retries {
            if let AttemptResult::Failure { reason } = result {
                warn!(
                    "{label} failed ({reason}). Retrying in {}s...",
                    policy.retry_delay.as_secs_f64()
                );
            }
            tokio::time::sleep(policy.retry_delay).await;
        }
    }

    warn!("{label} failed after {} attempts", policy.max_retries);
    last_outcome.unwrap_or(TransferOutcome {
        result: AttemptResult::failure(FailureReason::MaxRetriesExceeded),
        attempts_used: policy.max_retries,
    })
}

//! Detection and repair of funds stuck in wallet B.

use alloy::primitives::U256;
use log::{info, warn};

use super::attempt::TransferAgent;
use super::fees::ViabilityPolicy;
use super::types::{Accounts, TransferOutcome};
use crate::ledger::Ledger;

/// Result of the start-up balance check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    /// Wallet A is empty while wallet B holds funds
    pub degraded: bool,
}

/// Decides whether funds sit on the wrong side: `A == 0 && B > 0`
pub fn detect(balance_a: U256, balance_b: U256) -> Detection {
    Detection {
        degraded: balance_a.is_zero() && !balance_b.is_zero(),
    }
}

/// Result of a recovery run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryReport {
    /// Outcome of the single B→A transfer
    pub outcome: TransferOutcome,
    /// Fee paid by the transfer, zero if it failed
    pub total_fees: U256,
}

/// One-shot B→A transfer, used instead of the ping-pong loop
pub struct Recovery<'a, L: ?Sized> {
    /// Sends the transfer
    agent: TransferAgent<'a, L>,
    /// Wallets A and B
    accounts: Accounts,
}

impl<'a, L: Ledger + ?Sized> Recovery<'a, L> {
    /// Creates a recovery run
    pub const fn new(agent: TransferAgent<'a, L>, accounts: Accounts) -> Self {
        Self { agent, accounts }
    }

    /// Transfers all of wallet B's spendable balance to wallet A
    pub async fn run(&self) -> RecoveryReport {
        info!("RECOVERY MODE - Transferring all funds from B to A");

        let outcome = self
            .agent
            .transfer_with_retry(
                "Recovery Transfer",
                self.accounts.b,
                self.accounts.a,
                ViabilityPolicy::Drain,
            )
            .await;

        let total_fees = outcome.fee_paid().unwrap_or_default();
        match outcome.failure_reason() {
            None => {
                info!("Recovery transfer completed successfully!");
                info!("All funds have been moved back to Wallet A");
            }
            Some(reason) => {
                warn!(
                    "Recovery transfer failed after {} attempts: {reason}",
                    outcome.attempts_used
                );
                warn!("You may need to manually transfer funds or check gas prices");
            }
        }

        RecoveryReport {
            outcome,
            total_fees,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::transfer::test_helpers::*;
    use crate::transfer::types::FailureReason;

    #[test]
    fn test_detect() {
        for b in [1_u64, 5, 1_000_000] {
            assert!(detect(U256::ZERO, U256::from(b)).degraded);
        }
        assert!(!detect(U256::ZERO, U256::ZERO).degraded);
        for (a, b) in [(1_u64, 0_u64), (1, 1), (5, 1_000)] {
            assert!(!detect(U256::from(a), U256::from(b)).degraded);
        }
    }

    #[tokio::test]
    async fn test_recovery_moves_b_to_a() {
        let ledger = MockLedger::new(U256::ZERO, ether("5"), ONE_ETHER_GAS_PRICE);
        let settings = settings(10);
        let agent = TransferAgent::new(&ledger, &settings, "MON");

        let report = Recovery::new(agent, Accounts::new(WALLET_A, WALLET_B)).run().await;

        assert!(report.outcome.is_success());
        assert_eq!(report.total_fees, ether("1"));
        assert_eq!(ledger.balance_of(WALLET_A), ether("4"));
        assert_eq!(ledger.sends().len(), 1);
    }

    #[tokio::test]
    async fn test_recovery_failure_is_reported() {
        let ledger = MockLedger::new(U256::ZERO, ether("1"), ONE_ETHER_GAS_PRICE);
        let settings = settings(10);
        let agent = TransferAgent::new(&ledger, &settings, "MON");

        let report = Recovery::new(agent, Accounts::new(WALLET_A, WALLET_B)).run().await;

        assert_eq!(
            report.outcome.failure_reason(),
            Some(FailureReason::InsufficientBalance)
        );
        assert_eq!(report.outcome.attempts_used, 3);
        assert_eq!(report.total_fees, U256::ZERO);
    }
}

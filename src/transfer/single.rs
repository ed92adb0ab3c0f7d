use log::{info, warn};

use super::attempt::TransferAgent;
use super::fees::ViabilityPolicy;
use super::types::{Accounts, TransferOutcome};
use crate::ledger::Ledger;

/// One A→B transfer that must move at least the configured minimum
pub struct SingleTransfer<'a, L: ?Sized> {
    /// Sends the transfer
    agent: TransferAgent<'a, L>,
    /// Wallets A and B
    accounts: Accounts,
}

impl<'a, L: Ledger + ?Sized> SingleTransfer<'a, L> {
    /// Creates a single-transfer run
    pub const fn new(agent: TransferAgent<'a, L>, accounts: Accounts) -> Self {
        Self { agent, accounts }
    }

    /// Sends everything but the fee from A to B, with retries
    pub async fn run(&self) -> TransferOutcome {
        info!("Starting transfer process...");
        let minimum = self.agent.settings().min_transfer_amount;
        let outcome = self
            .agent
            .transfer_with_retry(
                "Transfer",
                self.accounts.a,
                self.accounts.b,
                ViabilityPolicy::MinimumTransfer(minimum),
            )
            .await;

        match outcome.fee_paid() {
            Some(fee) => {
                info!("Transfer completed successfully!");
                info!("Total fees used: {}", self.agent.display(fee));
            }
            None => warn!("Transfer failed. Please check the logs above for details."),
        }
        outcome
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::transfer::test_helpers::*;
    use crate::transfer::types::FailureReason;
    use alloy::primitives::U256;

    #[tokio::test]
    async fn test_single_transfer() {
        let ledger = MockLedger::new(ether("3"), U256::ZERO, ONE_ETHER_GAS_PRICE);
        let settings = settings(1);
        let agent = TransferAgent::new(&ledger, &settings, "MON");

        let outcome = SingleTransfer::new(agent, Accounts::new(WALLET_A, WALLET_B)).run().await;

        assert!(outcome.is_success());
        assert_eq!(outcome.fee_paid(), Some(ether("1")));
        assert_eq!(ledger.balance_of(WALLET_B), ether("2"));
        assert_eq!(ledger.sends().len(), 1);
    }

    #[tokio::test]
    async fn test_single_transfer_below_minimum() {
        let ledger = MockLedger::new(ether("1.2"), U256::ZERO, ONE_ETHER_GAS_PRICE);
        let settings = settings(1);
        let agent = TransferAgent::new(&ledger, &settings, "MON");

        let outcome = SingleTransfer::new(agent, Accounts::new(WALLET_A, WALLET_B)).run().await;

        assert_eq!(outcome.failure_reason(), Some(FailureReason::BelowMinimum));
        assert_eq!(outcome.attempts_used, 3);
        assert!(ledger.sends().is_empty());
    }

    #[tokio::test]
    async fn test_single_transfer_exactly_minimum() {
        let ledger = MockLedger::new(ether("1.5"), U256::ZERO, ONE_ETHER_GAS_PRICE);
        let settings = settings(1);
        let agent = TransferAgent::new(&ledger, &settings, "MON");

        let outcome = SingleTransfer::new(agent, Accounts::new(WALLET_A, WALLET_B)).run().await;

        assert!(outcome.is_success());
        assert_eq!(ledger.balance_of(WALLET_B), ether("0.5"));
    }
}

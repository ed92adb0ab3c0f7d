use alloy::primitives::{Address, U256};
use eyre::Result;
use log::{info, warn};

use super::fees::{FeeQuote, ViabilityPolicy};
use super::retry::execute_with_retry;
use super::types::{AttemptResult, FailureReason, TransferOutcome};
use crate::config::TransferSettings;
use crate::ledger::{Ledger, TransferRequest};
use crate::utils::units::{display_amount, display_gwei, display_signed_amount};

/// Makes drain transfers between accounts of one ledger.
///
/// Each attempt re-reads the sender's balance and the gas price right before
/// sending; nothing about balances is cached between attempts.
pub struct TransferAgent<'a, L: ?Sized> {
    /// Chain access
    ledger: &'a L,
    /// Gas, threshold and retry settings
    settings: &'a TransferSettings,
    /// Currency symbol for log lines
    currency: &'a str,
}

impl<L: ?Sized> Clone for TransferAgent<'_, L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L: ?Sized> Copy for TransferAgent<'_, L> {}

impl<'a, L: Ledger + ?Sized> TransferAgent<'a, L> {
    /// Creates an agent for `ledger`
    pub const fn new(ledger: &'a L, settings: &'a TransferSettings, currency: &'a str) -> Self {
        Self {
            ledger,
            settings,
            currency,
        }
    }

    /// The ledger this agent sends through
    pub const fn ledger(&self) -> &'a L {
        self.ledger
    }

    /// The settings this agent was created with
    pub const fn settings(&self) -> &'a TransferSettings {
        self.settings
    }

    /// Renders an amount with the configured currency
    pub fn display(&self, amount: U256) -> String {
        display_amount(amount, self.currency)
    }

    /// One transfer attempt of everything but the fee from `from` to `to`.
    ///
    /// # Errors
    /// * If the balance query or the send fails at the transport level
    pub async fn attempt(&self, from: Address, to: Address, policy: ViabilityPolicy) -> Result<AttemptResult> {
        let balance = self.ledger.balance(from).await?;
        info!("{from} balance: {}", self.display(balance));

        let gas_price = self.gas_price().await;
        let quote = FeeQuote::compute(balance, gas_price, self.settings.gas_limit, policy);
        info!("Estimated fee: {}", self.display(quote.estimated_fee));
        info!(
            "Available for transfer: {}",
            display_signed_amount(quote.available_amount, self.currency)
        );

        if let Some(reason) = self.reject(&quote, policy) {
            return Ok(AttemptResult::failure(reason));
        }

        let amount = quote.transfer_amount();
        info!("Preparing transaction to send {} to {to}", self.display(amount));

        let receipt = self
            .ledger
            .send_value(TransferRequest {
                from,
                to,
                amount,
                gas_limit: self.settings.gas_limit,
                gas_price,
            })
            .await?;

        if !receipt.succeeded() {
            warn!("Transaction {} failed", receipt.hash);
            return Ok(AttemptResult::failure(FailureReason::TransactionFailed));
        }

        let fee_paid = receipt.fee();
        info!("Transaction confirmed successfully!");
        info!(
            "Gas used: {}, gas price: {}, fee: {}",
            receipt.gas_used,
            display_gwei(receipt.effective_gas_price),
            self.display(fee_paid)
        );

        Ok(AttemptResult::Success {
            amount_sent: amount,
            fee_paid,
        })
    }

    /// [`TransferAgent::attempt`] wrapped in the configured retry policy
    pub async fn transfer_with_retry(
        &self,
        label: &str,
        from: Address,
        to: Address,
        policy: ViabilityPolicy,
    ) -> TransferOutcome {
        let agent = *self;
        execute_with_retry(label, self.settings.retry_policy(), move || async move {
            agent.attempt(from, to, policy).await
        })
        .await
    }

    /// Node gas price, or the reference price if the node cannot be asked
    async fn gas_price(&self) -> u128 {
        match self.ledger.gas_price().await {
            Ok(gas_price) => gas_price,
            Err(e) => {
                warn!(
                    "Failed to get gas price: {e}. Using reference price {}",
                    display_gwei(self.settings.reference_gas_price)
                );
                self.settings.reference_gas_price
            }
        }
    }

    /// Why `quote` must not be sent, if it must not
    fn reject(&self, quote: &FeeQuote, policy: ViabilityPolicy) -> Option<FailureReason> {
        match policy {
            ViabilityPolicy::Drain => {
                if !quote.viable {
                    warn!("Cannot transfer: Insufficient balance for gas fees");
                    return Some(FailureReason::InsufficientBalance);
                }
                let minimum = self.settings.min_remaining_amount;
                if quote.is_below(minimum) {
                    info!(
                        "Transfer amount ({}) is below minimum threshold ({})",
                        self.display(quote.transfer_amount()),
                        self.display(minimum)
                    );
                    return Some(FailureReason::BelowMinimum);
                }
                None
            }
            ViabilityPolicy::MinimumTransfer(minimum) => {
                if quote.viable {
                    return None;
                }
                warn!(
                    "Cannot transfer: Available amount ({}) is less than minimum required ({})",
                    display_signed_amount(quote.available_amount, self.currency),
                    self.display(minimum)
                );
                if quote.available_amount.is_positive() {
                    Some(FailureReason::BelowMinimum)
                } else {
                    Some(FailureReason::InsufficientBalance)
                }
            }
        }
    }
}

use alloy::primitives::{I256, U256};

/// How a quote decides whether a transfer is worth making
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViabilityPolicy {
    /// Ping-pong mode: anything above the fee is viable.
    ///
    /// The minimum-remaining threshold is checked separately by the caller so
    /// that it can be reported as its own stop condition.
    Drain,
    /// Single-transfer mode: the amount after fees must reach the minimum
    MinimumTransfer(U256),
}

/// Fee-aware amount quote for draining a balance.
///
/// A `FeeQuote` is a pure function of its inputs: the estimated fee is
/// `gas_price * gas_limit`, and the available amount is the balance minus that
/// fee. The available amount is kept signed and is never clamped, so a balance
/// smaller than the fee yields a negative amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeQuote {
    /// Balance left after paying the estimated fee, possibly negative
    pub available_amount: I256,
    /// `gas_price * gas_limit`
    pub estimated_fee: U256,
    /// Whether the active policy accepts this amount
    pub viable: bool,
}

impl FeeQuote {
    /// Computes the quote for sending everything but the fee.
    ///
    /// # Arguments
    ///
    /// * `balance` - Sender balance in the smallest currency unit
    /// * `gas_price` - Price per unit of gas
    /// * `gas_limit` - Gas units reserved for the transfer
    /// * `policy` - Viability rule of the calling mode
    pub fn compute(balance: U256, gas_price: u128, gas_limit: u64, policy: ViabilityPolicy) -> Self {
        let estimated_fee = U256::from(gas_price).saturating_mul(U256::from(gas_limit));
        let available_amount = signed(balance).saturating_sub(signed(estimated_fee));

        let viable = match policy {
            ViabilityPolicy::Drain => available_amount.is_positive(),
            ViabilityPolicy::MinimumTransfer(minimum) => available_amount >= signed(minimum),
        };

        Self {
            available_amount,
            estimated_fee,
            viable,
        }
    }

    /// The amount to put on the wire, zero when nothing is available
    pub fn transfer_amount(&self) -> U256 {
        if self.available_amount.is_positive() {
            self.available_amount.into_raw()
        } else {
            U256::ZERO
        }
    }

    /// Whether the available amount is under `threshold`
    pub fn is_below(&self, threshold: U256) -> bool {
        self.available_amount < signed(threshold)
    }
}

/// Balances and fees never get near 2^255, saturate if they somehow do
fn signed(value: U256) -> I256 {
    I256::try_from(value).unwrap_or(I256::MAX)
}

use alloy::primitives::{Address, U256};
use derive_more::Display;

/// One of the two accounts taking part in a ping-pong run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Role {
    /// Wallet A, the origin account
    #[display("A")]
    A,
    /// Wallet B
    #[display("B")]
    B,
}

impl Role {
    /// The counterparty of this role
    pub const fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

/// The two account identities a run operates on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accounts {
    /// Address of wallet A
    pub a: Address,
    /// Address of wallet B
    pub b: Address,
}

impl Accounts {
    /// Creates the account pair
    pub const fn new(a: Address, b: Address) -> Self {
        Self { a, b }
    }

    /// The address playing `role`
    pub const fn address(&self, role: Role) -> Address {
        match role {
            Role::A => self.a,
            Role::B => self.b,
        }
    }
}

/// Why a transfer attempt did not go through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum FailureReason {
    /// The balance does not cover the network fee
    #[display("insufficient_balance")]
    InsufficientBalance,
    /// The transferable amount is under the configured minimum
    #[display("below_minimum")]
    BelowMinimum,
    /// The transaction settled with a failing status
    #[display("transaction_failed")]
    TransactionFailed,
    /// A ledger call returned an error
    #[display("network_error")]
    NetworkError,
    /// Every attempt was used up without a result being recorded
    #[display("max_retries_exceeded")]
    MaxRetriesExceeded,
}

impl FailureReason {
    /// Whether this reason is an expected end of the run rather than an error.
    ///
    /// Retrying cannot change these outcomes, but the retry executor still
    /// retries them; only the orchestrator treats them as a normal stop.
    pub const fn is_natural_stop(self) -> bool {
        matches!(self, Self::InsufficientBalance | Self::BelowMinimum)
    }
}

/// Result of one transfer attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptResult {
    /// The transfer settled successfully
    Success {
        /// Value moved to the receiver
        amount_sent: U256,
        /// Fee actually paid, `gas_used * effective_gas_price`
        fee_paid: U256,
    },
    /// The transfer was not made or did not settle
    Failure {
        /// Why
        reason: FailureReason,
    },
}

impl AttemptResult {
    /// Shorthand for a failed attempt
    pub const fn failure(reason: FailureReason) -> Self {
        Self::Failure { reason }
    }

    /// Whether the attempt succeeded
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Terminal result of the retry executor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferOutcome {
    /// The last attempt's result, or `MaxRetriesExceeded` if nothing was recorded
    pub result: AttemptResult,
    /// Number of attempts made
    pub attempts_used: u32,
}

impl TransferOutcome {
    /// Whether the transfer eventually succeeded
    pub const fn is_success(&self) -> bool {
        self.result.is_success()
    }

    /// The failure reason, if the transfer failed
    pub const fn failure_reason(&self) -> Option<FailureReason> {
        match self.result {
            AttemptResult::Failure { reason } => Some(reason),
            AttemptResult::Success { .. } => None,
        }
    }

    /// The fee paid, if the transfer succeeded
    pub const fn fee_paid(&self) -> Option<U256> {
        match self.result {
            AttemptResult::Success { fee_paid, .. } => Some(fee_paid),
            AttemptResult::Failure { .. } => None,
        }
    }
}

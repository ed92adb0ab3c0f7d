//! # Ledger Module
//!
//! The boundary between the transfer engine and the chain. The engine only
//! needs three capabilities: reading a balance, reading the gas price, and
//! sending value while waiting for it to settle. `RpcLedger` provides them over
//! JSON-RPC; tests use an in-memory implementation.

use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use eyre::Result;

/// JSON-RPC ledger backed by alloy
pub mod rpc;

pub use rpc::RpcLedger;

/// A value transfer to submit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferRequest {
    /// Sending account, must be one the ledger can sign for
    pub from: Address,
    /// Receiving account
    pub to: Address,
    /// Value to move
    pub amount: U256,
    /// Gas units reserved
    pub gas_limit: u64,
    /// Price per gas unit
    pub gas_price: u128,
}

/// Settlement status of a submitted transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptStatus {
    /// Accepted by the network
    Success,
    /// Rejected by the network
    Failed,
}

/// What the ledger reports once a transfer has settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Receipt {
    /// Settlement status
    pub status: ReceiptStatus,
    /// Gas actually consumed
    pub gas_used: u64,
    /// Price actually paid per gas unit
    pub effective_gas_price: u128,
    /// Settlement hash
    pub hash: TxHash,
}

impl Receipt {
    /// Fee paid for this transfer
    pub fn fee(&self) -> U256 {
        U256::from(self.gas_used) * U256::from(self.effective_gas_price)
    }

    /// Whether the network accepted the transfer
    pub fn succeeded(&self) -> bool {
        self.status == ReceiptStatus::Success
    }
}

/// Capabilities the transfer engine needs from a chain
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Current balance of `account` in the smallest currency unit
    async fn balance(&self, account: Address) -> Result<U256>;

    /// Current gas price
    async fn gas_price(&self) -> Result<u128>;

    /// Submits a value transfer and waits for it to settle.
    ///
    /// A rejected transfer may be reported either as an error or as a receipt
    /// with a failing status.
    async fn send_value(&self, request: TransferRequest) -> Result<Receipt>;
}

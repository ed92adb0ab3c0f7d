use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use alloy::primitives::{address, utils::parse_ether, Address, TxHash, U256};
use async_trait::async_trait;
use eyre::{bail, Result};

use crate::config::{Config, NetworkConfig, TransferSettings, WalletConfig};
use crate::ledger::{Ledger, Receipt, ReceiptStatus, TransferRequest};

pub const WALLET_A: Address = address!("0x1111111111111111111111111111111111111111");
pub const WALLET_B: Address = address!("0x2222222222222222222222222222222222222222");

/// One ether-denominated amount, e.g. `ether("0.5")`
#[allow(clippy::unwrap_used)]
pub fn ether(amount: &str) -> U256 {
    parse_ether(amount).unwrap()
}

/// Gas price that makes a one-gas transfer cost exactly one ether
pub const ONE_ETHER_GAS_PRICE: u128 = 1_000_000_000_000_000_000;

/// Settings with no delays and a transfer fee of `gas_price * 1`
pub fn settings(max_cycles: u32) -> TransferSettings {
    TransferSettings {
        max_cycles,
        min_remaining_amount: ether("0.5"),
        min_transfer_amount: ether("0.5"),
        inter_transfer_delay: Duration::ZERO,
        max_retries: 3,
        retry_delay: Duration::ZERO,
        gas_limit: 1,
        reference_gas_price: ONE_ETHER_GAS_PRICE,
    }
}

pub fn config(transfer: TransferSettings) -> Config {
    Config {
        network: NetworkConfig::default(),
        wallet_a: WalletConfig {
            address: WALLET_A,
            private_key: None,
            key_variable: "WALLET_A_PRIVATE_KEY",
        },
        wallet_b: WalletConfig {
            address: WALLET_B,
            private_key: None,
            key_variable: "WALLET_B_PRIVATE_KEY",
        },
        transfer,
    }
}

/// Scripted behaviour of the next `send_value` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendScript {
    /// Settle normally
    Settle,
    /// Settle with a failing status, the fee is still charged
    Revert,
    /// Return a transport error, nothing is charged
    Error,
}

#[derive(Debug, Default)]
struct State {
    balances: HashMap<Address, U256>,
    gas_price: u128,
    gas_price_fails: bool,
    balance_failures: usize,
    scripts: VecDeque<SendScript>,
    balance_calls: usize,
    gas_price_calls: usize,
    sends: Vec<TransferRequest>,
}

/// In-memory ledger that moves value between accounts on `send_value`
#[derive(Debug, Default)]
pub struct MockLedger {
    state: Mutex<State>,
}

#[allow(clippy::unwrap_used)]
impl MockLedger {
    pub fn new(balance_a: U256, balance_b: U256, gas_price: u128) -> Self {
        let ledger = Self::default();
        {
            let mut state = ledger.state.lock().unwrap();
            state.balances.insert(WALLET_A, balance_a);
            state.balances.insert(WALLET_B, balance_b);
            state.gas_price = gas_price;
        }
        ledger
    }

    /// Queue behaviours for the next sends; later sends settle normally
    pub fn with_sends(self, scripts: &[SendScript]) -> Self {
        self.state.lock().unwrap().scripts.extend(scripts.iter().copied());
        self
    }

    /// Make the next `count` balance queries fail
    pub fn with_balance_failures(self, count: usize) -> Self {
        self.state.lock().unwrap().balance_failures = count;
        self
    }

    /// Make every gas price query fail
    pub fn with_failing_gas_price(self) -> Self {
        self.state.lock().unwrap().gas_price_fails = true;
        self
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.state
            .lock()
            .unwrap()
            .balances
            .get(&account)
            .copied()
            .unwrap_or_default()
    }

    pub fn sends(&self) -> Vec<TransferRequest> {
        self.state.lock().unwrap().sends.clone()
    }

    pub fn balance_calls(&self) -> usize {
        self.state.lock().unwrap().balance_calls
    }

    pub fn gas_price_calls(&self) -> usize {
        self.state.lock().unwrap().gas_price_calls
    }
}

#[async_trait]
#[allow(clippy::unwrap_used)]
impl Ledger for MockLedger {
    async fn balance(&self, account: Address) -> Result<U256> {
        let mut state = self.state.lock().unwrap();
        state.balance_calls += 1;
        if state.balance_failures > 0 {
            state.balance_failures -= 1;
            bail!("balance query failed");
        }
        Ok(state.balances.get(&account).copied().unwrap_or_default())
    }

    async fn gas_price(&self) -> Result<u128> {
        let mut state = self.state.lock().unwrap();
        state.gas_price_calls += 1;
        if state.gas_price_fails {
            bail!("gas price unavailable");
        }
        Ok(state.gas_price)
    }

    async fn send_value(&self, request: TransferRequest) -> Result<Receipt> {
        let mut state = self.state.lock().unwrap();
        state.sends.push(request);

        let script = state.scripts.pop_front().unwrap_or(SendScript::Settle);
        if script == SendScript::Error {
            bail!("connection reset");
        }

        let fee = U256::from(request.gas_limit) * U256::from(request.gas_price);
        let sender = state.balances.get(&request.from).copied().unwrap_or_default();
        let charged = if script == SendScript::Revert {
            fee
        } else {
            fee + request.amount
        };
        if sender < charged {
            bail!("insufficient funds for gas * price + value");
        }
        state.balances.insert(request.from, sender - charged);

        let status = if script == SendScript::Revert {
            ReceiptStatus::Failed
        } else {
            let receiver = state.balances.get(&request.to).copied().unwrap_or_default();
            state.balances.insert(request.to, receiver + request.amount);
            ReceiptStatus::Success
        };

        Ok(Receipt {
            status,
            gas_used: request.gas_limit,
            effective_gas_price: request.gas_price,
            hash: TxHash::with_last_byte(u8::try_from(state.sends.len() % 256).unwrap()),
        })
    }
}

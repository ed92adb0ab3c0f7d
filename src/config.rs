//! Run configuration.
//!
//! Everything is read from the process environment once, at start-up, into an
//! immutable [`Config`] that is passed explicitly to whatever needs it.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::{utils::parse_ether, utils::parse_units, Address, U256};
use eyre::{eyre, Error, Result};
use url::Url;

use crate::transfer::retry::RetryPolicy;
use crate::transfer::types::Accounts;

/// Gas units reserved for a plain value transfer
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

/// Network the transfers run on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Human readable network name
    pub name: String,
    /// JSON-RPC endpoint
    pub rpc_url: String,
    /// Expected chain id
    pub chain_id: u64,
    /// Native currency symbol, used in log lines
    pub currency: String,
    /// Block explorer base URL
    pub explorer: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: "Monad Testnet".to_string(),
            rpc_url: "https://testnet-rpc.monad.xyz/".to_string(),
            chain_id: 10_143,
            currency: "MON".to_string(),
            explorer: "https://testnet.monadexplorer.com/".to_string(),
        }
    }
}

impl NetworkConfig {
    /// Loads the network section alone, without wallet requirements
    ///
    /// # Errors
    /// * If `CHAIN_ID` is present but not a number
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| non_empty(&lookup, key);
        let defaults = Self::default();
        Ok(Self {
            name: get("NETWORK_NAME").unwrap_or(defaults.name),
            rpc_url: get("RPC_URL").unwrap_or(defaults.rpc_url),
            chain_id: parse_or("CHAIN_ID", get("CHAIN_ID"), defaults.chain_id)?,
            currency: get("CURRENCY").unwrap_or(defaults.currency),
            explorer: get("EXPLORER_URL").unwrap_or(defaults.explorer),
        })
    }
}

/// Identity and signing credential of one wallet
#[derive(Clone, PartialEq, Eq)]
pub struct WalletConfig {
    /// Configured address
    pub address: Address,
    /// Hex private key, if one was provided
    pub private_key: Option<String>,
    /// Variable the key was read from, or the variables it is looked up under
    pub key_variable: &'static str,
}

impl std::fmt::Debug for WalletConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletConfig")
            .field("address", &self.address)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("key_variable", &self.key_variable)
            .finish()
    }
}

/// Tunables of the transfer engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferSettings {
    /// Upper bound on ping-pong rounds
    pub max_cycles: u32,
    /// Ping-pong stops once a transfer would move less than this
    pub min_remaining_amount: U256,
    /// Single-transfer mode refuses to move less than this
    pub min_transfer_amount: U256,
    /// Pause between two ping-pong rounds
    pub inter_transfer_delay: Duration,
    /// Attempts per transfer
    pub max_retries: u32,
    /// Pause between two attempts of the same transfer
    pub retry_delay: Duration,
    /// Gas units reserved per transfer
    pub gas_limit: u64,
    /// Gas price used when the node cannot be asked for one
    pub reference_gas_price: u128,
}

impl TransferSettings {
    /// Retry policy for a single transfer
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, self.retry_delay)
    }
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            max_cycles: 100,
            min_remaining_amount: U256::from(500_000_000_000_000_000_u128),
            min_transfer_amount: U256::from(500_000_000_000_000_000_u128),
            inter_transfer_delay: Duration::from_millis(2000),
            max_retries: 3,
            retry_delay: Duration::from_millis(5000),
            gas_limit: TRANSFER_GAS_LIMIT,
            reference_gas_price: 20_000_000_000,
        }
    }
}

/// Full configuration snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Network to connect to
    pub network: NetworkConfig,
    /// Wallet A, origin of every run
    pub wallet_a: WalletConfig,
    /// Wallet B
    pub wallet_b: WalletConfig,
    /// Engine tunables
    pub transfer: TransferSettings,
}

impl Config {
    /// Loads the configuration from environment variables.
    ///
    /// # Environment Variables
    /// * `WALLET_A_ADDRESS`, `WALLET_B_ADDRESS` - required
    /// * `WALLET_A_PRIVATE_KEY` (or `PRIVATE_KEY`), `WALLET_B_PRIVATE_KEY` - optional here,
    ///   required later depending on the mode
    /// * `RPC_URL`, `NETWORK_NAME`, `CHAIN_ID`, `CURRENCY`, `EXPLORER_URL`
    /// * `MAX_CYCLES`, `MIN_REMAINING_AMOUNT`, `MIN_TRANSFER_AMOUNT`,
    ///   `DELAY_BETWEEN_TRANSFERS`, `MAX_RETRIES`, `RETRY_DELAY`, `GAS_PRICE_GWEI`
    ///
    /// # Errors
    /// * If a wallet address is missing or malformed
    /// * If any numeric option is present but cannot be parsed
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads the configuration from an arbitrary key/value source
    ///
    /// # Errors
    /// * See [`Config::from_env`]
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| non_empty(&lookup, key);
        let network = NetworkConfig::from_lookup(&lookup)?;

        // PRIVATE_KEY is the legacy name of wallet A's key
        let (key_a, key_variable_a) = match (get("WALLET_A_PRIVATE_KEY"), get("PRIVATE_KEY")) {
            (Some(key), _) => (Some(key), "WALLET_A_PRIVATE_KEY"),
            (None, Some(key)) => (Some(key), "PRIVATE_KEY"),
            (None, None) => (None, "WALLET_A_PRIVATE_KEY (or PRIVATE_KEY)"),
        };
        let wallet_a = WalletConfig {
            address: address("WALLET_A_ADDRESS", get("WALLET_A_ADDRESS"))?,
            private_key: key_a,
            key_variable: key_variable_a,
        };
        let wallet_b = WalletConfig {
            address: address("WALLET_B_ADDRESS", get("WALLET_B_ADDRESS"))?,
            private_key: get("WALLET_B_PRIVATE_KEY"),
            key_variable: "WALLET_B_PRIVATE_KEY",
        };

        let defaults = TransferSettings::default();
        let transfer = TransferSettings {
            max_cycles: parse_or("MAX_CYCLES", get("MAX_CYCLES"), defaults.max_cycles)?,
            min_remaining_amount: ether_or(
                "MIN_REMAINING_AMOUNT",
                get("MIN_REMAINING_AMOUNT"),
                defaults.min_remaining_amount,
            )?,
            min_transfer_amount: ether_or(
                "MIN_TRANSFER_AMOUNT",
                get("MIN_TRANSFER_AMOUNT"),
                defaults.min_transfer_amount,
            )?,
            inter_transfer_delay: Duration::from_millis(parse_or(
                "DELAY_BETWEEN_TRANSFERS",
                get("DELAY_BETWEEN_TRANSFERS"),
                2000,
            )?),
            max_retries: parse_or("MAX_RETRIES", get("MAX_RETRIES"), defaults.max_retries)?,
            retry_delay: Duration::from_millis(parse_or("RETRY_DELAY", get("RETRY_DELAY"), 5000)?),
            gas_limit: TRANSFER_GAS_LIMIT,
            reference_gas_price: match get("GAS_PRICE_GWEI") {
                Some(gwei) => u128::try_from(
                    parse_units(gwei.trim(), "gwei")
                        .map_err(|e| eyre!("GAS_PRICE_GWEI is invalid: {e}"))?
                        .get_absolute(),
                )
                .map_err(|e| eyre!("GAS_PRICE_GWEI is out of range: {e}"))?,
                None => defaults.reference_gas_price,
            },
        };

        Ok(Self {
            network,
            wallet_a,
            wallet_b,
            transfer,
        })
    }

    /// Both wallet addresses
    pub const fn accounts(&self) -> Accounts {
        Accounts::new(self.wallet_a.address, self.wallet_b.address)
    }

    /// The RPC endpoint as a URL
    ///
    /// # Errors
    /// * If `RPC_URL` is not a valid URL
    pub fn rpc_url(&self) -> Result<Url> {
        Url::parse(&self.network.rpc_url).map_err(|e| eyre!("RPC_URL is invalid: {e}"))
    }
}

/// Looks `key` up, treating blank values as absent
fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|value| !value.trim().is_empty())
}

/// Parses a required address
fn address(key: &str, value: Option<String>) -> Result<Address> {
    let value = value.ok_or_else(|| eyre!("{key} not found in environment variables"))?;
    Address::from_str(value.trim()).map_err(|e| eyre!("{key} is not a valid address: {e}"))
}

/// Parses an optional value, falling back to `default` when absent
fn parse_or<T>(key: &str, value: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.map_or(Ok(default), |value| {
        value
            .trim()
            .parse()
            .map_err(|e| eyre!("{key} is invalid: {e}"))
    })
}

/// Parses an optional ether amount such as `0.5`
fn ether_or(key: &str, value: Option<String>, default: U256) -> Result<U256> {
    value.map_or(Ok(default), |value| {
        parse_ether(value.trim()).map_err(|e| eyre!("{key} is invalid: {e}"))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use alloy::primitives::address;
    use std::collections::HashMap;

    const A: &str = "0x1111111111111111111111111111111111111111";
    const B: &str = "0x2222222222222222222222222222222222222222";

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("WALLET_A_ADDRESS", A), ("WALLET_B_ADDRESS", B)]).unwrap();

        assert_eq!(config.transfer, TransferSettings::default());
        assert_eq!(config.transfer.max_cycles, 100);
        assert_eq!(config.transfer.min_remaining_amount, parse_ether("0.5").unwrap());
        assert_eq!(config.transfer.inter_transfer_delay, Duration::from_secs(2));
        assert_eq!(config.transfer.max_retries, 3);
        assert_eq!(config.transfer.retry_delay, Duration::from_secs(5));
        assert_eq!(config.transfer.gas_limit, 21_000);
        assert_eq!(config.network, NetworkConfig::default());
        assert_eq!(
            config.accounts(),
            Accounts::new(
                address!("0x1111111111111111111111111111111111111111"),
                address!("0x2222222222222222222222222222222222222222"),
            )
        );
        assert_eq!(config.wallet_a.private_key, None);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("WALLET_A_ADDRESS", A),
            ("WALLET_B_ADDRESS", B),
            ("MAX_CYCLES", "7"),
            ("MIN_REMAINING_AMOUNT", "1.25"),
            ("DELAY_BETWEEN_TRANSFERS", "10"),
            ("MAX_RETRIES", "5"),
            ("RETRY_DELAY", "0"),
            ("GAS_PRICE_GWEI", "52"),
            ("PRIVATE_KEY", "0xabc"),
        ])
        .unwrap();

        assert_eq!(config.transfer.max_cycles, 7);
        assert_eq!(config.transfer.min_remaining_amount, parse_ether("1.25").unwrap());
        assert_eq!(config.transfer.inter_transfer_delay, Duration::from_millis(10));
        assert_eq!(config.transfer.max_retries, 5);
        assert_eq!(config.transfer.retry_delay, Duration::ZERO);
        assert_eq!(config.transfer.reference_gas_price, 52_000_000_000);
        assert_eq!(config.wallet_a.private_key.as_deref(), Some("0xabc"));
        assert_eq!(config.wallet_a.key_variable, "PRIVATE_KEY");
    }

    #[test]
    fn test_wallet_a_key_takes_precedence_over_alias() {
        let config = load(&[
            ("WALLET_A_ADDRESS", A),
            ("WALLET_B_ADDRESS", B),
            ("WALLET_A_PRIVATE_KEY", "0x01"),
            ("PRIVATE_KEY", "0x02"),
        ])
        .unwrap();
        assert_eq!(config.wallet_a.private_key.as_deref(), Some("0x01"));
        assert_eq!(config.wallet_a.key_variable, "WALLET_A_PRIVATE_KEY");
        assert_eq!(config.wallet_b.key_variable, "WALLET_B_PRIVATE_KEY");
    }

    #[test]
    fn test_missing_address() {
        let err = load(&[("WALLET_A_ADDRESS", A)]).err().unwrap();
        assert_eq!(
            err.to_string(),
            "WALLET_B_ADDRESS not found in environment variables"
        );
    }

    #[test]
    fn test_invalid_number() {
        let err = load(&[
            ("WALLET_A_ADDRESS", A),
            ("WALLET_B_ADDRESS", B),
            ("MAX_CYCLES", "many"),
        ])
        .err()
        .unwrap();
        assert!(err.to_string().starts_with("MAX_CYCLES is invalid"));
    }

    #[test]
    fn test_network_without_wallets() {
        let network = NetworkConfig::from_lookup(|key| {
            (key == "CHAIN_ID").then(|| "1".to_string())
        })
        .unwrap();
        assert_eq!(network.chain_id, 1);
        assert_eq!(network.name, "Monad Testnet");
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = load(&[
            ("WALLET_A_ADDRESS", A),
            ("WALLET_B_ADDRESS", B),
            ("MAX_RETRIES", "  "),
        ])
        .unwrap();
        assert_eq!(config.transfer.max_retries, 3);
    }

    #[test]
    fn test_private_key_is_redacted() {
        let config = load(&[
            ("WALLET_A_ADDRESS", A),
            ("WALLET_B_ADDRESS", B),
            ("WALLET_B_PRIVATE_KEY", "deadbeef"),
        ])
        .unwrap();
        assert!(!format!("{config:?}").contains("deadbeef"));
    }
}

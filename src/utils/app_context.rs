//! Application context for a transfer run.
//!
//! Turns the loaded configuration into a ledger that can sign for the wallets
//! the chosen mode sends from. Every credential problem surfaces here, before
//! any transfer is attempted.

use std::str::FromStr;

use alloy::signers::local::PrivateKeySigner;
use eyre::{eyre, Error, Result};

use crate::config::{Config, WalletConfig};
use crate::ledger::{rpc, Ledger};
use crate::transfer::types::Role;

/// Configuration plus the ledger built from it
pub struct AppContext {
    /// Immutable run configuration
    pub config: Config,
    /// Signing JSON-RPC ledger
    pub ledger: Box<dyn Ledger>,
}

impl AppContext {
    /// Creates the context for a run that sends from `senders`.
    ///
    /// # Returns
    /// * `Result<Self, Error>` - The initialized context or an error
    ///
    /// # Errors
    /// * If a sender's private key is missing or malformed
    /// * If a private key does not belong to the configured address
    /// * If `RPC_URL` cannot be parsed
    pub fn new(config: Config, senders: &[Role]) -> Result<Self, Error> {
        let signers = senders
            .iter()
            .map(|role| signer_for(wallet(&config, *role), *role))
            .collect::<Result<Vec<_>>>()?;

        let ledger = rpc::connect(config.rpc_url()?, &config.network.explorer, signers)?;

        Ok(Self {
            config,
            ledger: Box::new(ledger),
        })
    }
}

/// Wallet configuration of `role`
const fn wallet(config: &Config, role: Role) -> &WalletConfig {
    match role {
        Role::A => &config.wallet_a,
        Role::B => &config.wallet_b,
    }
}

/// Parses the wallet's private key and checks it matches the configured address
fn signer_for(wallet: &WalletConfig, role: Role) -> Result<PrivateKeySigner> {
    let variable = wallet.key_variable;
    let key = wallet
        .private_key
        .as_deref()
        .ok_or_else(|| eyre!("{variable} not found in environment variables"))?;

    let signer = PrivateKeySigner::from_str(key.trim().trim_start_matches("0x"))
        .map_err(|e| eyre!("{variable} is invalid: {e}"))?;

    if signer.address() != wallet.address {
        return Err(eyre!("WALLET_{role}_ADDRESS does not match {variable}"));
    }
    Ok(signer)
}

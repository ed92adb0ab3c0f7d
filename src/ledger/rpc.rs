use alloy::{
    network::{EthereumWallet, ReceiptResponse as _, TransactionBuilder},
    primitives::{Address, U256},
    providers::{Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;
use eyre::{bail, Result};
use log::info;
use url::Url;

use super::{Ledger, Receipt, ReceiptStatus, TransferRequest};

/// Ledger talking to a node over HTTP JSON-RPC.
///
/// Transfers are signed by the alloy wallet filler with whichever registered
/// signer matches the request's `from` address.
#[derive(Debug, Clone)]
pub struct RpcLedger<P> {
    /// Provider with the wallet and nonce/chain-id fillers attached
    provider: P,
    /// Block explorer base URL, used for log links only
    explorer: String,
}

impl<P: Provider> RpcLedger<P> {
    /// Wraps an already configured provider
    pub fn new(provider: P, explorer: &str) -> Self {
        Self {
            provider,
            explorer: explorer.trim_end_matches('/').to_string(),
        }
    }

    /// Chain id and latest block number reported by the node
    ///
    /// # Errors
    /// * If either RPC call fails
    pub async fn network_status(&self) -> Result<(u64, u64)> {
        let chain_id = self.provider.get_chain_id().await?;
        let block_number = self.provider.get_block_number().await?;
        Ok((chain_id, block_number))
    }

    /// Explorer link for a transaction hash
    fn tx_link(&self, hash: impl std::fmt::Display) -> String {
        format!("{}/tx/{hash}", self.explorer)
    }
}

/// Creates an HTTP ledger able to sign for every key in `signers`.
///
/// # Errors
/// * If `signers` is empty
pub fn connect(
    rpc_url: Url,
    explorer: &str,
    signers: Vec<PrivateKeySigner>,
) -> Result<RpcLedger<impl Provider + 'static>> {
    let mut signers = signers.into_iter();
    let Some(first) = signers.next() else {
        bail!("At least one signing key is required to send transfers");
    };

    let mut wallet = EthereumWallet::from(first);
    for signer in signers {
        wallet.register_signer(signer);
    }

    let provider = ProviderBuilder::new().wallet(wallet).on_http(rpc_url);
    Ok(RpcLedger::new(provider, explorer))
}

#[async_trait]
impl<P> Ledger for RpcLedger<P>
where
    P: Provider + 'static,
{
    async fn balance(&self, account: Address) -> Result<U256> {
        Ok(self.provider.get_balance(account).await?)
    }

    async fn gas_price(&self) -> Result<u128> {
        Ok(self.provider.get_gas_price().await?)
    }

    async fn send_value(&self, request: TransferRequest) -> Result<Receipt> {
        let tx = TransactionRequest::default()
            .with_from(request.from)
            .with_to(request.to)
            .with_value(request.amount)
            .with_gas_limit(request.gas_limit)
            .with_gas_price(request.gas_price);

        let pending = self.provider.send_transaction(tx).await?;
        let hash = *pending.tx_hash();
        info!("Transaction sent! Hash: {hash}");
        info!("Explorer: {}", self.tx_link(hash));

        info!("Waiting for confirmation...");
        let receipt = pending.get_receipt().await?;

        let status = if receipt.status() {
            ReceiptStatus::Success
        } else {
            ReceiptStatus::Failed
        };

        Ok(Receipt {
            status,
            gas_used: receipt.gas_used,
            effective_gas_price: receipt.effective_gas_price,
            hash: receipt.transaction_hash,
        })
    }
}

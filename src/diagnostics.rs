//! Setup self-check.
//!
//! Verifies the environment and the RPC endpoint without touching any wallet:
//! no balance is read and no transaction is sent.

use alloy::providers::ProviderBuilder;
use eyre::Result;
use log::{error, info, warn};

use crate::config::NetworkConfig;
use crate::ledger::RpcLedger;

/// Variables every mode needs
pub const REQUIRED_VARIABLES: [&str; 4] = [
    "WALLET_A_PRIVATE_KEY",
    "WALLET_B_PRIVATE_KEY",
    "WALLET_A_ADDRESS",
    "WALLET_B_ADDRESS",
];

/// Node state observed by the check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkStatus {
    /// Chain id reported by the node
    pub chain_id: u64,
    /// Latest block number
    pub block_number: u64,
}

/// Result of the self-check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    /// Required variables that are unset or blank
    pub missing: Vec<&'static str>,
    /// Node state, `None` if the endpoint could not be reached
    pub network: Option<NetworkStatus>,
    /// Chain id the configuration expects
    pub expected_chain_id: u64,
}

impl CheckReport {
    /// Whether every required variable is set
    pub fn environment_ready(&self) -> bool {
        self.missing.is_empty()
    }

    /// Whether the node answered with the expected chain id
    pub fn network_ready(&self) -> bool {
        self.network
            .is_some_and(|status| status.chain_id == self.expected_chain_id)
    }

    /// Whether a run can be started
    pub fn is_ready(&self) -> bool {
        self.environment_ready() && self.network_ready()
    }
}

/// Required variables for which `lookup` has no non-blank value
pub fn missing_variables<F>(lookup: F) -> Vec<&'static str>
where
    F: Fn(&str) -> Option<String>,
{
    REQUIRED_VARIABLES
        .into_iter()
        .filter(|key| !lookup(key).is_some_and(|value| !value.trim().is_empty()))
        .collect()
}

/// Runs the self-check against the process environment.
///
/// An unready setup is reported, not returned as an error.
///
/// # Errors
/// * If the network section of the configuration cannot be parsed
pub async fn run_check() -> Result<CheckReport> {
    check_with(|key| std::env::var(key).ok()).await
}

/// [`run_check`] over an arbitrary key/value source
async fn check_with<F>(lookup: F) -> Result<CheckReport>
where
    F: Fn(&str) -> Option<String>,
{
    info!("Testing setup");

    let missing = missing_variables(&lookup);
    info!("Environment variables:");
    for key in REQUIRED_VARIABLES {
        if missing.contains(&key) {
            warn!("  {key}: not set");
        } else {
            info!("  {key}: set");
        }
    }

    let network = NetworkConfig::from_lookup(&lookup)?;
    info!("{} connection ({}):", network.name, network.rpc_url);
    let status = match probe(&network).await {
        Ok(status) => {
            info!("  Chain ID: {}", status.chain_id);
            info!("  Latest block: {}", status.block_number);
            if status.chain_id != network.chain_id {
                warn!(
                    "  Node reports chain ID {} but CHAIN_ID is {}",
                    status.chain_id, network.chain_id
                );
            }
            Some(status)
        }
        Err(e) => {
            error!("  Connection failed: {e}");
            None
        }
    };

    let report = CheckReport {
        missing,
        network: status,
        expected_chain_id: network.chain_id,
    };

    info!("Setup summary:");
    info!(
        "  Environment: {}",
        if report.environment_ready() { "ready" } else { "missing variables" }
    );
    info!(
        "  Network: {}",
        if report.network_ready() { "connected" } else { "failed" }
    );
    if report.is_ready() {
        info!("Setup is complete, ready to run");
    } else {
        warn!("Please fix the issues above before running a transfer");
    }
    Ok(report)
}

/// Asks the configured node for its chain id and head block
async fn probe(network: &NetworkConfig) -> Result<NetworkStatus> {
    let url = network.rpc_url.parse()?;
    let ledger = RpcLedger::new(ProviderBuilder::new().on_http(url), &network.explorer);
    let (chain_id, block_number) = ledger.network_status().await?;
    Ok(NetworkStatus {
        chain_id,
        block_number,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn report(missing: Vec<&'static str>, chain_id: Option<u64>) -> CheckReport {
        CheckReport {
            missing,
            network: chain_id.map(|chain_id| NetworkStatus {
                chain_id,
                block_number: 42,
            }),
            expected_chain_id: 10_143,
        }
    }

    #[test]
    fn test_missing_variables() {
        let missing = missing_variables(|key| match key {
            "WALLET_A_ADDRESS" => Some("0x1111111111111111111111111111111111111111".to_string()),
            "WALLET_B_ADDRESS" => Some(" ".to_string()),
            _ => None,
        });
        assert_eq!(
            missing,
            vec!["WALLET_A_PRIVATE_KEY", "WALLET_B_PRIVATE_KEY", "WALLET_B_ADDRESS"]
        );
    }

    #[test]
    fn test_nothing_missing() {
        assert!(missing_variables(|_| Some("x".to_string())).is_empty());
    }

    #[test]
    fn test_readiness() {
        assert!(report(vec![], Some(10_143)).is_ready());
        assert!(!report(vec!["WALLET_A_ADDRESS"], Some(10_143)).is_ready());
        assert!(!report(vec![], None).is_ready());

        let wrong_chain = report(vec![], Some(1));
        assert!(wrong_chain.environment_ready());
        assert!(!wrong_chain.network_ready());
    }

    #[tokio::test]
    async fn test_unreachable_node_is_reported_not_raised() {
        let report = check_with(|key| {
            (key == "RPC_URL").then(|| "http://127.0.0.1:1".to_string())
        })
        .await
        .unwrap();

        assert_eq!(report.missing.len(), REQUIRED_VARIABLES.len());
        assert_eq!(report.network, None);
        assert!(!report.is_ready());
    }

    #[tokio::test]
    async fn test_invalid_chain_id_is_an_error() {
        let result = check_with(|key| (key == "CHAIN_ID").then(|| "monad".to_string())).await;
        assert!(result.is_err());
    }
}

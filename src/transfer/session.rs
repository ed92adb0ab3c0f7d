//! Top-level run flow: pre-flight balance check, recovery detection, the
//! ping-pong loop or the single transfer, and the closing summary.

use alloy::primitives::{Address, U256};
use eyre::Result;
use log::{error, info, warn};

use super::attempt::TransferAgent;
use super::pingpong::{CycleReport, PingPong};
use super::recovery::{detect, Recovery, RecoveryReport};
use super::single::SingleTransfer;
use super::types::TransferOutcome;
use crate::config::Config;
use crate::ledger::Ledger;
use crate::utils::units::{display_amount, display_gwei};

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Pre-flight check refused to start; nothing was sent
    Refused,
    /// Funds were moved back from wallet B instead of running the loop
    Recovered(RecoveryReport),
    /// The ping-pong loop ran
    Cycled(CycleReport),
    /// Single-transfer mode ran
    Transferred(TransferOutcome),
}

/// Balances read after the run, `None` where the query failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalBalances {
    /// Wallet A
    pub a: Option<U256>,
    /// Wallet B
    pub b: Option<U256>,
}

/// Everything a session reports back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionReport {
    /// What happened
    pub outcome: SessionOutcome,
    /// Closing balances, if a summary was produced
    pub final_balances: Option<FinalBalances>,
}

impl SessionReport {
    /// A session that never started
    const fn refused() -> Self {
        Self {
            outcome: SessionOutcome::Refused,
            final_balances: None,
        }
    }
}

/// Totals shown in the closing summary
#[derive(Debug, Clone, Copy)]
struct Statistics {
    /// Ping-pong rounds, not shown for single transfers
    cycles: Option<u32>,
    /// Successful transfers
    transfers: u32,
    /// Fees paid
    fees: U256,
}

/// One run of the program against a ledger
pub struct Session<'a, L: ?Sized> {
    /// Chain access
    ledger: &'a L,
    /// Run configuration
    config: &'a Config,
}

impl<'a, L: Ledger + ?Sized> Session<'a, L> {
    /// Creates a session
    pub const fn new(ledger: &'a L, config: &'a Config) -> Self {
        Self { ledger, config }
    }

    /// Ping-pong mode.
    ///
    /// Runs the recovery transfer instead of the loop when `force_recovery` is
    /// set or when wallet A is empty while wallet B is not.
    ///
    /// # Errors
    /// * If the initial balance queries fail
    pub async fn ping_pong(&self, force_recovery: bool) -> Result<SessionReport> {
        if force_recovery {
            info!("Force Recovery Mode Enabled");
            return Ok(self.recover().await);
        }

        let accounts = self.config.accounts();
        let balance_a = self.ledger.balance(accounts.a).await?;
        let balance_b = self.ledger.balance(accounts.b).await?;
        info!("Initial Balances:");
        info!("   Wallet A: {}", self.display(balance_a));
        info!("   Wallet B: {}", self.display(balance_b));

        if balance_a.is_zero() && balance_b.is_zero() {
            error!("Both wallets have zero balance. Please fund at least one wallet first.");
            return Ok(SessionReport::refused());
        }

        if detect(balance_a, balance_b).degraded {
            info!("Recovery Mode Detected!");
            info!("   Wallet A: {} (empty)", self.display(balance_a));
            info!("   Wallet B: {} (has funds)", self.display(balance_b));
            return Ok(self.recover().await);
        }

        let report = PingPong::new(self.agent(), accounts).run().await;
        if report.stop.is_error() {
            warn!("Ping-Pong Transfer stopped on an error ({}).", report.stop);
            warn!("If funds are stuck in Wallet B, re-run to recover them.");
        } else {
            info!("Ping-Pong Transfer completed successfully! ({})", report.stop);
        }

        let final_balances = self
            .summarize(Statistics {
                cycles: Some(report.state.cycle_count),
                transfers: report.state.total_transfers,
                fees: report.state.total_fees,
            })
            .await;

        Ok(SessionReport {
            outcome: SessionOutcome::Cycled(report),
            final_balances: Some(final_balances),
        })
    }

    /// Single-transfer mode: one A→B transfer of at least the minimum amount.
    ///
    /// # Errors
    /// * If the initial balance query fails
    pub async fn single_transfer(&self) -> Result<SessionReport> {
        let accounts = self.config.accounts();
        let balance = self.ledger.balance(accounts.a).await?;
        if balance.is_zero() {
            error!("Wallet A has no balance. Please fund the wallet first.");
            return Ok(SessionReport::refused());
        }

        let outcome = SingleTransfer::new(self.agent(), accounts).run().await;
        let final_balances = match outcome.fee_paid() {
            Some(fees) => Some(
                self.summarize(Statistics {
                    cycles: None,
                    transfers: 1,
                    fees,
                })
                .await,
            ),
            None => None,
        };

        Ok(SessionReport {
            outcome: SessionOutcome::Transferred(outcome),
            final_balances,
        })
    }

    /// Runs the one-shot B→A recovery and summarizes
    async fn recover(&self) -> SessionReport {
        let report = Recovery::new(self.agent(), self.config.accounts()).run().await;
        let final_balances = self
            .summarize(Statistics {
                cycles: Some(0),
                transfers: u32::from(report.outcome.is_success()),
                fees: report.total_fees,
            })
            .await;

        SessionReport {
            outcome: SessionOutcome::Recovered(report),
            final_balances: Some(final_balances),
        }
    }

    /// Logs final balances and statistics
    async fn summarize(&self, statistics: Statistics) -> FinalBalances {
        let accounts = self.config.accounts();
        let balances = FinalBalances {
            a: self.final_balance(accounts.a).await,
            b: self.final_balance(accounts.b).await,
        };

        info!("Final Balances:");
        info!("   Wallet A: {}", self.display_optional(balances.a));
        info!("   Wallet B: {}", self.display_optional(balances.b));

        info!("Transfer Statistics:");
        if let Some(cycles) = statistics.cycles {
            info!("   Total Cycles: {cycles}");
        }
        info!("   Total Transfers: {}", statistics.transfers);
        info!("   Total Fees Used: {}", self.display(statistics.fees));
        if statistics.cycles.is_some() {
            let settings = &self.config.transfer;
            info!("   Gas Price: {}", display_gwei(settings.reference_gas_price));
            info!(
                "   Min Threshold: {}",
                self.display(settings.min_remaining_amount)
            );
        }

        balances
    }

    /// Best-effort balance read for the summary
    async fn final_balance(&self, account: Address) -> Option<U256> {
        match self.ledger.balance(account).await {
            Ok(balance) => Some(balance),
            Err(e) => {
                warn!("Failed to get balance for {account}: {e}");
                None
            }
        }
    }

    /// Transfer agent bound to this session's ledger and settings
    fn agent(&self) -> TransferAgent<'a, L> {
        TransferAgent::new(self.ledger, &self.config.transfer, self.config.network.currency.as_str())
    }

    /// Amount with currency symbol
    fn display(&self, amount: U256) -> String {
        display_amount(amount, &self.config.network.currency)
    }

    /// Amount with currency symbol, or a placeholder
    fn display_optional(&self, amount: Option<U256>) -> String {
        amount.map_or_else(|| "unavailable".to_string(), |amount| self.display(amount))
    }
}

//! Alternating A→B→A… transfer loop and the final sweep back to wallet A.

use alloy::primitives::U256;
use derive_more::Display;
use log::{info, warn};

use super::attempt::TransferAgent;
use super::fees::ViabilityPolicy;
use super::types::{Accounts, AttemptResult, FailureReason, Role, TransferOutcome};
use crate::ledger::Ledger;

/// Where the orchestrator is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum RunState {
    /// Rounds are being made
    #[display("running")]
    Running,
    /// A transfer would have moved less than the minimum remaining amount
    #[display("stopped: minimum threshold reached")]
    StoppedMinThreshold,
    /// A sender could not cover the network fee
    #[display("stopped: insufficient balance")]
    StoppedInsufficient,
    /// A transfer kept failing for another reason
    #[display("stopped: error")]
    StoppedError,
    /// Every allowed round was made
    #[display("stopped: max cycles reached")]
    StoppedMaxCycles,
    /// The final sweep has been attempted
    #[display("complete")]
    Complete,
}

impl RunState {
    /// The stopped state a failed round leads to
    pub const fn from_failure(reason: FailureReason) -> Self {
        match reason {
            FailureReason::BelowMinimum => Self::StoppedMinThreshold,
            FailureReason::InsufficientBalance => Self::StoppedInsufficient,
            FailureReason::TransactionFailed
            | FailureReason::NetworkError
            | FailureReason::MaxRetriesExceeded => Self::StoppedError,
        }
    }

    /// Whether the loop ended on an error rather than a natural stop
    pub const fn is_error(self) -> bool {
        matches!(self, Self::StoppedError)
    }
}

/// Running totals of one ping-pong run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleState {
    /// Rounds started so far
    pub cycle_count: u32,
    /// Successful round transfers
    pub total_transfers: u32,
    /// Fees paid by successful transfers, the sweep included
    pub total_fees: U256,
    /// Who sends in the next round
    pub sender: Role,
    /// Lifecycle state
    pub state: RunState,
}

impl CycleState {
    /// Initial state: running, wallet A sends first
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            total_transfers: 0,
            total_fees: U256::ZERO,
            sender: Role::A,
            state: RunState::Running,
        }
    }

    /// Books a successful round and hands the sender role to the other side
    fn record_success(&mut self, fee_paid: U256) {
        self.total_transfers += 1;
        self.total_fees += fee_paid;
        self.sender = self.sender.other();
    }
}

impl Default for CycleState {
    fn default() -> Self {
        Self::new()
    }
}

/// What happened to the final sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepResult {
    /// Wallet B was already empty
    Skipped,
    /// A transfer was attempted
    Attempted(TransferOutcome),
}

impl SweepResult {
    /// Whether wallet B ended up settled (skipped or successful sweep)
    pub const fn is_settled(&self) -> bool {
        match self {
            Self::Skipped => true,
            Self::Attempted(outcome) => outcome.is_success(),
        }
    }
}

/// Result of a ping-pong run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// Why the loop ended; never changed by the sweep
    pub stop: RunState,
    /// Final totals, with `state` set to `Complete`
    pub state: CycleState,
    /// Outcome of the sweep back to wallet A
    pub sweep: SweepResult,
}

/// Drives the alternating transfer loop.
///
/// The orchestrator owns its [`CycleState`] for the duration of [`PingPong::run`]
/// and hands it back in the report. Rounds run strictly one after another:
/// every round re-reads the sender's balance, so two transfers in flight would
/// race on stale balances.
pub struct PingPong<'a, L: ?Sized> {
    /// Sends the individual transfers
    agent: TransferAgent<'a, L>,
    /// Wallets A and B
    accounts: Accounts,
}

impl<'a, L: Ledger + ?Sized> PingPong<'a, L> {
    /// Creates an orchestrator
    pub const fn new(agent: TransferAgent<'a, L>, accounts: Accounts) -> Self {
        Self { agent, accounts }
    }

    /// Runs rounds until a stop condition fires, then sweeps wallet B into A
    pub async fn run(&self) -> CycleReport {
        let settings = self.agent.settings();
        let max_cycles = settings.max_cycles;
        let mut state = CycleState::new();

        info!("Starting Ping-Pong Transfer Process");

        while state.cycle_count < max_cycles {
            state.cycle_count += 1;
            let from = self.accounts.address(state.sender);
            let to = self.accounts.address(state.sender.other());

            info!("CYCLE {}/{max_cycles}", state.cycle_count);
            info!("Transferring from {from} to {to}");

            let label = format!("Cycle {} Transfer", state.cycle_count);
            let outcome = self
                .agent
                .transfer_with_retry(&label, from, to, ViabilityPolicy::Drain)
                .await;

            match outcome.result {
                AttemptResult::Success { fee_paid, .. } => {
                    state.record_success(fee_paid);
                    info!("Running total fees: {}", self.agent.display(state.total_fees));
                }
                AttemptResult::Failure { reason } => {
                    state.state = RunState::from_failure(reason);
                    match state.state {
                        RunState::StoppedMinThreshold => {
                            info!("Minimum threshold reached. Stopping ping-pong transfers.");
                        }
                        RunState::StoppedInsufficient => {
                            info!("Insufficient balance for gas fees. Stopping ping-pong transfers.");
                        }
                        _ => warn!("Transfer failed: {reason}. Stopping ping-pong transfers."),
                    }
                    break;
                }
            }

            if state.cycle_count < max_cycles {
                info!(
                    "Waiting {}s before next transfer...",
                    settings.inter_transfer_delay.as_secs_f64()
                );
                tokio::time::sleep(settings.inter_transfer_delay).await;
            }
        }

        if state.state == RunState::Running {
            info!("Reached {max_cycles} cycles");
            state.state = RunState::StoppedMaxCycles;
        }

        let stop = state.state;
        let sweep = self.sweep(&mut state).await;
        state.state = RunState::Complete;

        CycleReport { stop, state, sweep }
    }

    /// Moves whatever wallet B holds back to wallet A
    async fn sweep(&self, state: &mut CycleState) -> SweepResult {
        info!("Performing final transfer - moving all funds back to Wallet A");

        match self.agent.ledger().balance(self.accounts.b).await {
            Ok(balance) if balance.is_zero() => {
                info!("Wallet B already has zero balance");
                return SweepResult::Skipped;
            }
            Ok(_) => {}
            Err(e) => warn!("Failed to get Wallet B balance before sweep: {e}"),
        }

        let outcome = self
            .agent
            .transfer_with_retry(
                "Final Transfer",
                self.accounts.b,
                self.accounts.a,
                ViabilityPolicy::Drain,
            )
            .await;

        match outcome.result {
            AttemptResult::Success { fee_paid, .. } => {
                state.total_fees += fee_paid;
                info!("Final transfer completed successfully!");
            }
            AttemptResult::Failure { reason } => warn!("Final transfer failed: {reason}"),
        }
        SweepResult::Attempted(outcome)
    }
}

/*!
 * # Pingpong - Fee-Aware Native Token Transfers
 *
 * Pingpong moves the native balance of an EVM chain back and forth between two
 * wallets. Every transfer sends the sender's whole balance minus the gas fee,
 * so the funds bounce between the wallets until what is left is no longer
 * worth moving.
 *
 * ## Core Features
 *
 * - **Ping-Pong Cycles**: Alternating A→B / B→A drain transfers with a final sweep back to A
 * - **Fee Awareness**: Each amount is computed from a fresh balance and gas price
 * - **Retries**: Every transfer is retried a bounded number of times
 * - **Recovery**: Funds left on wallet B are detected and moved back to A
 * - **Single Transfer**: One A→B transfer subject to a minimum amount
 *
 * ## Module Structure
 *
 * - `config`: Configuration loaded from the environment
 * - `diagnostics`: Setup self-check
 * - `ledger`: Chain access through JSON-RPC
 * - `transfer`: Transfer orchestration engine
 * - `utils`: Utility functions and helpers
 */

/// Configuration loaded from the environment
pub mod config;
/// Setup self-check
pub mod diagnostics;
/// Chain access through JSON-RPC
pub mod ledger;
/// Transfer orchestration engine
pub mod transfer;
/// Utility functions and helpers
pub mod utils;

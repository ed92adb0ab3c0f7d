//! # Transfer Module
//!
//! The transfer orchestration engine: fee-aware amount calculation, the retry
//! executor around a single transfer attempt, the alternating ping-pong loop,
//! and detection of funds left on the wrong wallet.

/// A single transfer attempt
pub mod attempt;
/// Fee-aware amount calculation
pub mod fees;
/// Ping-pong cycle orchestration
pub mod pingpong;
/// Recovery detection and transfer
pub mod recovery;
/// Retry executor
pub mod retry;
/// Run flow and closing summary
pub mod session;
/// Single-transfer mode
pub mod single;
/// Test helpers and utilities
#[cfg(test)]
mod test_helpers;
/// Common type definitions
pub mod types;

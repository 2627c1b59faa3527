//! Transfer Lifecycle State Definitions

use std::fmt;

use serde::{Deserialize, Serialize};

/// Transfer lifecycle status
///
/// ```text
/// PENDING ──execute──▶ EXECUTED
///    │
///    └────cancel────▶ CANCELLED
/// ```
///
/// Terminal states: EXECUTED, CANCELLED. No transition leaves a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferStatus {
    /// Collecting approvals; may be approved, executed or cancelled
    Pending,

    /// Terminal: assets moved to the recipient
    Executed,

    /// Terminal: withdrawn without moving assets
    Cancelled,
}

impl TransferStatus {
    /// Check if this is a terminal state (no more transitions possible)
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferStatus::Executed | TransferStatus::Cancelled)
    }

    /// Get human-readable status name
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Pending => "PENDING",
            TransferStatus::Executed => "EXECUTED",
            TransferStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

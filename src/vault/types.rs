//! Vault Core Types
//!
//! Type definitions for the transfer lifecycle.

use std::fmt;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use super::state::TransferStatus;
use crate::core_types::{Address, Amount, TransferId};

/// What a transfer moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "token", rename_all = "snake_case")]
pub enum AssetKind {
    /// The chain's native currency
    Native,
    /// A fungible token identified by its contract address
    Token(Address),
}

impl AssetKind {
    #[inline]
    pub fn is_native(&self) -> bool {
        matches!(self, AssetKind::Native)
    }

    /// Token contract address, if any
    pub fn token(&self) -> Option<Address> {
        match self {
            AssetKind::Native => None,
            AssetKind::Token(addr) => Some(*addr),
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Native => write!(f, "NATIVE"),
            AssetKind::Token(addr) => write!(f, "TOKEN({})", addr),
        }
    }
}

/// Outcome of one asset movement attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Assets reached the recipient
    Success,
    /// Explicit failure, nothing moved (safe to roll back)
    Failed(String),
}

impl MoveOutcome {
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, MoveOutcome::Success)
    }

    #[inline]
    pub fn is_explicit_fail(&self) -> bool {
        matches!(self, MoveOutcome::Failed(_))
    }
}

/// A transfer request tracked by the ledger
///
/// Mutated only through [`TransferStateMachine`](super::machine::TransferStateMachine),
/// which keeps `approval_count == approved_by.len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    pub(super) id: TransferId,
    pub(super) asset: AssetKind,
    pub(super) recipient: Address,
    pub(super) amount: Amount,
    pub(super) initiator: Address,
    pub(super) approved_by: FxHashSet<Address>,
    pub(super) approval_count: u32,
    pub(super) status: TransferStatus,
    /// Created timestamp (millis)
    pub(super) created_at: i64,
    /// Last updated timestamp (millis)
    pub(super) updated_at: i64,
}

impl TransferRecord {
    pub fn id(&self) -> TransferId {
        self.id
    }

    pub fn asset(&self) -> AssetKind {
        self.asset
    }

    pub fn recipient(&self) -> Address {
        self.recipient
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn initiator(&self) -> Address {
        self.initiator
    }

    pub fn approval_count(&self) -> u32 {
        self.approval_count
    }

    pub fn status(&self) -> TransferStatus {
        self.status
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn updated_at(&self) -> i64 {
        self.updated_at
    }

    pub fn has_approved(&self, who: &Address) -> bool {
        self.approved_by.contains(who)
    }

    /// Approvers of this transfer, sorted
    pub fn approvals(&self) -> Vec<Address> {
        let mut approvals: Vec<Address> = self.approved_by.iter().copied().collect();
        approvals.sort_unstable();
        approvals
    }
}

impl fmt::Display for TransferRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transfer[{}] {} amount={} -> {} approvals={} status={}",
            self.id, self.asset, self.amount, self.recipient, self.approval_count, self.status
        )
    }
}

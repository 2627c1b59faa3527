//! Transfer State Machine
//!
//! Legal lifecycle transitions of a single transfer record. Authorization
//! against the registry is the caller's job; everything here is local to
//! one record.
//!
//! # Transitions
//!
//! ```text
//! open ──▶ PENDING ──approve──▶ PENDING
//!             │
//!             ├──begin_execution──▶ EXECUTED ──abort_execution──▶ PENDING
//!             │                                (explicit failure only)
//!             └──cancel──▶ CANCELLED
//! ```

use rustc_hash::FxHashSet;

use super::error::VaultError;
use super::state::TransferStatus;
use super::types::{AssetKind, TransferRecord};
use crate::core_types::{Address, Amount, TransferId};

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub struct TransferStateMachine;

impl TransferStateMachine {
    /// Parameter checks for a new transfer
    pub fn validate_request(
        asset: &AssetKind,
        recipient: &Address,
        amount: Amount,
    ) -> Result<(), VaultError> {
        if recipient.is_zero() {
            return Err(VaultError::InvalidRecipient);
        }
        if let AssetKind::Token(token) = asset
            && token.is_zero()
        {
            return Err(VaultError::InvalidAsset);
        }
        if amount == 0 {
            return Err(VaultError::InvalidAmount);
        }
        Ok(())
    }

    /// Build a fresh PENDING record carrying the initiator's approval
    pub fn open(
        id: TransferId,
        initiator: Address,
        asset: AssetKind,
        recipient: Address,
        amount: Amount,
    ) -> TransferRecord {
        let mut approved_by = FxHashSet::default();
        approved_by.insert(initiator);
        let now = now_millis();

        TransferRecord {
            id,
            asset,
            recipient,
            amount,
            initiator,
            approved_by,
            approval_count: 1,
            status: TransferStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Fail with the matching "already X" error unless PENDING
    pub fn ensure_pending(record: &TransferRecord) -> Result<(), VaultError> {
        match record.status {
            TransferStatus::Pending => Ok(()),
            TransferStatus::Executed => Err(VaultError::AlreadyExecuted(record.id)),
            TransferStatus::Cancelled => Err(VaultError::AlreadyCancelled(record.id)),
        }
    }

    /// Record one approval
    pub fn approve(record: &mut TransferRecord, approver: Address) -> Result<(), VaultError> {
        Self::ensure_pending(record)?;
        if record.approved_by.contains(&approver) {
            return Err(VaultError::DuplicateApproval(approver));
        }

        record.approved_by.insert(approver);
        record.approval_count += 1;
        record.updated_at = now_millis();
        debug_assert_eq!(record.approval_count as usize, record.approved_by.len());
        Ok(())
    }

    /// Status and quorum gate for execution (no mutation)
    pub fn check_executable(record: &TransferRecord, quorum: u32) -> Result<(), VaultError> {
        Self::ensure_pending(record)?;
        if record.approval_count < quorum {
            return Err(VaultError::QuorumNotReached {
                id: record.id,
                approvals: record.approval_count,
                quorum,
            });
        }
        Ok(())
    }

    /// Flip to EXECUTED before the asset movement is attempted
    ///
    /// Returns the pre-flip record so an explicit failure can restore it
    /// exactly. While flipped, any re-entrant call sees EXECUTED.
    pub fn begin_execution(record: &mut TransferRecord) -> TransferRecord {
        let snapshot = record.clone();
        record.status = TransferStatus::Executed;
        record.updated_at = now_millis();
        snapshot
    }

    /// Undo `begin_execution` after an explicit movement failure
    ///
    /// Only an EXECUTED record with the same id is restored; returns whether
    /// the restore happened.
    pub fn abort_execution(record: &mut TransferRecord, snapshot: TransferRecord) -> bool {
        if record.id != snapshot.id || record.status != TransferStatus::Executed {
            return false;
        }
        *record = snapshot;
        true
    }

    /// PENDING -> CANCELLED (no quorum needed)
    pub fn cancel(record: &mut TransferRecord) -> Result<(), VaultError> {
        Self::ensure_pending(record)?;
        record.status = TransferStatus::Cancelled;
        record.updated_at = now_millis();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u64) -> Address {
        Address::from_low_u64(n)
    }

    fn pending() -> TransferRecord {
        TransferStateMachine::open(0, addr(1), AssetKind::Native, addr(9), 100)
    }

    #[test]
    fn test_validate_request() {
        let ok = TransferStateMachine::validate_request(&AssetKind::Native, &addr(9), 1);
        assert!(ok.is_ok());

        assert_eq!(
            TransferStateMachine::validate_request(&AssetKind::Native, &Address::ZERO, 1),
            Err(VaultError::InvalidRecipient)
        );
        assert_eq!(
            TransferStateMachine::validate_request(&AssetKind::Token(Address::ZERO), &addr(9), 1),
            Err(VaultError::InvalidAsset)
        );
        assert_eq!(
            TransferStateMachine::validate_request(&AssetKind::Native, &addr(9), 0),
            Err(VaultError::InvalidAmount)
        );
    }

    #[test]
    fn test_open_counts_initiator() {
        let record = pending();
        assert_eq!(record.status(), TransferStatus::Pending);
        assert_eq!(record.approval_count(), 1);
        assert!(record.has_approved(&addr(1)));
        assert_eq!(record.initiator(), addr(1));
    }

    #[test]
    fn test_approve_and_duplicate() {
        let mut record = pending();
        TransferStateMachine::approve(&mut record, addr(2)).unwrap();
        assert_eq!(record.approval_count(), 2);

        assert_eq!(
            TransferStateMachine::approve(&mut record, addr(2)),
            Err(VaultError::DuplicateApproval(addr(2)))
        );
        assert_eq!(
            TransferStateMachine::approve(&mut record, addr(1)),
            Err(VaultError::DuplicateApproval(addr(1)))
        );
        assert_eq!(record.approval_count(), 2);
        assert_eq!(record.approvals(), vec![addr(1), addr(2)]);
    }

    #[test]
    fn test_check_executable() {
        let mut record = pending();
        assert_eq!(
            TransferStateMachine::check_executable(&record, 2),
            Err(VaultError::QuorumNotReached {
                id: 0,
                approvals: 1,
                quorum: 2
            })
        );
        TransferStateMachine::approve(&mut record, addr(2)).unwrap();
        assert!(TransferStateMachine::check_executable(&record, 2).is_ok());
    }

    #[test]
    fn test_terminal_states_are_frozen() {
        let mut executed = pending();
        TransferStateMachine::begin_execution(&mut executed);
        assert_eq!(
            TransferStateMachine::approve(&mut executed, addr(2)),
            Err(VaultError::AlreadyExecuted(0))
        );
        assert_eq!(
            TransferStateMachine::cancel(&mut executed),
            Err(VaultError::AlreadyExecuted(0))
        );
        assert_eq!(
            TransferStateMachine::check_executable(&executed, 1),
            Err(VaultError::AlreadyExecuted(0))
        );

        let mut cancelled = pending();
        TransferStateMachine::cancel(&mut cancelled).unwrap();
        assert_eq!(
            TransferStateMachine::approve(&mut cancelled, addr(2)),
            Err(VaultError::AlreadyCancelled(0))
        );
        assert_eq!(
            TransferStateMachine::cancel(&mut cancelled),
            Err(VaultError::AlreadyCancelled(0))
        );
    }

    #[test]
    fn test_abort_execution_requires_executed() {
        let mut record = pending();
        let snapshot = record.clone();
        TransferStateMachine::cancel(&mut record).unwrap();

        assert!(!TransferStateMachine::abort_execution(&mut record, snapshot));
        assert_eq!(record.status(), TransferStatus::Cancelled);
    }

    #[test]
    fn test_abort_execution_restores_snapshot() {
        let mut record = pending();
        TransferStateMachine::approve(&mut record, addr(2)).unwrap();
        let before = record.clone();

        let snapshot = TransferStateMachine::begin_execution(&mut record);
        assert_eq!(record.status(), TransferStatus::Executed);

        assert!(TransferStateMachine::abort_execution(&mut record, snapshot));
        assert_eq!(record, before);
    }
}

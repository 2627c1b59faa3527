//! Approver Registry
//!
//! The set of identities allowed to drive transfers, plus the quorum
//! threshold. Validation happens on a candidate before anything is swapped,
//! so a rejected configuration leaves the registry untouched.

use rustc_hash::FxHashSet;

use super::error::VaultError;
use crate::core_types::Address;

/// Approver set and quorum
///
/// # Invariants
/// - `approvers` is non-empty
/// - `1 <= quorum <= approvers.len()`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApproverRegistry {
    approvers: FxHashSet<Address>,
    quorum: u32,
}

impl ApproverRegistry {
    /// Install an approver set and quorum
    ///
    /// Duplicate addresses collapse into one; the quorum is checked against
    /// the number of unique approvers.
    pub fn new(
        approvers: impl IntoIterator<Item = Address>,
        quorum: u32,
    ) -> Result<Self, VaultError> {
        let approvers: FxHashSet<Address> = approvers.into_iter().collect();
        Self::validate(&approvers, quorum)?;
        Ok(Self { approvers, quorum })
    }

    fn validate(approvers: &FxHashSet<Address>, quorum: u32) -> Result<(), VaultError> {
        if approvers.is_empty() {
            return Err(VaultError::EmptyApproverSet);
        }
        if quorum == 0 {
            return Err(VaultError::QuorumZero);
        }
        if quorum as usize > approvers.len() {
            return Err(VaultError::QuorumExceedsApproverCount {
                quorum,
                approvers: approvers.len(),
            });
        }
        Ok(())
    }

    /// Swap the whole approver set and quorum at once
    ///
    /// On error neither value changes.
    pub fn replace(
        &mut self,
        approvers: impl IntoIterator<Item = Address>,
        quorum: u32,
    ) -> Result<(), VaultError> {
        *self = Self::new(approvers, quorum)?;
        Ok(())
    }

    #[inline]
    pub fn is_approver(&self, who: &Address) -> bool {
        self.approvers.contains(who)
    }

    #[inline]
    pub fn quorum(&self) -> u32 {
        self.quorum
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.approvers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.approvers.is_empty()
    }

    /// Approvers, sorted
    pub fn approvers(&self) -> Vec<Address> {
        let mut list: Vec<Address> = self.approvers.iter().copied().collect();
        list.sort_unstable();
        list
    }
}

//! Transfer Ledger
//!
//! Append-only arena of transfer records indexed by id. Ids are handed out
//! from 0 in strictly increasing order and are never reused; records are
//! never removed.

use super::error::VaultError;
use super::types::TransferRecord;
use crate::core_types::TransferId;

#[derive(Debug, Default)]
pub struct TransferLedger {
    transfers: Vec<TransferRecord>,
}

impl TransferLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next allocation will receive
    #[inline]
    pub fn next_id(&self) -> TransferId {
        self.transfers.len() as TransferId
    }

    /// Number of transfers ever created
    #[inline]
    pub fn count(&self) -> u64 {
        self.transfers.len() as u64
    }

    /// Allocate the next id and store the record built for it
    pub fn allocate(&mut self, build: impl FnOnce(TransferId) -> TransferRecord) -> TransferId {
        let id = self.next_id();
        let record = build(id);
        debug_assert_eq!(record.id(), id);
        self.transfers.push(record);
        id
    }

    /// Read a record; never-allocated ids are an error, not a default record
    pub fn get(&self, id: TransferId) -> Result<&TransferRecord, VaultError> {
        usize::try_from(id)
            .ok()
            .and_then(|idx| self.transfers.get(idx))
            .ok_or(VaultError::UnknownTransfer(id))
    }

    pub(super) fn get_mut(&mut self, id: TransferId) -> Result<&mut TransferRecord, VaultError> {
        usize::try_from(id)
            .ok()
            .and_then(|idx| self.transfers.get_mut(idx))
            .ok_or(VaultError::UnknownTransfer(id))
    }

    /// Overwrite an existing record
    pub(super) fn put(&mut self, record: TransferRecord) -> Result<(), VaultError> {
        let slot = self.get_mut(record.id())?;
        *slot = record;
        Ok(())
    }
}

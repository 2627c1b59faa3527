/// ENFORCED BALANCE TYPE - Used by the custody adapters
///
/// Every balance the vault's custody layer tracks (the vault's own holdings
/// and each recipient's holdings) goes through these methods.
///
/// # Enforcement Strategy:
/// 1. Fields are PRIVATE - no direct access
/// 2. All mutations return Result - errors are explicit
/// 3. Version auto-increments - audit trail
/// 4. checked_add/sub - overflow protection
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core_types::Amount;

/// Balance mutation errors
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BalanceError {
    #[error("Insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds { available: Amount, requested: Amount },

    #[error("Balance overflow")]
    Overflow,
}

/// Balance for a single asset held by a single party
///
/// # Invariants (ENFORCED by private fields):
/// - Never negative, never overflows (checked arithmetic)
/// - `version` increments on every successful mutation
/// - A failed mutation leaves the balance untouched
///
/// # Usage:
/// ```ignore
/// let mut balance = Balance::default();
/// balance.credit(1000)?;   // available = 1000, version = 1
/// balance.debit(400)?;     // available = 600,  version = 2
/// ```
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Balance {
    available: Amount,
    version: u64,
}

impl Balance {
    /// Get available balance (read-only)
    #[inline(always)]
    pub const fn available(&self) -> Amount {
        self.available
    }

    /// Number of successful mutations so far
    #[inline(always)]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Increase the balance
    ///
    /// # Errors
    /// - `Overflow` if the result does not fit
    pub fn credit(&mut self, amount: Amount) -> Result<(), BalanceError> {
        self.available = self
            .available
            .checked_add(amount)
            .ok_or(BalanceError::Overflow)?;
        self.version = self.version.wrapping_add(1);
        Ok(())
    }

    /// Decrease the balance
    ///
    /// # Errors
    /// - `InsufficientFunds` if available < amount
    pub fn debit(&mut self, amount: Amount) -> Result<(), BalanceError> {
        self.available =
            self.available
                .checked_sub(amount)
                .ok_or(BalanceError::InsufficientFunds {
                    available: self.available,
                    requested: amount,
                })?;
        self.version = self.version.wrapping_add(1);
        Ok(())
    }

    /// Atomic: debit `self`, credit `to`. Either both apply or neither does.
    pub fn transfer_to(&mut self, to: &mut Balance, amount: Amount) -> Result<(), BalanceError> {
        // Validate first
        if self.available < amount {
            return Err(BalanceError::InsufficientFunds {
                available: self.available,
                requested: amount,
            });
        }
        to.available
            .checked_add(amount)
            .ok_or(BalanceError::Overflow)?;

        self.debit(amount)?;
        to.credit(amount)
    }
}

// ============================================================
// TESTS - Prove enforcement works
// ============================================================

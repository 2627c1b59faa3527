//! Asset Movers
//!
//! Adapters that actually move value out of custody. The vault calls
//! [`AssetMover::send`] exactly once per `execute` and never retries; the
//! call may run untrusted recipient code that re-enters the vault.

pub mod native;
pub mod token;

pub use native::NativeCustody;
pub use token::TokenCustody;

use std::sync::{Arc, Mutex};

use rustc_hash::FxHashMap;

use super::lock;
use super::types::{AssetKind, MoveOutcome};
use crate::core_types::{Address, Amount};

/// Custody capability required by the vault
pub trait AssetMover: Send + Sync {
    /// Get adapter name for logging
    fn name(&self) -> &'static str;

    /// Current custody balance of `asset`
    fn balance_of(&self, asset: &AssetKind) -> Amount;

    /// Credit native currency sent to the vault
    fn deposit(&self, sender: Address, amount: Amount) -> MoveOutcome;

    /// Move `amount` of `asset` from custody to `recipient`
    ///
    /// `Failed` means nothing moved.
    fn send(&self, asset: &AssetKind, recipient: Address, amount: Amount) -> MoveOutcome;
}

/// Code that runs on the recipient's side during a send
///
/// Returning `false` refuses the funds and fails the send.
pub trait ReceiveHook: Send + Sync {
    fn on_receive(&self, asset: &AssetKind, amount: Amount) -> bool;
}

impl<F> ReceiveHook for F
where
    F: Fn(&AssetKind, Amount) -> bool + Send + Sync,
{
    fn on_receive(&self, asset: &AssetKind, amount: Amount) -> bool {
        self(asset, amount)
    }
}

/// Per-recipient receive hooks
#[derive(Default)]
pub(crate) struct HookTable {
    hooks: Mutex<FxHashMap<Address, Arc<dyn ReceiveHook>>>,
}

impl HookTable {
    pub(crate) fn set(&self, recipient: Address, hook: Arc<dyn ReceiveHook>) {
        lock(&self.hooks).insert(recipient, hook);
    }

    pub(crate) fn clear(&self, recipient: &Address) {
        lock(&self.hooks).remove(recipient);
    }

    /// Run the recipient's hook (if any) with no lock held
    pub(crate) fn accepts(&self, recipient: &Address, asset: &AssetKind, amount: Amount) -> bool {
        let hook = lock(&self.hooks).get(recipient).cloned();
        match hook {
            Some(hook) => hook.on_receive(asset, amount),
            None => true,
        }
    }
}


#[cfg(test)]
pub use mock::MockMover;

//! Native Currency Custody
//!
//! In-memory native balance of the vault and of every recipient it paid.
//! A send is a direct value transfer; the recipient's receive hook runs
//! before the balances move and may refuse the funds.

use std::sync::{Arc, Mutex};

use rustc_hash::FxHashMap;
use tracing::debug;

use super::{AssetMover, HookTable, ReceiveHook};
use crate::balance::{Balance, BalanceError};
use crate::core_types::{Address, Amount};
use crate::vault::lock;
use crate::vault::types::{AssetKind, MoveOutcome};

#[derive(Default)]
struct NativeState {
    custody: Balance,
    holders: FxHashMap<Address, Balance>,
}

#[derive(Default)]
pub struct NativeCustody {
    state: Mutex<NativeState>,
    hooks: HookTable,
}

impl NativeCustody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Custody pre-funded with `amount`
    pub fn with_balance(amount: Amount) -> Result<Self, BalanceError> {
        let custody = Self::new();
        lock(&custody.state).custody.credit(amount)?;
        Ok(custody)
    }

    /// Native balance the vault has paid out to `holder`
    pub fn holder_balance(&self, holder: &Address) -> Amount {
        lock(&self.state)
            .holders
            .get(holder)
            .map(Balance::available)
            .unwrap_or(0)
    }

    /// Install code that runs whenever `recipient` is paid
    pub fn set_receive_hook(&self, recipient: Address, hook: Arc<dyn ReceiveHook>) {
        self.hooks.set(recipient, hook);
    }

    pub fn clear_receive_hook(&self, recipient: &Address) {
        self.hooks.clear(recipient);
    }
}

impl AssetMover for NativeCustody {
    fn name(&self) -> &'static str {
        "native"
    }

    fn balance_of(&self, asset: &AssetKind) -> Amount {
        match asset {
            AssetKind::Native => lock(&self.state).custody.available(),
            AssetKind::Token(_) => 0,
        }
    }

    fn deposit(&self, sender: Address, amount: Amount) -> MoveOutcome {
        match lock(&self.state).custody.credit(amount) {
            Ok(()) => {
                debug!(sender = %sender, amount, "Native deposit credited");
                MoveOutcome::Success
            }
            Err(e) => MoveOutcome::Failed(e.to_string()),
        }
    }

    fn send(&self, asset: &AssetKind, recipient: Address, amount: Amount) -> MoveOutcome {
        if !asset.is_native() {
            return MoveOutcome::Failed(format!("native custody cannot move {}", asset));
        }

        let available = lock(&self.state).custody.available();
        if available < amount {
            return MoveOutcome::Failed(format!(
                "custody holds {}, send needs {}",
                available, amount
            ));
        }

        // Recipient code runs here and may re-enter the vault
        if !self.hooks.accepts(&recipient, asset, amount) {
            return MoveOutcome::Failed(format!("recipient {} refused funds", recipient));
        }

        // Re-entrant sends may have drained custody while the hook ran
        let mut state = lock(&self.state);
        let NativeState { custody, holders } = &mut *state;
        let holder = holders.entry(recipient).or_default();
        match custody.transfer_to(holder, amount) {
            Ok(()) => {
                debug!(recipient = %recipient, amount, "Native send completed");
                MoveOutcome::Success
            }
            Err(e) => MoveOutcome::Failed(e.to_string()),
        }
    }
}

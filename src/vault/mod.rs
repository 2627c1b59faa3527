//! Quorum Vault
//!
//! Multi-approver custody: assets leave only after a quorum of approvers has
//! signed off on a specific transfer request.
//!
//! # State Machine
//!
//! ```text
//! initiate → PENDING ──approve*──▶ PENDING ──execute──▶ EXECUTED
//!                │
//!                └──────cancel──────▶ CANCELLED
//! ```
//!
//! # Safety Invariants
//!
//! 1. **Persist-Before-Call**: The EXECUTED flip happens before the asset movement
//! 2. **Explicit Fail Rule**: Only an explicit movement failure or an aborted
//!    (panicking) movement rolls the flip back
//! 3. **All-or-Nothing**: A failed operation mutates nothing and emits nothing
//! 4. **Frozen Terminals**: EXECUTED and CANCELLED records never change again

use std::sync::{Mutex, MutexGuard, PoisonError};

pub mod adapters;
pub mod engine;
pub mod error;
pub mod events;
pub mod ledger;
pub mod machine;
pub mod policy;
pub mod registry;
pub mod state;
pub mod types;

mod integration_tests;

// Re-exports for convenience
pub use adapters::{AssetMover, NativeCustody, ReceiveHook, TokenCustody};
pub use engine::Vault;
pub use error::{ErrorKind, VaultError};
pub use events::{EventLog, EventSink, JournalEntry, JournalSink, VaultEvent};
pub use ledger::TransferLedger;
pub use machine::TransferStateMachine;
pub use policy::{VaultPolicy, VaultProfile};
pub use registry::ApproverRegistry;
pub use state::TransferStatus;
pub use types::{AssetKind, MoveOutcome, TransferRecord};

/// Lock a mutex, recovering the data if a previous holder panicked
///
/// Every mutation validates before it writes, so a panic cannot leave a
/// half-applied change behind.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

//! Quorum Vault - multi-approver custody engine
//!
//! Assets (native currency or fungible tokens) leave custody only after a
//! configurable quorum of designated approvers has signed off on a specific
//! transfer request.
//!
//! # Modules
//!
//! - [`core_types`] - Core type definitions (Address, TransferId, Amount)
//! - [`balance`] - Enforced balance type used by custody adapters
//! - [`config`] - YAML application configuration
//! - [`logging`] - Tracing subscriber bootstrap
//! - [`vault`] - Registry, ledger, state machine, adapters and the engine

// Core types - must be first!
pub mod core_types;

pub mod balance;
pub mod config;
pub mod logging;
pub mod vault;

// Convenient re-exports at crate root
pub use balance::{Balance, BalanceError};
pub use config::{AppConfig, VaultConfig};
pub use core_types::{Address, Amount, TransferId};
pub use vault::{
    ApproverRegistry, AssetKind, AssetMover, ErrorKind, NativeCustody, TokenCustody,
    TransferRecord, TransferStatus, Vault, VaultError, VaultEvent, VaultPolicy, VaultProfile,
};

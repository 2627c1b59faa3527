//! Vault Error Types
//!
//! Every failed operation aborts with zero state mutation and returns one of these.

use thiserror::Error;

use crate::core_types::{Address, Amount, TransferId};

/// Error category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller is not a current approver
    Authorization,
    /// Malformed request parameters or registry configuration
    Validation,
    /// Transfer is in the wrong lifecycle state for the operation
    StateConflict,
    /// Custody cannot cover the request
    Resource,
    /// The asset movement itself reported failure
    External,
}

/// Vault error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VaultError {
    // === Authorization Errors ===
    #[error("Caller is not an approver: {0}")]
    NotAnApprover(Address),

    // === Validation Errors ===
    #[error("Recipient must not be the zero address")]
    InvalidRecipient,

    #[error("Token address must not be the zero address")]
    InvalidAsset,

    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("Vault holds no native balance")]
    EmptyVault,

    #[error("Approver set must not be empty")]
    EmptyApproverSet,

    #[error("Quorum must be greater than zero")]
    QuorumZero,

    #[error("Quorum {quorum} exceeds approver count {approvers}")]
    QuorumExceedsApproverCount { quorum: u32, approvers: usize },

    #[error("Operation disabled for this vault profile: {0}")]
    OperationDisabled(&'static str),

    // === State Conflict Errors ===
    #[error("Transfer not found: {0}")]
    UnknownTransfer(TransferId),

    #[error("Transfer {0} already executed")]
    AlreadyExecuted(TransferId),

    #[error("Transfer {0} already cancelled")]
    AlreadyCancelled(TransferId),

    #[error("Approver {0} already approved this transfer")]
    DuplicateApproval(Address),

    #[error("Transfer {id} has {approvals} approvals, quorum is {quorum}")]
    QuorumNotReached {
        id: TransferId,
        approvals: u32,
        quorum: u32,
    },

    // === Resource Errors ===
    #[error("Insufficient balance: custody holds {balance}, transfer needs {amount}")]
    InsufficientBalance { balance: Amount, amount: Amount },

    #[error("Deposit would overflow custody balance")]
    CustodyOverflow,

    // === External Call Errors ===
    #[error("Transfer {id} execution failed: {reason}")]
    TransferExecutionFailed { id: TransferId, reason: String },

    #[error("Deposit rejected by custody: {0}")]
    DepositRejected(String),
}

impl VaultError {
    /// Stable error code for logs and API responses
    pub fn code(&self) -> &'static str {
        match self {
            VaultError::NotAnApprover(_) => "NOT_AN_APPROVER",
            VaultError::InvalidRecipient => "INVALID_RECIPIENT",
            VaultError::InvalidAsset => "INVALID_ASSET",
            VaultError::InvalidAmount => "INVALID_AMOUNT",
            VaultError::EmptyVault => "EMPTY_VAULT",
            VaultError::EmptyApproverSet => "EMPTY_APPROVER_SET",
            VaultError::QuorumZero => "QUORUM_ZERO",
            VaultError::QuorumExceedsApproverCount { .. } => "QUORUM_EXCEEDS_APPROVER_COUNT",
            VaultError::OperationDisabled(_) => "OPERATION_DISABLED",
            VaultError::UnknownTransfer(_) => "UNKNOWN_TRANSFER",
            VaultError::AlreadyExecuted(_) => "ALREADY_EXECUTED",
            VaultError::AlreadyCancelled(_) => "ALREADY_CANCELLED",
            VaultError::DuplicateApproval(_) => "DUPLICATE_APPROVAL",
            VaultError::QuorumNotReached { .. } => "QUORUM_NOT_REACHED",
            VaultError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            VaultError::CustodyOverflow => "CUSTODY_OVERFLOW",
            VaultError::TransferExecutionFailed { .. } => "TRANSFER_EXECUTION_FAILED",
            VaultError::DepositRejected(_) => "DEPOSIT_REJECTED",
        }
    }

    /// Error category
    pub fn kind(&self) -> ErrorKind {
        match self {
            VaultError::NotAnApprover(_) => ErrorKind::Authorization,
            VaultError::InvalidRecipient
            | VaultError::InvalidAsset
            | VaultError::InvalidAmount
            | VaultError::EmptyVault
            | VaultError::EmptyApproverSet
            | VaultError::QuorumZero
            | VaultError::QuorumExceedsApproverCount { .. }
            | VaultError::OperationDisabled(_) => ErrorKind::Validation,
            VaultError::UnknownTransfer(_)
            | VaultError::AlreadyExecuted(_)
            | VaultError::AlreadyCancelled(_)
            | VaultError::DuplicateApproval(_)
            | VaultError::QuorumNotReached { .. } => ErrorKind::StateConflict,
            VaultError::InsufficientBalance { .. } | VaultError::CustodyOverflow => {
                ErrorKind::Resource
            }
            VaultError::TransferExecutionFailed { .. } | VaultError::DepositRejected(_) => {
                ErrorKind::External
            }
        }
    }
}

//! Vault Engine
//!
//! Composition root: owns the approver registry, the transfer ledger and the
//! event sinks, and drives every public operation through the state machine.
//!
//! Each operation runs as one unit inside the vault's critical section and
//! either commits fully or returns an error with nothing changed. The only
//! exception to holding the section for the whole operation is the asset
//! movement in `execute`, which runs with the section released so recipient
//! code can re-enter the vault.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Context;
use tracing::{debug, error, info, warn};

use super::adapters::AssetMover;
use super::error::VaultError;
use super::events::{EventLog, EventSink, JournalSink, VaultEvent};
use super::ledger::TransferLedger;
use super::lock;
use super::machine::TransferStateMachine;
use super::policy::VaultPolicy;
use super::registry::ApproverRegistry;
use super::types::{AssetKind, MoveOutcome, TransferRecord};
use crate::config::VaultConfig;
use crate::core_types::{Address, Amount, TransferId};

/// Mutable state guarded by the vault's critical section
struct VaultState {
    registry: ApproverRegistry,
    ledger: TransferLedger,
    log: EventLog,
    sinks: Vec<Box<dyn EventSink>>,
    next_seq: u64,
}

impl VaultState {
    fn ensure_approver(&self, caller: &Address) -> Result<(), VaultError> {
        if self.registry.is_approver(caller) {
            Ok(())
        } else {
            debug!(caller = %caller, "Rejected: caller is not an approver");
            Err(VaultError::NotAnApprover(*caller))
        }
    }

    /// Publish a committed event to the log and every sink
    ///
    /// Sink failures are logged; the operation has already committed.
    fn emit(&mut self, event: VaultEvent) {
        let seq = self.next_seq;
        self.next_seq += 1;

        for sink in self.sinks.iter_mut() {
            if let Err(e) = sink.record(seq, &event) {
                error!(
                    sink = sink.name(),
                    seq,
                    event = event.name(),
                    error = %e,
                    "Failed to record vault event"
                );
            }
        }
        self.log.push(event);
    }
}

/// Quorum-gated custody vault
pub struct Vault {
    state: Mutex<VaultState>,
    policy: VaultPolicy,
    native: Arc<dyn AssetMover>,
    tokens: Option<Arc<dyn AssetMover>>,
}

impl Vault {
    /// Create a vault over an initialized registry with a native-currency mover
    pub fn new(
        registry: ApproverRegistry,
        policy: VaultPolicy,
        native: Arc<dyn AssetMover>,
    ) -> Self {
        info!(
            approvers = registry.len(),
            quorum = registry.quorum(),
            mover = native.name(),
            "Vault created"
        );

        Self {
            state: Mutex::new(VaultState {
                registry,
                ledger: TransferLedger::new(),
                log: EventLog::new(),
                sinks: Vec::new(),
                next_seq: 0,
            }),
            policy,
            native,
            tokens: None,
        }
    }

    /// Attach the mover used for token assets
    pub fn with_token_mover(mut self, tokens: Arc<dyn AssetMover>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Attach an additional event sink
    pub fn with_sink(self, sink: Box<dyn EventSink>) -> Self {
        lock(&self.state).sinks.push(sink);
        self
    }

    /// Build a vault from configuration
    ///
    /// Registry validation errors surface as-is inside the returned error.
    pub fn from_config(
        config: &VaultConfig,
        native: Arc<dyn AssetMover>,
        tokens: Option<Arc<dyn AssetMover>>,
    ) -> anyhow::Result<Self> {
        let approvers = config.approver_addresses()?;
        let registry = ApproverRegistry::new(approvers, config.quorum)
            .context("Invalid approver configuration")?;

        let mut vault = Self::new(registry, VaultPolicy::from(config.profile), native);
        if let Some(tokens) = tokens {
            vault = vault.with_token_mover(tokens);
        }
        if let Some(path) = &config.journal_path {
            let journal = JournalSink::open(path)
                .with_context(|| format!("Failed to open journal: {}", path))?;
            vault = vault.with_sink(Box::new(journal));
        }
        Ok(vault)
    }

    fn state(&self) -> MutexGuard<'_, VaultState> {
        lock(&self.state)
    }

    fn mover_for(&self, asset: &AssetKind) -> Result<&Arc<dyn AssetMover>, VaultError> {
        match asset {
            AssetKind::Native => Ok(&self.native),
            AssetKind::Token(_) => {
                if !self.policy.allow_token_assets {
                    return Err(VaultError::OperationDisabled("token assets"));
                }
                self.tokens
                    .as_ref()
                    .ok_or(VaultError::OperationDisabled("token assets"))
            }
        }
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Accept native currency into custody
    pub fn deposit(&self, sender: Address, amount: Amount) -> Result<(), VaultError> {
        let mut st = self.state();
        if self
            .native
            .balance_of(&AssetKind::Native)
            .checked_add(amount)
            .is_none()
        {
            return Err(VaultError::CustodyOverflow);
        }

        match self.native.deposit(sender, amount) {
            MoveOutcome::Success => {
                info!(sender = %sender, amount, "Deposit received");
                st.emit(VaultEvent::Deposited { sender, amount });
                Ok(())
            }
            MoveOutcome::Failed(reason) => {
                warn!(sender = %sender, amount, reason = %reason, "Deposit rejected by custody");
                Err(VaultError::DepositRejected(reason))
            }
        }
    }

    /// Open a new transfer request carrying the caller's approval
    pub fn initiate(
        &self,
        caller: Address,
        asset: AssetKind,
        recipient: Address,
        amount: Amount,
    ) -> Result<TransferId, VaultError> {
        let mut st = self.state();
        st.ensure_approver(&caller)?;
        TransferStateMachine::validate_request(&asset, &recipient, amount)?;
        let mover = self.mover_for(&asset)?;

        if asset.is_native() && self.policy.require_funded_vault && mover.balance_of(&asset) == 0 {
            return Err(VaultError::EmptyVault);
        }

        let id = st
            .ledger
            .allocate(|id| TransferStateMachine::open(id, caller, asset, recipient, amount));

        info!(
            transfer_id = id,
            initiator = %caller,
            asset = %asset,
            recipient = %recipient,
            amount,
            "Transfer initiated"
        );
        st.emit(VaultEvent::TransferInitiated {
            id,
            asset,
            recipient,
            amount,
        });
        Ok(id)
    }

    /// Add the caller's approval to a pending transfer
    pub fn approve(&self, caller: Address, id: TransferId) -> Result<(), VaultError> {
        let mut st = self.state();
        st.ensure_approver(&caller)?;

        let mut record = st.ledger.get(id)?.clone();
        TransferStateMachine::approve(&mut record, caller)?;
        let approvals = record.approval_count();
        st.ledger.put(record)?;

        info!(transfer_id = id, approver = %caller, approvals, "Transfer approved");
        st.emit(VaultEvent::TransferApproved {
            id,
            approver: caller,
        });
        Ok(())
    }

    /// Release a quorum-approved transfer
    ///
    /// # Persist-Before-Call
    /// The record is flipped to EXECUTED before the mover runs, so a
    /// re-entrant call for the same id fails with `AlreadyExecuted`. An
    /// explicit `Failed` outcome or a panic inside the mover restores the
    /// pre-call record exactly.
    pub fn execute(&self, caller: Address, id: TransferId) -> Result<(), VaultError> {
        // 1. Validate and flip inside the critical section
        let (snapshot, mover) = {
            let mut st = self.state();
            st.ensure_approver(&caller)?;
            let quorum = st.registry.quorum();

            let record = st.ledger.get(id)?;
            TransferStateMachine::check_executable(record, quorum)?;

            let mover = self.mover_for(&record.asset())?;
            let balance = mover.balance_of(&record.asset());
            if balance < record.amount() {
                return Err(VaultError::InsufficientBalance {
                    balance,
                    amount: record.amount(),
                });
            }

            let record = st.ledger.get_mut(id)?;
            (TransferStateMachine::begin_execution(record), Arc::clone(mover))
        };

        // 2. Move assets with the section released (recipient code may re-enter)
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            mover.send(&snapshot.asset(), snapshot.recipient(), snapshot.amount())
        }))
        .unwrap_or_else(|_| MoveOutcome::Failed("asset movement panicked".to_string()));

        // 3. Finalize
        let mut st = self.state();
        match outcome {
            MoveOutcome::Success => {
                info!(
                    transfer_id = id,
                    executor = %caller,
                    recipient = %snapshot.recipient(),
                    amount = snapshot.amount(),
                    "Transfer executed"
                );
                st.emit(VaultEvent::TransferExecuted { id });
                Ok(())
            }
            MoveOutcome::Failed(reason) => {
                let restored = match st.ledger.get_mut(id) {
                    Ok(record) => TransferStateMachine::abort_execution(record, snapshot),
                    Err(_) => false,
                };
                if !restored {
                    error!(
                        transfer_id = id,
                        "Record changed during asset movement; rollback skipped"
                    );
                }
                warn!(
                    transfer_id = id,
                    reason = %reason,
                    "Asset movement failed, transfer rolled back to PENDING"
                );
                Err(VaultError::TransferExecutionFailed { id, reason })
            }
        }
    }

    /// Withdraw a pending transfer without moving assets
    pub fn cancel(&self, caller: Address, id: TransferId) -> Result<(), VaultError> {
        if !self.policy.allow_cancel {
            return Err(VaultError::OperationDisabled("cancel"));
        }

        let mut st = self.state();
        st.ensure_approver(&caller)?;

        let mut record = st.ledger.get(id)?.clone();
        TransferStateMachine::cancel(&mut record)?;
        st.ledger.put(record)?;

        info!(transfer_id = id, canceller = %caller, "Transfer cancelled");
        st.emit(VaultEvent::TransferCancelled {
            id,
            canceller: caller,
        });
        Ok(())
    }

    /// Swap the approver set and quorum (any single approver may do this)
    ///
    /// Approvals already recorded on pending transfers keep counting.
    pub fn replace_registry(
        &self,
        caller: Address,
        approvers: Vec<Address>,
        quorum: u32,
    ) -> Result<(), VaultError> {
        if !self.policy.allow_reconfigure {
            return Err(VaultError::OperationDisabled("reconfiguration"));
        }

        let mut st = self.state();
        st.ensure_approver(&caller)?;
        st.registry.replace(approvers, quorum)?;

        let approvers = st.registry.approvers();
        info!(
            updated_by = %caller,
            approvers = approvers.len(),
            quorum,
            "Approver registry replaced"
        );
        st.emit(VaultEvent::RegistryUpdated { approvers });
        st.emit(VaultEvent::QuorumUpdated { quorum });
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn get(&self, id: TransferId) -> Result<TransferRecord, VaultError> {
        self.state().ledger.get(id).cloned()
    }

    pub fn has_approved(&self, id: TransferId, who: &Address) -> Result<bool, VaultError> {
        Ok(self.state().ledger.get(id)?.has_approved(who))
    }

    /// Number of transfers ever created
    pub fn count(&self) -> u64 {
        self.state().ledger.count()
    }

    pub fn is_approver(&self, who: &Address) -> bool {
        self.state().registry.is_approver(who)
    }

    pub fn approvers(&self) -> Vec<Address> {
        self.state().registry.approvers()
    }

    pub fn quorum(&self) -> u32 {
        self.state().registry.quorum()
    }

    /// Custody balance of `asset`; 0 for assets this vault cannot hold
    pub fn custody_balance(&self, asset: &AssetKind) -> Amount {
        self.mover_for(asset)
            .map(|mover| mover.balance_of(asset))
            .unwrap_or(0)
    }

    pub fn policy(&self) -> VaultPolicy {
        self.policy
    }

    /// Every committed event, oldest first
    pub fn events(&self) -> Vec<VaultEvent> {
        self.state().log.events().to_vec()
    }
}

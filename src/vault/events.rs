//! Vault Notifications
//!
//! Audit trail of committed operations. Events are emitted only after an
//! operation commits; a failed operation emits nothing.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::AssetKind;
use crate::core_types::{Address, Amount, TransferId};

/// Externally observable notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum VaultEvent {
    TransferInitiated {
        id: TransferId,
        asset: AssetKind,
        recipient: Address,
        amount: Amount,
    },
    TransferApproved {
        id: TransferId,
        approver: Address,
    },
    TransferExecuted {
        id: TransferId,
    },
    TransferCancelled {
        id: TransferId,
        canceller: Address,
    },
    RegistryUpdated {
        approvers: Vec<Address>,
    },
    QuorumUpdated {
        quorum: u32,
    },
    Deposited {
        sender: Address,
        amount: Amount,
    },
}

impl VaultEvent {
    pub fn name(&self) -> &'static str {
        match self {
            VaultEvent::TransferInitiated { .. } => "transfer_initiated",
            VaultEvent::TransferApproved { .. } => "transfer_approved",
            VaultEvent::TransferExecuted { .. } => "transfer_executed",
            VaultEvent::TransferCancelled { .. } => "transfer_cancelled",
            VaultEvent::RegistryUpdated { .. } => "registry_updated",
            VaultEvent::QuorumUpdated { .. } => "quorum_updated",
            VaultEvent::Deposited { .. } => "deposited",
        }
    }
}

/// Receiver of committed notifications
pub trait EventSink: Send {
    /// Sink name for logging
    fn name(&self) -> &'static str;

    fn record(&mut self, seq: u64, event: &VaultEvent) -> io::Result<()>;
}

/// In-memory event log, always attached to a vault
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<VaultEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: VaultEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[VaultEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for EventLog {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn record(&mut self, _seq: u64, event: &VaultEvent) -> io::Result<()> {
        self.push(event.clone());
        Ok(())
    }
}

/// One line of the journal file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub seq: u64,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: VaultEvent,
}

/// Append-only JSONL journal
pub struct JournalSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl JournalSink {
    /// Open (or create) the journal file, appending to existing content
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every entry back from a journal file
    pub fn read_all(path: impl AsRef<Path>) -> io::Result<Vec<JournalEntry>> {
        let content = fs::read_to_string(path)?;
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(io::Error::from))
            .collect()
    }
}

impl EventSink for JournalSink {
    fn name(&self) -> &'static str {
        "journal"
    }

    fn record(&mut self, seq: u64, event: &VaultEvent) -> io::Result<()> {
        let entry = JournalEntry {
            seq,
            timestamp: Utc::now(),
            event: event.clone(),
        };
        let json = serde_json::to_string(&entry)?;
        writeln!(self.writer, "{}", json)?;
        self.writer.flush()
    }
}

impl Drop for JournalSink {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

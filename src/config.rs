use std::fs;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core_types::Address;
use crate::vault::VaultProfile;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub vault: VaultConfig,
}

/// Vault bootstrap configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VaultConfig {
    #[serde(default)]
    pub profile: VaultProfile,
    /// Hex addresses (`0x…`)
    pub approvers: Vec<String>,
    pub quorum: u32,
    /// JSONL audit journal; no journal when absent
    #[serde(default)]
    pub journal_path: Option<String>,
}

impl VaultConfig {
    pub fn approver_addresses(&self) -> anyhow::Result<Vec<Address>> {
        self.approvers
            .iter()
            .map(|raw| {
                raw.parse::<Address>()
                    .with_context(|| format!("Invalid approver address: {}", raw))
            })
            .collect()
    }
}

impl AppConfig {
    /// Load `config/<env>.yaml`
    pub fn load(env: &str) -> anyhow::Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        Self::from_yaml(&content).with_context(|| format!("Failed to parse {}", config_path))
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }
}

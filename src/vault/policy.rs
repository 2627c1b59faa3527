//! Deployment profiles
//!
//! Two historical profiles exist: a native-currency vault that can swap its
//! approver set but never cancels, and a token vault that cancels but never
//! reconfigures. `Unified` offers the superset.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VaultProfile {
    Native,
    Token,
    #[default]
    Unified,
}

/// Which operations and assets a vault accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultPolicy {
    /// Token assets may be requested
    pub allow_token_assets: bool,
    /// `cancel` is offered
    pub allow_cancel: bool,
    /// `replace` of the approver registry is offered
    pub allow_reconfigure: bool,
    /// Native requests need a non-zero custody balance at initiate time
    pub require_funded_vault: bool,
}

impl VaultPolicy {
    pub fn for_profile(profile: VaultProfile) -> Self {
        match profile {
            VaultProfile::Native => Self {
                allow_token_assets: false,
                allow_cancel: false,
                allow_reconfigure: true,
                require_funded_vault: true,
            },
            VaultProfile::Token => Self {
                allow_token_assets: true,
                allow_cancel: true,
                allow_reconfigure: false,
                require_funded_vault: false,
            },
            VaultProfile::Unified => Self {
                allow_token_assets: true,
                allow_cancel: true,
                allow_reconfigure: true,
                require_funded_vault: true,
            },
        }
    }
}

impl Default for VaultPolicy {
    fn default() -> Self {
        Self::for_profile(VaultProfile::default())
    }
}

impl From<VaultProfile> for VaultPolicy {
    fn from(profile: VaultProfile) -> Self {
        Self::for_profile(profile)
    }
}

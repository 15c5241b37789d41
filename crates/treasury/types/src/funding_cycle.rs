use ruint::aliases::U256;
use serde::{Deserialize, Serialize};

use crate::ids::{Address, ConfigurationId};
use crate::metadata::PackedMetadata;

/// Properties proposed for a new funding-cycle configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingCycleData {
    /// Cycle length in seconds. Zero means the cycle never rolls over.
    pub duration: u64,
    pub weight: U256,
    pub discount_rate: u32,
    /// Contract that approves queued reconfigurations.
    pub ballot: Option<Address>,
}

/// One immutable funding cycle as reported by the versioning store.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingCycle {
    pub number: u64,
    pub configuration: ConfigurationId,
    pub based_on: ConfigurationId,
    pub start: u64,
    pub duration: u64,
    pub weight: U256,
    pub discount_rate: u32,
    pub ballot: Option<Address>,
    pub metadata: PackedMetadata,
}

impl FundingCycle {
    /// The zero cycle: what a project that was never configured reads as.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.number == 0 && self.configuration.is_none()
    }

    pub fn reserved_rate(&self) -> u32 {
        self.metadata.reserved_rate()
    }

    pub fn minting_allowed(&self) -> bool {
        self.metadata.minting_allowed()
    }

    pub fn burn_paused(&self) -> bool {
        self.metadata.burn_paused()
    }

    pub fn controller_migration_allowed(&self) -> bool {
        self.metadata.controller_migration_allowed()
    }

    pub fn data_source(&self) -> Option<Address> {
        self.metadata.data_source()
    }
}

/// Ballot verdict on a queued configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallotState {
    Active,
    Approved,
    Failed,
}

/// Off-chain metadata pointer attached to a project.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub content: String,
    pub domain: u64,
}

impl ProjectMetadata {
    pub fn new(content: impl Into<String>, domain: u64) -> Self {
        Self {
            content: content.into(),
            domain,
        }
    }
}

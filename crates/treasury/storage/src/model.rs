use ruint::aliases::U256;
use serde::{Deserialize, Serialize};
use treasury_types::{Address, ConfigurationId, ProjectId};

/// Composite key of a fund-access record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FundAccessKey {
    pub project_id: ProjectId,
    pub configuration: ConfigurationId,
    pub terminal: Address,
    pub token: Address,
}

impl FundAccessKey {
    pub fn new(
        project_id: ProjectId,
        configuration: ConfigurationId,
        terminal: Address,
        token: Address,
    ) -> Self {
        Self {
            project_id,
            configuration,
            terminal,
            token,
        }
    }
}

/// A holder's balance of one project's tokens.
///
/// Unclaimed tokens are tracked by the ledger only; claimed tokens live in
/// the project's issued token contract.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub claimed: U256,
    pub unclaimed: U256,
}

impl TokenBalance {
    pub fn total(&self) -> U256 {
        self.claimed.saturating_add(self.unclaimed)
    }
}

/// Name and symbol of an issued project token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedToken {
    pub address: Address,
    pub name: String,
    pub symbol: String,
}

/// One project as recorded by the project registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub project_id: ProjectId,
    pub owner: Address,
    pub metadata: treasury_types::ProjectMetadata,
}

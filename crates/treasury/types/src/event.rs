use ruint::aliases::U256;
use serde::{Deserialize, Serialize};

use crate::fund_access::FundAccessConstraint;
use crate::ids::{Address, ConfigurationId, ProjectId};
use crate::split::Split;

/// Append-only notifications emitted by the controller.
///
/// Notifications are observational: nothing in the controller reads them back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControllerEvent {
    LaunchProject {
        configuration: ConfigurationId,
        project_id: ProjectId,
        memo: String,
        caller: Address,
    },
    LaunchFundingCycles {
        configuration: ConfigurationId,
        project_id: ProjectId,
        memo: String,
        caller: Address,
    },
    ReconfigureFundingCycles {
        configuration: ConfigurationId,
        project_id: ProjectId,
        memo: String,
        caller: Address,
    },
    SetFundAccessConstraints {
        configuration: ConfigurationId,
        funding_cycle_number: u64,
        project_id: ProjectId,
        constraints: FundAccessConstraint,
        caller: Address,
    },
    MintTokens {
        beneficiary: Address,
        project_id: ProjectId,
        token_count: U256,
        beneficiary_token_count: U256,
        memo: String,
        reserved_rate: u32,
        caller: Address,
    },
    BurnTokens {
        holder: Address,
        project_id: ProjectId,
        token_count: U256,
        memo: String,
        caller: Address,
    },
    DistributeReservedTokens {
        configuration: ConfigurationId,
        funding_cycle_number: u64,
        project_id: ProjectId,
        beneficiary: Address,
        token_count: U256,
        beneficiary_token_count: U256,
        memo: String,
        caller: Address,
    },
    DistributeToReservedTokenSplit {
        project_id: ProjectId,
        domain: u64,
        group: u64,
        split: Split,
        token_count: U256,
        caller: Address,
    },
    Migrate {
        project_id: ProjectId,
        to: Address,
        caller: Address,
    },
    PrepMigration {
        project_id: ProjectId,
        from: Address,
        caller: Address,
    },
}

impl ControllerEvent {
    pub fn project_id(&self) -> ProjectId {
        match self {
            ControllerEvent::LaunchProject { project_id, .. }
            | ControllerEvent::LaunchFundingCycles { project_id, .. }
            | ControllerEvent::ReconfigureFundingCycles { project_id, .. }
            | ControllerEvent::SetFundAccessConstraints { project_id, .. }
            | ControllerEvent::MintTokens { project_id, .. }
            | ControllerEvent::BurnTokens { project_id, .. }
            | ControllerEvent::DistributeReservedTokens { project_id, .. }
            | ControllerEvent::DistributeToReservedTokenSplit { project_id, .. }
            | ControllerEvent::Migrate { project_id, .. }
            | ControllerEvent::PrepMigration { project_id, .. } => *project_id,
        }
    }

    pub fn caller(&self) -> Address {
        match self {
            ControllerEvent::LaunchProject { caller, .. }
            | ControllerEvent::LaunchFundingCycles { caller, .. }
            | ControllerEvent::ReconfigureFundingCycles { caller, .. }
            | ControllerEvent::SetFundAccessConstraints { caller, .. }
            | ControllerEvent::MintTokens { caller, .. }
            | ControllerEvent::BurnTokens { caller, .. }
            | ControllerEvent::DistributeReservedTokens { caller, .. }
            | ControllerEvent::DistributeToReservedTokenSplit { caller, .. }
            | ControllerEvent::Migrate { caller, .. }
            | ControllerEvent::PrepMigration { caller, .. } => *caller,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ControllerEvent::LaunchProject { .. } => "LaunchProject",
            ControllerEvent::LaunchFundingCycles { .. } => "LaunchFundingCycles",
            ControllerEvent::ReconfigureFundingCycles { .. } => "ReconfigureFundingCycles",
            ControllerEvent::SetFundAccessConstraints { .. } => "SetFundAccessConstraints",
            ControllerEvent::MintTokens { .. } => "MintTokens",
            ControllerEvent::BurnTokens { .. } => "BurnTokens",
            ControllerEvent::DistributeReservedTokens { .. } => "DistributeReservedTokens",
            ControllerEvent::DistributeToReservedTokenSplit { .. } => {
                "DistributeToReservedTokenSplit"
            }
            ControllerEvent::Migrate { .. } => "Migrate",
            ControllerEvent::PrepMigration { .. } => "PrepMigration",
        }
    }
}

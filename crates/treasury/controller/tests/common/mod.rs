//! Shared fixtures for controller integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use ruint::aliases::U256;
use treasury_controller::{Collaborators, Controller, ControllerConfig, FundingCycleConfiguration};
use treasury_storage::memory::{InMemoryCollaborators, InMemoryControllerState};
use treasury_storage::TokenStore;
use treasury_types::{
    split_groups, Address, FundingCycleData, FundingCycleMetadata, ProjectId, ProjectMetadata,
    Split, SplitGroup, SPLITS_TOTAL_PERCENT,
};

pub const LAUNCHED_AT: u64 = 1_000;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn controller_address() -> Address {
    Address::from_low_u64(0xc0)
}

pub fn next_controller_address() -> Address {
    Address::from_low_u64(0xc1)
}

pub fn owner() -> Address {
    Address::from_low_u64(0x0a)
}

pub fn holder() -> Address {
    Address::from_low_u64(0xb0)
}

pub fn stranger() -> Address {
    Address::from_low_u64(0x5)
}

pub fn terminal() -> Address {
    Address::from_low_u64(0x7e)
}

pub fn data_source() -> Address {
    Address::from_low_u64(0xd5)
}

pub fn units(n: u64) -> U256 {
    U256::from(n)
}

/// `p` percent of the split denominator.
pub fn percent(p: u64) -> u64 {
    SPLITS_TOTAL_PERCENT / 100 * p
}

pub fn minting_metadata(reserved_rate: u32) -> FundingCycleMetadata {
    FundingCycleMetadata {
        reserved_rate,
        allow_minting: true,
        ..Default::default()
    }
}

pub fn configuration(
    metadata: FundingCycleMetadata,
    reserved_splits: Vec<Split>,
) -> FundingCycleConfiguration {
    FundingCycleConfiguration::new(FundingCycleData::default(), metadata).with_split_group(
        SplitGroup::new(split_groups::RESERVED_TOKENS, reserved_splits),
    )
}

/// Shared in-memory collaborators plus fresh controller state.
pub fn collaborators(shared: &InMemoryCollaborators) -> Collaborators {
    Collaborators {
        projects: shared.projects.clone(),
        funding_cycles: shared.funding_cycles.clone(),
        splits: shared.splits.clone(),
        tokens: shared.tokens.clone(),
        directory: shared.directory.clone(),
        operators: shared.operators.clone(),
        allocators: shared.allocators.clone(),
        events: shared.events.clone(),
        state: Arc::new(InMemoryControllerState::new()),
    }
}

pub struct Harness {
    pub shared: InMemoryCollaborators,
    pub controller: Arc<Controller>,
    pub project: ProjectId,
}

impl Harness {
    pub fn balance_of(&self, account: Address) -> U256 {
        self.shared
            .tokens
            .balance_of(account, self.project)
            .unwrap()
            .total()
    }

    pub fn total_supply(&self) -> U256 {
        self.shared.tokens.total_supply_of(self.project).unwrap()
    }

    /// Another controller over the same collaborators.
    pub fn second_controller(&self) -> Arc<Controller> {
        Arc::new(
            Controller::new(
                ControllerConfig::new(next_controller_address()),
                collaborators(&self.shared),
            )
            .unwrap(),
        )
    }
}

/// Launch one project owned by `owner()` with `terminal()` registered.
pub fn launch(metadata: FundingCycleMetadata, reserved_splits: Vec<Split>) -> Harness {
    init_tracing();
    let shared = InMemoryCollaborators::at(LAUNCHED_AT);
    let controller = Arc::new(
        Controller::new(
            ControllerConfig::new(controller_address()),
            collaborators(&shared),
        )
        .unwrap(),
    );
    let project = controller
        .launch_project_for(
            owner(),
            owner(),
            ProjectMetadata::new("ipfs://project", 0),
            &configuration(metadata, reserved_splits),
            &[terminal()],
            "launch",
        )
        .unwrap();
    Harness {
        shared,
        controller,
        project,
    }
}

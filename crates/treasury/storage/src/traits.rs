use std::sync::Arc;

use ruint::aliases::U256;
use treasury_types::{
    Address, BallotState, ConfigurationId, ControllerEvent, FundingCycle, FundingCycleData,
    Operation, PackedMetadata, ProjectId, ProjectMetadata, Split, SplitAllocationData, SplitGroup,
};

use crate::error::CallbackResult;
use crate::model::{FundAccessKey, TokenBalance};
use crate::StorageResult;

/// Ownership registry of projects.
pub trait ProjectRegistry: Send + Sync {
    /// Create a project owned by `owner` and return its id.
    fn create_for(&self, owner: Address, metadata: ProjectMetadata) -> StorageResult<ProjectId>;

    /// Current owner. Unknown projects fail with `NotFound`.
    fn owner_of(&self, project_id: ProjectId) -> StorageResult<Address>;
}

/// Configuration-versioning store for funding cycles.
pub trait FundingCycleStore: Send + Sync {
    /// Persist a new configuration. The returned cycle carries a configuration
    /// id strictly greater than every prior id of the project.
    fn configure_for(
        &self,
        project_id: ProjectId,
        data: FundingCycleData,
        metadata: PackedMetadata,
        must_start_at_or_after: u64,
    ) -> StorageResult<FundingCycle>;

    /// Cycle of a given configuration, or the empty cycle if unknown.
    fn get(&self, project_id: ProjectId, configuration: ConfigurationId)
        -> StorageResult<FundingCycle>;

    /// Cycle in effect now, if any.
    fn current_of(&self, project_id: ProjectId) -> StorageResult<Option<FundingCycle>>;

    /// Cycle that takes effect after the current one, if any.
    fn queued_of(&self, project_id: ProjectId) -> StorageResult<Option<FundingCycle>>;

    /// Most recently configured cycle and its ballot verdict.
    fn latest_configured_of(&self, project_id: ProjectId)
        -> StorageResult<(FundingCycle, BallotState)>;

    /// `ConfigurationId::NONE` if the project was never configured.
    fn latest_configuration_of(&self, project_id: ProjectId) -> StorageResult<ConfigurationId>;
}

/// Split-list persistence keyed by (project, domain, group).
pub trait SplitsStore: Send + Sync {
    fn set(&self, project_id: ProjectId, domain: u64, groups: &[SplitGroup]) -> StorageResult<()>;

    /// Splits of one group in stored order. Unset groups are empty.
    fn splits_of(&self, project_id: ProjectId, domain: u64, group: u64)
        -> StorageResult<Vec<Split>>;
}

/// Mint/burn ledger of project tokens.
pub trait TokenStore: Send + Sync {
    fn issue_for(&self, project_id: ProjectId, name: &str, symbol: &str)
        -> StorageResult<Address>;

    fn token_of(&self, project_id: ProjectId) -> StorageResult<Option<Address>>;

    fn mint_for(
        &self,
        holder: Address,
        project_id: ProjectId,
        amount: U256,
        prefer_claimed: bool,
    ) -> StorageResult<()>;

    /// Burn from the holder. Fails with `InsufficientBalance` if the holder's
    /// combined balance is short.
    fn burn_from(
        &self,
        holder: Address,
        project_id: ProjectId,
        amount: U256,
        prefer_claimed: bool,
    ) -> StorageResult<()>;

    fn balance_of(&self, holder: Address, project_id: ProjectId) -> StorageResult<TokenBalance>;

    fn total_supply_of(&self, project_id: ProjectId) -> StorageResult<U256>;
}

/// Directory of each project's controller and terminals.
pub trait ProjectDirectory: Send + Sync {
    fn controller_of(&self, project_id: ProjectId) -> StorageResult<Option<Address>>;

    fn set_controller_of(&self, project_id: ProjectId, controller: Address) -> StorageResult<()>;

    fn terminals_of(&self, project_id: ProjectId) -> StorageResult<Vec<Address>>;

    fn set_terminals_of(&self, project_id: ProjectId, terminals: &[Address]) -> StorageResult<()>;

    fn is_terminal_of(&self, project_id: ProjectId, terminal: Address) -> StorageResult<bool>;
}

/// Operator registry: permissions an account delegated to an operator,
/// scoped by domain.
pub trait OperatorStore: Send + Sync {
    fn has_permission(
        &self,
        operator: Address,
        account: Address,
        domain: u64,
        operation: Operation,
    ) -> StorageResult<bool>;

    /// Replace the operator's permission set for (account, domain).
    fn set_operator(
        &self,
        account: Address,
        operator: Address,
        domain: u64,
        operations: &[Operation],
    ) -> StorageResult<()>;
}

/// Recipient callback invoked after a split's share has been minted to it.
///
/// Implementations may call back into the controller.
pub trait SplitAllocator: Send + Sync {
    fn allocate(&self, data: SplitAllocationData) -> CallbackResult;
}

/// Resolves allocator addresses to callbacks.
pub trait AllocatorRegistry: Send + Sync {
    fn allocator_of(&self, address: Address) -> StorageResult<Option<Arc<dyn SplitAllocator>>>;
}

/// Controller that can receive a project during migration.
pub trait MigrationTarget: Send + Sync {
    fn address(&self) -> Address;

    /// Acceptance hook. An error aborts the migration.
    fn prep_for_migration_of(&self, project_id: ProjectId, from: Address) -> CallbackResult;
}

/// State owned by the controller itself.
pub trait ControllerStateStore: Send + Sync {
    /// Packed distribution-limit word; zero if unset.
    fn packed_distribution_limit_of(&self, key: &FundAccessKey) -> StorageResult<U256>;

    fn set_packed_distribution_limit_of(&self, key: FundAccessKey, word: U256)
        -> StorageResult<()>;

    /// Packed overflow-allowance word; zero if unset.
    fn packed_overflow_allowance_of(&self, key: &FundAccessKey) -> StorageResult<U256>;

    fn set_packed_overflow_allowance_of(&self, key: FundAccessKey, word: U256)
        -> StorageResult<()>;

    fn reserved_token_balance_of(&self, project_id: ProjectId) -> StorageResult<U256>;

    /// Add to the reserved balance and return the new balance.
    fn add_reserved_tokens(&self, project_id: ProjectId, amount: U256) -> StorageResult<U256>;

    /// Read the reserved balance and reset it to zero in one step.
    fn take_reserved_tokens(&self, project_id: ProjectId) -> StorageResult<U256>;
}

/// Append-only notification sink.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: ControllerEvent) -> StorageResult<()>;
}

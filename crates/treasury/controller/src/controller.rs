use std::sync::Arc;

use ruint::aliases::U256;
use tracing::info;
use treasury_storage::{
    AllocatorRegistry, CallbackResult, ControllerStateStore, EventSink, FundingCycleStore,
    MigrationTarget, OperatorStore, ProjectDirectory, ProjectRegistry, SplitsStore, TokenStore,
};
use treasury_types::{
    Address, BallotState, ConfigurationId, ControllerEvent, FundingCycle, FundingCycleMetadata,
    Operation, ProjectId, ProjectMetadata,
};

use crate::config::ControllerConfig;
use crate::error::{ControllerError, ControllerResult};
use crate::gate::{ControllerBinding, PermissionGate};
use crate::ledger::{ConfigurationLedger, FundingCycleConfiguration};
use crate::migration::MigrationCoordinator;
use crate::reserved::{MintRequest, ReservedTokenAccountant};
use crate::splits::SplitDistributor;

/// Handles to every store a controller talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub projects: Arc<dyn ProjectRegistry>,
    pub funding_cycles: Arc<dyn FundingCycleStore>,
    pub splits: Arc<dyn SplitsStore>,
    pub tokens: Arc<dyn TokenStore>,
    pub directory: Arc<dyn ProjectDirectory>,
    pub operators: Arc<dyn OperatorStore>,
    pub allocators: Arc<dyn AllocatorRegistry>,
    pub events: Arc<dyn EventSink>,
    /// State owned by this controller alone.
    pub state: Arc<dyn ControllerStateStore>,
}

/// Treasury controller.
///
/// Launches and reconfigures projects' funding cycles, mints and burns
/// project tokens, distributes reserved tokens and hands projects over to
/// other controllers. Every operation takes the calling address explicitly.
pub struct Controller {
    config: ControllerConfig,
    projects: Arc<dyn ProjectRegistry>,
    funding_cycles: Arc<dyn FundingCycleStore>,
    tokens: Arc<dyn TokenStore>,
    directory: Arc<dyn ProjectDirectory>,
    events: Arc<dyn EventSink>,
    gate: Arc<PermissionGate>,
    binding: Arc<ControllerBinding>,
    ledger: ConfigurationLedger,
    accountant: ReservedTokenAccountant,
    migration: MigrationCoordinator,
}

impl Controller {
    pub fn new(config: ControllerConfig, collaborators: Collaborators) -> ControllerResult<Self> {
        config.validate()?;
        let c = collaborators;

        let gate = Arc::new(PermissionGate::new(c.operators.clone()));
        let binding = Arc::new(ControllerBinding::new(config.address, c.directory.clone()));
        let ledger = ConfigurationLedger::new(
            c.funding_cycles.clone(),
            c.splits.clone(),
            c.state.clone(),
            c.events.clone(),
        );
        let distributor = SplitDistributor::new(
            c.splits.clone(),
            c.tokens.clone(),
            c.projects.clone(),
            c.allocators.clone(),
            c.events.clone(),
            config.allocation_decimals,
        );
        let accountant = ReservedTokenAccountant::new(
            gate.clone(),
            binding.clone(),
            c.projects.clone(),
            c.funding_cycles.clone(),
            c.directory.clone(),
            c.tokens.clone(),
            c.state.clone(),
            c.events.clone(),
            distributor,
            config.reserved_tokens_group,
        );
        let migration = MigrationCoordinator::new(
            binding.clone(),
            gate.clone(),
            c.projects.clone(),
            c.funding_cycles.clone(),
            c.directory.clone(),
            c.state.clone(),
            c.events.clone(),
        );

        Ok(Self {
            config,
            projects: c.projects,
            funding_cycles: c.funding_cycles,
            tokens: c.tokens,
            directory: c.directory,
            events: c.events,
            gate,
            binding,
            ledger,
            accountant,
            migration,
        })
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    // =========================================================================
    // LAUNCH AND RECONFIGURATION
    // =========================================================================

    /// Create a project for `owner`, make this controller its controller and
    /// configure its first funding cycle.
    pub fn launch_project_for(
        &self,
        caller: Address,
        owner: Address,
        project_metadata: ProjectMetadata,
        configuration: &FundingCycleConfiguration,
        terminals: &[Address],
        memo: &str,
    ) -> ControllerResult<ProjectId> {
        ConfigurationLedger::validate(configuration)?;

        let project_id = self.projects.create_for(owner, project_metadata)?;
        self.directory
            .set_controller_of(project_id, self.config.address)?;

        let cycle = self.ledger.configure(caller, project_id, configuration)?;

        if !terminals.is_empty() {
            self.directory.set_terminals_of(project_id, terminals)?;
        }

        self.events.emit(ControllerEvent::LaunchProject {
            configuration: cycle.configuration,
            project_id,
            memo: memo.to_string(),
            caller,
        })?;

        info!(project = %project_id, owner = %owner, configuration = %cycle.configuration, "Project launched");
        Ok(project_id)
    }

    /// Configure the first funding cycle of an existing project.
    pub fn launch_funding_cycles_for(
        &self,
        caller: Address,
        project_id: ProjectId,
        configuration: &FundingCycleConfiguration,
        terminals: &[Address],
        memo: &str,
    ) -> ControllerResult<ConfigurationId> {
        let owner = self.projects.owner_of(project_id)?;
        self.gate
            .require(caller, owner, project_id, Operation::Reconfigure)?;

        if !self
            .funding_cycles
            .latest_configuration_of(project_id)?
            .is_none()
        {
            return Err(ControllerError::FundingCycleAlreadyLaunched(project_id));
        }

        ConfigurationLedger::validate(configuration)?;

        self.directory
            .set_controller_of(project_id, self.config.address)?;

        let cycle = self.ledger.configure(caller, project_id, configuration)?;

        if !terminals.is_empty() {
            self.directory.set_terminals_of(project_id, terminals)?;
        }

        self.events.emit(ControllerEvent::LaunchFundingCycles {
            configuration: cycle.configuration,
            project_id,
            memo: memo.to_string(),
            caller,
        })?;

        info!(project = %project_id, configuration = %cycle.configuration, "Funding cycles launched");
        Ok(cycle.configuration)
    }

    pub fn reconfigure_funding_cycles_of(
        &self,
        caller: Address,
        project_id: ProjectId,
        configuration: &FundingCycleConfiguration,
        memo: &str,
    ) -> ControllerResult<ConfigurationId> {
        let owner = self.projects.owner_of(project_id)?;
        self.gate
            .require(caller, owner, project_id, Operation::Reconfigure)?;
        self.binding.require_current(project_id)?;

        let cycle = self.ledger.configure(caller, project_id, configuration)?;

        self.events.emit(ControllerEvent::ReconfigureFundingCycles {
            configuration: cycle.configuration,
            project_id,
            memo: memo.to_string(),
            caller,
        })?;

        info!(project = %project_id, configuration = %cycle.configuration, "Funding cycles reconfigured");
        Ok(cycle.configuration)
    }

    // =========================================================================
    // TOKENS
    // =========================================================================

    pub fn issue_token_for(
        &self,
        caller: Address,
        project_id: ProjectId,
        name: &str,
        symbol: &str,
    ) -> ControllerResult<Address> {
        let owner = self.projects.owner_of(project_id)?;
        self.gate.require(caller, owner, project_id, Operation::Issue)?;
        self.binding.require_current(project_id)?;

        let token = self.tokens.issue_for(project_id, name, symbol)?;
        info!(project = %project_id, token = %token, symbol, "Token issued");
        Ok(token)
    }

    pub fn mint_tokens_of(
        &self,
        caller: Address,
        project_id: ProjectId,
        request: &MintRequest,
    ) -> ControllerResult<U256> {
        self.accountant.mint_tokens_of(caller, project_id, request)
    }

    pub fn burn_tokens_of(
        &self,
        caller: Address,
        holder: Address,
        project_id: ProjectId,
        token_count: U256,
        memo: &str,
        prefer_claimed: bool,
    ) -> ControllerResult<()> {
        self.accountant
            .burn_tokens_of(caller, holder, project_id, token_count, memo, prefer_claimed)
    }

    pub fn distribute_reserved_tokens_of(
        &self,
        caller: Address,
        project_id: ProjectId,
        memo: &str,
    ) -> ControllerResult<U256> {
        self.accountant
            .distribute_reserved_tokens_of(caller, project_id, memo)
    }

    // =========================================================================
    // MIGRATION
    // =========================================================================

    pub fn migrate(
        &self,
        caller: Address,
        project_id: ProjectId,
        to: &dyn MigrationTarget,
    ) -> ControllerResult<()> {
        self.migration
            .migrate(caller, project_id, to, &self.accountant)
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub fn get_funding_cycle_of(
        &self,
        project_id: ProjectId,
        configuration: ConfigurationId,
    ) -> ControllerResult<(FundingCycle, FundingCycleMetadata)> {
        let cycle = self.funding_cycles.get(project_id, configuration)?;
        let metadata = cycle.metadata.unpack();
        Ok((cycle, metadata))
    }

    /// Current cycle; the empty cycle if the project has none.
    pub fn current_funding_cycle_of(
        &self,
        project_id: ProjectId,
    ) -> ControllerResult<(FundingCycle, FundingCycleMetadata)> {
        let cycle = self
            .funding_cycles
            .current_of(project_id)?
            .unwrap_or_else(FundingCycle::empty);
        let metadata = cycle.metadata.unpack();
        Ok((cycle, metadata))
    }

    /// Queued cycle; the empty cycle if nothing is queued.
    pub fn queued_funding_cycle_of(
        &self,
        project_id: ProjectId,
    ) -> ControllerResult<(FundingCycle, FundingCycleMetadata)> {
        let cycle = self
            .funding_cycles
            .queued_of(project_id)?
            .unwrap_or_else(FundingCycle::empty);
        let metadata = cycle.metadata.unpack();
        Ok((cycle, metadata))
    }

    pub fn latest_configured_funding_cycle_of(
        &self,
        project_id: ProjectId,
    ) -> ControllerResult<(FundingCycle, FundingCycleMetadata, BallotState)> {
        let (cycle, ballot) = self.funding_cycles.latest_configured_of(project_id)?;
        let metadata = cycle.metadata.unpack();
        Ok((cycle, metadata, ballot))
    }

    pub fn distribution_limit_of(
        &self,
        project_id: ProjectId,
        configuration: ConfigurationId,
        terminal: Address,
        token: Address,
    ) -> ControllerResult<(U256, u64)> {
        self.ledger
            .distribution_limit_of(project_id, configuration, terminal, token)
    }

    pub fn overflow_allowance_of(
        &self,
        project_id: ProjectId,
        configuration: ConfigurationId,
        terminal: Address,
        token: Address,
    ) -> ControllerResult<(U256, u64)> {
        self.ledger
            .overflow_allowance_of(project_id, configuration, terminal, token)
    }

    pub fn reserved_token_balance_of(&self, project_id: ProjectId) -> ControllerResult<U256> {
        self.accountant.reserved_token_balance_of(project_id)
    }

    pub fn total_outstanding_tokens_of(&self, project_id: ProjectId) -> ControllerResult<U256> {
        self.accountant.total_outstanding_tokens_of(project_id)
    }
}

impl MigrationTarget for Controller {
    fn address(&self) -> Address {
        self.config.address
    }

    /// Accept a project from `from`. Refuses projects this controller already
    /// controls.
    fn prep_for_migration_of(&self, project_id: ProjectId, from: Address) -> CallbackResult {
        if self.directory.controller_of(project_id)? == Some(self.config.address) {
            return Err(Box::new(ControllerError::CannotMigrateToCurrentController(
                project_id,
            )));
        }

        self.events.emit(ControllerEvent::PrepMigration {
            project_id,
            from,
            caller: from,
        })?;

        info!(project = %project_id, from = %from, to = %self.config.address, "Prepared for migration");
        Ok(())
    }
}

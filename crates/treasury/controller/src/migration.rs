use std::sync::Arc;

use tracing::{info, warn};
use treasury_storage::{
    ControllerStateStore, EventSink, FundingCycleStore, MigrationTarget, ProjectDirectory,
    ProjectRegistry,
};
use treasury_types::{Address, ControllerEvent, FundingCycle, Operation, ProjectId};

use crate::error::{ControllerError, ControllerResult};
use crate::gate::{ControllerBinding, PermissionGate};
use crate::reserved::ReservedTokenAccountant;

/// Two-phase handoff of a project to another controller.
///
/// Phase one asks the new controller to accept the project. Phase two, run
/// only if it accepted, points the directory at the new controller.
pub struct MigrationCoordinator {
    binding: Arc<ControllerBinding>,
    gate: Arc<PermissionGate>,
    projects: Arc<dyn ProjectRegistry>,
    funding_cycles: Arc<dyn FundingCycleStore>,
    directory: Arc<dyn ProjectDirectory>,
    state: Arc<dyn ControllerStateStore>,
    events: Arc<dyn EventSink>,
}

impl MigrationCoordinator {
    pub fn new(
        binding: Arc<ControllerBinding>,
        gate: Arc<PermissionGate>,
        projects: Arc<dyn ProjectRegistry>,
        funding_cycles: Arc<dyn FundingCycleStore>,
        directory: Arc<dyn ProjectDirectory>,
        state: Arc<dyn ControllerStateStore>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            binding,
            gate,
            projects,
            funding_cycles,
            directory,
            state,
            events,
        }
    }

    pub fn migrate(
        &self,
        caller: Address,
        project_id: ProjectId,
        to: &dyn MigrationTarget,
        accountant: &ReservedTokenAccountant,
    ) -> ControllerResult<()> {
        let owner = self.projects.owner_of(project_id)?;
        self.gate
            .require(caller, owner, project_id, Operation::MigrateController)?;

        self.binding.require_current(project_id)?;

        let cycle = self
            .funding_cycles
            .current_of(project_id)?
            .unwrap_or_else(FundingCycle::empty);
        if !cycle.controller_migration_allowed() {
            warn!(project = %project_id, "Controller migration not allowed");
            return Err(ControllerError::MigrationNotAllowed(project_id));
        }

        if !self.state.reserved_token_balance_of(project_id)?.is_zero() {
            accountant.distribute_reserved_tokens_of(caller, project_id, "")?;
        }

        let new_controller = to.address();
        to.prep_for_migration_of(project_id, self.binding.address())
            .map_err(|e| {
                warn!(project = %project_id, to = %new_controller, error = %e, "Migration rejected");
                ControllerError::MigrationRejected {
                    to: new_controller,
                    reason: e.to_string(),
                }
            })?;

        self.directory.set_controller_of(project_id, new_controller)?;

        self.events.emit(ControllerEvent::Migrate {
            project_id,
            to: new_controller,
            caller,
        })?;

        info!(project = %project_id, from = %self.binding.address(), to = %new_controller, "Controller migrated");
        Ok(())
    }
}

use std::sync::Arc;

use tracing::{debug, warn};
use treasury_storage::{OperatorStore, ProjectDirectory};
use treasury_types::{Address, Operation, ProjectId, WILDCARD_DOMAIN};

use crate::error::{ControllerError, ControllerResult};

/// Permission gate.
///
/// A caller is authorized for an operation on an account when, in order:
/// 1. the caller is the account itself
/// 2. the account delegated the operation to the caller in the project's
///    domain or in the wildcard domain
/// 3. the call context's override predicate holds
///
/// Override predicates are evaluated only when the first two fail.
pub struct PermissionGate {
    operators: Arc<dyn OperatorStore>,
}

impl PermissionGate {
    pub fn new(operators: Arc<dyn OperatorStore>) -> Self {
        Self { operators }
    }

    /// Require `operation` permission without an override.
    pub fn require(
        &self,
        caller: Address,
        account: Address,
        project_id: ProjectId,
        operation: Operation,
    ) -> ControllerResult<()> {
        self.require_allowing_override(caller, account, project_id, operation, || Ok(false))
    }

    pub fn require_allowing_override<F>(
        &self,
        caller: Address,
        account: Address,
        project_id: ProjectId,
        operation: Operation,
        override_predicate: F,
    ) -> ControllerResult<()>
    where
        F: FnOnce() -> ControllerResult<bool>,
    {
        if caller == account {
            return Ok(());
        }

        if self.is_delegated(caller, account, project_id, operation)? {
            debug!(
                caller = %caller,
                account = %account,
                project = %project_id,
                operation = %operation,
                "Delegated permission granted"
            );
            return Ok(());
        }

        if override_predicate()? {
            debug!(
                caller = %caller,
                project = %project_id,
                operation = %operation,
                "Permission granted by override"
            );
            return Ok(());
        }

        warn!(
            caller = %caller,
            account = %account,
            project = %project_id,
            operation = %operation,
            "Permission denied"
        );
        Err(ControllerError::PermissionDenied {
            caller,
            account,
            project_id,
            operation,
        })
    }

    fn is_delegated(
        &self,
        caller: Address,
        account: Address,
        project_id: ProjectId,
        operation: Operation,
    ) -> ControllerResult<bool> {
        if self
            .operators
            .has_permission(caller, account, project_id.as_u64(), operation)?
        {
            return Ok(true);
        }
        Ok(self
            .operators
            .has_permission(caller, account, WILDCARD_DOMAIN, operation)?)
    }
}

/// Binds a controller address to the directory, so writes through this
/// controller are refused once a project points elsewhere.
pub struct ControllerBinding {
    address: Address,
    directory: Arc<dyn ProjectDirectory>,
}

impl ControllerBinding {
    pub fn new(address: Address, directory: Arc<dyn ProjectDirectory>) -> Self {
        Self { address, directory }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn require_current(&self, project_id: ProjectId) -> ControllerResult<()> {
        let current = self.directory.controller_of(project_id)?;
        if current == Some(self.address) {
            return Ok(());
        }
        warn!(
            project = %project_id,
            controller = %self.address,
            current = ?current,
            "Not the current controller"
        );
        Err(ControllerError::NotCurrentController {
            project_id,
            controller: self.address,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use treasury_storage::memory::{InMemoryOperatorStore, InMemoryProjectDirectory};

    fn owner() -> Address {
        Address::from_low_u64(0x0a)
    }

    fn operator() -> Address {
        Address::from_low_u64(0x0b)
    }

    fn setup() -> (Arc<InMemoryOperatorStore>, PermissionGate) {
        let operators = Arc::new(InMemoryOperatorStore::new());
        let gate = PermissionGate::new(operators.clone());
        (operators, gate)
    }

    #[test]
    fn account_owner_always_passes() {
        let (_, gate) = setup();
        gate.require(owner(), owner(), ProjectId(1), Operation::Reconfigure)
            .unwrap();
    }

    #[test]
    fn delegation_is_scoped_to_project_domain() {
        let (operators, gate) = setup();
        operators
            .set_operator(owner(), operator(), 1, &[Operation::Mint])
            .unwrap();

        gate.require(operator(), owner(), ProjectId(1), Operation::Mint)
            .unwrap();
        assert!(gate
            .require(operator(), owner(), ProjectId(2), Operation::Mint)
            .is_err());
        assert!(gate
            .require(operator(), owner(), ProjectId(1), Operation::Burn)
            .is_err());
    }

    #[test]
    fn wildcard_domain_covers_every_project() {
        let (operators, gate) = setup();
        operators
            .set_operator(owner(), operator(), WILDCARD_DOMAIN, &[Operation::Reconfigure])
            .unwrap();
        gate.require(operator(), owner(), ProjectId(42), Operation::Reconfigure)
            .unwrap();
    }

    #[test]
    fn override_is_only_consulted_after_delegation_fails() {
        let (operators, gate) = setup();
        let consulted = Cell::new(false);

        operators
            .set_operator(owner(), operator(), 1, &[Operation::Mint])
            .unwrap();
        gate.require_allowing_override(operator(), owner(), ProjectId(1), Operation::Mint, || {
            consulted.set(true);
            Ok(true)
        })
        .unwrap();
        assert!(!consulted.get());

        let stranger = Address::from_low_u64(0xff);
        gate.require_allowing_override(stranger, owner(), ProjectId(1), Operation::Mint, || {
            consulted.set(true);
            Ok(true)
        })
        .unwrap();
        assert!(consulted.get());
    }

    #[test]
    fn binding_follows_the_directory() {
        let directory = Arc::new(InMemoryProjectDirectory::new());
        let controller = Address::from_low_u64(0xc0);
        let binding = ControllerBinding::new(controller, directory.clone());

        assert!(matches!(
            binding.require_current(ProjectId(1)),
            Err(ControllerError::NotCurrentController { .. })
        ));
        directory.set_controller_of(ProjectId(1), controller).unwrap();
        binding.require_current(ProjectId(1)).unwrap();

        directory
            .set_controller_of(ProjectId(1), Address::from_low_u64(0xc1))
            .unwrap();
        let err = binding.require_current(ProjectId(1)).unwrap_err();
        assert!(matches!(
            err,
            ControllerError::NotCurrentController { controller: c, .. } if c == controller
        ));
    }

    #[test]
    fn denied_without_any_grant() {
        let (_, gate) = setup();
        let err = gate
            .require_allowing_override(operator(), owner(), ProjectId(1), Operation::Burn, || {
                Ok(false)
            })
            .unwrap_err();
        assert!(matches!(
            err,
            ControllerError::PermissionDenied {
                operation: Operation::Burn,
                ..
            }
        ));
    }
}

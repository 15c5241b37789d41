use ruint::aliases::U256;
use thiserror::Error;
use treasury_storage::StorageError;
use treasury_types::{Address, Operation, ProjectId};

/// Result type for controller operations.
pub type ControllerResult<T> = Result<T, ControllerError>;

/// Errors raised by the treasury controller.
#[derive(Error, Debug)]
pub enum ControllerError {
    // --- Validation errors ---
    #[error("mint amount must be greater than zero")]
    ZeroMintAmount,

    #[error("burn amount must be greater than zero")]
    ZeroBurnAmount,

    #[error("reserved rate {rate} exceeds maximum {max}")]
    InvalidReservedRate { rate: u32, max: u32 },

    #[error("redemption rate {rate} exceeds maximum {max}")]
    InvalidRedemptionRate { rate: u32, max: u32 },

    #[error("ballot redemption rate {rate} exceeds maximum {max}")]
    InvalidBallotRedemptionRate { rate: u32, max: u32 },

    #[error("distribution limit {amount} does not fit in 232 bits")]
    InvalidLimit { amount: U256 },

    #[error("distribution limit currency {currency} does not fit in 24 bits")]
    InvalidLimitCurrency { currency: u64 },

    #[error("overflow allowance {amount} does not fit in 232 bits")]
    InvalidAllowance { amount: U256 },

    #[error("overflow allowance currency {currency} does not fit in 24 bits")]
    InvalidAllowanceCurrency { currency: u64 },

    #[error("split group {group} totals {total}, above {max}")]
    InvalidSplitTotal { group: u64, total: u64, max: u64 },

    #[error("arithmetic overflow in {0}")]
    ArithmeticOverflow(&'static str),

    // --- Authorization errors ---
    #[error("{caller} lacks {operation} permission from {account} on project {project_id}")]
    PermissionDenied {
        caller: Address,
        account: Address,
        project_id: ProjectId,
        operation: Operation,
    },

    #[error("controller {controller} is not the current controller of project {project_id}")]
    NotCurrentController {
        project_id: ProjectId,
        controller: Address,
    },

    // --- Precondition errors ---
    #[error("project {0} already has funding cycles")]
    FundingCycleAlreadyLaunched(ProjectId),

    #[error("current funding cycle of project {0} does not allow controller migration")]
    MigrationNotAllowed(ProjectId),

    #[error("current funding cycle of project {0} does not allow minting")]
    MintingNotAllowed(ProjectId),

    #[error("burning is paused for project {0}")]
    BurnPausedForNonTerminal(ProjectId),

    #[error("project {0} is already controlled by this controller")]
    CannotMigrateToCurrentController(ProjectId),

    // --- Collaborator errors ---
    #[error("no allocator registered at {0}")]
    AllocatorNotFound(Address),

    #[error("allocator {allocator} failed: {reason}")]
    AllocationFailed { allocator: Address, reason: String },

    #[error("controller {to} rejected migration: {reason}")]
    MigrationRejected { to: Address, reason: String },

    #[error("invalid controller configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Broad classification of a [`ControllerError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input. Nothing was mutated.
    Validation,
    /// The caller may not perform the operation.
    Authorization,
    /// Project state forbids the operation right now.
    Precondition,
    /// A collaborator, callback or the configuration failed.
    Collaborator,
}

impl ControllerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ControllerError::ZeroMintAmount
            | ControllerError::ZeroBurnAmount
            | ControllerError::InvalidReservedRate { .. }
            | ControllerError::InvalidRedemptionRate { .. }
            | ControllerError::InvalidBallotRedemptionRate { .. }
            | ControllerError::InvalidLimit { .. }
            | ControllerError::InvalidLimitCurrency { .. }
            | ControllerError::InvalidAllowance { .. }
            | ControllerError::InvalidAllowanceCurrency { .. }
            | ControllerError::InvalidSplitTotal { .. }
            | ControllerError::ArithmeticOverflow(_) => ErrorKind::Validation,

            ControllerError::PermissionDenied { .. }
            | ControllerError::NotCurrentController { .. } => ErrorKind::Authorization,

            ControllerError::FundingCycleAlreadyLaunched(_)
            | ControllerError::MigrationNotAllowed(_)
            | ControllerError::MintingNotAllowed(_)
            | ControllerError::BurnPausedForNonTerminal(_)
            | ControllerError::CannotMigrateToCurrentController(_)
            | ControllerError::Storage(StorageError::InsufficientBalance { .. }) => {
                ErrorKind::Precondition
            }

            ControllerError::AllocatorNotFound(_)
            | ControllerError::AllocationFailed { .. }
            | ControllerError::MigrationRejected { .. }
            | ControllerError::Config(_)
            | ControllerError::Storage(_) => ErrorKind::Collaborator,
        }
    }
}

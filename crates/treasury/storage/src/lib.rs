//! Collaborator contracts for the treasury controller.
//!
//! The controller owns only its fund-access words and reserved-token
//! balances. Everything else lives with collaborators defined here:
//! - project ownership registry
//! - funding-cycle (configuration-versioning) store
//! - split lists
//! - token mint/burn ledger
//! - project directory (controller and terminals)
//! - operator permissions
//! - allocator callbacks and migration targets
//! - notification sink
//!
//! The `memory` module ships deterministic in-memory implementations of all
//! of them.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]
#![warn(rust_2018_idioms)]

mod error;
pub mod memory;
mod model;
mod traits;

pub use error::{CallbackError, CallbackResult, StorageError, StorageResult};
pub use model::{FundAccessKey, IssuedToken, ProjectRecord, TokenBalance};
pub use traits::{
    AllocatorRegistry, ControllerStateStore, EventSink, FundingCycleStore, MigrationTarget,
    OperatorStore, ProjectDirectory, ProjectRegistry, SplitAllocator, SplitsStore, TokenStore,
};

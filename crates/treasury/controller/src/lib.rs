//! # treasury-controller
//!
//! Treasury controller for multi-tenant projects:
//!
//! - **Permission gate**: ownership, operator delegation (per project or
//!   wildcard domain) and call-context overrides
//! - **Configuration ledger**: validated funding-cycle configurations with
//!   packed distribution limits and overflow allowances
//! - **Reserved token accountant**: mints that withhold the reserved rate,
//!   burns, and reserved-token distribution
//! - **Split distributor**: proportional payouts with allocator callbacks
//! - **Migration coordinator**: two-phase controller handoff
//!
//! ## Reentrancy
//!
//! Allocator callbacks and migration hooks run synchronously and may call
//! back into the controller. Controller state is committed before every such
//! call, and no store holds a lock across one.

#![deny(unsafe_code)]

pub mod config;
pub mod controller;
pub mod error;
pub mod gate;
pub mod ledger;
pub mod math;
pub mod migration;
pub mod reserved;
pub mod splits;

pub use config::ControllerConfig;
pub use controller::{Collaborators, Controller};
pub use error::{ControllerError, ControllerResult, ErrorKind};
pub use gate::{ControllerBinding, PermissionGate};
pub use ledger::{ConfigurationLedger, FundingCycleConfiguration};
pub use migration::MigrationCoordinator;
pub use reserved::{beneficiary_token_count, MintRequest, ReservedTokenAccountant};
pub use splits::{Destination, DistributionPlan, SplitDistributor};

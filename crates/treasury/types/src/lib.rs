//! # treasury-types
//!
//! Domain model shared by the treasury controller and its collaborators:
//!
//! - **Identifiers**: [`ProjectId`], [`ConfigurationId`], [`Address`]
//! - **Funding cycles**: immutable, versioned spending configurations with a
//!   bit-packed metadata word ([`PackedMetadata`])
//! - **Splits**: weighted recipients of proportional distributions
//! - **Fund-access constraints**: per terminal/token distribution limits and
//!   overflow allowances
//! - **Notifications**: the append-only [`ControllerEvent`] stream
//!
//! All 256-bit quantities are [`U256`] values.

#![deny(unsafe_code)]

pub mod constants;
pub mod event;
pub mod fund_access;
pub mod funding_cycle;
pub mod ids;
pub mod metadata;
pub mod operation;
pub mod split;

pub use constants::*;
pub use event::ControllerEvent;
pub use fund_access::FundAccessConstraint;
pub use funding_cycle::{BallotState, FundingCycle, FundingCycleData, ProjectMetadata};
pub use ids::{Address, ConfigurationId, ParseAddressError, ProjectId};
pub use metadata::{FundingCycleMetadata, GlobalMetadata, PackedMetadata};
pub use operation::Operation;
pub use ruint::aliases::{U256, U512};
pub use split::{Split, SplitAllocationData, SplitGroup};

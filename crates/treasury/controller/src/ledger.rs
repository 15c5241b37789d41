//! Configuration ledger.
//!
//! Validates and persists funding-cycle configurations together with their
//! split groups and fund-access constraints. Distribution limits and overflow
//! allowances are stored as one 256-bit word per (project, configuration,
//! terminal, token): the amount in the low 232 bits, the currency in the high
//! 24 bits. The packed form never leaves this module.

use std::sync::Arc;

use ruint::aliases::U256;
use tracing::{debug, info, warn};
use treasury_storage::{ControllerStateStore, EventSink, FundAccessKey, FundingCycleStore, SplitsStore};
use treasury_types::{
    Address, ConfigurationId, ControllerEvent, FundAccessConstraint, FundingCycle,
    FundingCycleData, FundingCycleMetadata, ProjectId, SplitGroup, LIMIT_AMOUNT_BITS,
    LIMIT_CURRENCY_BITS, MAX_BALLOT_REDEMPTION_RATE, MAX_REDEMPTION_RATE, MAX_RESERVED_RATE,
    SPLITS_TOTAL_PERCENT,
};

use crate::error::{ControllerError, ControllerResult};

/// Everything a launch or reconfiguration proposes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FundingCycleConfiguration {
    pub data: FundingCycleData,
    pub metadata: FundingCycleMetadata,
    pub must_start_at_or_after: u64,
    pub split_groups: Vec<SplitGroup>,
    pub fund_access_constraints: Vec<FundAccessConstraint>,
}

impl FundingCycleConfiguration {
    pub fn new(data: FundingCycleData, metadata: FundingCycleMetadata) -> Self {
        Self {
            data,
            metadata,
            ..Default::default()
        }
    }

    pub fn starting_at_or_after(mut self, timestamp: u64) -> Self {
        self.must_start_at_or_after = timestamp;
        self
    }

    pub fn with_split_group(mut self, group: SplitGroup) -> Self {
        self.split_groups.push(group);
        self
    }

    pub fn with_constraint(mut self, constraint: FundAccessConstraint) -> Self {
        self.fund_access_constraints.push(constraint);
        self
    }
}

fn max_amount() -> U256 {
    (U256::from(1u64) << LIMIT_AMOUNT_BITS) - U256::from(1u64)
}

const MAX_CURRENCY: u64 = (1 << LIMIT_CURRENCY_BITS) - 1;

fn pack_fund_access(amount: U256, currency: u64) -> U256 {
    amount | (U256::from(currency) << LIMIT_AMOUNT_BITS)
}

fn unpack_fund_access(word: U256) -> (U256, u64) {
    let amount = word & max_amount();
    let currency = (word >> LIMIT_AMOUNT_BITS).as_limbs()[0];
    (amount, currency)
}

pub struct ConfigurationLedger {
    funding_cycles: Arc<dyn FundingCycleStore>,
    splits: Arc<dyn SplitsStore>,
    state: Arc<dyn ControllerStateStore>,
    events: Arc<dyn EventSink>,
}

impl ConfigurationLedger {
    pub fn new(
        funding_cycles: Arc<dyn FundingCycleStore>,
        splits: Arc<dyn SplitsStore>,
        state: Arc<dyn ControllerStateStore>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            funding_cycles,
            splits,
            state,
            events,
        }
    }

    /// Validate, then persist a new configuration.
    ///
    /// All validation happens before the first write, so a rejected
    /// configuration leaves no trace in any store.
    pub fn configure(
        &self,
        caller: Address,
        project_id: ProjectId,
        configuration: &FundingCycleConfiguration,
    ) -> ControllerResult<FundingCycle> {
        if let Err(err) = Self::validate(configuration) {
            warn!(project = %project_id, error = %err, "Configuration rejected");
            return Err(err);
        }

        let cycle = self.funding_cycles.configure_for(
            project_id,
            configuration.data.clone(),
            configuration.metadata.pack(),
            configuration.must_start_at_or_after,
        )?;

        self.splits.set(
            project_id,
            cycle.configuration.as_u64(),
            &configuration.split_groups,
        )?;

        for constraint in &configuration.fund_access_constraints {
            let key = FundAccessKey::new(
                project_id,
                cycle.configuration,
                constraint.terminal,
                constraint.token,
            );
            if !constraint.distribution_limit.is_zero() {
                self.state.set_packed_distribution_limit_of(
                    key,
                    pack_fund_access(
                        constraint.distribution_limit,
                        constraint.distribution_limit_currency,
                    ),
                )?;
            }
            if !constraint.overflow_allowance.is_zero() {
                self.state.set_packed_overflow_allowance_of(
                    key,
                    pack_fund_access(
                        constraint.overflow_allowance,
                        constraint.overflow_allowance_currency,
                    ),
                )?;
            }
            debug!(
                project = %project_id,
                configuration = %cycle.configuration,
                terminal = %constraint.terminal,
                token = %constraint.token,
                "Fund access constraints set"
            );
            self.events.emit(ControllerEvent::SetFundAccessConstraints {
                configuration: cycle.configuration,
                funding_cycle_number: cycle.number,
                project_id,
                constraints: constraint.clone(),
                caller,
            })?;
        }

        info!(
            project = %project_id,
            configuration = %cycle.configuration,
            number = cycle.number,
            "Funding cycle configured"
        );
        Ok(cycle)
    }

    pub fn validate(configuration: &FundingCycleConfiguration) -> ControllerResult<()> {
        Self::validate_metadata(&configuration.metadata)?;
        for group in &configuration.split_groups {
            Self::validate_split_group(group)?;
        }
        for constraint in &configuration.fund_access_constraints {
            Self::validate_constraint(constraint)?;
        }
        Ok(())
    }

    fn validate_split_group(group: &SplitGroup) -> ControllerResult<()> {
        let total = group.total_percent();
        if total > SPLITS_TOTAL_PERCENT {
            return Err(ControllerError::InvalidSplitTotal {
                group: group.group,
                total,
                max: SPLITS_TOTAL_PERCENT,
            });
        }
        Ok(())
    }

    fn validate_metadata(metadata: &FundingCycleMetadata) -> ControllerResult<()> {
        if metadata.reserved_rate > MAX_RESERVED_RATE {
            return Err(ControllerError::InvalidReservedRate {
                rate: metadata.reserved_rate,
                max: MAX_RESERVED_RATE,
            });
        }
        if metadata.redemption_rate > MAX_REDEMPTION_RATE {
            return Err(ControllerError::InvalidRedemptionRate {
                rate: metadata.redemption_rate,
                max: MAX_REDEMPTION_RATE,
            });
        }
        if metadata.ballot_redemption_rate > MAX_BALLOT_REDEMPTION_RATE {
            return Err(ControllerError::InvalidBallotRedemptionRate {
                rate: metadata.ballot_redemption_rate,
                max: MAX_BALLOT_REDEMPTION_RATE,
            });
        }
        Ok(())
    }

    fn validate_constraint(constraint: &FundAccessConstraint) -> ControllerResult<()> {
        if constraint.distribution_limit > max_amount() {
            return Err(ControllerError::InvalidLimit {
                amount: constraint.distribution_limit,
            });
        }
        if constraint.distribution_limit_currency > MAX_CURRENCY {
            return Err(ControllerError::InvalidLimitCurrency {
                currency: constraint.distribution_limit_currency,
            });
        }
        if constraint.overflow_allowance > max_amount() {
            return Err(ControllerError::InvalidAllowance {
                amount: constraint.overflow_allowance,
            });
        }
        if constraint.overflow_allowance_currency > MAX_CURRENCY {
            return Err(ControllerError::InvalidAllowanceCurrency {
                currency: constraint.overflow_allowance_currency,
            });
        }
        Ok(())
    }

    /// `(amount, currency)` a terminal may distribute of `token` under a
    /// configuration. Unset records read as `(0, 0)`.
    pub fn distribution_limit_of(
        &self,
        project_id: ProjectId,
        configuration: ConfigurationId,
        terminal: Address,
        token: Address,
    ) -> ControllerResult<(U256, u64)> {
        let key = FundAccessKey::new(project_id, configuration, terminal, token);
        let word = self.state.packed_distribution_limit_of(&key)?;
        Ok(unpack_fund_access(word))
    }

    /// `(amount, currency)` of overflow a terminal may use. Unset records
    /// read as `(0, 0)`.
    pub fn overflow_allowance_of(
        &self,
        project_id: ProjectId,
        configuration: ConfigurationId,
        terminal: Address,
        token: Address,
    ) -> ControllerResult<(U256, u64)> {
        let key = FundAccessKey::new(project_id, configuration, terminal, token);
        let word = self.state.packed_overflow_allowance_of(&key)?;
        Ok(unpack_fund_access(word))
    }
}

use std::sync::Arc;

use ruint::aliases::U256;
use tracing::{info, warn};
use treasury_storage::{
    ControllerStateStore, EventSink, FundingCycleStore, ProjectDirectory, ProjectRegistry,
    TokenStore,
};
use treasury_types::{Address, ControllerEvent, FundingCycle, Operation, ProjectId, MAX_RESERVED_RATE};

use crate::error::{ControllerError, ControllerResult};
use crate::gate::{ControllerBinding, PermissionGate};
use crate::math::mul_div;
use crate::splits::{DistributionPlan, SplitDistributor};

/// Parameters of a mint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MintRequest {
    pub token_count: U256,
    pub beneficiary: Address,
    pub memo: String,
    pub prefer_claimed: bool,
    pub use_reserved_rate: bool,
}

impl MintRequest {
    pub fn new(token_count: U256, beneficiary: Address) -> Self {
        Self {
            token_count,
            beneficiary,
            memo: String::new(),
            prefer_claimed: false,
            use_reserved_rate: true,
        }
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = memo.into();
        self
    }

    pub fn prefer_claimed(mut self, prefer_claimed: bool) -> Self {
        self.prefer_claimed = prefer_claimed;
        self
    }

    pub fn use_reserved_rate(mut self, use_reserved_rate: bool) -> Self {
        self.use_reserved_rate = use_reserved_rate;
        self
    }
}

/// Beneficiary part of a mint under `reserved_rate`. The rest is reserved.
pub fn beneficiary_token_count(token_count: U256, reserved_rate: u32) -> ControllerResult<U256> {
    let max = U256::from(MAX_RESERVED_RATE);
    let rate = U256::from(reserved_rate.min(MAX_RESERVED_RATE));
    mul_div(token_count, max - rate, max).ok_or(ControllerError::ArithmeticOverflow("reserved rate"))
}

/// Tracks minted-but-undistributed reserved tokens and runs mints, burns and
/// reserved-token distributions.
pub struct ReservedTokenAccountant {
    gate: Arc<PermissionGate>,
    binding: Arc<ControllerBinding>,
    projects: Arc<dyn ProjectRegistry>,
    funding_cycles: Arc<dyn FundingCycleStore>,
    directory: Arc<dyn ProjectDirectory>,
    tokens: Arc<dyn TokenStore>,
    state: Arc<dyn ControllerStateStore>,
    events: Arc<dyn EventSink>,
    distributor: SplitDistributor,
    reserved_tokens_group: u64,
}

impl ReservedTokenAccountant {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        gate: Arc<PermissionGate>,
        binding: Arc<ControllerBinding>,
        projects: Arc<dyn ProjectRegistry>,
        funding_cycles: Arc<dyn FundingCycleStore>,
        directory: Arc<dyn ProjectDirectory>,
        tokens: Arc<dyn TokenStore>,
        state: Arc<dyn ControllerStateStore>,
        events: Arc<dyn EventSink>,
        distributor: SplitDistributor,
        reserved_tokens_group: u64,
    ) -> Self {
        Self {
            gate,
            binding,
            projects,
            funding_cycles,
            directory,
            tokens,
            state,
            events,
            distributor,
            reserved_tokens_group,
        }
    }

    fn current_cycle(&self, project_id: ProjectId) -> ControllerResult<FundingCycle> {
        Ok(self
            .funding_cycles
            .current_of(project_id)?
            .unwrap_or_else(FundingCycle::empty))
    }

    fn is_terminal(&self, project_id: ProjectId, caller: Address) -> ControllerResult<bool> {
        Ok(self.directory.is_terminal_of(project_id, caller)?)
    }

    fn is_terminal_or_data_source(
        &self,
        project_id: ProjectId,
        caller: Address,
        cycle: &FundingCycle,
    ) -> ControllerResult<bool> {
        if cycle.data_source() == Some(caller) {
            return Ok(true);
        }
        self.is_terminal(project_id, caller)
    }

    /// Mint tokens, withholding the current reserved rate's share.
    ///
    /// Returns the number of tokens minted to the beneficiary.
    pub fn mint_tokens_of(
        &self,
        caller: Address,
        project_id: ProjectId,
        request: &MintRequest,
    ) -> ControllerResult<U256> {
        if request.token_count.is_zero() {
            return Err(ControllerError::ZeroMintAmount);
        }
        self.binding.require_current(project_id)?;

        let cycle = self.current_cycle(project_id)?;
        let owner = self.projects.owner_of(project_id)?;

        self.gate
            .require_allowing_override(caller, owner, project_id, Operation::Mint, || {
                self.is_terminal_or_data_source(project_id, caller, &cycle)
            })?;

        if !cycle.minting_allowed() && !self.is_terminal_or_data_source(project_id, caller, &cycle)? {
            warn!(project = %project_id, caller = %caller, "Minting not allowed");
            return Err(ControllerError::MintingNotAllowed(project_id));
        }

        let reserved_rate = if request.use_reserved_rate {
            cycle.reserved_rate()
        } else {
            0
        };

        let beneficiary_count = if reserved_rate == MAX_RESERVED_RATE {
            U256::ZERO
        } else {
            let count = beneficiary_token_count(request.token_count, reserved_rate)?;
            self.tokens.mint_for(
                request.beneficiary,
                project_id,
                count,
                request.prefer_claimed || cycle.metadata.prefer_claimed_token_override(),
            )?;
            count
        };

        if reserved_rate > 0 {
            self.state
                .add_reserved_tokens(project_id, request.token_count - beneficiary_count)?;
        }

        self.events.emit(ControllerEvent::MintTokens {
            beneficiary: request.beneficiary,
            project_id,
            token_count: request.token_count,
            beneficiary_token_count: beneficiary_count,
            memo: request.memo.clone(),
            reserved_rate,
            caller,
        })?;

        info!(
            project = %project_id,
            beneficiary = %request.beneficiary,
            count = %request.token_count,
            beneficiary_count = %beneficiary_count,
            reserved_rate,
            "Tokens minted"
        );
        Ok(beneficiary_count)
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
        if token_count.is_zero() {
            return Err(ControllerError::ZeroBurnAmount);
        }
        self.binding.require_current(project_id)?;

        self.gate
            .require_allowing_override(caller, holder, project_id, Operation::Burn, || {
                self.is_terminal(project_id, caller)
            })?;

        let cycle = self.current_cycle(project_id)?;
        if cycle.burn_paused() && !self.is_terminal(project_id, caller)? {
            warn!(project = %project_id, caller = %caller, "Burn paused");
            return Err(ControllerError::BurnPausedForNonTerminal(project_id));
        }

        self.tokens
            .burn_from(holder, project_id, token_count, prefer_claimed)?;

        self.events.emit(ControllerEvent::BurnTokens {
            holder,
            project_id,
            token_count,
            memo: memo.to_string(),
            caller,
        })?;

        info!(project = %project_id, holder = %holder, count = %token_count, "Tokens burned");
        Ok(())
    }

    /// Distribute the whole reserved balance over the reserved-token split
    /// group and mint the leftover to the project owner.
    ///
    /// The split group is resolved before the balance is taken, and the
    /// balance is reset before any split is paid, so a callback that
    /// re-enters sees nothing left to distribute. If a payout fails, the
    /// part nobody received goes back to the reserved balance.
    pub fn distribute_reserved_tokens_of(
        &self,
        caller: Address,
        project_id: ProjectId,
        memo: &str,
    ) -> ControllerResult<U256> {
        self.binding.require_current(project_id)?;
        let cycle = self.current_cycle(project_id)?;
        let owner = self.projects.owner_of(project_id)?;
        let plan = self.distributor.plan(
            caller,
            project_id,
            cycle.configuration.as_u64(),
            self.reserved_tokens_group,
        )?;

        let token_count = self.state.take_reserved_tokens(project_id)?;

        let mut undistributed = token_count;
        let leftover = match self.settle(&plan, owner, token_count, &mut undistributed) {
            Ok(leftover) => leftover,
            Err(e) => {
                if !undistributed.is_zero() {
                    warn!(
                        project = %project_id,
                        restored = %undistributed,
                        error = %e,
                        "Reserved distribution failed"
                    );
                    self.state.add_reserved_tokens(project_id, undistributed)?;
                }
                return Err(e);
            }
        };

        self.events.emit(ControllerEvent::DistributeReservedTokens {
            configuration: cycle.configuration,
            funding_cycle_number: cycle.number,
            project_id,
            beneficiary: owner,
            token_count,
            beneficiary_token_count: leftover,
            memo: memo.to_string(),
            caller,
        })?;

        info!(
            project = %project_id,
            count = %token_count,
            leftover = %leftover,
            "Reserved tokens distributed"
        );
        Ok(token_count)
    }

    /// Pay the splits, then the owner. Returns the owner's share.
    fn settle(
        &self,
        plan: &DistributionPlan,
        owner: Address,
        token_count: U256,
        undistributed: &mut U256,
    ) -> ControllerResult<U256> {
        if !token_count.is_zero() {
            self.distributor.pay_out(plan, token_count, undistributed)?;
        }
        let leftover = *undistributed;
        if !leftover.is_zero() {
            self.tokens
                .mint_for(owner, plan.project_id(), leftover, false)?;
            *undistributed = U256::ZERO;
        }
        Ok(leftover)
    }

    pub fn reserved_token_balance_of(&self, project_id: ProjectId) -> ControllerResult<U256> {
        Ok(self.state.reserved_token_balance_of(project_id)?)
    }

    /// Token supply plus reserved tokens not yet distributed.
    pub fn total_outstanding_tokens_of(&self, project_id: ProjectId) -> ControllerResult<U256> {
        let supply = self.tokens.total_supply_of(project_id)?;
        let reserved = self.state.reserved_token_balance_of(project_id)?;
        supply
            .checked_add(reserved)
            .ok_or(ControllerError::ArithmeticOverflow("outstanding tokens"))
    }
}

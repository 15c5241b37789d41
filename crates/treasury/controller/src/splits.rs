use std::sync::Arc;

use ruint::aliases::U256;
use tracing::{debug, warn};
use treasury_storage::{
    AllocatorRegistry, EventSink, ProjectRegistry, SplitAllocator, SplitsStore, TokenStore,
};
use treasury_types::{
    Address, ControllerEvent, ProjectId, Split, SplitAllocationData, SPLITS_TOTAL_PERCENT,
};

use crate::error::{ControllerError, ControllerResult};
use crate::math::mul_div;

/// Where a split's share goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Destination {
    /// Minted to the allocator, which is then notified.
    Allocator(Address),
    /// Minted to the owner of the split's target project.
    ProjectOwner(ProjectId),
    Beneficiary(Address),
    /// Minted to whoever triggered the distribution.
    Fallback(Address),
}

impl Destination {
    /// Resolve by fixed priority: allocator, target project, beneficiary,
    /// then the triggering caller.
    pub fn resolve(split: &Split, caller: Address) -> Self {
        if let Some(allocator) = split.allocator.filter(|a| !a.is_zero()) {
            Destination::Allocator(allocator)
        } else if let Some(project_id) = split.project_id.filter(|p| p.as_u64() != 0) {
            Destination::ProjectOwner(project_id)
        } else if let Some(beneficiary) = split.beneficiary.filter(|b| !b.is_zero()) {
            Destination::Beneficiary(beneficiary)
        } else {
            Destination::Fallback(caller)
        }
    }
}

/// A split whose recipient has been resolved.
struct Payout {
    split: Split,
    recipient: Address,
    allocator: Option<Arc<dyn SplitAllocator>>,
}

/// A split group checked and resolved before any token moves.
///
/// Building a plan reads the group, checks that its percents fit in
/// [`SPLITS_TOTAL_PERCENT`] and looks up every allocator and target project
/// owner, so a bad group fails before a balance is taken.
pub struct DistributionPlan {
    caller: Address,
    project_id: ProjectId,
    domain: u64,
    group: u64,
    payouts: Vec<Payout>,
}

impl DistributionPlan {
    pub fn project_id(&self) -> ProjectId {
        self.project_id
    }

    pub fn len(&self) -> usize {
        self.payouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payouts.is_empty()
    }
}

/// Proportional payout engine over a project's split groups.
pub struct SplitDistributor {
    splits: Arc<dyn SplitsStore>,
    tokens: Arc<dyn TokenStore>,
    projects: Arc<dyn ProjectRegistry>,
    allocators: Arc<dyn AllocatorRegistry>,
    events: Arc<dyn EventSink>,
    allocation_decimals: u8,
}

impl SplitDistributor {
    pub fn new(
        splits: Arc<dyn SplitsStore>,
        tokens: Arc<dyn TokenStore>,
        projects: Arc<dyn ProjectRegistry>,
        allocators: Arc<dyn AllocatorRegistry>,
        events: Arc<dyn EventSink>,
        allocation_decimals: u8,
    ) -> Self {
        Self {
            splits,
            tokens,
            projects,
            allocators,
            events,
            allocation_decimals,
        }
    }

    pub fn plan(
        &self,
        caller: Address,
        project_id: ProjectId,
        domain: u64,
        group: u64,
    ) -> ControllerResult<DistributionPlan> {
        let splits = self.splits.splits_of(project_id, domain, group)?;

        let total = splits
            .iter()
            .fold(0u64, |total, s| total.saturating_add(s.percent));
        if total > SPLITS_TOTAL_PERCENT {
            warn!(project = %project_id, group, total, "Split group exceeds total percent");
            return Err(ControllerError::InvalidSplitTotal {
                group,
                total,
                max: SPLITS_TOTAL_PERCENT,
            });
        }

        let mut payouts = Vec::with_capacity(splits.len());
        for split in splits {
            let payout = match Destination::resolve(&split, caller) {
                Destination::Allocator(address) => {
                    let allocator = self
                        .allocators
                        .allocator_of(address)?
                        .ok_or(ControllerError::AllocatorNotFound(address))?;
                    Payout {
                        split,
                        recipient: address,
                        allocator: Some(allocator),
                    }
                }
                Destination::ProjectOwner(target) => Payout {
                    split,
                    recipient: self.projects.owner_of(target)?,
                    allocator: None,
                },
                Destination::Beneficiary(recipient) | Destination::Fallback(recipient) => Payout {
                    split,
                    recipient,
                    allocator: None,
                },
            };
            payouts.push(payout);
        }

        Ok(DistributionPlan {
            caller,
            project_id,
            domain,
            group,
            payouts,
        })
    }

    /// Distribute `amount` project tokens over one split group and return
    /// what is left over.
    ///
    /// Splits are processed in stored order. Each share is
    /// `floor(amount * percent / SPLITS_TOTAL_PERCENT)`, so the shares plus
    /// the leftover always add up to `amount`. Allocator callbacks run
    /// synchronously and may re-enter the controller.
    pub fn distribute(
        &self,
        caller: Address,
        project_id: ProjectId,
        domain: u64,
        group: u64,
        amount: U256,
    ) -> ControllerResult<U256> {
        let plan = self.plan(caller, project_id, domain, group)?;
        self.execute(&plan, amount)
    }

    pub fn execute(&self, plan: &DistributionPlan, amount: U256) -> ControllerResult<U256> {
        let mut leftover = amount;
        self.pay_out(plan, amount, &mut leftover)?;
        Ok(leftover)
    }

    /// Pay every split of `plan` its share of `amount`.
    ///
    /// `leftover` drops by each share as soon as the share is minted, so on
    /// error it still holds exactly the part of `amount` nobody received.
    pub(crate) fn pay_out(
        &self,
        plan: &DistributionPlan,
        amount: U256,
        leftover: &mut U256,
    ) -> ControllerResult<()> {
        let project_id = plan.project_id;

        for payout in &plan.payouts {
            let share = mul_div(amount, U256::from(payout.split.percent), U256::from(SPLITS_TOTAL_PERCENT))
                .ok_or(ControllerError::ArithmeticOverflow("split share"))?;
            if share > *leftover {
                return Err(ControllerError::ArithmeticOverflow("split share exceeds leftover"));
            }

            if !share.is_zero() {
                debug!(project = %project_id, recipient = %payout.recipient, amount = %share, "Paying split");
                self.tokens.mint_for(
                    payout.recipient,
                    project_id,
                    share,
                    payout.split.prefer_claimed,
                )?;
                *leftover -= share;

                if let Some(allocator) = &payout.allocator {
                    self.allocate(plan, payout, allocator.as_ref(), share)?;
                }
            }

            self.events.emit(ControllerEvent::DistributeToReservedTokenSplit {
                project_id,
                domain: plan.domain,
                group: plan.group,
                split: payout.split.clone(),
                token_count: share,
                caller: plan.caller,
            })?;
        }

        Ok(())
    }

    fn allocate(
        &self,
        plan: &DistributionPlan,
        payout: &Payout,
        allocator: &dyn SplitAllocator,
        share: U256,
    ) -> ControllerResult<()> {
        let project_id = plan.project_id;
        let address = payout.recipient;
        let data = SplitAllocationData {
            token: self.tokens.token_of(project_id)?,
            amount: share,
            decimals: self.allocation_decimals,
            project_id,
            group: plan.group,
            split: payout.split.clone(),
        };
        debug!(project = %project_id, allocator = %address, amount = %share, "Allocating split");
        allocator.allocate(data).map_err(|e| {
            warn!(project = %project_id, allocator = %address, error = %e, "Allocation failed");
            ControllerError::AllocationFailed {
                allocator: address,
                reason: e.to_string(),
            }
        })
    }
}

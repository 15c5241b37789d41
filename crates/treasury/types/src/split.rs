use ruint::aliases::U256;
use serde::{Deserialize, Serialize};

use crate::ids::{Address, ProjectId};

/// A weighted recipient of a proportional distribution.
///
/// `percent` is out of [`crate::SPLITS_TOTAL_PERCENT`]. The recipient is
/// resolved in order: allocator, then project (whose owner receives the
/// tokens), then beneficiary, then the distribution's fallback account.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    pub prefer_claimed: bool,
    pub prefer_add_to_balance: bool,
    pub percent: u64,
    pub project_id: Option<ProjectId>,
    pub beneficiary: Option<Address>,
    /// Timestamp before which the split cannot be removed from its group.
    pub lock_until: u64,
    pub allocator: Option<Address>,
}

impl Split {
    pub fn new(percent: u64) -> Self {
        Self {
            percent,
            ..Default::default()
        }
    }

    pub fn with_beneficiary(mut self, beneficiary: Address) -> Self {
        self.beneficiary = Some(beneficiary);
        self
    }

    pub fn with_project(mut self, project_id: ProjectId) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn with_allocator(mut self, allocator: Address) -> Self {
        self.allocator = Some(allocator);
        self
    }

    pub fn prefer_claimed(mut self, prefer_claimed: bool) -> Self {
        self.prefer_claimed = prefer_claimed;
        self
    }

    pub fn prefer_add_to_balance(mut self, prefer_add_to_balance: bool) -> Self {
        self.prefer_add_to_balance = prefer_add_to_balance;
        self
    }

    pub fn locked_until(mut self, lock_until: u64) -> Self {
        self.lock_until = lock_until;
        self
    }
}

/// The splits of one group, e.g. [`crate::split_groups::RESERVED_TOKENS`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitGroup {
    pub group: u64,
    pub splits: Vec<Split>,
}

impl SplitGroup {
    pub fn new(group: u64, splits: Vec<Split>) -> Self {
        Self { group, splits }
    }

    /// Sum of the group's percents, saturating at `u64::MAX`.
    pub fn total_percent(&self) -> u64 {
        self.splits
            .iter()
            .fold(0u64, |total, s| total.saturating_add(s.percent))
    }
}

/// Payload handed to an allocator after its share has been minted to it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitAllocationData {
    /// Token contract of the project, or `None` while only unclaimed
    /// balances exist.
    pub token: Option<Address>,
    pub amount: U256,
    pub decimals: u8,
    pub project_id: ProjectId,
    pub group: u64,
    pub split: Split,
}

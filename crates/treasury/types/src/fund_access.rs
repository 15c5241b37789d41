use ruint::aliases::U256;
use serde::{Deserialize, Serialize};

use crate::ids::Address;

/// Distribution limit and overflow allowance a configuration grants one
/// terminal for one token.
///
/// Amounts must fit in [`crate::LIMIT_AMOUNT_BITS`] bits and currencies in
/// [`crate::LIMIT_CURRENCY_BITS`] bits. A zero amount means no access.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundAccessConstraint {
    pub terminal: Address,
    pub token: Address,
    pub distribution_limit: U256,
    pub distribution_limit_currency: u64,
    pub overflow_allowance: U256,
    pub overflow_allowance_currency: u64,
}

impl FundAccessConstraint {
    pub fn new(terminal: Address, token: Address) -> Self {
        Self {
            terminal,
            token,
            ..Default::default()
        }
    }

    pub fn with_distribution_limit(mut self, amount: U256, currency: u64) -> Self {
        self.distribution_limit = amount;
        self.distribution_limit_currency = currency;
        self
    }

    pub fn with_overflow_allowance(mut self, amount: U256, currency: u64) -> Self {
        self.overflow_allowance = amount;
        self.overflow_allowance_currency = currency;
        self
    }
}

/// Denominator of the reserved rate. A reserved rate equal to this value
/// withholds every minted token.
pub const MAX_RESERVED_RATE: u32 = 10_000;

/// Denominator of the redemption rate.
pub const MAX_REDEMPTION_RATE: u32 = 10_000;

/// Denominator of the redemption rate applied while a ballot is active.
pub const MAX_BALLOT_REDEMPTION_RATE: u32 = 10_000;

/// Denominator of every split percent.
pub const SPLITS_TOTAL_PERCENT: u64 = 1_000_000_000;

/// Precision advertised to allocators in [`crate::SplitAllocationData`].
pub const ALLOCATION_DECIMALS: u8 = 18;

/// Width of the amount field in a packed fund-access word.
pub const LIMIT_AMOUNT_BITS: usize = 232;

/// Width of the currency field in a packed fund-access word.
pub const LIMIT_CURRENCY_BITS: usize = 24;

/// Operator permissions granted in this domain apply to every project.
pub const WILDCARD_DOMAIN: u64 = 0;

/// Well-known split groups.
pub mod split_groups {
    /// Treasury payouts made by terminals.
    pub const ETH_PAYOUT: u64 = 1;
    /// Reserved-token distribution.
    pub const RESERVED_TOKENS: u64 = 2;
}

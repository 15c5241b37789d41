//! Funding-cycle metadata and its 256-bit packed form.
//!
//! Layout of the packed word (bit 0 is least significant):
//!
//! | Bits    | Field                                |
//! |---------|--------------------------------------|
//! | 0-7     | layout version                       |
//! | 8-23    | global metadata                      |
//! | 24-39   | reserved rate                        |
//! | 40-55   | redemption rate                      |
//! | 56-71   | ballot redemption rate               |
//! | 72-83   | per-cycle flags                      |
//! | 84-243  | data source address                  |
//! | 244-255 | free-form metadata                   |

use ruint::aliases::U256;
use serde::{Deserialize, Serialize};

use crate::ids::Address;

const LAYOUT_VERSION: u64 = 1;

const GLOBAL_OFFSET: usize = 8;
const GLOBAL_BITS: usize = 16;
const RESERVED_RATE_OFFSET: usize = 24;
const REDEMPTION_RATE_OFFSET: usize = 40;
const BALLOT_REDEMPTION_RATE_OFFSET: usize = 56;
const RATE_BITS: usize = 16;

const PAUSE_PAY_BIT: usize = 72;
const PAUSE_DISTRIBUTIONS_BIT: usize = 73;
const PAUSE_REDEEM_BIT: usize = 74;
const PAUSE_BURN_BIT: usize = 75;
const ALLOW_MINTING_BIT: usize = 76;
const ALLOW_TERMINAL_MIGRATION_BIT: usize = 77;
const ALLOW_CONTROLLER_MIGRATION_BIT: usize = 78;
const HOLD_FEES_BIT: usize = 79;
const PREFER_CLAIMED_TOKEN_OVERRIDE_BIT: usize = 80;
const USE_TOTAL_OVERFLOW_FOR_REDEMPTIONS_BIT: usize = 81;
const USE_DATA_SOURCE_FOR_PAY_BIT: usize = 82;
const USE_DATA_SOURCE_FOR_REDEEM_BIT: usize = 83;

const DATA_SOURCE_OFFSET: usize = 84;
const DATA_SOURCE_BITS: usize = 160;
const METADATA_OFFSET: usize = 244;
const METADATA_BITS: usize = 12;

fn mask(bits: usize) -> U256 {
    (U256::from(1u64) << bits) - U256::from(1u64)
}

fn field(word: &U256, offset: usize, bits: usize) -> u64 {
    ((*word >> offset) & mask(bits)).as_limbs()[0]
}

/// Metadata that stays meaningful across every funding cycle of a project.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalMetadata {
    pub allow_set_terminals: bool,
    pub allow_set_controller: bool,
    pub pause_transfers: bool,
}

impl GlobalMetadata {
    pub fn pack(&self) -> u16 {
        (self.allow_set_terminals as u16)
            | ((self.allow_set_controller as u16) << 1)
            | ((self.pause_transfers as u16) << 2)
    }

    pub fn unpack(packed: u16) -> Self {
        Self {
            allow_set_terminals: packed & 1 == 1,
            allow_set_controller: (packed >> 1) & 1 == 1,
            pause_transfers: (packed >> 2) & 1 == 1,
        }
    }
}

/// Rates and flags attached to one funding-cycle configuration.
///
/// Rates are expressed against their `MAX_*` denominators. Callers validate
/// the rates before packing; `pack` keeps only the low 16 bits of each rate
/// and the low 12 bits of `metadata`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingCycleMetadata {
    pub global: GlobalMetadata,
    pub reserved_rate: u32,
    pub redemption_rate: u32,
    pub ballot_redemption_rate: u32,
    pub pause_pay: bool,
    pub pause_distributions: bool,
    pub pause_redeem: bool,
    pub pause_burn: bool,
    pub allow_minting: bool,
    pub allow_terminal_migration: bool,
    pub allow_controller_migration: bool,
    pub hold_fees: bool,
    pub prefer_claimed_token_override: bool,
    pub use_total_overflow_for_redemptions: bool,
    pub use_data_source_for_pay: bool,
    pub use_data_source_for_redeem: bool,
    pub data_source: Option<Address>,
    pub metadata: u16,
}

impl FundingCycleMetadata {
    /// Pack into the single storage word handed to the versioning store.
    pub fn pack(&self) -> PackedMetadata {
        let mut word = U256::from(LAYOUT_VERSION);
        word |= U256::from(self.global.pack()) << GLOBAL_OFFSET;
        word |= (U256::from(self.reserved_rate) & mask(RATE_BITS)) << RESERVED_RATE_OFFSET;
        word |= (U256::from(self.redemption_rate) & mask(RATE_BITS)) << REDEMPTION_RATE_OFFSET;
        word |= (U256::from(self.ballot_redemption_rate) & mask(RATE_BITS))
            << BALLOT_REDEMPTION_RATE_OFFSET;

        word.set_bit(PAUSE_PAY_BIT, self.pause_pay);
        word.set_bit(PAUSE_DISTRIBUTIONS_BIT, self.pause_distributions);
        word.set_bit(PAUSE_REDEEM_BIT, self.pause_redeem);
        word.set_bit(PAUSE_BURN_BIT, self.pause_burn);
        word.set_bit(ALLOW_MINTING_BIT, self.allow_minting);
        word.set_bit(ALLOW_TERMINAL_MIGRATION_BIT, self.allow_terminal_migration);
        word.set_bit(ALLOW_CONTROLLER_MIGRATION_BIT, self.allow_controller_migration);
        word.set_bit(HOLD_FEES_BIT, self.hold_fees);
        word.set_bit(
            PREFER_CLAIMED_TOKEN_OVERRIDE_BIT,
            self.prefer_claimed_token_override,
        );
        word.set_bit(
            USE_TOTAL_OVERFLOW_FOR_REDEMPTIONS_BIT,
            self.use_total_overflow_for_redemptions,
        );
        word.set_bit(USE_DATA_SOURCE_FOR_PAY_BIT, self.use_data_source_for_pay);
        word.set_bit(USE_DATA_SOURCE_FOR_REDEEM_BIT, self.use_data_source_for_redeem);

        if let Some(data_source) = self.data_source {
            word |= data_source.to_u256() << DATA_SOURCE_OFFSET;
        }
        word |= (U256::from(self.metadata) & mask(METADATA_BITS)) << METADATA_OFFSET;

        PackedMetadata(word)
    }
}

/// Packed metadata word as stored by the configuration-versioning store.
///
/// The all-zero word is the metadata of a project that was never configured:
/// every rate is zero and every flag is off.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackedMetadata(pub U256);

impl PackedMetadata {
    pub fn word(&self) -> U256 {
        self.0
    }

    pub fn version(&self) -> u8 {
        field(&self.0, 0, 8) as u8
    }

    pub fn global(&self) -> GlobalMetadata {
        GlobalMetadata::unpack(field(&self.0, GLOBAL_OFFSET, GLOBAL_BITS) as u16)
    }

    pub fn reserved_rate(&self) -> u32 {
        field(&self.0, RESERVED_RATE_OFFSET, RATE_BITS) as u32
    }

    pub fn redemption_rate(&self) -> u32 {
        field(&self.0, REDEMPTION_RATE_OFFSET, RATE_BITS) as u32
    }

    pub fn ballot_redemption_rate(&self) -> u32 {
        field(&self.0, BALLOT_REDEMPTION_RATE_OFFSET, RATE_BITS) as u32
    }

    pub fn pay_paused(&self) -> bool {
        self.0.bit(PAUSE_PAY_BIT)
    }

    pub fn distributions_paused(&self) -> bool {
        self.0.bit(PAUSE_DISTRIBUTIONS_BIT)
    }

    pub fn redeem_paused(&self) -> bool {
        self.0.bit(PAUSE_REDEEM_BIT)
    }

    pub fn burn_paused(&self) -> bool {
        self.0.bit(PAUSE_BURN_BIT)
    }

    pub fn minting_allowed(&self) -> bool {
        self.0.bit(ALLOW_MINTING_BIT)
    }

    pub fn terminal_migration_allowed(&self) -> bool {
        self.0.bit(ALLOW_TERMINAL_MIGRATION_BIT)
    }

    pub fn controller_migration_allowed(&self) -> bool {
        self.0.bit(ALLOW_CONTROLLER_MIGRATION_BIT)
    }

    pub fn should_hold_fees(&self) -> bool {
        self.0.bit(HOLD_FEES_BIT)
    }

    pub fn prefer_claimed_token_override(&self) -> bool {
        self.0.bit(PREFER_CLAIMED_TOKEN_OVERRIDE_BIT)
    }

    pub fn use_total_overflow_for_redemptions(&self) -> bool {
        self.0.bit(USE_TOTAL_OVERFLOW_FOR_REDEMPTIONS_BIT)
    }

    pub fn use_data_source_for_pay(&self) -> bool {
        self.0.bit(USE_DATA_SOURCE_FOR_PAY_BIT)
    }

    pub fn use_data_source_for_redeem(&self) -> bool {
        self.0.bit(USE_DATA_SOURCE_FOR_REDEEM_BIT)
    }

    /// The configuration's data source, if one is set.
    pub fn data_source(&self) -> Option<Address> {
        let word = (self.0 >> DATA_SOURCE_OFFSET) & mask(DATA_SOURCE_BITS);
        let address = Address::from_u256(word);
        (!address.is_zero()).then_some(address)
    }

    pub fn metadata(&self) -> u16 {
        field(&self.0, METADATA_OFFSET, METADATA_BITS) as u16
    }

    pub fn unpack(&self) -> FundingCycleMetadata {
        FundingCycleMetadata {
            global: self.global(),
            reserved_rate: self.reserved_rate(),
            redemption_rate: self.redemption_rate(),
            ballot_redemption_rate: self.ballot_redemption_rate(),
            pause_pay: self.pay_paused(),
            pause_distributions: self.distributions_paused(),
            pause_redeem: self.redeem_paused(),
            pause_burn: self.burn_paused(),
            allow_minting: self.minting_allowed(),
            allow_terminal_migration: self.terminal_migration_allowed(),
            allow_controller_migration: self.controller_migration_allowed(),
            hold_fees: self.should_hold_fees(),
            prefer_claimed_token_override: self.prefer_claimed_token_override(),
            use_total_overflow_for_redemptions: self.use_total_overflow_for_redemptions(),
            use_data_source_for_pay: self.use_data_source_for_pay(),
            use_data_source_for_redeem: self.use_data_source_for_redeem(),
            data_source: self.data_source(),
            metadata: self.metadata(),
        }
    }
}

use serde::{Deserialize, Serialize};
use treasury_types::{split_groups, Address, ALLOCATION_DECIMALS};

use crate::error::{ControllerError, ControllerResult};

/// Static configuration of one controller instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Address this controller is registered under in the project directory.
    pub address: Address,
    /// Precision advertised to allocators.
    pub allocation_decimals: u8,
    /// Split group reserved tokens are distributed over.
    pub reserved_tokens_group: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            address: Address::ZERO,
            allocation_decimals: ALLOCATION_DECIMALS,
            reserved_tokens_group: split_groups::RESERVED_TOKENS,
        }
    }
}

impl ControllerConfig {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> ControllerResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ControllerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ControllerResult<()> {
        if self.address.is_zero() {
            return Err(ControllerError::Config(
                "controller address cannot be the zero address".to_string(),
            ));
        }
        Ok(())
    }
}

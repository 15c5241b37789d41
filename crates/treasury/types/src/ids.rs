use std::str::FromStr;

use ruint::aliases::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Project identifier assigned by the project registry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectId(pub u64);

impl ProjectId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Version id of a project's funding-cycle configuration.
///
/// Ids are minted by the configuration-versioning store and strictly increase
/// per project. `ConfigurationId::NONE` marks a project that was never
/// configured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConfigurationId(pub u64);

impl ConfigurationId {
    pub const NONE: ConfigurationId = ConfigurationId(0);

    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn is_none(&self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for ConfigurationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 20-byte account address: owners, operators, terminals, controllers,
/// allocators and token contracts all share this space.
///
/// Serializes as a `0x`-prefixed hex string.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Address whose last eight bytes hold `value` in big-endian order.
    pub fn from_low_u64(value: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    pub fn repeat_byte(byte: u8) -> Self {
        Self([byte; 20])
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Left-pads the address into a 256-bit word.
    pub fn to_u256(&self) -> U256 {
        U256::from_be_slice(&self.0)
    }

    /// Takes the low 160 bits of a 256-bit word.
    pub fn from_u256(word: U256) -> Self {
        let bytes = word.to_be_bytes::<32>();
        let mut out = [0u8; 20];
        out.copy_from_slice(&bytes[12..]);
        Self(out)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x")?;
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Address({})", self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseAddressError {
    #[error("expected 40 hex digits, found {0}")]
    Length(usize),

    #[error("invalid hex digit in address")]
    InvalidHex,
}

impl FromStr for Address {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if !hex.is_ascii() {
            return Err(ParseAddressError::InvalidHex);
        }
        if hex.len() != 40 {
            return Err(ParseAddressError::Length(hex.len()));
        }
        let mut bytes = [0u8; 20];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[2 * i..2 * i + 2], 16)
                .map_err(|_| ParseAddressError::InvalidHex)?;
        }
        Ok(Self(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_display_is_prefixed_hex() {
        let addr = Address::from_low_u64(0xabcd);
        assert_eq!(
            addr.to_string(),
            "0x000000000000000000000000000000000000abcd"
        );
    }

    #[test]
    fn address_survives_word_conversion() {
        let addr = Address::repeat_byte(0x7f);
        assert_eq!(Address::from_u256(addr.to_u256()), addr);
        assert_eq!(Address::ZERO.to_u256(), U256::ZERO);
    }

    #[test]
    fn address_parses_with_or_without_prefix() {
        let addr = Address::from_low_u64(0xbeef);
        assert_eq!(addr.to_string().parse::<Address>().unwrap(), addr);
        assert_eq!(
            "000000000000000000000000000000000000BEEF".parse::<Address>().unwrap(),
            addr
        );
        assert_eq!("0x12".parse::<Address>(), Err(ParseAddressError::Length(2)));
        assert_eq!(
            "0xzz00000000000000000000000000000000000000".parse::<Address>(),
            Err(ParseAddressError::InvalidHex)
        );
    }

    #[test]
    fn address_serializes_as_hex_string() {
        let addr = Address::from_low_u64(1);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"0x0000000000000000000000000000000000000001\"");
        let restored: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, addr);
    }

    #[test]
    fn configuration_none_is_zero() {
        assert!(ConfigurationId::NONE.is_none());
        assert!(!ConfigurationId::new(7).is_none());
        assert!(ConfigurationId::new(7) > ConfigurationId::NONE);
    }

    #[test]
    fn project_id_serialization() {
        let json = serde_json::to_string(&ProjectId::new(42)).unwrap();
        assert_eq!(json, "42");
        let restored: ProjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, ProjectId(42));
    }
}

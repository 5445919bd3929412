//! Common types used throughout the keeper system.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Re-export the wide integer used for token amounts
pub use alloy_primitives::U256;

/// Unix timestamp in seconds
pub type Timestamp = u64;

/// Transaction hash as returned by the chain gateway
pub type TxHash = String;

/// 32-byte account address on the host chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; 32]);

impl Address {
	pub const ZERO: Address = Address([0u8; 32]);

	pub fn as_bytes(&self) -> &[u8; 32] {
		&self.0
	}

	pub fn to_hex(&self) -> String {
		hex::encode(self.0)
	}
}

impl From<[u8; 32]> for Address {
	fn from(bytes: [u8; 32]) -> Self {
		Address(bytes)
	}
}

impl fmt::Display for Address {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.to_hex())
	}
}

#[derive(Debug, thiserror::Error)]
#[error("invalid address: {0}")]
pub struct AddressParseError(String);

impl FromStr for Address {
	type Err = AddressParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let raw = s.strip_prefix("0x").unwrap_or(s);
		let bytes = hex::decode(raw).map_err(|e| AddressParseError(e.to_string()))?;
		if bytes.len() != 32 {
			return Err(AddressParseError(format!(
				"expected 32 bytes, got {}",
				bytes.len()
			)));
		}
		let mut out = [0u8; 32];
		out.copy_from_slice(&bytes);
		Ok(Address(out))
	}
}

impl Serialize for Address {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.to_hex())
	}
}

impl<'de> Deserialize<'de> for Address {
	fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let s = String::deserialize(deserializer)?;
		s.parse().map_err(serde::de::Error::custom)
	}
}

/// Opaque token identifier, e.g. `USDC-c76f1f`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(String);

impl TokenId {
	pub fn new(id: impl Into<String>) -> Self {
		TokenId(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn as_bytes(&self) -> &[u8] {
		self.0.as_bytes()
	}
}

impl fmt::Display for TokenId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<&str> for TokenId {
	fn from(s: &str) -> Self {
		TokenId(s.to_string())
	}
}

/// A fungible payment: some amount of one token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayment {
	pub token: TokenId,
	pub amount: U256,
}

impl TokenPayment {
	pub fn new(token: TokenId, amount: U256) -> Self {
		Self { token, amount }
	}
}

/// An outbound transfer the contract instructs the host chain to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenTransfer {
	pub to: Address,
	pub token: TokenId,
	pub amount: U256,
}

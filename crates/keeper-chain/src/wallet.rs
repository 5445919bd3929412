//! Operator signing key.

use crate::error::ChainError;
use ed25519_dalek::{Signer, SigningKey};
use keeper_types::Address;
use std::path::Path;

/// The executor's ed25519 signing identity, loaded from a hex key file.
///
/// Exactly one executor instance may hold this key against a given contract;
/// two instances sharing it collide on nonces.
pub struct OperatorWallet {
	key: SigningKey,
}

impl OperatorWallet {
	/// Load from a file containing 64 hex characters (optional 0x prefix,
	/// trailing whitespace tolerated).
	pub fn from_key_file(path: impl AsRef<Path>) -> Result<Self, ChainError> {
		let contents = std::fs::read_to_string(path.as_ref())
			.map_err(|e| ChainError::InvalidKey(format!("cannot read key file: {}", e)))?;
		Self::from_hex(contents.trim())
	}

	pub fn from_hex(hex_key: &str) -> Result<Self, ChainError> {
		let raw = hex_key.strip_prefix("0x").unwrap_or(hex_key);
		let bytes = hex::decode(raw).map_err(|e| ChainError::InvalidKey(e.to_string()))?;
		let seed: [u8; 32] = bytes
			.try_into()
			.map_err(|_| ChainError::InvalidKey("key must be 32 bytes".to_string()))?;
		Ok(Self {
			key: SigningKey::from_bytes(&seed),
		})
	}

	/// The operator's on-chain address (the ed25519 public key)
	pub fn address(&self) -> Address {
		Address(self.key.verifying_key().to_bytes())
	}

	pub fn sign(&self, message: &[u8]) -> [u8; 64] {
		self.key.sign(message).to_bytes()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use ed25519_dalek::{Signature, Verifier, VerifyingKey};

	const SEED_HEX: &str = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";

	#[test]
	fn derives_a_stable_address() {
		let wallet = OperatorWallet::from_hex(SEED_HEX).unwrap();
		let again = OperatorWallet::from_hex(&format!("0x{}", SEED_HEX)).unwrap();
		assert_eq!(wallet.address(), again.address());
		assert_ne!(wallet.address(), Address::ZERO);
	}

	#[test]
	fn signatures_verify_against_the_address() {
		let wallet = OperatorWallet::from_hex(SEED_HEX).unwrap();
		let message = b"executeLimitOrder@01@9b@03e8";
		let signature = Signature::from_bytes(&wallet.sign(message));

		let public = VerifyingKey::from_bytes(wallet.address().as_bytes()).unwrap();
		assert!(public.verify(message, &signature).is_ok());
		assert!(public.verify(b"tampered", &signature).is_err());
	}

	#[test]
	fn rejects_malformed_keys() {
		assert!(OperatorWallet::from_hex("abcd").is_err());
		assert!(OperatorWallet::from_hex("zz".repeat(32).as_str()).is_err());
	}
}

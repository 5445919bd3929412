//! Process-configured token decimals registry.

use crate::common::TokenId;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("token {0} is not configured in the registry")]
pub struct UnknownToken(pub TokenId);

/// Maps token identifiers to their decimals count.
///
/// Price construction is meaningless without decimals, so lookups fail hard
/// rather than defaulting.
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
	decimals: HashMap<TokenId, u8>,
}

impl TokenRegistry {
	pub fn new(entries: impl IntoIterator<Item = (TokenId, u8)>) -> Self {
		Self {
			decimals: entries.into_iter().collect(),
		}
	}

	pub fn decimals(&self, token: &TokenId) -> Result<u8, UnknownToken> {
		self.decimals
			.get(token)
			.copied()
			.ok_or_else(|| UnknownToken(token.clone()))
	}

	pub fn contains(&self, token: &TokenId) -> bool {
		self.decimals.contains_key(token)
	}

	pub fn len(&self) -> usize {
		self.decimals.len()
	}

	pub fn is_empty(&self) -> bool {
		self.decimals.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn lookup_known_and_unknown() {
		let registry = TokenRegistry::new([
			(TokenId::new("USDC-c76f1f"), 6),
			(TokenId::new("WEGLD-bd4d79"), 18),
		]);

		assert_eq!(registry.decimals(&TokenId::new("USDC-c76f1f")), Ok(6));
		assert_eq!(registry.decimals(&TokenId::new("WEGLD-bd4d79")), Ok(18));
		assert_eq!(
			registry.decimals(&TokenId::new("MEX-455c57")),
			Err(UnknownToken(TokenId::new("MEX-455c57")))
		);
	}
}

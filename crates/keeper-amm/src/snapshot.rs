//! Transient view of a pool's reserves.

use alloy_primitives::U256;
use keeper_price::PriceError;

/// Reserves of the configured pool at one observation, with the decimals
/// needed to derive a directional spot price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSnapshot {
	pub reserve_from: U256,
	pub reserve_to: U256,
	pub decimals_from: u8,
	pub decimals_to: u8,
}

impl PoolSnapshot {
	/// Spot price in the from -> to sense, decimals-adjusted
	pub fn spot_price(&self) -> Result<f64, PriceError> {
		keeper_price::spot_price(
			self.reserve_from,
			self.reserve_to,
			self.decimals_from,
			self.decimals_to,
		)
	}
}

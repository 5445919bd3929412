//! Limit order record and lifecycle states.

use crate::common::{Address, TokenId, U256};
use serde::{Deserialize, Serialize};

/// Contract-assigned order identifier, monotonically increasing from 1
pub type OrderId = u64;

/// Lifecycle state of a limit order.
///
/// `Pending` is the only non-terminal state; the discriminants are the
/// on-wire status bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
	Pending = 0,
	Executed = 1,
	Cancelled = 2,
	Expired = 3,
}

impl OrderStatus {
	pub fn as_byte(self) -> u8 {
		self as u8
	}

	pub fn from_byte(b: u8) -> Option<Self> {
		match b {
			0 => Some(OrderStatus::Pending),
			1 => Some(OrderStatus::Executed),
			2 => Some(OrderStatus::Cancelled),
			3 => Some(OrderStatus::Expired),
			_ => None,
		}
	}

	pub fn is_terminal(self) -> bool {
		!matches!(self, OrderStatus::Pending)
	}
}

/// A standing instruction to swap `from_amount` of `from_token` into
/// `to_token` once the spot price reaches the stored target.
///
/// The target price is an integer fraction already adjusted for token
/// decimals: `output_units = from_amount * target_num / target_denom`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
	pub order_id: OrderId,
	pub owner: Address,
	pub from_token: TokenId,
	pub from_amount: U256,
	pub to_token: TokenId,
	pub target_num: u64,
	pub target_denom: u64,
	/// Slippage tolerance in basis points (500 = 5%)
	pub slippage_bp: u16,
	pub created_at: u64,
	pub expires_at: u64,
	pub status: OrderStatus,
}

impl Order {
	pub fn is_expired(&self, now: u64) -> bool {
		now >= self.expires_at
	}

	/// Target price as a human decimal (output tokens per input token).
	///
	/// The stored fraction is a base-unit ratio; undoing the decimals
	/// adjustment makes it comparable with a decimals-adjusted spot price.
	pub fn target_price(&self, decimals_from: u8, decimals_to: u8) -> f64 {
		let ratio = self.target_num as f64 / self.target_denom as f64;
		ratio * 10f64.powi(decimals_from as i32 - decimals_to as i32)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn status_bytes_round_trip() {
		for status in [
			OrderStatus::Pending,
			OrderStatus::Executed,
			OrderStatus::Cancelled,
			OrderStatus::Expired,
		] {
			assert_eq!(OrderStatus::from_byte(status.as_byte()), Some(status));
		}
		assert_eq!(OrderStatus::from_byte(4), None);
	}

	#[test]
	fn only_pending_is_non_terminal() {
		assert!(!OrderStatus::Pending.is_terminal());
		assert!(OrderStatus::Executed.is_terminal());
		assert!(OrderStatus::Cancelled.is_terminal());
		assert!(OrderStatus::Expired.is_terminal());
	}

	#[test]
	fn expiry_boundary_is_inclusive() {
		let order = Order {
			order_id: 1,
			owner: Address::ZERO,
			from_token: TokenId::new("USDC-c76f1f"),
			from_amount: U256::from(10_000_000u64),
			to_token: TokenId::new("WEGLD-bd4d79"),
			target_num: 155_000_000_000_000,
			target_denom: 1_000,
			slippage_bp: 500,
			created_at: 1_000,
			expires_at: 4_600,
			status: OrderStatus::Pending,
		};
		assert!(!order.is_expired(4_599));
		assert!(order.is_expired(4_600));
	}

	#[test]
	fn target_price_undoes_the_decimals_adjustment() {
		let order = Order {
			order_id: 1,
			owner: Address::ZERO,
			from_token: TokenId::new("USDC-c76f1f"),
			from_amount: U256::from(10_000_000u64),
			to_token: TokenId::new("WEGLD-bd4d79"),
			target_num: 155_000_000_000_000,
			target_denom: 1_000,
			slippage_bp: 500,
			created_at: 0,
			expires_at: 1,
			status: OrderStatus::Pending,
		};
		assert!((order.target_price(6, 18) - 0.155).abs() < 1e-12);
	}
}

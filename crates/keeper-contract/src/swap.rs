//! Two-phase asynchronous swap plumbing.
//!
//! The pool lives on another shard: the call leaves in one transaction and
//! the outcome arrives in a later one. Phase A (`begin_execute`) persists an
//! in-flight marker and hands back the outbound call; phase B
//! (`settle_swap`) consumes the marker when the callback fires. All state
//! changes gated on swap success happen in phase B.

use alloy_primitives::U256;
use async_trait::async_trait;
use keeper_types::{Address, OrderId, TokenId, TokenPayment};

/// Outbound cross-shard call to the pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapCall {
	pub receiver: Address,
	pub payment: TokenPayment,
	pub payload: Vec<u8>,
}

/// Outcome delivered to the swap callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapResult {
	/// The pool delivered an output payment
	Output(TokenPayment),
	/// The pool refused the trade and returned the input payment
	Refund(TokenPayment),
	/// The call failed outright; the input payment comes back with it
	Error(String),
}

/// Marker persisted between phase A and phase B, keyed by order id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InFlightSwap {
	pub order_id: OrderId,
	pub owner: Address,
	pub executor: Address,
	pub from_token: TokenId,
	pub from_amount: U256,
	pub to_token: TokenId,
	pub min_out: U256,
	/// Executor-observed spot at trigger time; event payload only
	pub current_num: u64,
	pub current_denom: u64,
}

/// The pool's fixed-input swap endpoint.
///
/// Implementations map transport failures to [`SwapResult::Error`]; this
/// call does not fail at the type level because the contract converts every
/// outcome into order state, never into a caller-visible error.
#[async_trait]
pub trait SwapPool: Send + Sync {
	async fn swap_fixed_input(&self, call: SwapCall) -> SwapResult;
}

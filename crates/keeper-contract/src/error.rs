//! Contract error taxonomy.
//!
//! Validation and lifecycle failures reject the call and never mutate state.
//! Swap failures are not errors at this boundary: they become
//! `OrderExecutionFailed` events while the order stays pending.

use keeper_price::PriceError;
use keeper_types::OrderId;
use thiserror::Error;

pub const ERR_PAUSED: &str = "contract is paused";
pub const ERR_NO_PAYMENT: &str = "a fungible payment is required";
pub const ERR_NOT_WHITELISTED: &str = "token is not whitelisted";
pub const ERR_SAME_TOKEN: &str = "cannot swap a token to itself";
pub const ERR_ZERO_AMOUNT: &str = "amount must be greater than zero";
pub const ERR_ZERO_NUM: &str = "target price numerator must be positive";
pub const ERR_ZERO_DENOM: &str = "target price denominator must be positive";
pub const ERR_SLIPPAGE: &str = "slippage exceeds the configured maximum";
pub const ERR_DURATION: &str = "duration outside the configured bounds";
pub const ERR_NOT_OWNER: &str = "only the contract owner may call this";
pub const ERR_NOT_EXECUTOR: &str = "only the configured executor may execute";
pub const ERR_NOT_ORDER_OWNER: &str = "caller does not own this order";
pub const ERR_NO_POOL: &str = "no pool configured";
pub const ERR_HOLDINGS: &str = "insufficient contract holdings";
pub const ERR_FEE_TOO_HIGH: &str = "execution fee above the 500 bp cap";
pub const ERR_BAD_BOUNDS: &str = "invalid duration bounds";
pub const ERR_ALREADY_WHITELISTED: &str = "token already whitelisted";

pub const ERR_NOT_PENDING: &str = "order is not pending";
pub const ERR_EXPIRED: &str = "order has expired";
pub const ERR_IN_FLIGHT: &str = "a swap is already in flight for this order";
pub const ERR_NO_MARKER: &str = "no swap in flight for this order";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContractError {
	/// Bad input or wrong caller; the transaction is rejected untouched
	#[error("validation: {0}")]
	Validation(&'static str),

	/// Operation not valid in the order's current status
	#[error("lifecycle: {0}")]
	Lifecycle(&'static str),

	#[error("unknown order {0}")]
	UnknownOrder(OrderId),

	#[error(transparent)]
	Arithmetic(#[from] PriceError),
}

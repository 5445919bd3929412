//! Contract event log entries.
//!
//! Events are append-only and are the sole source of truth for external
//! indexers; the schema is part of the external interface and is versioned
//! like a wire protocol.

use crate::common::{Address, TokenId, U256};
use crate::order::{Order, OrderId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ContractEvent {
	OrderCreated {
		order: Order,
		timestamp: u64,
	},
	OrderExecuted {
		order_id: OrderId,
		owner: Address,
		from_token: TokenId,
		from_amount: U256,
		to_token: TokenId,
		output_amount: U256,
		/// Spot price observed by the executor at trigger time; informational
		/// only, never part of the trade economics.
		current_num: u64,
		current_denom: u64,
		timestamp: u64,
	},
	OrderExecutionFailed {
		order_id: OrderId,
		reason: String,
		timestamp: u64,
	},
	OrderCancelled {
		order_id: OrderId,
		owner: Address,
		token: TokenId,
		amount: U256,
		timestamp: u64,
	},
	OrderExpired {
		order_id: OrderId,
		owner: Address,
		token: TokenId,
		amount: U256,
		timestamp: u64,
	},
	TokenWhitelisted {
		token: TokenId,
	},
	TokenRemoved {
		token: TokenId,
	},
	PauseChanged {
		paused: bool,
	},
}

impl ContractEvent {
	/// Order the event refers to, if any
	pub fn order_id(&self) -> Option<OrderId> {
		match self {
			ContractEvent::OrderCreated { order, .. } => Some(order.order_id),
			ContractEvent::OrderExecuted { order_id, .. }
			| ContractEvent::OrderExecutionFailed { order_id, .. }
			| ContractEvent::OrderCancelled { order_id, .. }
			| ContractEvent::OrderExpired { order_id, .. } => Some(*order_id),
			_ => None,
		}
	}
}

//! Per-order retry deferral.
//!
//! The table is soft state: it only throttles the executor's own attempts.
//! Losing it on a crash is safe because the contract remains the source of
//! truth for what is still pending.

use dashmap::DashMap;
use keeper_types::OrderId;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub struct CooldownTable {
	entries: DashMap<OrderId, Instant>,
}

impl CooldownTable {
	pub fn new() -> Self {
		Self {
			entries: DashMap::new(),
		}
	}

	/// Record an attempt now
	pub fn mark(&self, order_id: OrderId) {
		self.entries.insert(order_id, Instant::now());
	}

	/// Whether the order is still inside its cooldown window
	pub fn is_cooling(&self, order_id: OrderId, window: Duration) -> bool {
		self.entries
			.get(&order_id)
			.map(|at| at.elapsed() < window)
			.unwrap_or(false)
	}

	/// Operator intervention: forget one order's attempt
	pub fn clear(&self, order_id: OrderId) -> bool {
		self.entries.remove(&order_id).is_some()
	}

	/// Operator intervention: forget everything
	pub fn clear_all(&self) {
		self.entries.clear();
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

//! Executor status shared with the HTTP API.
//!
//! The sweep updates individual fields with single atomic stores; the API
//! reads them without locks.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

#[derive(Debug)]
pub struct ExecutorStatus {
	enabled: bool,
	running: AtomicBool,
	attempted_count: AtomicU64,
	operator_address: String,
	contract_address: String,
	check_interval_ms: u64,
	cooldown_ms: u64,
}

/// Point-in-time view rendered by the status API
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
	pub running: bool,
	pub operator_address: String,
	pub check_interval_ms: u64,
	pub cooldown_ms: u64,
	pub attempted_count: u64,
	pub contract_address: String,
}

impl ExecutorStatus {
	pub fn new(
		enabled: bool,
		operator_address: String,
		contract_address: String,
		check_interval_ms: u64,
		cooldown_ms: u64,
	) -> Self {
		Self {
			enabled,
			running: AtomicBool::new(false),
			attempted_count: AtomicU64::new(0),
			operator_address,
			contract_address,
			check_interval_ms,
			cooldown_ms,
		}
	}

	/// Placeholder status for a disabled or misconfigured executor
	pub fn idle() -> Self {
		Self::new(false, String::new(), String::new(), 0, 0)
	}

	pub fn enabled(&self) -> bool {
		self.enabled
	}

	pub fn running(&self) -> bool {
		self.running.load(Ordering::Relaxed)
	}

	pub fn set_running(&self, running: bool) {
		self.running.store(running, Ordering::Relaxed);
	}

	pub fn set_attempted_count(&self, count: u64) {
		self.attempted_count.store(count, Ordering::Relaxed);
	}

	pub fn snapshot(&self) -> StatusSnapshot {
		StatusSnapshot {
			running: self.running(),
			operator_address: self.operator_address.clone(),
			check_interval_ms: self.check_interval_ms,
			cooldown_ms: self.cooldown_ms,
			attempted_count: self.attempted_count.load(Ordering::Relaxed),
			contract_address: self.contract_address.clone(),
		}
	}
}

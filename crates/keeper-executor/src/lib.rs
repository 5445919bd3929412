//! Off-chain executor: drives `executeLimitOrder` exactly when an order is
//! triggerable, throttled by per-order cooldowns.

pub mod cooldown;
pub mod service;
pub mod status;

pub use cooldown::CooldownTable;
pub use service::{
	ExecutorConfig, ExecutorService, DEFAULT_CHECK_INTERVAL, DEFAULT_CONFIRM_POLLS,
	DEFAULT_CONFIRM_POLL_INTERVAL, DEFAULT_COOLDOWN, DEFAULT_EXEC_GAS,
};
pub use status::{ExecutorStatus, StatusSnapshot};

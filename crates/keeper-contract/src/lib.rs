//! On-chain order book: custody, lifecycle and AMM integration.

pub mod contract;
pub mod error;
pub mod swap;

pub use contract::{
	CallContext, LimitOrderContract, DEFAULT_MAX_DURATION_S, DEFAULT_MIN_DURATION_S,
	MAX_EXECUTION_FEE_BP,
};
pub use error::ContractError;
pub use swap::{InFlightSwap, SwapCall, SwapPool, SwapResult};

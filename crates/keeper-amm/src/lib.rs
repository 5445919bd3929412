//! Single dependency boundary on the external AMM.
//!
//! Exactly two things cross this boundary: reading a pool's reserves, and
//! building the transfer-and-call payload for a fixed-input swap. Nothing
//! else about the AMM leaks into the rest of the system. The adapter never
//! searches for pairs; pool selection is the caller's configuration.

pub mod adapter;
pub mod payload;
pub mod snapshot;

pub use adapter::{AmmAdapter, AmmError, GatewayAmmAdapter};
pub use payload::build_swap_payload;
pub use snapshot::PoolSnapshot;

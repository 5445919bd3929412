//! Shared domain types for the limit-order keeper.

pub mod codec;
pub mod common;
pub mod events;
pub mod order;
pub mod registry;

pub use codec::*;
pub use common::*;
pub use events::*;
pub use order::*;
pub use registry::*;

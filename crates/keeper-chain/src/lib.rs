//! Chain boundary for the executor.
//!
//! Everything the executor knows about the host chain goes through the
//! [`ChainClient`] trait: reading contract state via VM queries and
//! submitting signed transactions. The production implementation speaks the
//! chain gateway's REST API; tests substitute mocks.

pub mod client;
pub mod error;
pub mod tx;
pub mod wallet;

pub use client::{ChainClient, GatewayClient, TxStatus};
pub use error::ChainError;
pub use tx::{execute_call_data, expire_call_data, Transaction};
pub use wallet::OperatorWallet;

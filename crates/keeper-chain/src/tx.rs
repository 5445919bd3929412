//! Transaction construction and signing for contract calls.
//!
//! Call data is the chain's `function@arg@arg` convention with minimal
//! big-endian hex arguments; the signature covers the canonical JSON
//! encoding of the transaction without its `signature` field.

use crate::error::ChainError;
use crate::wallet::OperatorWallet;
use base64::Engine;
use keeper_types::{Address, OrderId};
use serde::{Deserialize, Serialize};

pub const DEFAULT_GAS_PRICE: u64 = 1_000_000_000;
pub const TX_VERSION: u32 = 1;

/// A gateway transaction. Field order is the canonical signing order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
	pub nonce: u64,
	pub value: String,
	pub receiver: String,
	pub sender: String,
	#[serde(rename = "gasPrice")]
	pub gas_price: u64,
	#[serde(rename = "gasLimit")]
	pub gas_limit: u64,
	/// Base64 of the call data
	pub data: String,
	#[serde(rename = "chainID")]
	pub chain_id: String,
	pub version: u32,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub signature: Option<String>,
}

impl Transaction {
	/// Unsigned contract call carrying no payment
	pub fn contract_call(
		sender: &Address,
		receiver: &Address,
		nonce: u64,
		gas_limit: u64,
		chain_id: &str,
		call_data: &str,
	) -> Self {
		Self {
			nonce,
			value: "0".to_string(),
			receiver: receiver.to_hex(),
			sender: sender.to_hex(),
			gas_price: DEFAULT_GAS_PRICE,
			gas_limit,
			data: base64::engine::general_purpose::STANDARD.encode(call_data),
			chain_id: chain_id.to_string(),
			version: TX_VERSION,
			signature: None,
		}
	}

	/// Sign in place with the operator key
	pub fn sign(&mut self, wallet: &OperatorWallet) -> Result<(), ChainError> {
		self.signature = None;
		let canonical = serde_json::to_vec(self).map_err(|e| ChainError::Parse(e.to_string()))?;
		self.signature = Some(hex::encode(wallet.sign(&canonical)));
		Ok(())
	}
}

/// Minimal big-endian hex of an integer argument; empty for zero
fn arg_u64(value: u64) -> String {
	let bytes = value.to_be_bytes();
	let start = bytes.iter().position(|b| *b != 0).unwrap_or(8);
	hex::encode(&bytes[start..])
}

/// Call data for `executeLimitOrder(order_id, current_num, current_denom)`
pub fn execute_call_data(order_id: OrderId, current_num: u64, current_denom: u64) -> String {
	format!(
		"executeLimitOrder@{}@{}@{}",
		arg_u64(order_id),
		arg_u64(current_num),
		arg_u64(current_denom)
	)
}

/// Call data for `expireOrders(max)`
pub fn expire_call_data(max: u32) -> String {
	format!("expireOrders@{}", arg_u64(max as u64))
}

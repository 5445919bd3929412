//! Gateway REST client for contract reads and transaction submission.

use crate::error::ChainError;
use crate::tx::Transaction;
use async_trait::async_trait;
use base64::Engine;
use keeper_types::{codec::decode_order, Address, Order, OrderId, TxHash};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Gateway-reported transaction processing state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
	Pending,
	Success,
	Failed,
}

/// Everything the executor needs from the host chain
#[async_trait]
pub trait ChainClient: Send + Sync {
	/// Orders currently pending on the contract
	async fn get_pending_orders(&self, contract: &Address) -> Result<Vec<Order>, ChainError>;

	/// One order by id; `None` if the contract no longer knows it
	async fn get_order(
		&self,
		contract: &Address,
		order_id: OrderId,
	) -> Result<Option<Order>, ChainError>;

	async fn account_nonce(&self, address: &Address) -> Result<u64, ChainError>;

	async fn send_transaction(&self, tx: &Transaction) -> Result<TxHash, ChainError>;

	async fn transaction_status(&self, hash: &str) -> Result<TxStatus, ChainError>;
}

#[derive(Debug, Serialize)]
struct VmQueryRequest {
	#[serde(rename = "scAddress")]
	sc_address: String,
	#[serde(rename = "funcName")]
	func_name: String,
	args: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
	data: T,
}

#[derive(Debug, Deserialize)]
struct VmQueryData {
	data: VmQueryResult,
}

#[derive(Debug, Deserialize)]
struct VmQueryResult {
	#[serde(rename = "returnData", default)]
	return_data: Vec<String>,
	#[serde(rename = "returnCode")]
	return_code: String,
	#[serde(rename = "returnMessage", default)]
	return_message: String,
}

#[derive(Debug, Deserialize)]
struct NonceData {
	nonce: u64,
}

#[derive(Debug, Deserialize)]
struct SendData {
	#[serde(rename = "txHash")]
	tx_hash: String,
}

#[derive(Debug, Deserialize)]
struct StatusData {
	status: String,
}

/// REST implementation against the chain gateway
#[derive(Debug, Clone)]
pub struct GatewayClient {
	client: reqwest::Client,
	base_url: String,
}

impl GatewayClient {
	pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ChainError> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| ChainError::Network(e.to_string()))?;

		Ok(Self {
			client,
			base_url: base_url.into().trim_end_matches('/').to_string(),
		})
	}

	async fn vm_query(
		&self,
		contract: &Address,
		func_name: &str,
		args: Vec<String>,
	) -> Result<Vec<Vec<u8>>, ChainError> {
		let request = VmQueryRequest {
			sc_address: contract.to_hex(),
			func_name: func_name.to_string(),
			args,
		};

		let url = format!("{}/vm-values/query", self.base_url);
		debug!(func = func_name, "vm query");

		let response = self
			.client
			.post(&url)
			.json(&request)
			.send()
			.await
			.map_err(|e| ChainError::Network(e.to_string()))?
			.error_for_status()
			.map_err(|e| ChainError::Network(e.to_string()))?;

		let envelope: Envelope<VmQueryData> = response
			.json()
			.await
			.map_err(|e| ChainError::Parse(e.to_string()))?;

		decode_vm_result(&envelope.data.data)
	}
}

fn decode_vm_result(result: &VmQueryResult) -> Result<Vec<Vec<u8>>, ChainError> {
	if result.return_code != "ok" {
		return Err(ChainError::Gateway(format!(
			"{}: {}",
			result.return_code, result.return_message
		)));
	}

	result
		.return_data
		.iter()
		.map(|entry| {
			base64::engine::general_purpose::STANDARD
				.decode(entry)
				.map_err(|e| ChainError::Parse(e.to_string()))
		})
		.collect()
}

fn parse_tx_status(status: &str) -> TxStatus {
	match status {
		"success" | "executed" => TxStatus::Success,
		"fail" | "failed" | "invalid" => TxStatus::Failed,
		_ => TxStatus::Pending,
	}
}

#[async_trait]
impl ChainClient for GatewayClient {
	async fn get_pending_orders(&self, contract: &Address) -> Result<Vec<Order>, ChainError> {
		let entries = self.vm_query(contract, "getPendingOrders", vec![]).await?;
		entries
			.iter()
			.map(|bytes| decode_order(bytes).map_err(|e| ChainError::Parse(e.to_string())))
			.collect()
	}

	async fn get_order(
		&self,
		contract: &Address,
		order_id: OrderId,
	) -> Result<Option<Order>, ChainError> {
		let arg = {
			let bytes = order_id.to_be_bytes();
			let start = bytes.iter().position(|b| *b != 0).unwrap_or(8);
			hex::encode(&bytes[start..])
		};

		let entries = self.vm_query(contract, "getOrder", vec![arg]).await?;
		match entries.first() {
			None => Ok(None),
			Some(bytes) if bytes.is_empty() => Ok(None),
			Some(bytes) => decode_order(bytes)
				.map(Some)
				.map_err(|e| ChainError::Parse(e.to_string())),
		}
	}

	async fn account_nonce(&self, address: &Address) -> Result<u64, ChainError> {
		let url = format!("{}/address/{}/nonce", self.base_url, address.to_hex());
		let envelope: Envelope<NonceData> = self
			.client
			.get(&url)
			.send()
			.await
			.map_err(|e| ChainError::Network(e.to_string()))?
			.error_for_status()
			.map_err(|e| ChainError::Network(e.to_string()))?
			.json()
			.await
			.map_err(|e| ChainError::Parse(e.to_string()))?;

		Ok(envelope.data.nonce)
	}

	async fn send_transaction(&self, tx: &Transaction) -> Result<TxHash, ChainError> {
		let url = format!("{}/transaction/send", self.base_url);
		let envelope: Envelope<SendData> = self
			.client
			.post(&url)
			.json(tx)
			.send()
			.await
			.map_err(|e| ChainError::Network(e.to_string()))?
			.error_for_status()
			.map_err(|e| ChainError::Network(e.to_string()))?
			.json()
			.await
			.map_err(|e| ChainError::Parse(e.to_string()))?;

		Ok(envelope.data.tx_hash)
	}

	async fn transaction_status(&self, hash: &str) -> Result<TxStatus, ChainError> {
		let url = format!("{}/transaction/{}/status", self.base_url, hash);
		let envelope: Envelope<StatusData> = self
			.client
			.get(&url)
			.send()
			.await
			.map_err(|e| ChainError::Network(e.to_string()))?
			.error_for_status()
			.map_err(|e| ChainError::Network(e.to_string()))?
			.json()
			.await
			.map_err(|e| ChainError::Parse(e.to_string()))?;

		Ok(parse_tx_status(&envelope.data.status))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use keeper_types::{codec::encode_order, OrderStatus, TokenId, U256};

	fn b64(bytes: &[u8]) -> String {
		base64::engine::general_purpose::STANDARD.encode(bytes)
	}

	fn sample_order() -> Order {
		Order {
			order_id: 7,
			owner: Address([3u8; 32]),
			from_token: TokenId::new("USDC-c76f1f"),
			from_amount: U256::from(10_000_000u64),
			to_token: TokenId::new("WEGLD-bd4d79"),
			target_num: 155_000_000_000_000,
			target_denom: 1_000,
			slippage_bp: 500,
			created_at: 1_000,
			expires_at: 4_600,
			status: OrderStatus::Pending,
		}
	}

	#[test]
	fn vm_result_decodes_orders() {
		let order = sample_order();
		let result = VmQueryResult {
			return_data: vec![b64(&encode_order(&order))],
			return_code: "ok".to_string(),
			return_message: String::new(),
		};

		let entries = decode_vm_result(&result).unwrap();
		assert_eq!(decode_order(&entries[0]).unwrap(), order);
	}

	#[test]
	fn vm_error_surfaces_the_message() {
		let result = VmQueryResult {
			return_data: vec![],
			return_code: "user error".to_string(),
			return_message: "function not found".to_string(),
		};
		let err = decode_vm_result(&result).unwrap_err();
		assert!(err.to_string().contains("function not found"));
	}

	#[test]
	fn tx_status_mapping() {
		assert_eq!(parse_tx_status("success"), TxStatus::Success);
		assert_eq!(parse_tx_status("executed"), TxStatus::Success);
		assert_eq!(parse_tx_status("fail"), TxStatus::Failed);
		assert_eq!(parse_tx_status("invalid"), TxStatus::Failed);
		assert_eq!(parse_tx_status("pending"), TxStatus::Pending);
		assert_eq!(parse_tx_status("received"), TxStatus::Pending);
	}
}

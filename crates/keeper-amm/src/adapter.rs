//! Pool reserve queries against the chain gateway.

use alloy_primitives::U256;
use async_trait::async_trait;
use base64::Engine;
use keeper_types::Address;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum AmmError {
	#[error("pool unavailable: {0}")]
	PoolUnavailable(String),
}

/// Read boundary on the AMM
#[async_trait]
pub trait AmmAdapter: Send + Sync {
	/// Current reserves of the configured pool, in the pair's canonical
	/// token order. Orienting them to a trade direction is the caller's job.
	async fn get_reserves(&self, pool: &Address) -> Result<(U256, U256), AmmError>;
}

#[derive(Debug, Serialize)]
struct VmQueryRequest<'a> {
	#[serde(rename = "scAddress")]
	sc_address: String,
	#[serde(rename = "funcName")]
	func_name: &'a str,
	args: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct VmQueryEnvelope {
	data: VmQueryData,
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

/// Reserve reader backed by the gateway's VM query endpoint.
///
/// Stateless apart from the HTTP client and network configuration.
#[derive(Debug, Clone)]
pub struct GatewayAmmAdapter {
	client: reqwest::Client,
	base_url: String,
}

const RESERVES_FN: &str = "getReservesAndTotalSupply";

impl GatewayAmmAdapter {
	pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AmmError> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| AmmError::PoolUnavailable(e.to_string()))?;

		Ok(Self {
			client,
			base_url: base_url.into().trim_end_matches('/').to_string(),
		})
	}
}

#[async_trait]
impl AmmAdapter for GatewayAmmAdapter {
	async fn get_reserves(&self, pool: &Address) -> Result<(U256, U256), AmmError> {
		let request = VmQueryRequest {
			sc_address: pool.to_hex(),
			func_name: RESERVES_FN,
			args: vec![],
		};

		let url = format!("{}/vm-values/query", self.base_url);
		debug!(pool = %pool, url = %url, "querying pool reserves");

		let response = self
			.client
			.post(&url)
			.json(&request)
			.send()
			.await
			.map_err(|e| AmmError::PoolUnavailable(e.to_string()))?
			.error_for_status()
			.map_err(|e| AmmError::PoolUnavailable(e.to_string()))?;

		let envelope: VmQueryEnvelope = response
			.json()
			.await
			.map_err(|e| AmmError::PoolUnavailable(e.to_string()))?;

		decode_reserves(&envelope.data.data)
	}
}

fn decode_reserves(result: &VmQueryResult) -> Result<(U256, U256), AmmError> {
	if result.return_code != "ok" {
		return Err(AmmError::PoolUnavailable(format!(
			"vm query returned {}: {}",
			result.return_code, result.return_message
		)));
	}
	if result.return_data.len() < 2 {
		return Err(AmmError::PoolUnavailable(format!(
			"expected 2 reserve values, got {}",
			result.return_data.len()
		)));
	}

	let first = decode_magnitude(&result.return_data[0])?;
	let second = decode_magnitude(&result.return_data[1])?;
	Ok((first, second))
}

fn decode_magnitude(encoded: &str) -> Result<U256, AmmError> {
	let bytes = base64::engine::general_purpose::STANDARD
		.decode(encoded)
		.map_err(|e| AmmError::PoolUnavailable(format!("bad reserve encoding: {}", e)))?;
	if bytes.len() > 32 {
		return Err(AmmError::PoolUnavailable(format!(
			"reserve magnitude of {} bytes",
			bytes.len()
		)));
	}
	Ok(U256::from_be_slice(&bytes))
}

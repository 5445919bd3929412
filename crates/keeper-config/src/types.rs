//! Configuration types for the keeper service.

use keeper_types::{TokenId, TokenRegistry};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete keeper configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct KeeperConfig {
	/// Network endpoints
	#[serde(default)]
	pub chain: ChainSettings,
	/// Monitored contract and its pool
	#[serde(default)]
	pub contract: ContractSettings,
	/// Executor loop settings
	#[serde(default)]
	pub executor: ExecutorSettings,
	/// Status API settings
	#[serde(default)]
	pub api: ApiSettings,
	/// Token decimals registry
	#[serde(default)]
	pub tokens: Vec<TokenSettings>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChainSettings {
	/// Chain gateway REST endpoint
	pub rpc_url: String,
	/// Gateway used for AMM reserve queries (may equal `rpc_url`)
	pub amm_query_url: String,
	/// Chain identifier included in signed transactions
	pub chain_id: String,
	/// Per-request timeout in seconds
	pub request_timeout_s: u64,
}

impl Default for ChainSettings {
	fn default() -> Self {
		Self {
			rpc_url: "http://localhost:7950".to_string(),
			amm_query_url: "http://localhost:7950".to_string(),
			chain_id: "D".to_string(),
			request_timeout_s: 10,
		}
	}
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ContractSettings {
	/// Limit-order contract to monitor (hex)
	pub address: Option<String>,
	/// Pool backing all swaps (hex)
	pub pool: Option<String>,
	/// The pool's token pair in its canonical reserve order
	#[serde(default)]
	pub pool_tokens: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExecutorSettings {
	/// When false the executor stays idle while the status API still runs
	pub enabled: bool,
	/// Sweep period in seconds
	pub check_interval_s: u64,
	/// Per-order retry deferral in seconds
	pub cooldown_s: u64,
	/// Gas budget for execute, sized for the cross-shard call + callback
	pub exec_gas: u64,
	/// File containing the operator's hex signing key
	pub operator_key_path: Option<PathBuf>,
}

impl Default for ExecutorSettings {
	fn default() -> Self {
		Self {
			enabled: true,
			check_interval_s: 30,
			cooldown_s: 300,
			exec_gas: 80_000_000,
			operator_key_path: None,
		}
	}
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiSettings {
	pub port: u16,
}

impl Default for ApiSettings {
	fn default() -> Self {
		Self { port: 8080 }
	}
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenSettings {
	pub id: String,
	pub decimals: u8,
}

impl KeeperConfig {
	/// Build the registry the price math depends on
	pub fn token_registry(&self) -> TokenRegistry {
		TokenRegistry::new(
			self.tokens
				.iter()
				.map(|t| (TokenId::new(t.id.clone()), t.decimals)),
		)
	}
}

//! Component wiring.

use anyhow::{Context, Result};
use keeper_amm::GatewayAmmAdapter;
use keeper_chain::{GatewayClient, OperatorWallet};
use keeper_config::{ConfigLoader, KeeperConfig};
use keeper_executor::{ExecutorConfig, ExecutorService, ExecutorStatus};
use keeper_types::{Address, TokenId};
use std::sync::Arc;
use std::time::Duration;

/// The assembled service: an optional executor plus the status cell the API
/// reads either way.
#[derive(Clone)]
pub struct KeeperService {
	pub status: Arc<ExecutorStatus>,
	pub executor: Option<Arc<ExecutorService>>,
}

impl KeeperService {
	/// API-only service, used when the executor is disabled or its
	/// configuration is unusable
	pub fn idle() -> Self {
		Self {
			status: Arc::new(ExecutorStatus::idle()),
			executor: None,
		}
	}
}

/// Build the executor from configuration. Fails when the executor is enabled
/// but lacks its contract address, pool or operator key.
pub fn build(config: &KeeperConfig) -> Result<KeeperService> {
	if !config.executor.enabled {
		return Ok(KeeperService::idle());
	}

	ConfigLoader::validate(config).context("executor configuration invalid")?;

	let contract: Address = config
		.contract
		.address
		.as_deref()
		.context("contract address missing")?
		.parse()
		.context("contract address malformed")?;
	let pool: Address = config
		.contract
		.pool
		.as_deref()
		.context("pool address missing")?
		.parse()
		.context("pool address malformed")?;

	let pool_pair = match config.contract.pool_tokens.as_slice() {
		[first, second] => (TokenId::new(first.clone()), TokenId::new(second.clone())),
		_ => anyhow::bail!("pool token pair missing"),
	};

	let key_path = config
		.executor
		.operator_key_path
		.as_ref()
		.context("operator key path missing")?;
	let wallet = OperatorWallet::from_key_file(key_path).context("cannot load operator key")?;

	let timeout = Duration::from_secs(config.chain.request_timeout_s);
	let chain = GatewayClient::new(config.chain.rpc_url.clone(), timeout)
		.context("cannot build gateway client")?;
	let amm = GatewayAmmAdapter::new(config.chain.amm_query_url.clone(), timeout)
		.context("cannot build AMM adapter")?;

	let mut executor_config =
		ExecutorConfig::new(contract, pool, pool_pair, config.chain.chain_id.clone());
	executor_config.check_interval = Duration::from_secs(config.executor.check_interval_s);
	executor_config.cooldown = Duration::from_secs(config.executor.cooldown_s);
	executor_config.exec_gas = config.executor.exec_gas;

	let executor = Arc::new(ExecutorService::new(
		executor_config,
		Arc::new(chain),
		Arc::new(amm),
		wallet,
		config.token_registry(),
	));

	Ok(KeeperService {
		status: executor.status(),
		executor: Some(executor),
	})
}

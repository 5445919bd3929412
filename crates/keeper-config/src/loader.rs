//! Configuration loading: optional TOML file, then environment overrides.

use crate::types::*;
use crate::ConfigError;
use std::path::Path;
use tracing::{debug, info};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
	/// Load from a TOML file
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<KeeperConfig, ConfigError> {
		let path = path.as_ref();
		info!("loading configuration from {:?}", path);

		let contents = std::fs::read_to_string(path)
			.map_err(|e| ConfigError::Io(path.display().to_string(), e.to_string()))?;
		Self::from_toml(&contents)
	}

	pub fn from_toml(contents: &str) -> Result<KeeperConfig, ConfigError> {
		toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
	}

	/// File (if given) plus environment overrides. Not validated: the
	/// service degrades to API-only on executor misconfiguration instead of
	/// refusing to parse its config.
	pub fn from_env_and_file(file_path: Option<&Path>) -> Result<KeeperConfig, ConfigError> {
		let mut config = match file_path {
			Some(path) => Self::from_file(path)?,
			None => KeeperConfig::default(),
		};

		Self::apply_overrides(&mut config, |name| std::env::var(name).ok())?;
		Ok(config)
	}

	/// Apply the documented environment variables through `lookup`
	pub fn apply_overrides(
		config: &mut KeeperConfig,
		lookup: impl Fn(&str) -> Option<String>,
	) -> Result<(), ConfigError> {
		if let Some(url) = lookup("CHAIN_RPC_URL") {
			config.chain.rpc_url = url;
		}
		if let Some(url) = lookup("AMM_QUERY_URL") {
			config.chain.amm_query_url = url;
		}
		if let Some(id) = lookup("CHAIN_ID") {
			config.chain.chain_id = id;
		}
		if let Some(addr) = lookup("CONTRACT_ADDRESS") {
			config.contract.address = Some(addr);
		}
		if let Some(addr) = lookup("POOL_ADDRESS") {
			config.contract.pool = Some(addr);
		}
		if let Some(pair) = lookup("POOL_TOKENS") {
			config.contract.pool_tokens = pair.split(',').map(|t| t.trim().to_string()).collect();
		}
		if let Some(path) = lookup("OPERATOR_KEY_PATH") {
			config.executor.operator_key_path = Some(path.into());
		}

		if let Some(raw) = lookup("CHECK_INTERVAL_S") {
			config.executor.check_interval_s = parse_u64("CHECK_INTERVAL_S", &raw)?;
		}
		if let Some(raw) = lookup("COOLDOWN_S") {
			config.executor.cooldown_s = parse_u64("COOLDOWN_S", &raw)?;
		}
		if let Some(raw) = lookup("EXEC_GAS") {
			config.executor.exec_gas = parse_u64("EXEC_GAS", &raw)?;
		}
		if let Some(raw) = lookup("ENABLE_EXECUTOR") {
			config.executor.enabled = parse_bool("ENABLE_EXECUTOR", &raw)?;
		}
		if let Some(raw) = lookup("STATUS_API_PORT") {
			config.api.port = raw
				.parse()
				.map_err(|_| ConfigError::EnvVar("STATUS_API_PORT", raw))?;
		}

		Ok(())
	}

	/// Reject configurations the service cannot run with. A missing contract
	/// address or key file is fatal for the executor at startup; the status
	/// API will still come up reporting `running = false`.
	pub fn validate(config: &KeeperConfig) -> Result<(), ConfigError> {
		if config.executor.enabled {
			if config.contract.address.is_none() {
				return Err(ConfigError::Validation(
					"executor enabled but CONTRACT_ADDRESS is not set".to_string(),
				));
			}
			if config.contract.pool.is_none() {
				return Err(ConfigError::Validation(
					"executor enabled but POOL_ADDRESS is not set".to_string(),
				));
			}
			if config.executor.operator_key_path.is_none() {
				return Err(ConfigError::Validation(
					"executor enabled but OPERATOR_KEY_PATH is not set".to_string(),
				));
			}
			if config.contract.pool_tokens.len() != 2 {
				return Err(ConfigError::Validation(
					"POOL_TOKENS must name exactly the pool's two tokens".to_string(),
				));
			}
			if config.executor.check_interval_s == 0 {
				return Err(ConfigError::Validation(
					"CHECK_INTERVAL_S must be positive".to_string(),
				));
			}
		}

		let mut seen = std::collections::HashSet::new();
		for token in &config.tokens {
			if token.decimals > 30 {
				return Err(ConfigError::Validation(format!(
					"token {} has implausible decimals {}",
					token.id, token.decimals
				)));
			}
			if !seen.insert(token.id.as_str()) {
				return Err(ConfigError::Validation(format!(
					"token {} configured twice",
					token.id
				)));
			}
		}

		Ok(())
	}
}

fn parse_u64(name: &'static str, raw: &str) -> Result<u64, ConfigError> {
	raw.parse()
		.map_err(|_| ConfigError::EnvVar(name, raw.to_string()))
}

fn parse_bool(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
	match raw.to_ascii_lowercase().as_str() {
		"true" | "1" | "yes" => Ok(true),
		"false" | "0" | "no" => Ok(false),
		_ => Err(ConfigError::EnvVar(name, raw.to_string())),
	}
}

/// Load and validate from the standard locations: `KEEPER_CONFIG` if set,
/// else a plain environment-driven default.
pub fn load_config() -> Result<KeeperConfig, ConfigError> {
	let config = if let Ok(path) = std::env::var("KEEPER_CONFIG") {
		debug!("using config file from KEEPER_CONFIG");
		ConfigLoader::from_env_and_file(Some(Path::new(&path)))?
	} else {
		ConfigLoader::from_env_and_file(None)?
	};

	ConfigLoader::validate(&config)?;
	Ok(config)
}

//! Keeper configuration.
//!
//! Environment-first, matching how the service is deployed: every knob has a
//! variable name and a default, and an optional TOML file (`KEEPER_CONFIG`)
//! supplies the token registry plus any overridable defaults. Environment
//! variables win over the file.

mod loader;
mod types;

pub use loader::{load_config, ConfigLoader};
pub use types::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("cannot read config file {0}: {1}")]
	Io(String, String),

	#[error("cannot parse config: {0}")]
	Parse(String),

	#[error("invalid value for {0}: {1}")]
	EnvVar(&'static str, String),

	#[error("invalid configuration: {0}")]
	Validation(String),
}

//! Chain boundary errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
	#[error("network error: {0}")]
	Network(String),

	#[error("parse error: {0}")]
	Parse(String),

	#[error("gateway rejected the request: {0}")]
	Gateway(String),

	#[error("invalid operator key: {0}")]
	InvalidKey(String),
}

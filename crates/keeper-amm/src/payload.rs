//! Swap call payload construction.

use alloy_primitives::U256;
use keeper_types::TokenId;

/// Pool endpoint performing a fixed-input swap that reverts below `min_out`
pub const SWAP_FIXED_INPUT_FN: &str = "swapTokensFixedInput";

/// Builtin that attaches a fungible payment to a contract call
const TOKEN_TRANSFER_FN: &str = "TokenTransfer";

/// Minimal big-endian hex of a magnitude; empty string for zero
fn magnitude_hex(value: U256) -> String {
	let bytes = value.to_be_bytes::<32>();
	let start = bytes.iter().position(|b| *b != 0).unwrap_or(32);
	hex::encode(&bytes[start..])
}

/// Build the transfer-and-call payload that, submitted to the pool address,
/// attaches `from_amount` of `from_token` and invokes the fixed-input swap.
/// The pool reverts (returning the input) unless it can deliver at least
/// `min_out` of `to_token`.
pub fn build_swap_payload(
	from_token: &TokenId,
	from_amount: U256,
	to_token: &TokenId,
	min_out: U256,
) -> Vec<u8> {
	let payload = format!(
		"{}@{}@{}@{}@{}@{}",
		TOKEN_TRANSFER_FN,
		hex::encode(from_token.as_bytes()),
		magnitude_hex(from_amount),
		hex::encode(SWAP_FIXED_INPUT_FN.as_bytes()),
		hex::encode(to_token.as_bytes()),
		magnitude_hex(min_out),
	);
	payload.into_bytes()
}

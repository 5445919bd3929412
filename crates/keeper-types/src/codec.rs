//! Wire codec for order records.
//!
//! Orders cross the contract boundary as nested big-endian bytes: fixed-width
//! scalars for ids and timestamps, 4-byte length prefixes for tokens and
//! magnitudes, and a raw 32-byte owner. Magnitudes are minimal big-endian
//! (zero encodes as an empty byte string). The field order is normative and
//! must match between the contract emitter and the executor decoder; note
//! that `status` sits between `expires_at` and `created_at`.

use crate::common::{Address, TokenId, U256};
use crate::order::{Order, OrderStatus};
use bytes::{Buf, BufMut, BytesMut};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
	#[error("unexpected end of input while reading {0}")]
	UnexpectedEof(&'static str),

	#[error("{0} magnitude of {1} bytes exceeds its width")]
	Overflow(&'static str, usize),

	#[error("invalid status byte {0}")]
	InvalidStatus(u8),

	#[error("token identifier is not valid UTF-8")]
	InvalidTokenId,

	#[error("{0} trailing bytes after order record")]
	TrailingBytes(usize),
}

/// Minimal big-endian bytes of a 256-bit magnitude; empty for zero
fn u256_magnitude(value: &U256) -> Vec<u8> {
	let bytes = value.to_be_bytes::<32>();
	let start = bytes.iter().position(|b| *b != 0).unwrap_or(32);
	bytes[start..].to_vec()
}

fn u64_magnitude(value: u64) -> Vec<u8> {
	let bytes = value.to_be_bytes();
	let start = bytes.iter().position(|b| *b != 0).unwrap_or(8);
	bytes[start..].to_vec()
}

fn put_prefixed(buf: &mut BytesMut, bytes: &[u8]) {
	buf.put_u32(bytes.len() as u32);
	buf.put_slice(bytes);
}

/// Encode an order into its normative wire representation
pub fn encode_order(order: &Order) -> Vec<u8> {
	let mut buf = BytesMut::with_capacity(128);

	buf.put_u64(order.order_id);
	buf.put_slice(order.owner.as_bytes());
	put_prefixed(&mut buf, order.from_token.as_bytes());
	put_prefixed(&mut buf, &u256_magnitude(&order.from_amount));
	put_prefixed(&mut buf, order.to_token.as_bytes());
	put_prefixed(&mut buf, &u64_magnitude(order.target_num));
	put_prefixed(&mut buf, &u64_magnitude(order.target_denom));
	buf.put_u64(order.slippage_bp as u64);
	buf.put_u64(order.expires_at);
	buf.put_u8(order.status.as_byte());
	buf.put_u64(order.created_at);

	buf.to_vec()
}

struct Reader<'a> {
	buf: &'a [u8],
}

impl<'a> Reader<'a> {
	fn need(&self, n: usize, field: &'static str) -> Result<(), CodecError> {
		if self.buf.remaining() < n {
			return Err(CodecError::UnexpectedEof(field));
		}
		Ok(())
	}

	fn u64(&mut self, field: &'static str) -> Result<u64, CodecError> {
		self.need(8, field)?;
		Ok(self.buf.get_u64())
	}

	fn u8(&mut self, field: &'static str) -> Result<u8, CodecError> {
		self.need(1, field)?;
		Ok(self.buf.get_u8())
	}

	fn fixed32(&mut self, field: &'static str) -> Result<[u8; 32], CodecError> {
		self.need(32, field)?;
		let mut out = [0u8; 32];
		self.buf.copy_to_slice(&mut out);
		Ok(out)
	}

	fn prefixed(&mut self, field: &'static str) -> Result<Vec<u8>, CodecError> {
		self.need(4, field)?;
		let len = self.buf.get_u32() as usize;
		self.need(len, field)?;
		let mut out = vec![0u8; len];
		self.buf.copy_to_slice(&mut out);
		Ok(out)
	}

	fn token(&mut self, field: &'static str) -> Result<TokenId, CodecError> {
		let raw = self.prefixed(field)?;
		let s = String::from_utf8(raw).map_err(|_| CodecError::InvalidTokenId)?;
		Ok(TokenId::new(s))
	}

	fn magnitude_u256(&mut self, field: &'static str) -> Result<U256, CodecError> {
		let raw = self.prefixed(field)?;
		if raw.len() > 32 {
			return Err(CodecError::Overflow(field, raw.len()));
		}
		Ok(U256::from_be_slice(&raw))
	}

	fn magnitude_u64(&mut self, field: &'static str) -> Result<u64, CodecError> {
		let raw = self.prefixed(field)?;
		if raw.len() > 8 {
			return Err(CodecError::Overflow(field, raw.len()));
		}
		let mut out = 0u64;
		for b in raw {
			out = (out << 8) | b as u64;
		}
		Ok(out)
	}
}

/// Decode an order from its wire representation, rejecting trailing bytes
pub fn decode_order(bytes: &[u8]) -> Result<Order, CodecError> {
	let mut r = Reader { buf: bytes };

	let order_id = r.u64("order_id")?;
	let owner = Address(r.fixed32("owner")?);
	let from_token = r.token("from_token")?;
	let from_amount = r.magnitude_u256("from_amount")?;
	let to_token = r.token("to_token")?;
	let target_num = r.magnitude_u64("target_num")?;
	let target_denom = r.magnitude_u64("target_denom")?;

	let slippage = r.u64("slippage_bp")?;
	if slippage > u16::MAX as u64 {
		return Err(CodecError::Overflow("slippage_bp", 8));
	}
	let expires_at = r.u64("expires_at")?;
	let status_byte = r.u8("status")?;
	let status = OrderStatus::from_byte(status_byte).ok_or(CodecError::InvalidStatus(status_byte))?;
	let created_at = r.u64("created_at")?;

	if r.buf.has_remaining() {
		return Err(CodecError::TrailingBytes(r.buf.remaining()));
	}

	Ok(Order {
		order_id,
		owner,
		from_token,
		from_amount,
		to_token,
		target_num,
		target_denom,
		slippage_bp: slippage as u16,
		created_at,
		expires_at,
		status,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample_order() -> Order {
		Order {
			order_id: 42,
			owner: Address([0xabu8; 32]),
			from_token: TokenId::new("USDC-c76f1f"),
			from_amount: U256::from(10_000_000u64),
			to_token: TokenId::new("WEGLD-bd4d79"),
			target_num: 155_000_000_000_000,
			target_denom: 1_000,
			slippage_bp: 500,
			created_at: 1_700_000_000,
			expires_at: 1_700_003_600,
			status: OrderStatus::Pending,
		}
	}

	#[test]
	fn encode_decode_identity() {
		let order = sample_order();
		let bytes = encode_order(&order);
		let decoded = decode_order(&bytes).unwrap();
		assert_eq!(decoded, order);
	}

	#[test]
	fn zero_amount_encodes_empty_magnitude() {
		let mut order = sample_order();
		order.from_amount = U256::ZERO;
		let bytes = encode_order(&order);
		let decoded = decode_order(&bytes).unwrap();
		assert_eq!(decoded.from_amount, U256::ZERO);
	}

	#[test]
	fn golden_layout() {
		let order = sample_order();
		let bytes = encode_order(&order);

		// order_id, big-endian u64
		assert_eq!(&bytes[..8], &42u64.to_be_bytes());
		// owner, raw 32 bytes with no prefix
		assert_eq!(&bytes[8..40], &[0xabu8; 32]);
		// from_token length prefix
		assert_eq!(&bytes[40..44], &(11u32).to_be_bytes());
		assert_eq!(&bytes[44..55], b"USDC-c76f1f");

		// status byte sits between expires_at and created_at at the tail
		let n = bytes.len();
		assert_eq!(&bytes[n - 8..], &1_700_000_000u64.to_be_bytes());
		assert_eq!(bytes[n - 9], OrderStatus::Pending.as_byte());
		assert_eq!(&bytes[n - 17..n - 9], &1_700_003_600u64.to_be_bytes());
		assert_eq!(&bytes[n - 25..n - 17], &500u64.to_be_bytes());
	}

	#[test]
	fn truncated_input_is_rejected() {
		let bytes = encode_order(&sample_order());
		for cut in [0, 7, 39, 43, 54, bytes.len() - 1] {
			assert!(decode_order(&bytes[..cut]).is_err(), "cut at {}", cut);
		}
	}

	#[test]
	fn trailing_bytes_are_rejected() {
		let mut bytes = encode_order(&sample_order());
		bytes.push(0);
		assert_eq!(decode_order(&bytes), Err(CodecError::TrailingBytes(1)));
	}

	#[test]
	fn bad_status_byte_is_rejected() {
		let order = sample_order();
		let mut bytes = encode_order(&order);
		let n = bytes.len();
		bytes[n - 9] = 9;
		assert_eq!(decode_order(&bytes), Err(CodecError::InvalidStatus(9)));
	}

	#[test]
	fn oversized_price_magnitude_is_rejected() {
		let order = sample_order();
		let mut bytes = encode_order(&order);

		// widen target_num's length prefix past 8 bytes
		let token_end = 8 + 32 + 4 + 11 + 4 + u256_len(&order.from_amount) + 4 + 12;
		let num_len_at = token_end;
		bytes[num_len_at..num_len_at + 4].copy_from_slice(&9u32.to_be_bytes());
		assert!(matches!(
			decode_order(&bytes),
			Err(CodecError::Overflow("target_num", 9)) | Err(CodecError::UnexpectedEof(_))
		));
	}

	fn u256_len(v: &U256) -> usize {
		super::u256_magnitude(v).len()
	}
}

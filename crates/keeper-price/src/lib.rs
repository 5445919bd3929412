//! Decimal-correct price arithmetic.
//!
//! User-facing prices are human decimals (0.155 of token B per 1 of token A);
//! all contract arithmetic is integer. This crate translates between the two:
//! a decimal price becomes an integer `(numerator, denominator)` fraction
//! already adjusted for the decimals of both tokens, so that
//! `output_units = input_units * num / denom` lands directly in the output
//! token's base units. Construction keeps both integers inside the 2^53 safe
//! range; minimum-output amounts are computed with 256-bit arithmetic.

use alloy_primitives::U256;
use thiserror::Error;

/// Largest integer exactly representable in an f64
const MAX_SAFE_INTEGER: u64 = 1 << 53;

const BP_DENOM: u64 = 10_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriceError {
	#[error("price not representable for this token pair")]
	PriceOutOfRange,

	#[error("pool reserve is zero")]
	ZeroReserve,

	#[error("input amount is zero")]
	ZeroInput,

	#[error("slippage {0} exceeds 10000 basis points")]
	InvalidSlippage(u16),
}

/// A rational price, decimals-adjusted, with both terms in the 2^53 range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceFraction {
	pub num: u64,
	pub denom: u64,
}

impl PriceFraction {
	/// Build from raw integer terms, rejecting a zero denominator and terms
	/// outside the safe range.
	pub fn new(num: u64, denom: u64) -> Result<Self, PriceError> {
		if denom == 0 || num > MAX_SAFE_INTEGER || denom > MAX_SAFE_INTEGER {
			return Err(PriceError::PriceOutOfRange);
		}
		Ok(Self { num, denom })
	}

	/// Translate a human decimal price into the integer fraction consumed by
	/// the contract.
	///
	/// With `delta = decimals_to - decimals_from`, picks
	/// `PRECISION = min(6, 15 - |delta|)` and produces
	/// `num = floor(p * 10^(PRECISION + delta))` over `denom = 10^PRECISION`,
	/// so `num / denom == p * 10^delta` up to `10^-PRECISION`.
	pub fn from_decimal(p: f64, decimals_from: u8, decimals_to: u8) -> Result<Self, PriceError> {
		if !p.is_finite() || p <= 0.0 {
			return Err(PriceError::PriceOutOfRange);
		}

		let delta = decimals_to as i32 - decimals_from as i32;
		let precision = 6.min(15 - delta.abs());
		if precision < 0 {
			return Err(PriceError::PriceOutOfRange);
		}

		let scaled = p * 10f64.powi(precision + delta);
		if !scaled.is_finite() || scaled >= MAX_SAFE_INTEGER as f64 {
			return Err(PriceError::PriceOutOfRange);
		}

		let num = scaled.floor() as u64;
		if num == 0 {
			// the pair's decimals gap swallowed the whole price
			return Err(PriceError::PriceOutOfRange);
		}

		Ok(Self {
			num,
			denom: 10u64.pow(precision as u32),
		})
	}

	pub fn as_f64(&self) -> f64 {
		self.num as f64 / self.denom as f64
	}
}

/// Minimum acceptable swap output: `from_amount * num / denom` discounted by
/// the slippage tolerance, all in wide-integer arithmetic.
pub fn min_out(
	from_amount: U256,
	num: u64,
	denom: u64,
	slippage_bp: u16,
) -> Result<U256, PriceError> {
	if from_amount.is_zero() {
		return Err(PriceError::ZeroInput);
	}
	if denom == 0 {
		return Err(PriceError::PriceOutOfRange);
	}
	if slippage_bp as u64 > BP_DENOM {
		return Err(PriceError::InvalidSlippage(slippage_bp));
	}

	let expected = from_amount
		.checked_mul(U256::from(num))
		.ok_or(PriceError::PriceOutOfRange)?
		/ U256::from(denom);

	let discounted = expected
		.checked_mul(U256::from(BP_DENOM - slippage_bp as u64))
		.ok_or(PriceError::PriceOutOfRange)?
		/ U256::from(BP_DENOM);

	Ok(discounted)
}

/// Spot price from pool reserves, adjusted for token decimals. Used only for
/// the trigger comparison, never for trade economics.
pub fn spot_price(
	reserve_from: U256,
	reserve_to: U256,
	decimals_from: u8,
	decimals_to: u8,
) -> Result<f64, PriceError> {
	if reserve_from.is_zero() || reserve_to.is_zero() {
		return Err(PriceError::ZeroReserve);
	}

	let from = u256_to_f64(&reserve_from) / 10f64.powi(decimals_from as i32);
	let to = u256_to_f64(&reserve_to) / 10f64.powi(decimals_to as i32);
	Ok(to / from)
}

fn u256_to_f64(value: &U256) -> f64 {
	value
		.as_limbs()
		.iter()
		.rev()
		.fold(0.0, |acc, &limb| acc * 2f64.powi(64) + limb as f64)
}

//! The limit-order contract engine.
//!
//! Custodies deposits, assigns monotonically increasing order ids, enforces
//! the Pending -> Executed | Cancelled | Expired state machine and performs
//! swaps through the AMM boundary. Each endpoint models one host-chain
//! transaction: it takes a [`CallContext`] and either mutates state
//! atomically or rejects without touching it. Outbound token movements are
//! queued as payouts for the host to perform; emitted events are the
//! external indexing interface.

use crate::error::*;
use crate::swap::{InFlightSwap, SwapCall, SwapPool, SwapResult};
use alloy_primitives::U256;
use keeper_amm::build_swap_payload;
use keeper_types::{
	Address, ContractEvent, Order, OrderId, OrderStatus, TokenId, TokenPayment, TokenTransfer,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info, warn};

/// Transaction context supplied by the host chain
#[derive(Debug, Clone)]
pub struct CallContext {
	pub caller: Address,
	pub now: u64,
	pub payment: Option<TokenPayment>,
}

impl CallContext {
	pub fn new(caller: Address, now: u64) -> Self {
		Self {
			caller,
			now,
			payment: None,
		}
	}

	pub fn with_payment(caller: Address, now: u64, payment: TokenPayment) -> Self {
		Self {
			caller,
			now,
			payment: Some(payment),
		}
	}
}

pub const DEFAULT_MIN_DURATION_S: u64 = 60;
pub const DEFAULT_MAX_DURATION_S: u64 = 30 * 24 * 3_600;
pub const MAX_EXECUTION_FEE_BP: u16 = 500;

const BP_DENOM: u64 = 10_000;

pub struct LimitOrderContract {
	owner: Address,
	paused: bool,
	max_slippage_bp: u16,
	executor: Address,
	pool: Address,
	whitelist: HashSet<TokenId>,
	min_duration_s: u64,
	max_duration_s: u64,
	execution_fee_bp: u16,

	next_order_id: OrderId,
	orders: BTreeMap<OrderId, Order>,
	user_orders: HashMap<Address, Vec<OrderId>>,
	/// Custody ledger: the contract's own balance per token
	holdings: HashMap<TokenId, U256>,
	in_flight: HashMap<OrderId, InFlightSwap>,

	events: Vec<ContractEvent>,
	payouts: Vec<TokenTransfer>,
}

impl LimitOrderContract {
	/// Deploy-time init. The deployer owns the contract and doubles as the
	/// executor until `set_executor` is called.
	pub fn new(
		owner: Address,
		max_slippage_bp: u16,
		initial_tokens: impl IntoIterator<Item = TokenId>,
	) -> Self {
		Self {
			owner,
			paused: false,
			max_slippage_bp,
			executor: owner,
			pool: Address::ZERO,
			whitelist: initial_tokens.into_iter().collect(),
			min_duration_s: DEFAULT_MIN_DURATION_S,
			max_duration_s: DEFAULT_MAX_DURATION_S,
			execution_fee_bp: 0,
			next_order_id: 1,
			orders: BTreeMap::new(),
			user_orders: HashMap::new(),
			holdings: HashMap::new(),
			in_flight: HashMap::new(),
			events: Vec::new(),
			payouts: Vec::new(),
		}
	}

	// ---- user endpoints ----

	/// Create a limit order. Payable: the attached payment is the input side
	/// of the future swap and stays custodied until execution, cancellation
	/// or expiry.
	pub fn create_limit_order(
		&mut self,
		ctx: &CallContext,
		to_token: TokenId,
		target_num: u64,
		target_denom: u64,
		slippage_bp: u16,
		duration_s: u64,
	) -> Result<OrderId, ContractError> {
		if self.paused {
			return Err(ContractError::Validation(ERR_PAUSED));
		}

		let payment = ctx
			.payment
			.as_ref()
			.ok_or(ContractError::Validation(ERR_NO_PAYMENT))?;

		if !self.whitelist.contains(&payment.token) || !self.whitelist.contains(&to_token) {
			return Err(ContractError::Validation(ERR_NOT_WHITELISTED));
		}
		if payment.token == to_token {
			return Err(ContractError::Validation(ERR_SAME_TOKEN));
		}
		if payment.amount.is_zero() {
			return Err(ContractError::Validation(ERR_ZERO_AMOUNT));
		}
		if target_num == 0 {
			return Err(ContractError::Validation(ERR_ZERO_NUM));
		}
		if target_denom == 0 {
			return Err(ContractError::Validation(ERR_ZERO_DENOM));
		}
		if slippage_bp > self.max_slippage_bp {
			return Err(ContractError::Validation(ERR_SLIPPAGE));
		}
		if duration_s < self.min_duration_s || duration_s > self.max_duration_s {
			return Err(ContractError::Validation(ERR_DURATION));
		}

		let order_id = self.next_order_id;
		self.next_order_id += 1;

		let order = Order {
			order_id,
			owner: ctx.caller,
			from_token: payment.token.clone(),
			from_amount: payment.amount,
			to_token,
			target_num,
			target_denom,
			slippage_bp,
			created_at: ctx.now,
			expires_at: ctx.now + duration_s,
			status: OrderStatus::Pending,
		};

		self.credit(&order.from_token, order.from_amount);
		self.user_orders.entry(ctx.caller).or_default().push(order_id);
		self.events.push(ContractEvent::OrderCreated {
			order: order.clone(),
			timestamp: ctx.now,
		});
		self.orders.insert(order_id, order);

		info!(order_id, owner = %ctx.caller, "limit order created");
		Ok(order_id)
	}

	/// Cancel one of the caller's pending orders and refund the deposit.
	/// Available while the contract is paused.
	pub fn cancel_limit_order(
		&mut self,
		ctx: &CallContext,
		order_id: OrderId,
	) -> Result<(), ContractError> {
		let order = self
			.orders
			.get(&order_id)
			.ok_or(ContractError::UnknownOrder(order_id))?;

		if order.owner != ctx.caller {
			return Err(ContractError::Validation(ERR_NOT_ORDER_OWNER));
		}
		if order.status != OrderStatus::Pending {
			return Err(ContractError::Lifecycle(ERR_NOT_PENDING));
		}
		if self.in_flight.contains_key(&order_id) {
			return Err(ContractError::Lifecycle(ERR_IN_FLIGHT));
		}

		let (owner, token, amount) = (order.owner, order.from_token.clone(), order.from_amount);
		self.debit(&token, amount)?;
		self.payouts.push(TokenTransfer {
			to: owner,
			token: token.clone(),
			amount,
		});
		self.set_status(order_id, OrderStatus::Cancelled);
		self.events.push(ContractEvent::OrderCancelled {
			order_id,
			owner,
			token,
			amount,
			timestamp: ctx.now,
		});

		info!(order_id, "limit order cancelled");
		Ok(())
	}

	// ---- execution ----

	/// Phase A of the cross-shard execute: validate, compute the minimum
	/// output from the *stored* target, debit custody and persist the
	/// in-flight marker. Returns the outbound pool call.
	///
	/// The executor-supplied price is recorded for the eventual event only;
	/// trade economics rest on the stored target and the pool's min-output
	/// check.
	pub fn begin_execute(
		&mut self,
		ctx: &CallContext,
		order_id: OrderId,
		current_num: u64,
		current_denom: u64,
	) -> Result<SwapCall, ContractError> {
		if ctx.caller != self.executor {
			return Err(ContractError::Validation(ERR_NOT_EXECUTOR));
		}
		if self.paused {
			return Err(ContractError::Validation(ERR_PAUSED));
		}
		if self.pool == Address::ZERO {
			return Err(ContractError::Validation(ERR_NO_POOL));
		}

		let order = self
			.orders
			.get(&order_id)
			.ok_or(ContractError::UnknownOrder(order_id))?;

		if order.status != OrderStatus::Pending {
			return Err(ContractError::Lifecycle(ERR_NOT_PENDING));
		}
		if order.is_expired(ctx.now) {
			return Err(ContractError::Lifecycle(ERR_EXPIRED));
		}
		if self.in_flight.contains_key(&order_id) {
			return Err(ContractError::Lifecycle(ERR_IN_FLIGHT));
		}

		let min_out = keeper_price::min_out(
			order.from_amount,
			order.target_num,
			order.target_denom,
			order.slippage_bp,
		)?;

		let marker = InFlightSwap {
			order_id,
			owner: order.owner,
			executor: ctx.caller,
			from_token: order.from_token.clone(),
			from_amount: order.from_amount,
			to_token: order.to_token.clone(),
			min_out,
			current_num,
			current_denom,
		};

		let call = SwapCall {
			receiver: self.pool,
			payment: TokenPayment::new(marker.from_token.clone(), marker.from_amount),
			payload: build_swap_payload(
				&marker.from_token,
				marker.from_amount,
				&marker.to_token,
				min_out,
			),
		};

		self.debit(&marker.from_token, marker.from_amount)?;
		self.in_flight.insert(order_id, marker);

		debug!(order_id, %min_out, "swap dispatched to pool");
		Ok(call)
	}

	/// Phase B: the swap callback. Consumes the in-flight marker and either
	/// completes the order or records the failure and restores custody.
	pub fn settle_swap(
		&mut self,
		order_id: OrderId,
		result: SwapResult,
		now: u64,
	) -> Result<(), ContractError> {
		let marker = self
			.in_flight
			.remove(&order_id)
			.ok_or(ContractError::Lifecycle(ERR_NO_MARKER))?;

		let failure = match result {
			SwapResult::Output(payment) => {
				if payment.token != marker.to_token {
					Some(format!("unexpected output token {}", payment.token))
				} else if payment.amount < marker.min_out {
					Some(format!(
						"swap output {} below minimum {}",
						payment.amount, marker.min_out
					))
				} else {
					self.complete_execution(&marker, payment.amount, now);
					None
				}
			}
			SwapResult::Refund(_) => Some("pool returned the input payment".to_string()),
			SwapResult::Error(reason) => Some(format!("swap failed: {}", reason)),
		};

		if let Some(reason) = failure {
			// order stays pending; deposit back under custody
			self.credit(&marker.from_token, marker.from_amount);
			warn!(order_id, %reason, "swap execution failed");
			self.events.push(ContractEvent::OrderExecutionFailed {
				order_id,
				reason,
				timestamp: now,
			});
		}

		Ok(())
	}

	fn complete_execution(&mut self, marker: &InFlightSwap, output_amount: U256, now: u64) {
		let fee = output_amount * U256::from(self.execution_fee_bp as u64) / U256::from(BP_DENOM);
		let user_amount = output_amount - fee;

		if !fee.is_zero() {
			self.payouts.push(TokenTransfer {
				to: marker.executor,
				token: marker.to_token.clone(),
				amount: fee,
			});
		}
		self.payouts.push(TokenTransfer {
			to: marker.owner,
			token: marker.to_token.clone(),
			amount: user_amount,
		});

		self.set_status(marker.order_id, OrderStatus::Executed);
		self.events.push(ContractEvent::OrderExecuted {
			order_id: marker.order_id,
			owner: marker.owner,
			from_token: marker.from_token.clone(),
			from_amount: marker.from_amount,
			to_token: marker.to_token.clone(),
			output_amount: user_amount,
			current_num: marker.current_num,
			current_denom: marker.current_denom,
			timestamp: now,
		});

		info!(order_id = marker.order_id, %user_amount, "limit order executed");
	}

	/// Full execute endpoint: phase A, the cross-shard pool call, phase B.
	pub async fn execute_limit_order(
		&mut self,
		ctx: &CallContext,
		order_id: OrderId,
		current_num: u64,
		current_denom: u64,
		pool: &dyn SwapPool,
	) -> Result<(), ContractError> {
		let call = self.begin_execute(ctx, order_id, current_num, current_denom)?;
		let result = pool.swap_fixed_input(call).await;
		self.settle_swap(order_id, result, ctx.now)
	}

	/// Sweep up to `limit` expired pending orders: refund and mark Expired.
	/// Callable by anyone; idempotent per order.
	pub fn expire_orders(&mut self, ctx: &CallContext, limit: u32) -> u32 {
		let expired: Vec<OrderId> = self
			.orders
			.values()
			.filter(|o| {
				o.status == OrderStatus::Pending
					&& o.is_expired(ctx.now)
					&& !self.in_flight.contains_key(&o.order_id)
			})
			.take(limit as usize)
			.map(|o| o.order_id)
			.collect();

		for order_id in &expired {
			let Some(order) = self.orders.get(order_id) else {
				continue;
			};
			let (owner, token, amount) = (order.owner, order.from_token.clone(), order.from_amount);
			if self.debit(&token, amount).is_err() {
				// custody mismatch; leave the order alone rather than
				// fabricate a refund
				warn!(order_id, "expiry skipped: holdings below deposit");
				continue;
			}
			self.payouts.push(TokenTransfer {
				to: owner,
				token: token.clone(),
				amount,
			});
			self.set_status(*order_id, OrderStatus::Expired);
			self.events.push(ContractEvent::OrderExpired {
				order_id: *order_id,
				owner,
				token,
				amount,
				timestamp: ctx.now,
			});
		}

		expired.len() as u32
	}

	// ---- admin endpoints (owner only) ----

	pub fn set_paused(&mut self, ctx: &CallContext, paused: bool) -> Result<(), ContractError> {
		self.require_owner(ctx)?;
		self.paused = paused;
		self.events.push(ContractEvent::PauseChanged { paused });
		Ok(())
	}

	pub fn set_max_slippage(&mut self, ctx: &CallContext, bp: u16) -> Result<(), ContractError> {
		self.require_owner(ctx)?;
		self.max_slippage_bp = bp;
		Ok(())
	}

	pub fn set_executor(&mut self, ctx: &CallContext, executor: Address) -> Result<(), ContractError> {
		self.require_owner(ctx)?;
		self.executor = executor;
		Ok(())
	}

	pub fn set_pool(&mut self, ctx: &CallContext, pool: Address) -> Result<(), ContractError> {
		self.require_owner(ctx)?;
		self.pool = pool;
		Ok(())
	}

	pub fn whitelist_token(&mut self, ctx: &CallContext, token: TokenId) -> Result<(), ContractError> {
		self.require_owner(ctx)?;
		if self.whitelist.contains(&token) {
			return Err(ContractError::Validation(ERR_ALREADY_WHITELISTED));
		}
		self.whitelist.insert(token.clone());
		self.events.push(ContractEvent::TokenWhitelisted { token });
		Ok(())
	}

	pub fn remove_token(&mut self, ctx: &CallContext, token: TokenId) -> Result<(), ContractError> {
		self.require_owner(ctx)?;
		if !self.whitelist.remove(&token) {
			return Err(ContractError::Validation(ERR_NOT_WHITELISTED));
		}
		self.events.push(ContractEvent::TokenRemoved { token });
		Ok(())
	}

	/// Basis-point reward paid to the executor out of each swap's output
	pub fn set_execution_fee(&mut self, ctx: &CallContext, fee_bp: u16) -> Result<(), ContractError> {
		self.require_owner(ctx)?;
		if fee_bp > MAX_EXECUTION_FEE_BP {
			return Err(ContractError::Validation(ERR_FEE_TOO_HIGH));
		}
		self.execution_fee_bp = fee_bp;
		Ok(())
	}

	pub fn set_duration_bounds(
		&mut self,
		ctx: &CallContext,
		min_s: u64,
		max_s: u64,
	) -> Result<(), ContractError> {
		self.require_owner(ctx)?;
		if min_s == 0 || min_s > max_s {
			return Err(ContractError::Validation(ERR_BAD_BOUNDS));
		}
		self.min_duration_s = min_s;
		self.max_duration_s = max_s;
		Ok(())
	}

	// ---- views ----

	pub fn get_order(&self, order_id: OrderId) -> Option<&Order> {
		self.orders.get(&order_id)
	}

	/// Orders currently in the Pending state; ordering is unspecified
	pub fn get_pending_orders(&self) -> Vec<Order> {
		self.orders
			.values()
			.filter(|o| o.status == OrderStatus::Pending)
			.cloned()
			.collect()
	}

	pub fn get_user_orders(&self, user: &Address) -> Vec<OrderId> {
		self.user_orders.get(user).cloned().unwrap_or_default()
	}

	pub fn get_executor(&self) -> Address {
		self.executor
	}

	pub fn get_pool(&self) -> Address {
		self.pool
	}

	pub fn is_paused(&self) -> bool {
		self.paused
	}

	pub fn get_max_slippage(&self) -> u16 {
		self.max_slippage_bp
	}

	pub fn is_token_whitelisted(&self, token: &TokenId) -> bool {
		self.whitelist.contains(token)
	}

	pub fn get_whitelisted_tokens(&self) -> Vec<TokenId> {
		self.whitelist.iter().cloned().collect()
	}

	/// Contract balance of one token (custody ledger)
	pub fn holdings(&self, token: &TokenId) -> U256 {
		self.holdings.get(token).copied().unwrap_or(U256::ZERO)
	}

	/// Append-only event log
	pub fn events(&self) -> &[ContractEvent] {
		&self.events
	}

	/// Drain the queued outbound transfers; the host performs them
	pub fn take_payouts(&mut self) -> Vec<TokenTransfer> {
		std::mem::take(&mut self.payouts)
	}

	// ---- internals ----

	fn require_owner(&self, ctx: &CallContext) -> Result<(), ContractError> {
		if ctx.caller != self.owner {
			return Err(ContractError::Validation(ERR_NOT_OWNER));
		}
		Ok(())
	}

	fn set_status(&mut self, order_id: OrderId, status: OrderStatus) {
		if let Some(order) = self.orders.get_mut(&order_id) {
			order.status = status;
		}
	}

	fn credit(&mut self, token: &TokenId, amount: U256) {
		let entry = self.holdings.entry(token.clone()).or_insert(U256::ZERO);
		*entry += amount;
	}

	fn debit(&mut self, token: &TokenId, amount: U256) -> Result<(), ContractError> {
		let entry = self
			.holdings
			.get_mut(token)
			.ok_or(ContractError::Validation(ERR_HOLDINGS))?;
		*entry = entry
			.checked_sub(amount)
			.ok_or(ContractError::Validation(ERR_HOLDINGS))?;
		Ok(())
	}
}

//! The executor sweep loop.
//!
//! One long-running task polls the contract every `check_interval`, decides
//! which pending orders are triggerable against the AMM's spot price and
//! submits `executeLimitOrder` calls signed with the operator key. Sweeps
//! never overlap: if a sweep outruns the interval the next tick is dropped.
//! Orders within a sweep are processed sequentially in list order.

use crate::cooldown::CooldownTable;
use crate::status::ExecutorStatus;
use keeper_amm::{AmmAdapter, PoolSnapshot};
use keeper_chain::{execute_call_data, ChainClient, OperatorWallet, Transaction, TxStatus};
use keeper_price::PriceFraction;
use keeper_types::{Address, Order, OrderId, TokenId, TokenRegistry};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(300);
/// Sized for the cross-shard pool call plus its callback
pub const DEFAULT_EXEC_GAS: u64 = 80_000_000;
pub const DEFAULT_CONFIRM_POLLS: u32 = 20;
pub const DEFAULT_CONFIRM_POLL_INTERVAL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct ExecutorConfig {
	pub contract: Address,
	pub pool: Address,
	/// The pool's token pair in its canonical reserve order
	pub pool_pair: (TokenId, TokenId),
	pub chain_id: String,
	pub check_interval: Duration,
	pub cooldown: Duration,
	pub exec_gas: u64,
	pub confirm_polls: u32,
	pub confirm_poll_interval: Duration,
}

impl ExecutorConfig {
	pub fn new(
		contract: Address,
		pool: Address,
		pool_pair: (TokenId, TokenId),
		chain_id: impl Into<String>,
	) -> Self {
		Self {
			contract,
			pool,
			pool_pair,
			chain_id: chain_id.into(),
			check_interval: DEFAULT_CHECK_INTERVAL,
			cooldown: DEFAULT_COOLDOWN,
			exec_gas: DEFAULT_EXEC_GAS,
			confirm_polls: DEFAULT_CONFIRM_POLLS,
			confirm_poll_interval: DEFAULT_CONFIRM_POLL_INTERVAL,
		}
	}
}

pub struct ExecutorService {
	config: ExecutorConfig,
	chain: Arc<dyn ChainClient>,
	amm: Arc<dyn AmmAdapter>,
	wallet: OperatorWallet,
	registry: TokenRegistry,
	cooldowns: CooldownTable,
	status: Arc<ExecutorStatus>,
	stopping: AtomicBool,
}

fn unix_now() -> u64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.unwrap_or_default()
		.as_secs()
}

impl ExecutorService {
	pub fn new(
		config: ExecutorConfig,
		chain: Arc<dyn ChainClient>,
		amm: Arc<dyn AmmAdapter>,
		wallet: OperatorWallet,
		registry: TokenRegistry,
	) -> Self {
		let status = Arc::new(ExecutorStatus::new(
			true,
			wallet.address().to_hex(),
			config.contract.to_hex(),
			config.check_interval.as_millis() as u64,
			config.cooldown.as_millis() as u64,
		));

		Self {
			config,
			chain,
			amm,
			wallet,
			registry,
			cooldowns: CooldownTable::new(),
			status,
			stopping: AtomicBool::new(false),
		}
	}

	/// Status cell shared with the HTTP API
	pub fn status(&self) -> Arc<ExecutorStatus> {
		self.status.clone()
	}

	/// Operator intervention: forget one order's attempt
	pub fn clear_cooldown(&self, order_id: OrderId) -> bool {
		self.cooldowns.clear(order_id)
	}

	/// Operator intervention: forget all attempts
	pub fn clear_all_cooldowns(&self) {
		self.cooldowns.clear_all();
	}

	/// Run until the shutdown channel fires. An in-flight submission is
	/// allowed to complete; the sweep stops between orders.
	pub async fn run(self: Arc<Self>, shutdown: broadcast::Sender<()>) {
		let mut shutdown_rx = shutdown.subscribe();
		let watcher = {
			let mut rx = shutdown.subscribe();
			let service = self.clone();
			tokio::spawn(async move {
				let _ = rx.recv().await;
				service.stopping.store(true, Ordering::SeqCst);
			})
		};

		let mut ticker = tokio::time::interval(self.config.check_interval);
		ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

		self.status.set_running(true);
		info!(
			contract = %self.config.contract,
			interval_s = self.config.check_interval.as_secs(),
			"executor started"
		);

		loop {
			tokio::select! {
				_ = ticker.tick() => {
					self.sweep().await;
				}
				_ = shutdown_rx.recv() => {
					info!("executor received shutdown signal");
					break;
				}
			}
		}

		self.status.set_running(false);
		watcher.abort();
	}

	/// One pass over the contract's pending orders
	pub async fn sweep(&self) {
		let pending = match self.chain.get_pending_orders(&self.config.contract).await {
			Ok(orders) => orders,
			Err(e) => {
				warn!(error = %e, "pending order fetch failed; skipping sweep");
				return;
			}
		};

		let order_ids: Vec<OrderId> = pending.iter().map(|o| o.order_id).collect();
		debug!(count = order_ids.len(), "sweep started");

		for order_id in order_ids {
			if self.stopping.load(Ordering::SeqCst) {
				info!("shutdown requested; ending sweep early");
				break;
			}
			self.process_order(order_id).await;
		}

		self.status.set_attempted_count(self.cooldowns.len() as u64);
	}

	async fn process_order(&self, order_id: OrderId) {
		if self.cooldowns.is_cooling(order_id, self.config.cooldown) {
			debug!(order_id, "still cooling down");
			return;
		}

		let order = match self.chain.get_order(&self.config.contract, order_id).await {
			Ok(Some(order)) => order,
			Ok(None) => {
				self.cooldowns.clear(order_id);
				return;
			}
			Err(e) => {
				warn!(order_id, error = %e, "order fetch failed");
				return;
			}
		};

		if order.is_expired(unix_now()) {
			// the contract's expiry sweep owns this order now
			self.cooldowns.clear(order_id);
			return;
		}

		let decimals = (
			self.registry.decimals(&order.from_token),
			self.registry.decimals(&order.to_token),
		);
		let (decimals_from, decimals_to) = match decimals {
			(Ok(from), Ok(to)) => (from, to),
			(Err(e), _) | (_, Err(e)) => {
				warn!(order_id, error = %e, "token decimals not configured; skipping");
				return;
			}
		};

		let reserves = match self.amm.get_reserves(&self.config.pool).await {
			Ok(reserves) => reserves,
			Err(e) => {
				warn!(order_id, error = %e, "reserve fetch failed");
				return;
			}
		};

		// orient the pool's canonical reserve order to the order's from -> to
		// direction; sell-style orders use the inverted pair
		let (reserve_from, reserve_to) = if order.from_token == self.config.pool_pair.0 {
			reserves
		} else if order.from_token == self.config.pool_pair.1 {
			(reserves.1, reserves.0)
		} else {
			warn!(order_id, token = %order.from_token, "order token not in the configured pool");
			return;
		};

		let snapshot = PoolSnapshot {
			reserve_from,
			reserve_to,
			decimals_from,
			decimals_to,
		};
		let spot = match snapshot.spot_price() {
			Ok(p) => p,
			Err(e) => {
				warn!(order_id, error = %e, "spot price unavailable");
				return;
			}
		};

		// buy when the price is at or below target; ties trigger
		let target = order.target_price(decimals_from, decimals_to);
		if spot > target {
			debug!(order_id, spot, target, "not triggered");
			return;
		}

		// informational only; the contract trades on its stored target. A
		// spot the fraction encoding cannot represent (sell-direction
		// decimals gaps) must not block execution, so it degrades to zero.
		let current = match PriceFraction::from_decimal(spot, decimals_from, decimals_to) {
			Ok(fraction) => fraction,
			Err(e) => {
				debug!(order_id, error = %e, "observed spot not encodable; logging zero");
				PriceFraction { num: 0, denom: 1 }
			}
		};

		info!(order_id, spot, target, "order triggered");

		// record the attempt before submitting so a crash mid-submit still
		// leaves the cooldown in place
		self.cooldowns.mark(order_id);
		self.submit_execute(&order, current).await;
	}

	async fn submit_execute(&self, order: &Order, current: PriceFraction) {
		let sender = self.wallet.address();
		let nonce = match self.chain.account_nonce(&sender).await {
			Ok(nonce) => nonce,
			Err(e) => {
				warn!(order_id = order.order_id, error = %e, "nonce fetch failed");
				return;
			}
		};

		let call_data = execute_call_data(order.order_id, current.num, current.denom);
		let mut tx = Transaction::contract_call(
			&sender,
			&self.config.contract,
			nonce,
			self.config.exec_gas,
			&self.config.chain_id,
			&call_data,
		);

		if let Err(e) = tx.sign(&self.wallet) {
			warn!(order_id = order.order_id, error = %e, "signing failed");
			return;
		}

		match self.chain.send_transaction(&tx).await {
			Ok(hash) => {
				info!(order_id = order.order_id, %hash, "execute submitted");
				self.await_confirmation(order.order_id, &hash).await;
			}
			Err(e) => {
				warn!(
					order_id = order.order_id,
					error = %e,
					"submission failed; retry deferred by cooldown"
				);
			}
		}
	}

	async fn await_confirmation(&self, order_id: OrderId, hash: &str) {
		for _ in 0..self.config.confirm_polls {
			tokio::time::sleep(self.config.confirm_poll_interval).await;

			match self.chain.transaction_status(hash).await {
				Ok(TxStatus::Success) => {
					info!(order_id, %hash, "execute confirmed");
					// the order leaves getPendingOrders on its own; no need
					// to keep deferring it
					self.cooldowns.clear(order_id);
					return;
				}
				Ok(TxStatus::Failed) => {
					warn!(order_id, %hash, "execute failed on-chain");
					return;
				}
				Ok(TxStatus::Pending) => continue,
				Err(e) => {
					warn!(order_id, %hash, error = %e, "status poll failed");
					continue;
				}
			}
		}

		// a poll timeout does not roll anything back; the chain decides
		warn!(order_id, %hash, "confirmation polling timed out");
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::U256;
	use async_trait::async_trait;
	use base64::Engine;
	use keeper_amm::AmmError;
	use keeper_chain::ChainError;
	use keeper_types::{OrderStatus, TokenId};
	use std::collections::HashMap;
	use std::sync::Mutex;

	const CONTRACT: Address = Address([4u8; 32]);
	const POOL: Address = Address([9u8; 32]);
	const SEED_HEX: &str = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";

	struct MockChain {
		pending: Mutex<Vec<Order>>,
		orders: Mutex<HashMap<OrderId, Order>>,
		sent: Mutex<Vec<Transaction>>,
		tx_status: TxStatus,
	}

	impl MockChain {
		fn with_orders(orders: Vec<Order>, tx_status: TxStatus) -> Self {
			let map = orders.iter().map(|o| (o.order_id, o.clone())).collect();
			Self {
				pending: Mutex::new(orders),
				orders: Mutex::new(map),
				sent: Mutex::new(Vec::new()),
				tx_status,
			}
		}

		fn sent_count(&self) -> usize {
			self.sent.lock().unwrap().len()
		}
	}

	#[async_trait]
	impl ChainClient for MockChain {
		async fn get_pending_orders(&self, _: &Address) -> Result<Vec<Order>, ChainError> {
			Ok(self.pending.lock().unwrap().clone())
		}

		async fn get_order(
			&self,
			_: &Address,
			order_id: OrderId,
		) -> Result<Option<Order>, ChainError> {
			Ok(self.orders.lock().unwrap().get(&order_id).cloned())
		}

		async fn account_nonce(&self, _: &Address) -> Result<u64, ChainError> {
			Ok(7)
		}

		async fn send_transaction(&self, tx: &Transaction) -> Result<String, ChainError> {
			self.sent.lock().unwrap().push(tx.clone());
			Ok("deadbeef".to_string())
		}

		async fn transaction_status(&self, _: &str) -> Result<TxStatus, ChainError> {
			Ok(self.tx_status)
		}
	}

	struct MockAmm {
		reserves: Mutex<Option<(U256, U256)>>,
	}

	impl MockAmm {
		fn with_reserves(reserve_from: U256, reserve_to: U256) -> Self {
			Self {
				reserves: Mutex::new(Some((reserve_from, reserve_to))),
			}
		}

		fn failing() -> Self {
			Self {
				reserves: Mutex::new(None),
			}
		}

		fn set_reserves(&self, reserve_from: U256, reserve_to: U256) {
			*self.reserves.lock().unwrap() = Some((reserve_from, reserve_to));
		}
	}

	#[async_trait]
	impl AmmAdapter for MockAmm {
		async fn get_reserves(&self, _: &Address) -> Result<(U256, U256), AmmError> {
			(*self.reserves.lock().unwrap())
				.ok_or_else(|| AmmError::PoolUnavailable("gateway unreachable".to_string()))
		}
	}

	fn usdc() -> TokenId {
		TokenId::new("USDC-c76f1f")
	}

	fn wegld() -> TokenId {
		TokenId::new("WEGLD-bd4d79")
	}

	fn registry() -> TokenRegistry {
		TokenRegistry::new([
			(usdc(), 6),
			(wegld(), 18),
			(TokenId::new("USDA-111111"), 6),
			(TokenId::new("USDB-222222"), 6),
		])
	}

	/// 10 USDC -> WEGLD at a 0.155 target
	fn reference_order(order_id: OrderId, expires_at: u64) -> Order {
		Order {
			order_id,
			owner: Address([3u8; 32]),
			from_token: usdc(),
			from_amount: U256::from(10_000_000u64),
			to_token: wegld(),
			target_num: 155_000_000_000_000,
			target_denom: 1_000,
			slippage_bp: 500,
			created_at: 0,
			expires_at,
			status: OrderStatus::Pending,
		}
	}

	/// Reserves putting the spot at `wegld_per_thousand / 1000` WEGLD per USDC
	fn reserves_at(wegld_per_thousand: u64) -> (U256, U256) {
		let reserve_from = U256::from(1_000_000_000_000u64); // 1e6 USDC
		let reserve_to = U256::from(wegld_per_thousand * 1_000)
			* U256::from(10u64).pow(U256::from(18u64));
		(reserve_from, reserve_to)
	}

	fn service_with_pair(
		chain: Arc<MockChain>,
		amm: Arc<MockAmm>,
		pool_pair: (TokenId, TokenId),
	) -> ExecutorService {
		let mut config = ExecutorConfig::new(CONTRACT, POOL, pool_pair, "D");
		config.confirm_polls = 1;
		config.confirm_poll_interval = Duration::ZERO;
		ExecutorService::new(
			config,
			chain,
			amm,
			OperatorWallet::from_hex(SEED_HEX).unwrap(),
			registry(),
		)
	}

	fn service(chain: Arc<MockChain>, amm: Arc<MockAmm>) -> ExecutorService {
		service_with_pair(chain, amm, (usdc(), wegld()))
	}

	#[tokio::test]
	async fn triggered_order_submits_once_per_cooldown_window() {
		let (rf, rt) = reserves_at(150); // 0.150 <= 0.155 target
		let chain = Arc::new(MockChain::with_orders(
			vec![reference_order(1, u64::MAX)],
			TxStatus::Pending,
		));
		let amm = Arc::new(MockAmm::with_reserves(rf, rt));
		let service = service(chain.clone(), amm);

		service.sweep().await;
		assert_eq!(chain.sent_count(), 1);

		// still inside the cooldown window: no second submission
		service.sweep().await;
		assert_eq!(chain.sent_count(), 1);
		assert_eq!(service.status().snapshot().attempted_count, 1);

		let tx = chain.sent.lock().unwrap()[0].clone();
		assert_eq!(tx.receiver, CONTRACT.to_hex());
		assert_eq!(tx.gas_limit, DEFAULT_EXEC_GAS);
		assert!(tx.signature.is_some());
		let data = base64::engine::general_purpose::STANDARD
			.decode(&tx.data)
			.unwrap();
		assert!(String::from_utf8(data)
			.unwrap()
			.starts_with("executeLimitOrder@01@"));
	}

	#[tokio::test]
	async fn confirmed_success_clears_the_cooldown_entry() {
		let (rf, rt) = reserves_at(150);
		let chain = Arc::new(MockChain::with_orders(
			vec![reference_order(1, u64::MAX)],
			TxStatus::Success,
		));
		let amm = Arc::new(MockAmm::with_reserves(rf, rt));
		let service = service(chain.clone(), amm);

		service.sweep().await;
		assert_eq!(chain.sent_count(), 1);
		assert!(service.cooldowns.is_empty());
	}

	#[tokio::test]
	async fn spot_above_target_does_not_trigger() {
		let (rf, rt) = reserves_at(160); // 0.160 > 0.155
		let chain = Arc::new(MockChain::with_orders(
			vec![reference_order(1, u64::MAX)],
			TxStatus::Pending,
		));
		let amm = Arc::new(MockAmm::with_reserves(rf, rt));
		let service = service(chain.clone(), amm);

		service.sweep().await;
		assert_eq!(chain.sent_count(), 0);
		assert!(service.cooldowns.is_empty());
	}

	#[tokio::test]
	async fn exact_tie_triggers() {
		// two 6-decimal tokens and a 1/8 target: both sides exact in f64
		let mut order = reference_order(1, u64::MAX);
		order.from_token = TokenId::new("USDA-111111");
		order.to_token = TokenId::new("USDB-222222");
		order.target_num = 1;
		order.target_denom = 8;

		let chain = Arc::new(MockChain::with_orders(vec![order], TxStatus::Pending));
		let amm = Arc::new(MockAmm::with_reserves(
			U256::from(8_000_000u64),
			U256::from(1_000_000u64),
		));
		let service = service_with_pair(
			chain.clone(),
			amm,
			(TokenId::new("USDA-111111"), TokenId::new("USDB-222222")),
		);

		service.sweep().await;
		assert_eq!(chain.sent_count(), 1);
	}

	#[tokio::test]
	async fn sell_direction_orders_use_inverted_reserves() {
		// the pool is (USDC, WEGLD); this order sells WEGLD for USDC, so the
		// spot it sees is USDC per WEGLD
		let mut order = reference_order(1, u64::MAX);
		order.from_token = wegld();
		order.to_token = usdc();
		order.from_amount = U256::from(10u64) * U256::from(10u64).pow(U256::from(18u64));
		// 7 USDC per WEGLD in base-unit terms: num / denom * 10^(6-18)
		order.target_num = 7;
		order.target_denom = 1_000_000_000_000;

		let (rf, rt) = reserves_at(150); // ~6.67 USDC per WEGLD inverted
		let chain = Arc::new(MockChain::with_orders(vec![order], TxStatus::Pending));
		let amm = Arc::new(MockAmm::with_reserves(rf, rt));
		let service = service(chain.clone(), amm);

		service.sweep().await;
		assert_eq!(chain.sent_count(), 1);
	}

	#[tokio::test]
	async fn missing_order_drops_its_cooldown_entry() {
		let chain = Arc::new(MockChain::with_orders(
			vec![reference_order(5, u64::MAX)],
			TxStatus::Pending,
		));
		chain.orders.lock().unwrap().clear(); // listed but gone on fetch
		let amm = Arc::new(MockAmm::failing());
		let service = service(chain.clone(), amm);

		service.cooldowns.mark(5);
		service.sweep().await;

		assert!(service.cooldowns.is_empty());
		assert_eq!(chain.sent_count(), 0);
	}

	#[tokio::test]
	async fn expired_order_drops_its_cooldown_entry() {
		let chain = Arc::new(MockChain::with_orders(
			vec![reference_order(3, 1)], // long past expiry
			TxStatus::Pending,
		));
		let amm = Arc::new(MockAmm::failing());
		let service = service(chain.clone(), amm);

		service.cooldowns.mark(3);
		service.sweep().await;

		assert!(service.cooldowns.is_empty());
		assert_eq!(chain.sent_count(), 0);
	}

	#[tokio::test]
	async fn reserve_failure_skips_without_marking_attempted() {
		let chain = Arc::new(MockChain::with_orders(
			vec![reference_order(1, u64::MAX)],
			TxStatus::Pending,
		));
		let amm = Arc::new(MockAmm::failing());
		let service = service(chain.clone(), amm.clone());

		service.sweep().await;
		assert_eq!(chain.sent_count(), 0);
		assert!(service.cooldowns.is_empty());

		// the AMM recovers: the very next sweep may submit, proving the
		// failed fetch deferred nothing
		let (rf, rt) = reserves_at(150);
		amm.set_reserves(rf, rt);
		service.sweep().await;
		assert_eq!(chain.sent_count(), 1);
	}

	#[tokio::test]
	async fn unconfigured_token_is_skipped() {
		let mut order = reference_order(1, u64::MAX);
		order.from_token = TokenId::new("MEX-455c57");

		let (rf, rt) = reserves_at(150);
		let chain = Arc::new(MockChain::with_orders(vec![order], TxStatus::Pending));
		let amm = Arc::new(MockAmm::with_reserves(rf, rt));
		let service = service(chain.clone(), amm);

		service.sweep().await;
		assert_eq!(chain.sent_count(), 0);
		assert!(service.cooldowns.is_empty());
	}

	#[tokio::test]
	async fn operator_can_clear_cooldowns() {
		let (rf, rt) = reserves_at(150);
		let chain = Arc::new(MockChain::with_orders(
			vec![reference_order(1, u64::MAX)],
			TxStatus::Pending,
		));
		let amm = Arc::new(MockAmm::with_reserves(rf, rt));
		let service = service(chain.clone(), amm);

		service.sweep().await;
		assert_eq!(chain.sent_count(), 1);

		// clearing the entry lets the next sweep retry immediately
		assert!(service.clear_cooldown(1));
		service.sweep().await;
		assert_eq!(chain.sent_count(), 2);
	}
}

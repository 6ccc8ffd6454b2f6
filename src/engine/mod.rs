//! The batched liquidity engine.
//!
//! [`Engine`] is the module facade a host embeds: it validates and
//! escrows incoming intents, executes per-pool batches on the host's
//! tick callbacks, and keeps all module state in an injected
//! [`KvStore`]. Side effects on balances flow exclusively through the
//! injected [`BankLedger`]; the engine holds no funds of its own beyond
//! the module escrow account.
//!
//! Execution is single-threaded and deterministic: identical store and
//! bank pre-state plus identical tick calls produce identical post-state
//! on every replica.

mod batch;
mod escrow;
mod genesis;
mod invariants;
mod migration;
mod pool_ops;
mod swap_ops;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use crate::config::Params;
use crate::domain::{
    Address, Amount, Coin, DepositState, IntentId, Pool, PoolBatch, Price, SwapState,
    WithdrawState,
};
use crate::error::{LiquidityError, Result};
use crate::host::{AccountLookup, BankLedger, Clock, DistributionSink, InvariantRegistry};
use crate::math;
use crate::store::{keys, KvStore};

/// Module name used for invariant routes and logging.
pub const MODULE_NAME: &str = "tidepool";

/// The batched AMM engine.
///
/// Generic over the host capabilities so hosts inject their own store,
/// bank, account registry, distribution hook and clock. The in-memory
/// implementations under [`crate::host::memory`] satisfy every bound.
pub struct Engine<S, B, A, D, C>
where
    S: KvStore,
    B: BankLedger,
    A: AccountLookup,
    D: DistributionSink,
    C: Clock,
{
    store: S,
    bank: B,
    accounts: A,
    distribution: D,
    clock: C,
    params: Params,
    halted: bool,
}

impl<S, B, A, D, C> Engine<S, B, A, D, C>
where
    S: KvStore,
    B: BankLedger,
    A: AccountLookup,
    D: DistributionSink,
    C: Clock,
{
    /// Creates an engine over the given host capabilities.
    ///
    /// # Errors
    ///
    /// Returns [`LiquidityError::InvalidParams`] if `params` fails
    /// validation.
    pub fn new(
        store: S,
        bank: B,
        accounts: A,
        distribution: D,
        clock: C,
        params: Params,
    ) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            store,
            bank,
            accounts,
            distribution,
            clock,
            params,
            halted: false,
        })
    }

    /// Current parameter snapshot.
    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Replaces the parameter set. Takes effect from the next tick.
    ///
    /// # Errors
    ///
    /// Returns [`LiquidityError::InvalidParams`] if `params` fails
    /// validation.
    pub fn set_params(&mut self, params: Params) -> Result<()> {
        params.validate()?;
        self.params = params;
        Ok(())
    }

    /// Read access to the injected bank.
    #[must_use]
    pub fn bank(&self) -> &B {
        &self.bank
    }

    /// Mutable access to the injected bank, for host-side funding.
    pub fn bank_mut(&mut self) -> &mut B {
        &mut self.bank
    }

    /// Read access to the distribution sink.
    #[must_use]
    pub fn distribution(&self) -> &D {
        &self.distribution
    }

    /// Mutable access to the injected clock.
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Whether intake has been halted by a global invariant violation.
    #[must_use]
    pub const fn is_halted(&self) -> bool {
        self.halted
    }

    /// Registers the engine's global invariants with the host.
    pub fn register_invariants<R>(registry: &mut R)
    where
        R: InvariantRegistry<Self>,
    {
        registry.register(MODULE_NAME, "escrow-amount", |engine| {
            engine.check_escrow_sufficiency()
        });
    }

    // -- store codec --------------------------------------------------------

    fn store_has(&self, key: &[u8]) -> bool {
        self.store.get(key).is_some()
    }

    fn store_delete(&mut self, key: &[u8]) {
        self.store.delete(key);
    }

    fn clock_height(&self) -> u64 {
        self.clock.block_height()
    }

    fn get_record<T: DeserializeOwned>(&self, key: &[u8]) -> Result<Option<T>> {
        match self.store.get(key) {
            None => Ok(None),
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|_| LiquidityError::CorruptRecord("decode failed")),
        }
    }

    fn set_record<T: Serialize>(&mut self, key: &[u8], value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)
            .map_err(|_| LiquidityError::CorruptRecord("encode failed"))?;
        self.store.set(key, bytes);
        Ok(())
    }

    fn decode_scan<T: DeserializeOwned>(&self, prefix: &[u8]) -> Result<Vec<T>> {
        self.store
            .prefix_scan(prefix)
            .into_iter()
            .map(|(_, bytes)| {
                serde_json::from_slice(&bytes)
                    .map_err(|_| LiquidityError::CorruptRecord("decode failed"))
            })
            .collect()
    }

    // -- queries -------------------------------------------------------------

    /// Looks up a pool by id.
    ///
    /// # Errors
    ///
    /// Returns [`LiquidityError::PoolNotFound`] if no such pool exists.
    pub fn pool(&self, pool_id: u64) -> Result<Pool> {
        self.get_record(&keys::pool(pool_id))?
            .ok_or(LiquidityError::PoolNotFound)
    }

    /// All pools, ascending by id.
    ///
    /// # Errors
    ///
    /// Returns [`LiquidityError::CorruptRecord`] on a decode failure.
    pub fn pools(&self) -> Result<Vec<Pool>> {
        self.decode_scan(keys::POOL_PREFIX)
    }

    /// The live batch of a pool.
    ///
    /// # Errors
    ///
    /// Returns [`LiquidityError::BatchNotFound`] if the pool has no batch.
    pub fn pool_batch(&self, pool_id: u64) -> Result<PoolBatch> {
        self.get_record(&keys::batch(pool_id))?
            .ok_or(LiquidityError::BatchNotFound)
    }

    /// Current reserve amounts `(X, Y)` of a pool, read from the bank.
    #[must_use]
    pub fn reserves(&self, pool: &Pool) -> (Amount, Amount) {
        let x = self
            .bank
            .balance(pool.reserve_address(), pool.pair().denom_a());
        let y = self
            .bank
            .balance(pool.reserve_address(), pool.pair().denom_b());
        (x, y)
    }

    /// Total pool-coin supply of a pool.
    #[must_use]
    pub fn pool_coin_supply(&self, pool: &Pool) -> Amount {
        self.bank.supply(pool.pool_coin_denom())
    }

    /// The instantaneous pool price `X / Y`.
    ///
    /// # Errors
    ///
    /// Returns [`LiquidityError::DepletedPool`] if either reserve is zero.
    pub fn pool_price(&self, pool: &Pool) -> Result<Price> {
        let (x, y) = self.reserves(pool);
        if !x.is_positive() || !y.is_positive() {
            return Err(LiquidityError::DepletedPool);
        }
        Price::new(math::ratio(&x, &y)?)
    }

    /// Deposit messages of a pool, ascending by index.
    ///
    /// # Errors
    ///
    /// Returns [`LiquidityError::CorruptRecord`] on a decode failure.
    pub fn deposit_msgs(&self, pool_id: u64) -> Result<Vec<DepositState>> {
        self.decode_scan(&keys::deposit_msg_prefix(pool_id))
    }

    /// Withdraw messages of a pool, ascending by index.
    ///
    /// # Errors
    ///
    /// Returns [`LiquidityError::CorruptRecord`] on a decode failure.
    pub fn withdraw_msgs(&self, pool_id: u64) -> Result<Vec<WithdrawState>> {
        self.decode_scan(&keys::withdraw_msg_prefix(pool_id))
    }

    /// Swap messages of a pool, ascending by index.
    ///
    /// # Errors
    ///
    /// Returns [`LiquidityError::CorruptRecord`] on a decode failure.
    pub fn swap_msgs(&self, pool_id: u64) -> Result<Vec<SwapState>> {
        self.decode_scan(&keys::swap_msg_prefix(pool_id))
    }

    // -- intake guards --------------------------------------------------------

    fn ensure_intake_allowed(&self) -> Result<()> {
        if self.halted {
            return Err(LiquidityError::EscrowShortfall);
        }
        if self.params.circuit_breaker_enabled {
            return Err(LiquidityError::CircuitBreakerEnabled);
        }
        Ok(())
    }

    fn next_pool_id(&mut self) -> Result<u64> {
        let next: u64 = self.get_record(keys::NEXT_POOL_ID)?.unwrap_or(1);
        self.set_record(keys::NEXT_POOL_ID, &(next + 1))?;
        Ok(next)
    }

    // -- intake: deposit -------------------------------------------------------

    /// Escrows a proportional deposit and queues it on the pool's batch.
    ///
    /// The coins must arrive sorted and match the pool's denom pair
    /// exactly. Funds move to escrow immediately; the deposit itself
    /// settles when the batch executes.
    ///
    /// # Errors
    ///
    /// Validation and funds errors per the intake taxonomy; no escrow
    /// effect on failure.
    pub fn deposit_within_batch(
        &mut self,
        depositor: &Address,
        pool_id: u64,
        deposit_a: Coin,
        deposit_b: Coin,
    ) -> Result<IntentId> {
        self.ensure_intake_allowed()?;
        let pool = self.pool(pool_id)?;
        if deposit_a.denom() != pool.pair().denom_a()
            || deposit_b.denom() != pool.pair().denom_b()
        {
            return Err(LiquidityError::InvalidDenom(
                "deposit coins must match the pool pair in order",
            ));
        }
        if !deposit_a.amount().is_positive() || !deposit_b.amount().is_positive() {
            return Err(LiquidityError::InvalidAmount("deposit amounts must be positive"));
        }
        let cap = self.params.max_reserve_coin_amount.clone();
        if cap.is_positive() {
            let (x, y) = self.reserves(&pool);
            if &x + deposit_a.amount() > cap || &y + deposit_b.amount() > cap {
                return Err(LiquidityError::ExceededReserveCap);
            }
        }

        let mut batch = self.pool_batch(pool_id)?;
        let msg_index = batch.next_deposit_index();
        self.hold(depositor, &[deposit_a.clone(), deposit_b.clone()])?;

        let state = DepositState {
            msg_height: self.clock.block_height(),
            msg_index,
            pool_id,
            depositor: *depositor,
            deposit_a,
            deposit_b,
            executed: false,
            succeeded: false,
            to_be_retired: false,
        };
        self.set_record(&keys::deposit_msg(pool_id, msg_index), &state)?;
        self.set_record(&keys::batch(pool_id), &batch)?;
        info!(pool_id, msg_index, depositor = %depositor, "queued deposit");
        Ok(IntentId { pool_id, msg_index })
    }

    // -- intake: withdraw -------------------------------------------------------

    /// Escrows pool coin and queues a proportional withdrawal.
    ///
    /// # Errors
    ///
    /// Validation and funds errors per the intake taxonomy; no escrow
    /// effect on failure.
    pub fn withdraw_within_batch(
        &mut self,
        withdrawer: &Address,
        pool_id: u64,
        pool_coin: Coin,
    ) -> Result<IntentId> {
        self.ensure_intake_allowed()?;
        let pool = self.pool(pool_id)?;
        if pool_coin.denom() != pool.pool_coin_denom() {
            return Err(LiquidityError::InvalidDenom(
                "withdraw coin must be the pool's share token",
            ));
        }
        if !pool_coin.amount().is_positive() {
            return Err(LiquidityError::InvalidAmount("withdraw amount must be positive"));
        }

        let mut batch = self.pool_batch(pool_id)?;
        let msg_index = batch.next_withdraw_index();
        self.hold(withdrawer, &[pool_coin.clone()])?;

        let state = WithdrawState {
            msg_height: self.clock.block_height(),
            msg_index,
            pool_id,
            withdrawer: *withdrawer,
            pool_coin,
            executed: false,
            succeeded: false,
            to_be_retired: false,
        };
        self.set_record(&keys::withdraw_msg(pool_id, msg_index), &state)?;
        self.set_record(&keys::batch(pool_id), &batch)?;
        info!(pool_id, msg_index, withdrawer = %withdrawer, "queued withdrawal");
        Ok(IntentId { pool_id, msg_index })
    }

    // -- intake: swap -------------------------------------------------------------

    /// Escrows a limit swap and queues it on the pool's batch.
    ///
    /// `offer_fee` must equal the canonical reservation
    /// `trunc(offer · swap_fee_rate)` in the offer denomination; both the
    /// offer and the fee move to escrow. The order stays live until fully
    /// filled or until `expiry_slots` ticks have passed.
    ///
    /// # Errors
    ///
    /// Validation and funds errors per the intake taxonomy; no escrow
    /// effect on failure.
    #[allow(clippy::too_many_arguments)]
    pub fn swap(
        &mut self,
        requester: &Address,
        pool_id: u64,
        offer_coin: Coin,
        demand_denom: &str,
        order_price: Price,
        offer_fee: Coin,
        expiry_slots: u64,
    ) -> Result<IntentId> {
        self.ensure_intake_allowed()?;
        let pool = self.pool(pool_id)?;
        if !pool.pair().contains(offer_coin.denom()) {
            return Err(LiquidityError::InvalidDenom("offer denom not in pool pair"));
        }
        if pool.pair().other(offer_coin.denom())? != demand_denom {
            return Err(LiquidityError::InvalidDenom(
                "demand denom must be the pair counterpart",
            ));
        }
        if !offer_coin.amount().is_positive() {
            return Err(LiquidityError::InvalidAmount("offer amount must be positive"));
        }
        if order_price.is_zero() {
            return Err(LiquidityError::InvalidPrice("order price must be positive"));
        }
        // A single order may not exceed the configured fraction of the
        // offer-side reserve.
        let reserve = self
            .bank
            .balance(pool.reserve_address(), offer_coin.denom());
        let max_orderable = math::mul_trunc(&reserve, self.params.max_order_amount_ratio);
        if offer_coin.amount() > &max_orderable {
            return Err(LiquidityError::ExceededMaxOrderRatio);
        }
        let canonical_fee = math::mul_trunc(offer_coin.amount(), self.params.swap_fee_rate);
        if offer_fee.denom() != offer_coin.denom() || offer_fee.amount() != &canonical_fee {
            return Err(LiquidityError::BadOfferCoinFee);
        }

        let mut batch = self.pool_batch(pool_id)?;
        let msg_index = batch.next_swap_index();
        let escrowed = offer_coin.with_amount(offer_coin.amount() + offer_fee.amount())?;
        self.hold(requester, &[escrowed])?;

        let now = self.clock.block_height();
        let state = SwapState {
            msg_height: now,
            msg_index,
            pool_id,
            requester: *requester,
            remaining_offer: offer_coin.amount().clone(),
            exchanged_offer: Amount::zero(),
            reserved_offer_fee: offer_fee.amount().clone(),
            offer_coin,
            demand_denom: demand_denom.to_owned(),
            order_price,
            order_expiry_height: now + expiry_slots,
            executed: false,
            succeeded: false,
            to_be_retired: false,
        };
        self.set_record(&keys::swap_msg(pool_id, msg_index), &state)?;
        self.set_record(&keys::batch(pool_id), &batch)?;
        info!(pool_id, msg_index, requester = %requester, price = %order_price, "queued swap");
        Ok(IntentId { pool_id, msg_index })
    }
}

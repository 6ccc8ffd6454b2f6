//! Pool creation and deposit/withdraw execution.
//!
//! Creation settles immediately; deposits and withdrawals settle when
//! their batch executes. Execution paths mark the message `executed`
//! first, then either settle (`succeeded`) or refund, and always leave a
//! terminal flag state behind — messages are never deleted here, only at
//! the next tick begin.

use tracing::info;

use super::{invariants, Engine};
use crate::domain::{Address, Amount, Coin, DenomPair, DepositState, Pool, PoolBatch, WithdrawState};
use crate::error::{LiquidityError, Result};
use crate::host::{AccountLookup, BankLedger, Clock, DistributionSink, Transfer};
use crate::math;
use crate::store::{keys, KvStore};

impl<S, B, A, D, C> Engine<S, B, A, D, C>
where
    S: KvStore,
    B: BankLedger,
    A: AccountLookup,
    D: DistributionSink,
    C: Clock,
{
    /// Creates a pool from two sorted deposit coins.
    ///
    /// The creation fee goes to the community pool, the deposits seed the
    /// freshly derived reserve account, and the initial pool-coin mint
    /// goes to the creator. The pool's first batch opens immediately.
    ///
    /// # Errors
    ///
    /// Validation and funds errors per the intake taxonomy; nothing moves
    /// on failure.
    pub fn create_pool(
        &mut self,
        creator: &Address,
        type_id: u32,
        deposit_a: Coin,
        deposit_b: Coin,
    ) -> Result<Pool> {
        self.ensure_intake_allowed()?;
        let pool_type = self
            .params()
            .pool_type(type_id)
            .ok_or(LiquidityError::PoolTypeNotFound)?
            .clone();
        if pool_type.min_reserve_coins != 2 || pool_type.max_reserve_coins != 2 {
            return Err(LiquidityError::PoolTypeNotFound);
        }
        if deposit_a.denom() >= deposit_b.denom() {
            return Err(LiquidityError::InvalidDenomPair(
                "deposit coins must be in alphabetical order",
            ));
        }
        let pair = DenomPair::new(deposit_a.denom(), deposit_b.denom())?;

        let min_init = self.params().min_init_deposit_amount.clone();
        if deposit_a.amount() < &min_init || deposit_b.amount() < &min_init {
            return Err(LiquidityError::BelowMinInitDeposit);
        }
        let cap = self.params().max_reserve_coin_amount.clone();
        if cap.is_positive() && (deposit_a.amount() > &cap || deposit_b.amount() > &cap) {
            return Err(LiquidityError::ExceededReserveCap);
        }

        let reserve_address = Pool::derive_reserve_address(&pair, type_id);
        if self.store_has(&keys::pool_by_reserve(&reserve_address))
            || self.store_has(&keys::pool_by_denoms(&pair, type_id))
        {
            return Err(LiquidityError::PoolAlreadyExists);
        }

        // The creator funds deposits first, then the creation fee on top.
        for coin in [&deposit_a, &deposit_b] {
            if &self.bank.balance(creator, coin.denom()) < coin.amount() {
                return Err(LiquidityError::InsufficientBalance);
            }
        }
        let creation_fee = self.params().pool_creation_fee.clone();
        for fee_coin in &creation_fee {
            let mut needed = fee_coin.amount().clone();
            for coin in [&deposit_a, &deposit_b] {
                if coin.denom() == fee_coin.denom() {
                    needed += coin.amount();
                }
            }
            if self.bank.balance(creator, fee_coin.denom()) < needed {
                return Err(LiquidityError::InsufficientPoolCreationFee);
            }
        }

        let pool_id = self.next_pool_id()?;
        let pool = Pool::new(pool_id, type_id, pair.clone());
        let mint_amount = self.params().init_pool_coin_mint_amount.clone();
        let pool_coin = Coin::new(pool.pool_coin_denom(), mint_amount)?;

        self.bank.mint(&Address::escrow(), &[pool_coin.clone()])?;
        let mut transfers = vec![
            Transfer {
                from: *creator,
                to: *pool.reserve_address(),
                coins: vec![deposit_a.clone(), deposit_b.clone()],
            },
            Transfer {
                from: Address::escrow(),
                to: *creator,
                coins: vec![pool_coin],
            },
        ];
        if !creation_fee.is_empty() {
            transfers.insert(
                0,
                Transfer {
                    from: *creator,
                    to: Address::community_pool(),
                    coins: creation_fee.clone(),
                },
            );
        }
        self.release_multi(&transfers)?;
        if !creation_fee.is_empty() {
            self.distribution
                .fund_community_pool(creator, &creation_fee)?;
        }

        let now = self.clock_height();
        self.set_record(&keys::pool(pool_id), &pool)?;
        self.set_record(&keys::pool_by_reserve(pool.reserve_address()), &pool_id)?;
        self.set_record(&keys::pool_by_denoms(&pair, type_id), &pool_id)?;
        self.set_record(&keys::batch(pool_id), &PoolBatch::new(pool_id, 1, now))?;

        let (x, y) = self.reserves(&pool);
        info!(
            pool_id,
            creator = %creator,
            reserve_a = %x,
            reserve_b = %y,
            "created pool"
        );
        Ok(pool)
    }

    /// Removes a pool record and its indexes. The host-facing admin hook
    /// behind the deleted-pool refund path; queued intents refund when
    /// their batch executes.
    ///
    /// # Errors
    ///
    /// Returns [`LiquidityError::PoolNotFound`] if no such pool exists.
    pub fn delete_pool(&mut self, pool_id: u64) -> Result<()> {
        let pool = self.pool(pool_id)?;
        self.store_delete(&keys::pool(pool_id));
        self.store_delete(&keys::pool_by_reserve(pool.reserve_address()));
        self.store_delete(&keys::pool_by_denoms(pool.pair(), pool.type_id()));
        info!(pool_id, "deleted pool");
        Ok(())
    }

    // -- deposit execution ----------------------------------------------------

    /// Executes one queued deposit against current reserves.
    ///
    /// The accepted amounts follow the reserve ratio; the excess side
    /// refunds to the depositor. A deposit that would mint zero pool
    /// coins refunds in full and retires as failed.
    pub(super) fn execute_deposit(&mut self, state: &mut DepositState) -> Result<()> {
        state.executed = true;

        let Ok(pool) = self.pool(state.pool_id) else {
            // Pool vanished since intake: refund in full.
            return self.refund_deposit(state);
        };
        let (reserve_a, reserve_b) = self.reserves(&pool);
        let supply = self.pool_coin_supply(&pool);
        if !reserve_a.is_positive() || !reserve_b.is_positive() || !supply.is_positive() {
            return self.refund_deposit(state);
        }

        let last_ratio = math::ratio(&reserve_a, &reserve_b)?;
        let coin_a = state.deposit_a.amount().clone();
        let coin_b = state.deposit_b.amount().clone();

        // Accept up to the reserve ratio on each side; refund the excess.
        let depositable_a = math::mul_trunc(&coin_b, last_ratio);
        let (accept_a, accept_b) = if coin_a < depositable_a {
            (coin_a.clone(), math::div_trunc(&coin_a, last_ratio)?)
        } else if coin_a > depositable_a {
            (depositable_a, coin_b.clone())
        } else {
            (coin_a.clone(), coin_b.clone())
        };
        let refund_a = &coin_a - &accept_a;
        let refund_b = &coin_b - &accept_b;

        let minted = supply
            .mul(&accept_a)
            .checked_div_trunc(&reserve_a)?;
        if !minted.is_positive() {
            return self.refund_deposit(state);
        }

        let mut transfers = vec![Transfer {
            from: Address::escrow(),
            to: *pool.reserve_address(),
            coins: vec![
                state.deposit_a.with_amount(accept_a.clone())?,
                state.deposit_b.with_amount(accept_b.clone())?,
            ],
        }];
        if refund_a.is_positive() || refund_b.is_positive() {
            transfers.push(Transfer {
                from: Address::escrow(),
                to: state.depositor,
                coins: vec![
                    state.deposit_a.with_amount(refund_a)?,
                    state.deposit_b.with_amount(refund_b)?,
                ],
            });
        }
        self.release_multi(&transfers)?;

        let pool_coin = Coin::new(pool.pool_coin_denom(), minted.clone())?;
        self.bank.mint(&Address::escrow(), &[pool_coin.clone()])?;
        self.release(&state.depositor, &[pool_coin])?;

        if self.params().batch_logic_invariant_checks {
            let (post_a, post_b) = self.reserves(&pool);
            invariants::minting_pool_coins_invariant(
                &supply, &minted, &accept_a, &accept_b, &reserve_a, &reserve_b,
            )?;
            invariants::deposit_invariant(
                &reserve_a, &reserve_b, &accept_a, &accept_b, &post_a, &post_b,
            )?;
        }

        state.succeeded = true;
        state.to_be_retired = true;
        self.save_deposit(state)?;

        info!(
            pool_id = state.pool_id,
            msg_index = state.msg_index,
            minted = %minted,
            "executed deposit"
        );
        Ok(())
    }

    /// Refunds a deposit in full and retires it as failed.
    pub(super) fn refund_deposit(&mut self, state: &mut DepositState) -> Result<()> {
        self.release(
            &state.depositor,
            &[state.deposit_a.clone(), state.deposit_b.clone()],
        )?;
        state.executed = true;
        state.succeeded = false;
        state.to_be_retired = true;
        self.save_deposit(state)?;
        info!(
            pool_id = state.pool_id,
            msg_index = state.msg_index,
            "refunded deposit"
        );
        Ok(())
    }

    pub(super) fn save_deposit(&mut self, state: &DepositState) -> Result<()> {
        self.set_record(&keys::deposit_msg(state.pool_id, state.msg_index), state)
    }

    // -- withdraw execution ------------------------------------------------------

    /// Executes one queued withdrawal against current reserves.
    ///
    /// Pays the truncated proportional share net of the withdraw fee,
    /// which stays in the reserve. Burning the entire supply drains the
    /// pool with no fee.
    pub(super) fn execute_withdraw(&mut self, state: &mut WithdrawState) -> Result<()> {
        state.executed = true;

        let Ok(pool) = self.pool(state.pool_id) else {
            return self.refund_withdraw(state);
        };
        let supply = self.pool_coin_supply(&pool);
        let burn = state.pool_coin.amount().clone();
        if !supply.is_positive() || burn > supply {
            return self.refund_withdraw(state);
        }
        let (reserve_a, reserve_b) = self.reserves(&pool);
        let fee_rate = self.params().withdraw_fee_rate;

        let draining = burn == supply;
        let mut net = Vec::with_capacity(2);
        let mut fees = Vec::with_capacity(2);
        for reserve in [&reserve_a, &reserve_b] {
            if draining {
                net.push(reserve.clone());
                fees.push(Amount::zero());
            } else {
                let gross = reserve.mul(&burn).checked_div_trunc(&supply)?;
                let fee = math::mul_trunc(&gross, fee_rate);
                net.push(&gross - &fee);
                fees.push(fee);
            }
        }

        let payout = vec![
            Coin::new(pool.pair().denom_a(), net[0].clone())?,
            Coin::new(pool.pair().denom_b(), net[1].clone())?,
        ];
        self.release_multi(&[Transfer {
            from: *pool.reserve_address(),
            to: state.withdrawer,
            coins: payout,
        }])?;
        self.bank
            .burn(&Address::escrow(), &[state.pool_coin.clone()])?;

        if self.params().batch_logic_invariant_checks {
            let (post_a, post_b) = self.reserves(&pool);
            let post_supply = self.pool_coin_supply(&pool);
            invariants::burning_pool_coins_invariant(
                &burn, &net[0], &net[1], &fees[0], &fees[1], &reserve_a, &reserve_b, &supply,
            )?;
            invariants::withdraw_amount_invariant(
                &net[0], &net[1], &reserve_a, &reserve_b, &burn, &supply, fee_rate,
            )?;
            invariants::withdraw_reserve_coins_invariant(
                &net[0],
                &net[1],
                &reserve_a,
                &reserve_b,
                &post_a,
                &post_b,
                &post_supply,
                &supply,
                &burn,
            )?;
            invariants::immutable_pool_price_invariant(
                &net[0], &net[1], &reserve_a, &reserve_b, &post_a, &post_b,
            )?;
        }

        state.succeeded = true;
        state.to_be_retired = true;
        self.save_withdraw(state)?;

        info!(
            pool_id = state.pool_id,
            msg_index = state.msg_index,
            burned = %burn,
            "executed withdrawal"
        );
        Ok(())
    }

    /// Refunds a withdrawal's escrowed pool coin and retires it as failed.
    pub(super) fn refund_withdraw(&mut self, state: &mut WithdrawState) -> Result<()> {
        self.release(&state.withdrawer, &[state.pool_coin.clone()])?;
        state.executed = true;
        state.succeeded = false;
        state.to_be_retired = true;
        self.save_withdraw(state)?;
        info!(
            pool_id = state.pool_id,
            msg_index = state.msg_index,
            "refunded withdrawal"
        );
        Ok(())
    }

    pub(super) fn save_withdraw(&mut self, state: &WithdrawState) -> Result<()> {
        self.set_record(&keys::withdraw_msg(state.pool_id, state.msg_index), state)
    }
}

//! Tick lifecycle.
//!
//! The host drives the engine with two callbacks per tick:
//!
//! - [`Engine::tick_begin`] retires the flagged messages of executed
//!   batches and reopens them for the new cycle;
//! - [`Engine::tick_end`] executes every due batch — deposits first,
//!   then withdrawals, then one swap matching round — and re-asserts the
//!   global escrow invariant.
//!
//! Both callbacks are idempotent per height. Executed batches keep their
//! message state until the next `tick_begin` so consumers can read
//! terminal intent state during the tick.

use tracing::debug;

use super::Engine;
use crate::domain::{DepositState, PoolBatch, SwapState, WithdrawState};
use crate::error::Result;
use crate::host::{AccountLookup, BankLedger, Clock, DistributionSink};
use crate::store::{keys, KvStore};

impl<S, B, A, D, C> Engine<S, B, A, D, C>
where
    S: KvStore,
    B: BankLedger,
    A: AccountLookup,
    D: DistributionSink,
    C: Clock,
{
    /// All live batches, ascending by pool id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::LiquidityError::CorruptRecord`] on a
    /// decode failure.
    pub fn batches(&self) -> Result<Vec<PoolBatch>> {
        self.decode_scan(keys::BATCH_PREFIX)
    }

    /// Opens the tick: retires executed batches' flagged messages and
    /// reopens them. Idempotent per height.
    ///
    /// # Errors
    ///
    /// Store decode failures only.
    pub fn tick_begin(&mut self, now: u64) -> Result<()> {
        if self.get_record::<u64>(keys::TICK_BEGUN)? == Some(now) {
            return Ok(());
        }
        self.retire_and_reopen_batches(now)?;
        self.set_record(keys::TICK_BEGUN, &now)?;
        debug!(height = now, "tick begin");
        Ok(())
    }

    /// Closes the tick: executes every due batch and re-asserts escrow
    /// sufficiency. Idempotent per height.
    ///
    /// # Errors
    ///
    /// Propagates execution errors — notably
    /// [`crate::error::LiquidityError::InvariantBroken`], after which the
    /// host must discard the tick's writes — and
    /// [`crate::error::LiquidityError::EscrowShortfall`], which also
    /// halts further intake.
    pub fn tick_end(&mut self, now: u64) -> Result<()> {
        if self.get_record::<u64>(keys::TICK_ENDED)? == Some(now) {
            return Ok(());
        }
        self.execute_pool_batches(now, false)?;
        if let Err(err) = self.check_escrow_sufficiency() {
            self.halted = true;
            return Err(err);
        }
        self.set_record(keys::TICK_ENDED, &now)?;
        debug!(height = now, "tick end");
        Ok(())
    }

    /// Retires flagged messages of executed batches and advances them.
    pub(super) fn retire_and_reopen_batches(&mut self, now: u64) -> Result<()> {
        for mut batch in self.batches()? {
            if !batch.executed {
                continue;
            }
            let pool_id = batch.pool_id;
            for state in self.deposit_msgs(pool_id)? {
                if state.to_be_retired {
                    self.store_delete(&keys::deposit_msg(pool_id, state.msg_index));
                }
            }
            for state in self.withdraw_msgs(pool_id)? {
                if state.to_be_retired {
                    self.store_delete(&keys::withdraw_msg(pool_id, state.msg_index));
                }
            }
            for state in self.swap_msgs(pool_id)? {
                if state.to_be_retired {
                    self.store_delete(&keys::swap_msg(pool_id, state.msg_index));
                }
            }
            batch.advance(now);
            self.set_record(&keys::batch(pool_id), &batch)?;
        }
        Ok(())
    }

    /// Executes every unexecuted batch that is due at `now` (or all of
    /// them when `force` is set, as bulk operations require).
    ///
    /// Within a pool the order is fixed: deposits, then withdrawals,
    /// then one swap matching round over the reserves they left behind.
    /// Pools execute in ascending id order.
    pub(super) fn execute_pool_batches(&mut self, now: u64, force: bool) -> Result<()> {
        let unit_batch_height = self.params().unit_batch_height;
        for mut batch in self.batches()? {
            if batch.executed {
                continue;
            }
            if !force && !batch.is_due(now, unit_batch_height) {
                continue;
            }
            let pool_id = batch.pool_id;

            let deposits: Vec<DepositState> = self
                .deposit_msgs(pool_id)?
                .into_iter()
                .filter(|s| !s.executed && !s.to_be_retired)
                .collect();
            for mut state in deposits {
                self.execute_deposit(&mut state)?;
            }

            let withdrawals: Vec<WithdrawState> = self
                .withdraw_msgs(pool_id)?
                .into_iter()
                .filter(|s| !s.executed && !s.to_be_retired)
                .collect();
            for mut state in withdrawals {
                self.execute_withdraw(&mut state)?;
            }

            match self.pool(pool_id) {
                Ok(pool) => self.execute_swaps(&pool, now)?,
                Err(_) => self.refund_live_swaps(pool_id)?,
            }

            batch.executed = true;
            self.set_record(&keys::batch(pool_id), &batch)?;
        }
        Ok(())
    }

    /// Refunds and retires every live swap of a pool whose reserves are
    /// gone (deleted or drained pool).
    pub(super) fn refund_live_swaps(&mut self, pool_id: u64) -> Result<()> {
        let live: Vec<SwapState> = self
            .swap_msgs(pool_id)?
            .into_iter()
            .filter(|s| !s.to_be_retired)
            .collect();
        for mut state in live {
            state.executed = true;
            let residue = state.outstanding();
            if residue.is_positive() {
                let refund = state.offer_coin.with_amount(residue)?;
                self.release(&state.requester, &[refund])?;
            }
            state.to_be_retired = true;
            self.save_swap(&state)?;
        }
        Ok(())
    }
}

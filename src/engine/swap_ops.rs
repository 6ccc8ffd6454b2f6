//! Swap batch execution.
//!
//! One matching round per pool per due batch: the matcher plans the
//! uniform clearing, this module settles it. Transacted offers and
//! offer-side fees flow escrow → reserve, demand payouts net of the
//! withheld exchanged fee flow reserve → requester, and everything lands
//! in one atomic bank call per pool. Orders that reach their expiry in
//! this round transact first and refund their residue after.

use tracing::{debug, info};

use super::{invariants, Engine};
use crate::domain::{Address, Coin, Pool, SwapState};
use crate::error::Result;
use crate::host::{AccountLookup, BankLedger, Clock, DistributionSink, Transfer};
use crate::matching::{self, MatchPlan};
use crate::store::{keys, KvStore};

impl<S, B, A, D, C> Engine<S, B, A, D, C>
where
    S: KvStore,
    B: BankLedger,
    A: AccountLookup,
    D: DistributionSink,
    C: Clock,
{
    /// Runs the matcher over a pool's live swaps and settles the plan.
    pub(super) fn execute_swaps(&mut self, pool: &Pool, now: u64) -> Result<()> {
        let mut live: Vec<SwapState> = self
            .swap_msgs(pool.id())?
            .into_iter()
            .filter(|s| !s.to_be_retired)
            .collect();
        if live.is_empty() {
            return Ok(());
        }

        let (reserve_a, reserve_b) = self.reserves(pool);
        if !reserve_a.is_positive() || !reserve_b.is_positive() {
            // Nothing to trade against: refund every order.
            return self.refund_live_swaps(pool.id());
        }

        let plan = matching::match_batch(
            &reserve_a,
            &reserve_b,
            &live,
            pool.pair(),
            self.params().swap_fee_rate,
        )?;
        debug!(
            pool_id = pool.id(),
            clearing_price = %plan.clearing_price,
            matched = plan.results.len(),
            "computed batch clearing"
        );

        self.settle_plan(pool, now, &mut live, &plan)?;

        let (post_a, post_b) = self.reserves(pool);
        invariants::swap_price_invariant(plan.clearing_price.get(), &post_a, &post_b)?;

        if !plan.results.is_empty() {
            info!(
                pool_id = pool.id(),
                clearing_price = %plan.clearing_price,
                matched_buy = %plan.matched_buy,
                matched_sell = %plan.matched_sell,
                "executed swap batch"
            );
        }
        Ok(())
    }

    /// Applies fills and expirations to the live swap set.
    fn settle_plan(
        &mut self,
        pool: &Pool,
        now: u64,
        live: &mut [SwapState],
        plan: &MatchPlan,
    ) -> Result<()> {
        let escrow = Address::escrow();
        let reserve = *pool.reserve_address();
        // Reserve inflows settle before any payout leaves the reserve, so
        // a heavily self-crossing batch cannot transiently overdraw it.
        let mut inflows: Vec<Transfer> = Vec::new();
        let mut outflows: Vec<Transfer> = Vec::new();

        for state in live.iter_mut() {
            state.executed = true;
            if let Some(result) = plan.result_for(state.msg_index) {
                let offer_in = state
                    .offer_coin
                    .with_amount(&result.transacted_offer + &result.offer_fee)?;
                inflows.push(Transfer {
                    from: escrow,
                    to: reserve,
                    coins: vec![offer_in],
                });
                let payout = Coin::new(
                    state.demand_denom.clone(),
                    &result.exchanged_demand - &result.exchanged_fee,
                )?;
                outflows.push(Transfer {
                    from: reserve,
                    to: state.requester,
                    coins: vec![payout],
                });

                state.remaining_offer -= &result.transacted_offer;
                state.reserved_offer_fee -= &result.offer_fee;
                state.exchanged_offer += &result.transacted_offer;
                state.succeeded = true;

                if state.remaining_offer.is_zero() {
                    // Fully filled; the unconsumed fee reservation refunds.
                    if state.reserved_offer_fee.is_positive() {
                        outflows.push(Transfer {
                            from: escrow,
                            to: state.requester,
                            coins: vec![state
                                .offer_coin
                                .with_amount(state.reserved_offer_fee.clone())?],
                        });
                        state.reserved_offer_fee = crate::domain::Amount::zero();
                    }
                    state.to_be_retired = true;
                } else if state.is_expired(now) {
                    // Partially filled but expiring: refund the residue.
                    outflows.push(Transfer {
                        from: escrow,
                        to: state.requester,
                        coins: vec![state.offer_coin.with_amount(state.outstanding())?],
                    });
                    state.to_be_retired = true;
                }
            } else if state.is_expired(now) {
                outflows.push(Transfer {
                    from: escrow,
                    to: state.requester,
                    coins: vec![state.offer_coin.with_amount(state.outstanding())?],
                });
                state.to_be_retired = true;
            }
        }

        inflows.append(&mut outflows);
        self.release_multi(&inflows)?;
        for state in live.iter() {
            self.save_swap(state)?;
        }
        Ok(())
    }

    pub(super) fn save_swap(&mut self, state: &SwapState) -> Result<()> {
        self.set_record(&keys::swap_msg(state.pool_id, state.msg_index), state)
    }
}

//! Module-wide forced withdrawal.
//!
//! Winds the module down: every user-held pool coin is forcibly
//! withdrawn through the normal batch pipeline, residual reserve dust is
//! swept to the community pool, and pools and batches are deleted. The
//! whole operation stages its store writes in a [`CacheStore`] overlay
//! and works on cloned bank/distribution capabilities, committing only
//! on complete success — a failed run leaves no trace.

use std::collections::BTreeMap;

use tracing::{debug, info};

use super::Engine;
use crate::domain::{Address, Coin};
use crate::error::{LiquidityError, Result};
use crate::host::{AccountLookup, BankLedger, Clock, DistributionSink, Transfer};
use crate::store::{self, CacheStore, KvStore};

impl<S, B, A, D, C> Engine<S, B, A, D, C>
where
    S: KvStore,
    B: BankLedger,
    A: AccountLookup,
    D: DistributionSink,
    C: Clock,
{
    /// Forcibly withdraws all pool-coin holders and removes every pool.
    ///
    /// Runs under a store overlay; on any error the overlay and the
    /// cloned capabilities are discarded and the engine is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`LiquidityError::MigrationIncomplete`] if intent state
    /// survives the forced batches (for example unexpired swap orders),
    /// plus any execution error from the batch pipeline.
    pub fn force_withdrawal(&mut self) -> Result<()>
    where
        B: Clone,
        A: Clone,
        D: Clone,
        C: Clone,
    {
        let mut scratch = Engine {
            store: CacheStore::new(&self.store),
            bank: self.bank.clone(),
            accounts: self.accounts.clone(),
            distribution: self.distribution.clone(),
            clock: self.clock.clone(),
            params: self.params.clone(),
            halted: self.halted,
        };
        scratch.force_withdrawal_inner()?;

        let Engine {
            store: overlay,
            bank,
            distribution,
            ..
        } = scratch;
        let writes = overlay.into_writes();
        store::apply_writes(&mut self.store, writes);
        self.bank = bank;
        self.distribution = distribution;
        info!("force withdrawal committed");
        Ok(())
    }

    fn force_withdrawal_inner(&mut self) -> Result<()> {
        let now = self.clock_height();
        let pools = self.pools()?;
        let pool_by_coin_denom: BTreeMap<String, u64> = pools
            .iter()
            .map(|p| (p.pool_coin_denom().to_owned(), p.id()))
            .collect();

        // Two rounds: the second catches pool coin left over from
        // truncation in the first.
        for _ in 0..2 {
            let mut holders: Vec<(Address, Coin)> = Vec::new();
            self.bank.visit_all_balances(&mut |address, coin| {
                if pool_by_coin_denom.contains_key(coin.denom()) {
                    holders.push((*address, coin.clone()));
                }
            });
            for (address, coin) in holders {
                let user_controlled = self
                    .accounts
                    .resolve(&address)
                    .is_some_and(|info| !info.is_module_owned());
                if !user_controlled {
                    continue;
                }
                let pool_id = pool_by_coin_denom[coin.denom()];
                if let Err(err) = self.withdraw_within_batch(&address, pool_id, coin.clone()) {
                    debug!(withdrawer = %address, %coin, %err, "failed force withdrawal");
                }
            }
            self.execute_pool_batches(now, true)?;
            self.retire_and_reopen_batches(now + 1)?;
        }

        for pool in &pools {
            if !self.deposit_msgs(pool.id())?.is_empty() {
                return Err(LiquidityError::MigrationIncomplete(
                    "deposit msg states must be empty",
                ));
            }
            if !self.withdraw_msgs(pool.id())?.is_empty() {
                return Err(LiquidityError::MigrationIncomplete(
                    "withdraw msg states must be empty",
                ));
            }
            if !self.swap_msgs(pool.id())?.is_empty() {
                return Err(LiquidityError::MigrationIncomplete(
                    "swap msg states must be empty",
                ));
            }
        }

        // Sweep residual reserve balances to the community pool.
        for pool in &pools {
            let balances = self.bank.all_balances(pool.reserve_address());
            if balances.is_empty() {
                continue;
            }
            self.bank.send(&[Transfer {
                from: *pool.reserve_address(),
                to: Address::community_pool(),
                coins: balances.clone(),
            }])?;
            self.distribution
                .fund_community_pool(pool.reserve_address(), &balances)?;
        }

        for batch in self.batches()? {
            self.store_delete(&crate::store::keys::batch(batch.pool_id));
        }
        for pool in &pools {
            self.store_delete(&crate::store::keys::pool(pool.id()));
            self.store_delete(&crate::store::keys::pool_by_reserve(pool.reserve_address()));
            self.store_delete(&crate::store::keys::pool_by_denoms(
                pool.pair(),
                pool.type_id(),
            ));
        }
        Ok(())
    }
}

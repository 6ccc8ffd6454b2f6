//! Genesis export and import.

use tracing::info;

use super::Engine;
use crate::error::Result;
use crate::genesis::{GenesisState, PoolRecord};
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
    /// Exports the complete module state.
    ///
    /// The snapshot is validated before it is returned, so an export that
    /// succeeds is always importable.
    ///
    /// # Errors
    ///
    /// Store decode failures and record inconsistencies.
    pub fn export_state(&self) -> Result<GenesisState> {
        let mut pool_records = Vec::new();
        for pool in self.pools()? {
            let pool_id = pool.id();
            pool_records.push(PoolRecord {
                batch: self.pool_batch(pool_id)?,
                deposit_msgs: self.deposit_msgs(pool_id)?,
                withdraw_msgs: self.withdraw_msgs(pool_id)?,
                swap_msgs: self.swap_msgs(pool_id)?,
                pool,
            });
        }
        let state = GenesisState {
            params: self.params().clone(),
            pool_records,
        };
        state.validate()?;
        Ok(state)
    }

    /// Imports a module snapshot into an empty store.
    ///
    /// Lifecycle flags are restored verbatim: a batch exported as
    /// `executed` stays executed, so replaying the next `tick_begin`
    /// retires its messages instead of re-executing them.
    ///
    /// # Errors
    ///
    /// Returns validation errors from the snapshot; nothing is written on
    /// failure.
    pub fn import_state(&mut self, state: &GenesisState) -> Result<()> {
        state.validate()?;
        self.set_params(state.params.clone())?;
        let mut max_pool_id = 0u64;
        for record in &state.pool_records {
            let pool = &record.pool;
            let pool_id = pool.id();
            max_pool_id = max_pool_id.max(pool_id);
            self.set_record(&keys::pool(pool_id), pool)?;
            self.set_record(&keys::pool_by_reserve(pool.reserve_address()), &pool_id)?;
            self.set_record(&keys::pool_by_denoms(pool.pair(), pool.type_id()), &pool_id)?;
            self.set_record(&keys::batch(pool_id), &record.batch)?;
            for msg in &record.deposit_msgs {
                self.set_record(&keys::deposit_msg(pool_id, msg.msg_index), msg)?;
            }
            for msg in &record.withdraw_msgs {
                self.set_record(&keys::withdraw_msg(pool_id, msg.msg_index), msg)?;
            }
            for msg in &record.swap_msgs {
                self.set_record(&keys::swap_msg(pool_id, msg.msg_index), msg)?;
            }
        }
        self.set_record(keys::NEXT_POOL_ID, &(max_pool_id + 1))?;
        info!(pools = state.pool_records.len(), "imported genesis state");
        Ok(())
    }
}

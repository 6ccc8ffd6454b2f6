//! Genesis snapshot types.
//!
//! A [`GenesisState`] captures the whole module: parameters plus one
//! [`PoolRecord`] per pool carrying the pool, its live batch and every
//! intent state with lifecycle flags intact. Exporting after a batch has
//! executed but before its messages retire, then importing, must not
//! re-execute the batch — which is why the `executed` and
//! `to_be_retired` flags travel in the snapshot verbatim.
//!
//! Account balances (reserves, escrow, user wallets, pool-coin supply)
//! are the host bank's genesis concern and are not duplicated here.

use serde::{Deserialize, Serialize};

use crate::config::Params;
use crate::domain::{DepositState, Pool, PoolBatch, SwapState, WithdrawState};
use crate::error::{LiquidityError, Result};

/// One pool's complete module state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolRecord {
    /// The pool record.
    pub pool: Pool,
    /// The pool's live batch.
    pub batch: PoolBatch,
    /// Queued and terminal deposit messages, ascending by index.
    pub deposit_msgs: Vec<DepositState>,
    /// Queued and terminal withdraw messages, ascending by index.
    pub withdraw_msgs: Vec<WithdrawState>,
    /// Queued and terminal swap messages, ascending by index.
    pub swap_msgs: Vec<SwapState>,
}

impl PoolRecord {
    /// Validates internal consistency of the record.
    ///
    /// # Errors
    ///
    /// Returns [`LiquidityError::CorruptRecord`] if derived identities do
    /// not re-derive, ids disagree, or batch cursors sit at or below an
    /// existing message index.
    pub fn validate(&self) -> Result<()> {
        if !self.pool.identities_consistent() {
            return Err(LiquidityError::CorruptRecord(
                "pool identities do not re-derive",
            ));
        }
        if self.batch.pool_id != self.pool.id() {
            return Err(LiquidityError::CorruptRecord("batch pool id mismatch"));
        }
        if let Some(last) = self.deposit_msgs.last() {
            if self.batch.deposit_msg_index <= last.msg_index {
                return Err(LiquidityError::CorruptRecord("deposit cursor behind messages"));
            }
        }
        if let Some(last) = self.withdraw_msgs.last() {
            if self.batch.withdraw_msg_index <= last.msg_index {
                return Err(LiquidityError::CorruptRecord(
                    "withdraw cursor behind messages",
                ));
            }
        }
        if let Some(last) = self.swap_msgs.last() {
            if self.batch.swap_msg_index <= last.msg_index {
                return Err(LiquidityError::CorruptRecord("swap cursor behind messages"));
            }
        }
        let pool_id = self.pool.id();
        if self.deposit_msgs.iter().any(|m| m.pool_id != pool_id)
            || self.withdraw_msgs.iter().any(|m| m.pool_id != pool_id)
            || self.swap_msgs.iter().any(|m| m.pool_id != pool_id)
        {
            return Err(LiquidityError::CorruptRecord("message pool id mismatch"));
        }
        Ok(())
    }
}

/// The module's full genesis state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenesisState {
    /// Parameter snapshot.
    pub params: Params,
    /// One record per pool, ascending by pool id.
    pub pool_records: Vec<PoolRecord>,
}

impl Default for GenesisState {
    fn default() -> Self {
        Self {
            params: Params::default(),
            pool_records: Vec::new(),
        }
    }
}

impl GenesisState {
    /// Validates the snapshot.
    ///
    /// # Errors
    ///
    /// Returns parameter validation errors and any record inconsistency.
    pub fn validate(&self) -> Result<()> {
        self.params.validate()?;
        let mut last_id = 0u64;
        for record in &self.pool_records {
            record.validate()?;
            if record.pool.id() <= last_id {
                return Err(LiquidityError::CorruptRecord(
                    "pool records must ascend by id",
                ));
            }
            last_id = record.pool.id();
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::DenomPair;

    fn record(pool_id: u64) -> PoolRecord {
        let Ok(pair) = DenomPair::new("denomX", "denomY") else {
            panic!("valid pair");
        };
        PoolRecord {
            pool: Pool::new(pool_id, 1, pair),
            batch: PoolBatch::new(pool_id, 1, 0),
            deposit_msgs: Vec::new(),
            withdraw_msgs: Vec::new(),
            swap_msgs: Vec::new(),
        }
    }

    #[test]
    fn default_genesis_is_valid() {
        assert!(GenesisState::default().validate().is_ok());
    }

    #[test]
    fn well_formed_record_passes() {
        assert!(record(1).validate().is_ok());
    }

    #[test]
    fn batch_pool_id_mismatch_fails() {
        let mut r = record(1);
        r.batch.pool_id = 2;
        assert!(r.validate().is_err());
    }

    #[test]
    fn duplicate_pool_ids_fail() {
        let genesis = GenesisState {
            params: Params::default(),
            pool_records: vec![record(1), record(1)],
        };
        assert!(genesis.validate().is_err());
    }

    #[test]
    fn descending_pool_ids_fail() {
        let genesis = GenesisState {
            params: Params::default(),
            pool_records: vec![record(2), record(1)],
        };
        assert!(genesis.validate().is_err());
    }
}

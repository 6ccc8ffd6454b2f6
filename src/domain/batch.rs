//! Per-pool batch execution envelope.

use serde::{Deserialize, Serialize};

/// The per-pool, per-cycle envelope collecting intents for atomic
/// execution at tick end.
///
/// Exactly one live batch exists per pool. A batch that has executed is
/// retained for one tick so dependent consumers can observe terminal
/// intent state; the next `tick_begin` retires its flagged messages and
/// advances the index.
///
/// The `*_msg_index` cursors hold the index the **next** message of each
/// kind will receive; they start at 1 and never reset, so message keys
/// stay unique for the lifetime of the pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolBatch {
    /// Owning pool.
    pub pool_id: u64,
    /// Monotonically increasing batch number, starting at 1.
    pub index: u64,
    /// Tick at which this batch opened.
    pub begin_height: u64,
    /// Next deposit message index.
    pub deposit_msg_index: u64,
    /// Next withdraw message index.
    pub withdraw_msg_index: u64,
    /// Next swap message index.
    pub swap_msg_index: u64,
    /// Whether this batch has been processed by `tick_end`.
    pub executed: bool,
}

impl PoolBatch {
    /// Creates the first batch of a pool.
    #[must_use]
    pub const fn new(pool_id: u64, index: u64, begin_height: u64) -> Self {
        Self {
            pool_id,
            index,
            begin_height,
            deposit_msg_index: 1,
            withdraw_msg_index: 1,
            swap_msg_index: 1,
            executed: false,
        }
    }

    /// Allocates the next deposit message index.
    pub fn next_deposit_index(&mut self) -> u64 {
        let index = self.deposit_msg_index;
        self.deposit_msg_index += 1;
        index
    }

    /// Allocates the next withdraw message index.
    pub fn next_withdraw_index(&mut self) -> u64 {
        let index = self.withdraw_msg_index;
        self.withdraw_msg_index += 1;
        index
    }

    /// Allocates the next swap message index.
    pub fn next_swap_index(&mut self) -> u64 {
        let index = self.swap_msg_index;
        self.swap_msg_index += 1;
        index
    }

    /// Reopens the batch for a new cycle after execution.
    pub fn advance(&mut self, begin_height: u64) {
        self.index += 1;
        self.executed = false;
        self.begin_height = begin_height;
    }

    /// Whether the batch is due for execution at tick `now` under the
    /// given batch cadence.
    #[must_use]
    pub const fn is_due(&self, now: u64, unit_batch_height: u64) -> bool {
        now + 1 >= self.begin_height + unit_batch_height
    }
}

//! Convenience re-exports for common types and traits.
//!
//! The prelude provides a single import to bring all commonly used items
//! into scope:
//!
//! ```rust
//! use tidepool::prelude::*;
//! ```

// Re-export domain types
pub use crate::domain::{
    Address, Amount, Coin, DenomPair, DepositState, Intent, IntentId, MatchResult, Pool,
    PoolBatch, Price, SwapState, WithdrawState,
};

// Re-export the engine facade
pub use crate::engine::{Engine, MODULE_NAME};

// Re-export host capability traits
pub use crate::host::{
    AccountInfo, AccountLookup, BankLedger, Clock, DistributionSink, InvariantRegistry, Transfer,
};

// Re-export the store abstraction
pub use crate::store::{CacheStore, KvStore, MemStore};

// Re-export matching types
pub use crate::matching::{match_batch, MatchPlan, OrderBook, PriceDirection};

// Re-export configuration
pub use crate::config::{Params, PoolType};

// Re-export genesis types
pub use crate::genesis::{GenesisState, PoolRecord};

// Re-export error types
pub use crate::error::{LiquidityError, Result};

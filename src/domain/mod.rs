//! Fundamental domain value types used throughout the engine.
//!
//! This module contains the core value types that model the batched AMM
//! domain: amounts, prices, coins, addresses, pools, batches and intent
//! lifecycle records. Value types use validated constructors; lifecycle
//! records are plain data mutated by the engine and serialized to the
//! store.

mod address;
mod amount;
mod batch;
mod coin;
mod denom_pair;
mod intent;
mod pool;
mod price;

pub use address::Address;
pub use amount::Amount;
pub use batch::PoolBatch;
pub use coin::Coin;
pub use denom_pair::DenomPair;
pub use intent::{DepositState, Intent, IntentId, MatchResult, SwapState, WithdrawState};
pub use pool::Pool;
pub use price::Price;

//! # Tidepool
//!
//! Batched constant-product AMM engine: deposit, withdraw and swap
//! intents accumulate in per-pool batches and clear together, once per
//! tick, at a single uniform price.
//!
//! Unlike a continuous AMM, no intent settles at intake time. Funds move
//! to a module escrow immediately, the intent queues on the pool's live
//! batch, and the host's end-of-tick callback executes the whole batch
//! atomically: deposits first, then withdrawals, then one matching round
//! over every live limit swap. All matched swaps transact at the same
//! clearing price, chosen so the post-trade reserve ratio equals that
//! price while the reserve product is preserved.
//!
//! # Quick Start
//!
//! ```rust
//! use tidepool::config::Params;
//! use tidepool::domain::{Address, Amount, Coin};
//! use tidepool::engine::Engine;
//! use tidepool::host::memory::{FixedClock, MemoryAccounts, MemoryBank, MemoryDistribution};
//! use tidepool::host::BankLedger;
//! use tidepool::store::MemStore;
//!
//! // 1. Fund a creator account on the (in-memory) host bank
//! let alice = Address::derive("alice");
//! let mut bank = MemoryBank::new();
//! bank.fund(&alice, &Coin::new("denomX", Amount::new(2_000_000_000u64)).expect("coin"));
//! bank.fund(&alice, &Coin::new("denomY", Amount::new(2_000_000_000u64)).expect("coin"));
//!
//! // 2. Build the engine over host capabilities
//! let mut engine = Engine::new(
//!     MemStore::new(),
//!     bank,
//!     MemoryAccounts::new(),
//!     MemoryDistribution::new(),
//!     FixedClock::at(1),
//!     Params::default(),
//! )
//! .expect("valid params");
//!
//! // 3. Create a pool; the initial pool-coin mint goes to the creator
//! let pool = engine
//!     .create_pool(
//!         &alice,
//!         1,
//!         Coin::new("denomX", Amount::new(1_000_000_000u64)).expect("coin"),
//!         Coin::new("denomY", Amount::new(1_000_000_000u64)).expect("coin"),
//!     )
//!     .expect("pool created");
//! assert_eq!(
//!     engine.bank().balance(&alice, pool.pool_coin_denom()),
//!     Amount::new(1_000_000u64),
//! );
//!
//! // 4. Queue a deposit and run one tick; the batch settles at tick end
//! engine.tick_begin(1).expect("tick begin");
//! engine
//!     .deposit_within_batch(
//!         &alice,
//!         pool.id(),
//!         Coin::new("denomX", Amount::new(1_000_000_000u64)).expect("coin"),
//!         Coin::new("denomY", Amount::new(1_000_000_000u64)).expect("coin"),
//!     )
//!     .expect("queued");
//! engine.tick_end(1).expect("tick end");
//!
//! // Doubling the reserves doubled the pool-coin supply
//! assert_eq!(
//!     engine.bank().balance(&alice, pool.pool_coin_denom()),
//!     Amount::new(2_000_000u64),
//! );
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  tick_begin / tick_end, intake ops
//! │     Host      │──────────────────────────────┐
//! └──────┬───────┘                               ▼
//!        │ injects                        ┌──────────────┐
//!        ▼                                │    Engine     │
//! ┌──────────────┐   BankLedger, Clock,   │  (batches,    │
//! │ Capabilities  │◄──AccountLookup, ...──│   escrow,     │
//! └──────────────┘                        │   invariants) │
//! ┌──────────────┐   KvStore              └──────┬───────┘
//! │    Store      │◄───────────────────────────┘ │ match_batch
//! └──────────────┘                               ▼
//!                                         ┌──────────────┐
//!                                         │   Matching    │
//!                                         │ (order book,  │
//!                                         │  clearing)    │
//!                                         └──────────────┘
//! ```
//!
//! # Module Guide
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`domain`] | Value types and lifecycle records: [`Amount`](domain::Amount), [`Price`](domain::Price), [`Coin`](domain::Coin), [`Pool`](domain::Pool), intent states |
//! | [`engine`] | The [`Engine`](engine::Engine) facade: intake, tick lifecycle, escrow, invariants, forced withdrawal |
//! | [`matching`] | Uniform-price batch matching: [`OrderBook`](matching::OrderBook), [`match_batch`](matching::match_batch) |
//! | [`host`] | Capability traits and in-memory reference implementations |
//! | [`store`] | [`KvStore`](store::KvStore) trait, [`MemStore`](store::MemStore), [`CacheStore`](store::CacheStore) overlay, key schema |
//! | [`config`] | [`Params`](config::Params) snapshot and pool types |
//! | [`genesis`] | [`GenesisState`](genesis::GenesisState) export/import |
//! | [`math`] | Truncating big-integer × decimal arithmetic |
//! | [`error`] | [`LiquidityError`](error::LiquidityError) unified error enum |
//! | [`prelude`] | Convenience re-exports |

pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod genesis;
pub mod host;
pub mod math;
pub mod matching;
pub mod prelude;
pub mod store;

//! Module parameters.
//!
//! All tunable behavior of the engine lives in a single [`Params`]
//! record. The engine snapshots it at the top of every tick, so every
//! operation within a tick observes one consistent configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{Amount, Coin};
use crate::error::{LiquidityError, Result};

/// A registered pool type, bounding how many reserve coins its pools hold.
///
/// Only the default two-asset type is meaningful to the constant-product
/// engine; the bounds exist so hosts can register (and reject) others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolType {
    /// Stable type identifier, referenced by `create_pool`.
    pub id: u32,
    /// Minimum number of reserve coins.
    pub min_reserve_coins: u32,
    /// Maximum number of reserve coins.
    pub max_reserve_coins: u32,
}

impl PoolType {
    /// The default two-asset constant-product pool type.
    #[must_use]
    pub const fn default_pair() -> Self {
        Self {
            id: 1,
            min_reserve_coins: 2,
            max_reserve_coins: 2,
        }
    }
}

/// Module parameter snapshot.
///
/// Defaults follow the reference deployment: 0.3% swap and withdraw
/// fees, a 10% per-order reserve cap, batches every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Params {
    /// Registered pool types.
    pub pool_types: Vec<PoolType>,
    /// Minimum per-asset amount for `create_pool`.
    pub min_init_deposit_amount: Amount,
    /// Pool coins minted to the creator at pool creation.
    pub init_pool_coin_mint_amount: Amount,
    /// Cap on each reserve (zero = unbounded).
    pub max_reserve_coin_amount: Amount,
    /// Multi-coin fee routed to the community pool on creation.
    pub pool_creation_fee: Vec<Coin>,
    /// Swap fee rate, e.g. `0.003`.
    pub swap_fee_rate: Decimal,
    /// Withdraw fee rate, e.g. `0.003`.
    pub withdraw_fee_rate: Decimal,
    /// Largest fraction of the offer-side reserve a single order may bid.
    pub max_order_amount_ratio: Decimal,
    /// Ticks per batch cycle (1 = every tick).
    pub unit_batch_height: u64,
    /// Halts new intake when enabled.
    pub circuit_breaker_enabled: bool,
    /// Enables the heavyweight in-path invariant checks.
    ///
    /// Meant for development and simulation runs; a violation aborts the
    /// batch with [`LiquidityError::InvariantBroken`].
    pub batch_logic_invariant_checks: bool,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            pool_types: vec![PoolType::default_pair()],
            min_init_deposit_amount: Amount::new(1_000_000u64),
            init_pool_coin_mint_amount: Amount::new(1_000_000u64),
            max_reserve_coin_amount: Amount::zero(),
            pool_creation_fee: Vec::new(),
            swap_fee_rate: Decimal::new(3, 3),
            withdraw_fee_rate: Decimal::new(3, 3),
            max_order_amount_ratio: Decimal::new(1, 1),
            unit_batch_height: 1,
            circuit_breaker_enabled: false,
            batch_logic_invariant_checks: false,
        }
    }
}

impl Params {
    /// Validates the parameter set.
    ///
    /// # Errors
    ///
    /// Returns [`LiquidityError::InvalidParams`] naming the offending key.
    pub fn validate(&self) -> Result<()> {
        if self.pool_types.is_empty() {
            return Err(LiquidityError::InvalidParams("pool_types must not be empty"));
        }
        for pool_type in &self.pool_types {
            if pool_type.min_reserve_coins > pool_type.max_reserve_coins {
                return Err(LiquidityError::InvalidParams(
                    "pool type reserve bounds are inverted",
                ));
            }
        }
        if !self.min_init_deposit_amount.is_positive() {
            return Err(LiquidityError::InvalidParams(
                "min_init_deposit_amount must be positive",
            ));
        }
        if !self.init_pool_coin_mint_amount.is_positive() {
            return Err(LiquidityError::InvalidParams(
                "init_pool_coin_mint_amount must be positive",
            ));
        }
        if self.max_reserve_coin_amount.is_negative() {
            return Err(LiquidityError::InvalidParams(
                "max_reserve_coin_amount must not be negative",
            ));
        }
        if self.swap_fee_rate.is_sign_negative() || self.swap_fee_rate >= Decimal::ONE {
            return Err(LiquidityError::InvalidParams(
                "swap_fee_rate must be in [0, 1)",
            ));
        }
        if self.withdraw_fee_rate.is_sign_negative() || self.withdraw_fee_rate >= Decimal::ONE {
            return Err(LiquidityError::InvalidParams(
                "withdraw_fee_rate must be in [0, 1)",
            ));
        }
        if self.max_order_amount_ratio.is_sign_negative()
            || self.max_order_amount_ratio > Decimal::ONE
        {
            return Err(LiquidityError::InvalidParams(
                "max_order_amount_ratio must be in [0, 1]",
            ));
        }
        if self.unit_batch_height == 0 {
            return Err(LiquidityError::InvalidParams(
                "unit_batch_height must be at least 1",
            ));
        }
        Ok(())
    }

    /// Looks up a registered pool type.
    #[must_use]
    pub fn pool_type(&self, type_id: u32) -> Option<&PoolType> {
        self.pool_types.iter().find(|t| t.id == type_id)
    }
}

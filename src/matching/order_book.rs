//! Price-keyed order aggregation.
//!
//! The matcher never looks at individual orders to pick a clearing
//! price; it works on an [`OrderBook`] that aggregates live swap intents
//! per distinct limit price. Pool price and every limit price are quoted
//! as the reserve ratio `X / Y`.
//!
//! Sides follow the offer denomination:
//!
//! - **buy** side: orders offering the pair's first denom (X), aggregated
//!   in X units. A buy is executable at any clearing price at or below
//!   its limit, so buy depth is summed over limits *at or above* a
//!   candidate price.
//! - **sell** side: orders offering the second denom (Y), aggregated in Y
//!   units, executable at clearing prices at or above their limit.

use std::collections::BTreeMap;

use crate::domain::{Amount, DenomPair, Price, SwapState};
use crate::math;

/// Which way the clearing price moves relative to the pool price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceDirection {
    /// Buy pressure dominates; the clearing price rises.
    Increase,
    /// Sell pressure dominates; the clearing price falls.
    Decrease,
    /// Neither side dominates; the batch clears at the pool price.
    Stay,
}

/// Aggregated order volume at one limit price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderByPrice {
    /// The limit price shared by all aggregated orders.
    pub order_price: Price,
    /// Total remaining offer of buy-side orders, in X units.
    pub buy_offer_amt: Amount,
    /// Total remaining offer of sell-side orders, in Y units.
    pub sell_offer_amt: Amount,
}

/// Limit orders of one pool aggregated by price.
#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    levels: BTreeMap<Price, OrderByPrice>,
}

impl OrderBook {
    /// Builds the book from live swap states.
    ///
    /// Orders with nothing left to offer are skipped; everything else is
    /// aggregated under its limit price on the side its offer denom
    /// dictates.
    #[must_use]
    pub fn from_swaps(swaps: &[SwapState], pair: &DenomPair) -> Self {
        let mut book = Self::default();
        for swap in swaps {
            if !swap.remaining_offer.is_positive() {
                continue;
            }
            let level = book
                .levels
                .entry(swap.order_price)
                .or_insert_with(|| OrderByPrice {
                    order_price: swap.order_price,
                    buy_offer_amt: Amount::zero(),
                    sell_offer_amt: Amount::zero(),
                });
            if swap.offer_coin.denom() == pair.denom_a() {
                level.buy_offer_amt += &swap.remaining_offer;
            } else {
                level.sell_offer_amt += &swap.remaining_offer;
            }
        }
        book
    }

    /// Returns `true` if the book holds no orders.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Executable volume at a candidate price: buy depth with limits at
    /// or above `at` (X units) and sell depth with limits at or below
    /// `at` (Y units).
    #[must_use]
    pub fn executable_amounts(&self, at: Price) -> (Amount, Amount) {
        let mut buy = Amount::zero();
        let mut sell = Amount::zero();
        for (price, level) in &self.levels {
            if *price >= at {
                buy += &level.buy_offer_amt;
            }
            if *price <= at {
                sell += &level.sell_offer_amt;
            }
        }
        (buy, sell)
    }

    /// Picks the clearing direction at the current pool price by
    /// comparing executable buy volume against executable sell volume
    /// scaled into X units.
    #[must_use]
    pub fn direction(&self, pool_price: Price) -> PriceDirection {
        let (buy, sell) = self.executable_amounts(pool_price);
        if buy.is_zero() && sell.is_zero() {
            return PriceDirection::Stay;
        }
        match math::cmp_scaled(&buy, &sell, pool_price.get()) {
            core::cmp::Ordering::Greater => PriceDirection::Increase,
            core::cmp::Ordering::Less => PriceDirection::Decrease,
            core::cmp::Ordering::Equal => PriceDirection::Stay,
        }
    }

    /// Distinct order prices strictly above `price`, ascending.
    #[must_use]
    pub fn prices_above(&self, price: Price) -> Vec<Price> {
        self.levels
            .keys()
            .filter(|p| **p > price)
            .copied()
            .collect()
    }

    /// Distinct order prices strictly below `price`, descending.
    #[must_use]
    pub fn prices_below(&self, price: Price) -> Vec<Price> {
        let mut prices: Vec<Price> = self
            .levels
            .keys()
            .filter(|p| **p < price)
            .copied()
            .collect();
        prices.reverse();
        prices
    }
}

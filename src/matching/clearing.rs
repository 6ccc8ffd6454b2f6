//! Clearing-price search and fill computation.
//!
//! Given the pool reserves and the aggregated order book, the matcher
//! selects one uniform clearing price per batch and turns it into a
//! [`MatchPlan`]: per-order transacted amounts, fee splits and predicted
//! post-reserves. The matcher never mutates balances — the engine applies
//! the plan through the bank seam.
//!
//! # Price search
//!
//! Starting from the pool price `P = X/Y`, candidate prices walk the
//! distinct order prices in the clearing direction. A candidate `Pc` is
//! feasible when the executable volume on the dominating side covers the
//! opposite side converted at `Pc` plus the pool's product-preserving
//! replenishment (`X' · Y' = X · Y`, `X'/Y' = Pc`). Feasibility is
//! monotone along the ladder, so the search keeps the last feasible
//! candidate: the largest for `Increase`, the smallest for `Decrease` —
//! which is also the feasible price closest to `P` that still maximizes
//! matched volume.
//!
//! # Fills
//!
//! Orders whose limit is strictly better than the clearing price fill
//! first and fully; orders exactly at the clearing price share the
//! residual pro-rata by remaining offer. All payouts truncate toward
//! zero.

use rust_decimal::Decimal;

use super::order_book::{OrderBook, PriceDirection};
use crate::domain::{Amount, DenomPair, MatchResult, Price, SwapState};
use crate::error::{LiquidityError, Result};
use crate::math;

/// The full outcome of one batch matching round.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchPlan {
    /// Direction the clearing price moved.
    pub direction: PriceDirection,
    /// The uniform clearing price.
    pub clearing_price: Price,
    /// Buy-side offer volume that transacted, in X units.
    pub matched_buy: Amount,
    /// Sell-side offer volume that transacted, in Y units.
    pub matched_sell: Amount,
    /// Per-order outcomes, in the input order of the swaps.
    pub results: Vec<MatchResult>,
    /// Predicted X reserve after applying every result.
    pub post_reserve_a: Amount,
    /// Predicted Y reserve after applying every result.
    pub post_reserve_b: Amount,
}

impl MatchPlan {
    fn unmatched(pool_price: Price, reserve_a: &Amount, reserve_b: &Amount) -> Self {
        Self {
            direction: PriceDirection::Stay,
            clearing_price: pool_price,
            matched_buy: Amount::zero(),
            matched_sell: Amount::zero(),
            results: Vec::new(),
            post_reserve_a: reserve_a.clone(),
            post_reserve_b: reserve_b.clone(),
        }
    }

    /// Looks up the result settling a particular swap message.
    #[must_use]
    pub fn result_for(&self, msg_index: u64) -> Option<&MatchResult> {
        self.results.iter().find(|r| r.msg_index == msg_index)
    }
}

/// Computes the uniform clearing for one pool's live swaps.
///
/// `swaps` must contain only live (unretired) orders of the pool; they
/// are read in slice order, which the engine keeps at insertion order for
/// deterministic pro-rata truncation.
///
/// # Errors
///
/// Returns [`LiquidityError::DepletedPool`] if either reserve is not
/// positive, and arithmetic errors if amounts exceed decimal range.
pub fn match_batch(
    reserve_a: &Amount,
    reserve_b: &Amount,
    swaps: &[SwapState],
    pair: &DenomPair,
    swap_fee_rate: Decimal,
) -> Result<MatchPlan> {
    if !reserve_a.is_positive() || !reserve_b.is_positive() {
        return Err(LiquidityError::DepletedPool);
    }
    let pool_price = Price::new(math::ratio(reserve_a, reserve_b)?)?;
    let book = OrderBook::from_swaps(swaps, pair);
    if book.is_empty() {
        return Ok(MatchPlan::unmatched(pool_price, reserve_a, reserve_b));
    }

    let direction = book.direction(pool_price);
    let (clearing_price, matched_buy, matched_sell) = match direction {
        PriceDirection::Stay => {
            let (buy, sell) = book.executable_amounts(pool_price);
            if buy.is_zero() && sell.is_zero() {
                return Ok(MatchPlan::unmatched(pool_price, reserve_a, reserve_b));
            }
            // Exact balance: both sides transact fully at the pool price.
            (pool_price, buy, sell)
        }
        PriceDirection::Increase => {
            match search_increase(reserve_a, reserve_b, &book, pool_price)? {
                Some(found) => found,
                None => return Ok(MatchPlan::unmatched(pool_price, reserve_a, reserve_b)),
            }
        }
        PriceDirection::Decrease => {
            match search_decrease(reserve_a, reserve_b, &book, pool_price)? {
                Some(found) => found,
                None => return Ok(MatchPlan::unmatched(pool_price, reserve_a, reserve_b)),
            }
        }
    };

    let results = build_results(
        swaps,
        pair,
        direction,
        clearing_price,
        &matched_buy,
        &matched_sell,
        swap_fee_rate,
    )?;

    let (post_reserve_a, post_reserve_b) =
        post_reserves(reserve_a, reserve_b, swaps, pair, &results)?;

    Ok(MatchPlan {
        direction,
        clearing_price,
        matched_buy,
        matched_sell,
        results,
        post_reserve_a,
        post_reserve_b,
    })
}

/// The X the pool must absorb to move its price up to `pc` along the
/// constant-product curve: `isqrt(X·Y·pc) − X`, floored at zero.
fn pool_delta_x(reserve_a: &Amount, reserve_b: &Amount, pc: Price) -> Result<Amount> {
    let product = reserve_a.mul(reserve_b);
    let target = math::mul_trunc(&product, pc.get()).isqrt()?;
    Ok((&target - reserve_a).max(Amount::zero()))
}

/// The Y the pool must absorb to move its price down to `pc`:
/// `isqrt(X·Y/pc) − Y`, floored at zero.
fn pool_delta_y(reserve_a: &Amount, reserve_b: &Amount, pc: Price) -> Result<Amount> {
    let product = reserve_a.mul(reserve_b);
    let target = math::div_trunc(&product, pc.get())?.isqrt()?;
    Ok((&target - reserve_b).max(Amount::zero()))
}

type Found = Option<(Price, Amount, Amount)>;

fn search_increase(
    reserve_a: &Amount,
    reserve_b: &Amount,
    book: &OrderBook,
    pool_price: Price,
) -> Result<Found> {
    let mut chosen = None;
    let mut candidates = vec![pool_price];
    candidates.extend(book.prices_above(pool_price));
    for pc in candidates {
        let (buy, sell) = book.executable_amounts(pc);
        let delta = pool_delta_x(reserve_a, reserve_b, pc)?;
        let required = &math::mul_trunc(&sell, pc.get()) + &delta;
        if buy < required {
            // Feasibility is monotone: higher candidates shrink the buy
            // side and grow the requirement.
            break;
        }
        let matched_buy = buy.min(required);
        chosen = Some((pc, matched_buy, sell));
    }
    Ok(chosen)
}

fn search_decrease(
    reserve_a: &Amount,
    reserve_b: &Amount,
    book: &OrderBook,
    pool_price: Price,
) -> Result<Found> {
    let mut chosen = None;
    let mut candidates = vec![pool_price];
    candidates.extend(book.prices_below(pool_price));
    for pc in candidates {
        if pc.is_zero() {
            break;
        }
        let (buy, sell) = book.executable_amounts(pc);
        let delta = pool_delta_y(reserve_a, reserve_b, pc)?;
        let required = &math::div_trunc(&buy, pc.get())? + &delta;
        if sell < required {
            break;
        }
        let matched_sell = sell.min(required);
        chosen = Some((pc, buy, matched_sell));
    }
    Ok(chosen)
}

/// Turns matched volumes into per-order results.
#[allow(clippy::too_many_arguments)]
fn build_results(
    swaps: &[SwapState],
    pair: &DenomPair,
    direction: PriceDirection,
    clearing_price: Price,
    matched_buy: &Amount,
    matched_sell: &Amount,
    swap_fee_rate: Decimal,
) -> Result<Vec<MatchResult>> {
    let buy_ration = side_ration(
        swaps,
        pair,
        clearing_price,
        Side::Buy,
        matched_buy,
        matches!(direction, PriceDirection::Increase),
    )?;
    let sell_ration = side_ration(
        swaps,
        pair,
        clearing_price,
        Side::Sell,
        matched_sell,
        matches!(direction, PriceDirection::Decrease),
    )?;

    let mut results = Vec::new();
    for swap in swaps {
        if !swap.remaining_offer.is_positive() {
            continue;
        }
        let side = Side::of(swap, pair);
        let ration = match side {
            Side::Buy => &buy_ration,
            Side::Sell => &sell_ration,
        };
        let Some(transacted) = ration.transacted(swap, clearing_price) else {
            continue;
        };
        if !transacted.is_positive() {
            continue;
        }
        let exchanged = match side {
            Side::Buy => math::div_trunc(&transacted, clearing_price.get())?,
            Side::Sell => math::mul_trunc(&transacted, clearing_price.get()),
        };
        results.push(MatchResult {
            msg_index: swap.msg_index,
            offer_fee: math::mul_trunc(&transacted, swap_fee_rate),
            exchanged_fee: math::mul_trunc(&exchanged, swap_fee_rate),
            transacted_offer: transacted,
            exchanged_demand: exchanged,
        });
    }
    Ok(results)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Side {
    Buy,
    Sell,
}

impl Side {
    fn of(swap: &SwapState, pair: &DenomPair) -> Self {
        if swap.offer_coin.denom() == pair.denom_a() {
            Self::Buy
        } else {
            Self::Sell
        }
    }

    /// Whether an order on this side is eligible at the clearing price.
    fn eligible(self, limit: Price, clearing: Price) -> bool {
        match self {
            Self::Buy => limit >= clearing,
            Self::Sell => limit <= clearing,
        }
    }

    /// Whether the limit is strictly better than the clearing price.
    fn strictly_better(self, limit: Price, clearing: Price) -> bool {
        match self {
            Self::Buy => limit > clearing,
            Self::Sell => limit < clearing,
        }
    }
}

/// How one side of the book shares its matched volume.
struct SideRation {
    side: Side,
    /// Every eligible order is rationed by this factor (rationed side
    /// with truncation dust); `None` means tiered fills apply.
    global_ratio: Option<Decimal>,
    /// Pro-rata factor for orders exactly at the clearing price.
    level_ratio: Decimal,
}

impl SideRation {
    /// Returns the transacted offer for one order, or `None` if the order
    /// is not eligible at the clearing price.
    fn transacted(&self, swap: &SwapState, clearing: Price) -> Option<Amount> {
        if !self.side.eligible(swap.order_price, clearing) {
            return None;
        }
        if let Some(ratio) = self.global_ratio {
            return Some(math::mul_trunc(&swap.remaining_offer, ratio));
        }
        if self.side.strictly_better(swap.order_price, clearing) {
            Some(swap.remaining_offer.clone())
        } else {
            Some(math::mul_trunc(&swap.remaining_offer, self.level_ratio))
        }
    }
}

fn side_ration(
    swaps: &[SwapState],
    pair: &DenomPair,
    clearing: Price,
    side: Side,
    matched: &Amount,
    is_rationed_side: bool,
) -> Result<SideRation> {
    if !is_rationed_side {
        // The covered side transacts in full.
        return Ok(SideRation {
            side,
            global_ratio: None,
            level_ratio: Decimal::ONE,
        });
    }

    let mut eligible_total = Amount::zero();
    let mut strictly_better_total = Amount::zero();
    let mut at_level_total = Amount::zero();
    for swap in swaps {
        if Side::of(swap, pair) != side || !swap.remaining_offer.is_positive() {
            continue;
        }
        if side.eligible(swap.order_price, clearing) {
            eligible_total += &swap.remaining_offer;
            if side.strictly_better(swap.order_price, clearing) {
                strictly_better_total += &swap.remaining_offer;
            } else {
                at_level_total += &swap.remaining_offer;
            }
        }
    }

    if eligible_total.is_zero() || matched >= &eligible_total {
        return Ok(SideRation {
            side,
            global_ratio: None,
            level_ratio: Decimal::ONE,
        });
    }
    if strictly_better_total > *matched {
        // Truncation dust made even the strictly-better tier oversubscribed.
        let ratio = math::ratio(matched, &eligible_total)?;
        return Ok(SideRation {
            side,
            global_ratio: Some(ratio),
            level_ratio: Decimal::ZERO,
        });
    }
    let residual = matched - &strictly_better_total;
    let level_ratio = if at_level_total.is_zero() {
        Decimal::ZERO
    } else {
        math::ratio(&residual, &at_level_total)?
    };
    Ok(SideRation {
        side,
        global_ratio: None,
        level_ratio,
    })
}

/// Predicted reserves after applying every result: transacted offers and
/// offer fees flow in, demand payouts net of the withheld exchanged fee
/// flow out.
fn post_reserves(
    reserve_a: &Amount,
    reserve_b: &Amount,
    swaps: &[SwapState],
    pair: &DenomPair,
    results: &[MatchResult],
) -> Result<(Amount, Amount)> {
    let mut post_a = reserve_a.clone();
    let mut post_b = reserve_b.clone();
    for result in results {
        let Some(swap) = swaps.iter().find(|s| s.msg_index == result.msg_index) else {
            continue;
        };
        let inflow = &result.transacted_offer + &result.offer_fee;
        let outflow = &result.exchanged_demand - &result.exchanged_fee;
        match Side::of(swap, pair) {
            Side::Buy => {
                post_a += &inflow;
                post_b -= &outflow;
            }
            Side::Sell => {
                post_b += &inflow;
                post_a -= &outflow;
            }
        }
    }
    if post_a.is_negative() || post_b.is_negative() {
        return Err(LiquidityError::InvariantBroken("negative post-reserve"));
    }
    Ok((post_a, post_b))
}

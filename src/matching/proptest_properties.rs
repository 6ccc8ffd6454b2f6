//! Property-based checks over the batch matcher.
//!
//! Random books around a random pool price must always produce a plan
//! that honors the uniform-price contract: every fill's limit is
//! compatible with the clearing price, no order transacts more than it
//! has, exchanged amounts are truncated products, and fees never exceed
//! their reservation.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::{match_batch, PriceDirection};
use crate::domain::{Address, Amount, Coin, DenomPair, Price, SwapState};
use crate::math;

fn pair() -> DenomPair {
    DenomPair::new("denomX", "denomY").expect("valid pair")
}

fn fee_rate() -> Decimal {
    Decimal::new(3, 3)
}

fn order(offer_denom: &str, amount: u64, limit: Decimal, index: u64) -> SwapState {
    let offer = Coin::new(offer_denom, Amount::new(amount)).expect("valid coin");
    SwapState {
        msg_height: 1,
        msg_index: index,
        pool_id: 1,
        requester: Address::derive("prop-trader"),
        demand_denom: if offer_denom == "denomX" {
            "denomY".into()
        } else {
            "denomX".into()
        },
        order_price: Price::new(limit).expect("valid price"),
        order_expiry_height: 100,
        remaining_offer: offer.amount().clone(),
        exchanged_offer: Amount::zero(),
        reserved_offer_fee: math::mul_trunc(offer.amount(), fee_rate()),
        offer_coin: offer,
        executed: false,
        succeeded: false,
        to_be_retired: false,
    }
}

proptest! {
    #[test]
    fn matcher_plan_is_sound(
        x in 1_000_000u64..=1_000_000_000,
        y in 1_000_000u64..=1_000_000_000,
        buys in prop::collection::vec((1_000u64..=5_000_000, 900u32..=1100u32), 0..6),
        sells in prop::collection::vec((1_000u64..=5_000_000, 900u32..=1100u32), 0..6),
    ) {
        let reserve_a = Amount::new(x);
        let reserve_b = Amount::new(y);
        let pool_price = math::ratio(&reserve_a, &reserve_b).expect("positive reserves");

        let mut swaps = Vec::new();
        let mut index = 0u64;
        for (amount, permille) in &buys {
            index += 1;
            let limit = pool_price * Decimal::new(i64::from(*permille), 3);
            swaps.push(order("denomX", *amount, limit, index));
        }
        for (amount, permille) in &sells {
            index += 1;
            let limit = pool_price * Decimal::new(i64::from(*permille), 3);
            swaps.push(order("denomY", *amount, limit, index));
        }

        let plan = match_batch(&reserve_a, &reserve_b, &swaps, &pair(), fee_rate())
            .expect("matcher must not fail on positive reserves");
        let clearing = plan.clearing_price;

        // The clearing price never leaves the band spanned by the pool
        // price and the order limits.
        let mut lo = Price::new(pool_price).expect("valid price");
        let mut hi = lo;
        for swap in &swaps {
            lo = lo.min(swap.order_price);
            hi = hi.max(swap.order_price);
        }
        prop_assert!(clearing >= lo && clearing <= hi);

        match plan.direction {
            PriceDirection::Increase => prop_assert!(clearing.get() >= pool_price),
            PriceDirection::Decrease => prop_assert!(clearing.get() <= pool_price),
            PriceDirection::Stay => prop_assert_eq!(clearing.get(), pool_price),
        }

        for result in &plan.results {
            let swap = swaps
                .iter()
                .find(|s| s.msg_index == result.msg_index)
                .expect("result references a known order");
            prop_assert!(result.transacted_offer.is_positive());
            prop_assert!(result.transacted_offer <= swap.remaining_offer);

            let is_buy = swap.offer_coin.denom() == "denomX";
            if is_buy {
                // Limit compatibility and truncated exchange: pay x, get
                // at most x / P'.
                prop_assert!(swap.order_price >= clearing);
                prop_assert!(
                    math::cmp_scaled(
                        &result.transacted_offer,
                        &result.exchanged_demand,
                        clearing.get(),
                    ) != core::cmp::Ordering::Less
                );
            } else {
                prop_assert!(swap.order_price <= clearing);
                prop_assert!(
                    math::cmp_scaled(
                        &result.exchanged_demand,
                        &result.transacted_offer,
                        clearing.get(),
                    ) != core::cmp::Ordering::Greater
                );
            }

            prop_assert_eq!(
                &result.offer_fee,
                &math::mul_trunc(&result.transacted_offer, fee_rate())
            );
            prop_assert!(result.offer_fee <= swap.reserved_offer_fee);
            prop_assert!(result.exchanged_fee <= result.exchanged_demand);
        }

        prop_assert!(!plan.post_reserve_a.is_negative());
        prop_assert!(!plan.post_reserve_b.is_negative());
    }
}

//! Post-condition checks.
//!
//! Two kinds of invariants guard the engine:
//!
//! - **Global** — cheap, always on, evaluated outside any transaction.
//!   The single global invariant is escrow sufficiency: the module
//!   escrow must cover every live intent's outstanding coins.
//! - **Local** — heavier checks inside the deposit/withdraw/swap
//!   execution paths, gated by `Params::batch_logic_invariant_checks`.
//!   A violation aborts the batch with
//!   [`LiquidityError::InvariantBroken`]; the host is expected to roll
//!   back the tick's writes.
//!
//! Ratio checks tolerate a 5% relative error and are skipped entirely
//! when any participating amount is below 20 units: at such sizes a
//! single truncated unit legitimately moves a ratio by more than the
//! tolerance.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::Engine;
use crate::domain::{Address, Amount, Intent};
use crate::error::{LiquidityError, Result};
use crate::host::{AccountLookup, BankLedger, Clock, DistributionSink};
use crate::math;
use crate::store::KvStore;

fn error_rate_threshold() -> Decimal {
    Decimal::new(5, 2)
}

fn coin_amount_threshold() -> Amount {
    Amount::new(20u32)
}

fn above_threshold(amounts: &[&Amount]) -> bool {
    let threshold = coin_amount_threshold();
    amounts.iter().all(|a| **a >= threshold)
}

/// Checks the minted pool-coin amount against both reserve ratios.
///
/// `minted / supply` must track `accept_a / reserve_a` and
/// `accept_b / reserve_b` within the tolerance. Both sides are checked
/// symmetrically.
pub(super) fn minting_pool_coins_invariant(
    supply: &Amount,
    minted: &Amount,
    accept_a: &Amount,
    accept_b: &Amount,
    reserve_a: &Amount,
    reserve_b: &Amount,
) -> Result<()> {
    if !above_threshold(&[supply, minted, accept_a, accept_b, reserve_a, reserve_b]) {
        return Ok(());
    }
    let pool_ratio = math::ratio(minted, supply)?;
    let a_ratio = math::ratio(accept_a, reserve_a)?;
    let b_ratio = math::ratio(accept_b, reserve_b)?;
    let threshold = error_rate_threshold();
    if math::error_rate(a_ratio, pool_ratio) > threshold
        || math::error_rate(b_ratio, pool_ratio) > threshold
    {
        return Err(LiquidityError::InvariantBroken("minting ratio out of band"));
    }
    Ok(())
}

/// Checks deposited amounts and the resulting pool price.
pub(super) fn deposit_invariant(
    reserve_a: &Amount,
    reserve_b: &Amount,
    accept_a: &Amount,
    accept_b: &Amount,
    post_a: &Amount,
    post_b: &Amount,
) -> Result<()> {
    if *post_a != reserve_a + accept_a || *post_b != reserve_b + accept_b {
        return Err(LiquidityError::InvariantBroken("incorrect deposit amounts"));
    }
    if !above_threshold(&[reserve_a, reserve_b, accept_a, accept_b]) {
        return Ok(());
    }
    let last_ratio = math::ratio(reserve_a, reserve_b)?;
    let deposit_ratio = math::ratio(accept_a, accept_b)?;
    let post_ratio = math::ratio(post_a, post_b)?;
    let threshold = error_rate_threshold();
    if math::error_rate(last_ratio, deposit_ratio) > threshold {
        return Err(LiquidityError::InvariantBroken("incorrect deposit ratio"));
    }
    if math::error_rate(last_ratio, post_ratio) > threshold {
        return Err(LiquidityError::InvariantBroken(
            "pool price moved by deposit",
        ));
    }
    Ok(())
}

/// Checks the burned pool-coin amount against what left the reserves.
#[allow(clippy::too_many_arguments)]
pub(super) fn burning_pool_coins_invariant(
    burned: &Amount,
    net_a: &Amount,
    net_b: &Amount,
    fee_a: &Amount,
    fee_b: &Amount,
    reserve_a: &Amount,
    reserve_b: &Amount,
    supply: &Amount,
) -> Result<()> {
    if burned == supply {
        // Full drain pays out everything; the ratio checks do not apply.
        return Ok(());
    }
    let burn_ratio = math::ratio(burned, supply)?;
    let ratio_a = math::ratio(&(net_a + fee_a), reserve_a)?;
    let ratio_b = math::ratio(&(net_b + fee_b), reserve_b)?;
    if ratio_a > burn_ratio || ratio_b > burn_ratio {
        return Err(LiquidityError::InvariantBroken(
            "withdrawn share exceeds burned share",
        ));
    }
    if !above_threshold(&[burned]) {
        return Ok(());
    }
    let burned_dec = math::dec_from_amount(burned)?;
    let supply_dec = math::dec_from_amount(supply)?;
    let threshold = error_rate_threshold();
    for side_ratio in [ratio_a, ratio_b] {
        let expected = supply_dec * side_ratio;
        if ((burned_dec - expected).abs() / burned_dec) > threshold {
            return Err(LiquidityError::InvariantBroken(
                "burned pool coin out of band",
            ));
        }
    }
    Ok(())
}

/// Checks net payouts against the ideal `reserve · (burn/S) · (1 − w)`,
/// which must agree within one unit unless the pool is being drained.
#[allow(clippy::too_many_arguments)]
pub(super) fn withdraw_amount_invariant(
    net_a: &Amount,
    net_b: &Amount,
    reserve_a: &Amount,
    reserve_b: &Amount,
    burned: &Amount,
    supply: &Amount,
    withdraw_fee_rate: Decimal,
) -> Result<()> {
    if burned == supply {
        return Ok(());
    }
    let share = math::ratio(burned, supply)? * (Decimal::ONE - withdraw_fee_rate);
    for (net, reserve) in [(net_a, reserve_a), (net_b, reserve_b)] {
        let ideal = math::dec_from_amount(reserve)? * share;
        let actual = math::dec_from_amount(net)?;
        if (ideal - actual).abs() >= Decimal::ONE {
            return Err(LiquidityError::InvariantBroken(
                "withdraw amount differs from ideal",
            ));
        }
    }
    Ok(())
}

/// Checks exact conservation of reserves and supply across a withdrawal.
#[allow(clippy::too_many_arguments)]
pub(super) fn withdraw_reserve_coins_invariant(
    net_a: &Amount,
    net_b: &Amount,
    reserve_a: &Amount,
    reserve_b: &Amount,
    post_a: &Amount,
    post_b: &Amount,
    post_supply: &Amount,
    supply: &Amount,
    burned: &Amount,
) -> Result<()> {
    if *post_a != reserve_a - net_a {
        return Err(LiquidityError::InvariantBroken(
            "incorrect withdraw amount for first reserve",
        ));
    }
    if *post_b != reserve_b - net_b {
        return Err(LiquidityError::InvariantBroken(
            "incorrect withdraw amount for second reserve",
        ));
    }
    if *post_supply != supply - burned {
        return Err(LiquidityError::InvariantBroken(
            "incorrect pool coin supply after burn",
        ));
    }
    Ok(())
}

/// Checks that a withdrawal leaves the pool price unchanged.
pub(super) fn immutable_pool_price_invariant(
    net_a: &Amount,
    net_b: &Amount,
    reserve_a: &Amount,
    reserve_b: &Amount,
    post_a: &Amount,
    post_b: &Amount,
) -> Result<()> {
    if !post_a.is_positive() || !post_b.is_positive() {
        // A drained pool has no price to preserve.
        return Ok(());
    }
    let remaining_a = reserve_a - net_a;
    let remaining_b = reserve_b - net_b;
    if !above_threshold(&[&remaining_a, &remaining_b, net_a, net_b]) {
        return Ok(());
    }
    let expected = math::ratio(&remaining_a, &remaining_b)?;
    let actual = math::ratio(post_a, post_b)?;
    if math::error_rate(expected, actual) > error_rate_threshold() {
        return Err(LiquidityError::InvariantBroken(
            "pool price moved by withdrawal",
        ));
    }
    Ok(())
}

/// Checks the post-batch reserve ratio against the clearing price.
pub(super) fn swap_price_invariant(
    clearing_price: Decimal,
    post_a: &Amount,
    post_b: &Amount,
) -> Result<()> {
    if !post_a.is_positive() || !post_b.is_positive() {
        return Ok(());
    }
    if !above_threshold(&[post_a, post_b]) {
        return Ok(());
    }
    let post_price = math::ratio(post_a, post_b)?;
    if math::error_rate(clearing_price, post_price) > error_rate_threshold() {
        return Err(LiquidityError::InvariantBroken(
            "post-batch price diverged from clearing price",
        ));
    }
    Ok(())
}

impl<S, B, A, D, C> Engine<S, B, A, D, C>
where
    S: KvStore,
    B: BankLedger,
    A: AccountLookup,
    D: DistributionSink,
    C: Clock,
{
    /// Global escrow-sufficiency invariant: per denomination, the module
    /// escrow balance must cover the outstanding coins of every live
    /// intent.
    ///
    /// # Errors
    ///
    /// Returns [`LiquidityError::EscrowShortfall`] on a shortfall.
    pub fn check_escrow_sufficiency(&self) -> Result<()> {
        let mut required: BTreeMap<String, Amount> = BTreeMap::new();
        let mut add = |denom: String, amount: Amount| {
            let entry = required.entry(denom).or_insert_with(Amount::zero);
            *entry += &amount;
        };
        // Retired intents have already released their escrow; they only
        // vanish at the next tick begin, so they must not be counted.
        // Batches outlive pool deletion, so the walk goes by batch.
        for batch in self.batches()? {
            let pool_id = batch.pool_id;
            let intents = self
                .deposit_msgs(pool_id)?
                .into_iter()
                .map(Intent::Deposit)
                .chain(self.withdraw_msgs(pool_id)?.into_iter().map(Intent::Withdraw))
                .chain(self.swap_msgs(pool_id)?.into_iter().map(Intent::Swap));
            for intent in intents {
                if !intent.is_live() {
                    continue;
                }
                for (denom, amount) in intent.outstanding_coins() {
                    add(denom, amount);
                }
            }
        }
        let escrow = Address::escrow();
        for (denom, amount) in required {
            if self.bank.balance(&escrow, &denom) < amount {
                return Err(LiquidityError::EscrowShortfall);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amt(n: u64) -> Amount {
        Amount::new(n)
    }

    // -- minting --------------------------------------------------------------

    #[test]
    fn minting_in_band_passes() {
        // 10% deposit mints 10% of supply
        assert!(minting_pool_coins_invariant(
            &amt(1_000_000),
            &amt(100_000),
            &amt(100),
            &amt(200),
            &amt(1_000),
            &amt(2_000),
        )
        .is_ok());
    }

    #[test]
    fn minting_out_of_band_fails() {
        // Minted twice what the deposit share justifies
        assert!(minting_pool_coins_invariant(
            &amt(1_000_000),
            &amt(200_000),
            &amt(100),
            &amt(200),
            &amt(1_000),
            &amt(2_000),
        )
        .is_err());
    }

    #[test]
    fn minting_skipped_below_threshold() {
        // Tiny amounts are exempt even when ratios look wild
        assert!(minting_pool_coins_invariant(
            &amt(1_000_000),
            &amt(200_000),
            &amt(1),
            &amt(1),
            &amt(2),
            &amt(3),
        )
        .is_ok());
    }

    // -- deposit ---------------------------------------------------------------

    #[test]
    fn deposit_conservation_is_exact() {
        assert!(deposit_invariant(
            &amt(1_000),
            &amt(2_000),
            &amt(100),
            &amt(200),
            &amt(1_100),
            &amt(2_200),
        )
        .is_ok());
        assert!(deposit_invariant(
            &amt(1_000),
            &amt(2_000),
            &amt(100),
            &amt(200),
            &amt(1_101),
            &amt(2_200),
        )
        .is_err());
    }

    #[test]
    fn deposit_off_ratio_fails() {
        assert!(deposit_invariant(
            &amt(1_000),
            &amt(2_000),
            &amt(300),
            &amt(200),
            &amt(1_300),
            &amt(2_200),
        )
        .is_err());
    }

    // -- burning ---------------------------------------------------------------

    #[test]
    fn burning_in_band_passes() {
        // Burn 10%: payouts 99.7 net + 0.3 fee per 1000 of reserve
        assert!(burning_pool_coins_invariant(
            &amt(100_000),
            &amt(99_700),
            &amt(199_400),
            &amt(300),
            &amt(600),
            &amt(1_000_000),
            &amt(2_000_000),
            &amt(1_000_000),
        )
        .is_ok());
    }

    #[test]
    fn burning_over_share_fails() {
        // Paying out 20% of reserves for a 10% burn
        assert!(burning_pool_coins_invariant(
            &amt(100_000),
            &amt(200_000),
            &amt(400_000),
            &amt(0),
            &amt(0),
            &amt(1_000_000),
            &amt(2_000_000),
            &amt(1_000_000),
        )
        .is_err());
    }

    #[test]
    fn burning_full_drain_exempt() {
        assert!(burning_pool_coins_invariant(
            &amt(1_000_000),
            &amt(1_000_000),
            &amt(2_000_000),
            &amt(0),
            &amt(0),
            &amt(1_000_000),
            &amt(2_000_000),
            &amt(1_000_000),
        )
        .is_ok());
    }

    // -- withdraw amounts --------------------------------------------------------

    #[test]
    fn withdraw_amount_within_one_unit() {
        // burn/S = 0.1, w = 0: ideal A = 100_000
        assert!(withdraw_amount_invariant(
            &amt(100_000),
            &amt(200_000),
            &amt(1_000_000),
            &amt(2_000_000),
            &amt(100_000),
            &amt(1_000_000),
            Decimal::ZERO,
        )
        .is_ok());
        assert!(withdraw_amount_invariant(
            &amt(99_998),
            &amt(200_000),
            &amt(1_000_000),
            &amt(2_000_000),
            &amt(100_000),
            &amt(1_000_000),
            Decimal::ZERO,
        )
        .is_err());
    }

    // -- conservation --------------------------------------------------------------

    #[test]
    fn withdraw_conservation_is_exact() {
        assert!(withdraw_reserve_coins_invariant(
            &amt(100),
            &amt(200),
            &amt(1_000),
            &amt(2_000),
            &amt(900),
            &amt(1_800),
            &amt(900_000),
            &amt(1_000_000),
            &amt(100_000),
        )
        .is_ok());
        assert!(withdraw_reserve_coins_invariant(
            &amt(100),
            &amt(200),
            &amt(1_000),
            &amt(2_000),
            &amt(900),
            &amt(1_801),
            &amt(900_000),
            &amt(1_000_000),
            &amt(100_000),
        )
        .is_err());
    }

    // -- price immutability ----------------------------------------------------------

    #[test]
    fn price_preserved_after_withdraw() {
        assert!(immutable_pool_price_invariant(
            &amt(100_000),
            &amt(200_000),
            &amt(1_000_000),
            &amt(2_000_000),
            &amt(900_000),
            &amt(1_800_000),
        )
        .is_ok());
    }

    #[test]
    fn drained_pool_exempt_from_price_check() {
        assert!(immutable_pool_price_invariant(
            &amt(1_000_000),
            &amt(2_000_000),
            &amt(1_000_000),
            &amt(2_000_000),
            &amt(0),
            &amt(0),
        )
        .is_ok());
    }

    // -- swap price --------------------------------------------------------------------

    #[test]
    fn swap_price_band() {
        let clearing = Decimal::new(2, 0);
        assert!(swap_price_invariant(clearing, &amt(100_000), &amt(50_000)).is_ok());
        // 2.0 vs 4.0 is far outside the band
        assert!(swap_price_invariant(clearing, &amt(200_000), &amt(50_000)).is_err());
    }
}

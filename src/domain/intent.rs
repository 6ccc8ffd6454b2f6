//! Intent lifecycle state records.
//!
//! Every user intent — a deposit, a withdrawal, a limit swap — is wrapped
//! in a state record carrying the shared lifecycle flags:
//!
//! - `executed`: seen by an execution attempt,
//! - `succeeded`: settled favorably (possibly partially, for swaps),
//! - `to_be_retired`: eligible for deletion at the next `tick_begin`.
//!
//! A retired record is excluded from the escrow-sufficiency invariant; an
//! unretired one pins its outstanding coins in escrow.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::{Address, Amount, Coin, Price};

/// Identifier of a queued intent: the owning pool plus the message index
/// within its batch stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntentId {
    /// Owning pool.
    pub pool_id: u64,
    /// Message index within the pool's batch stream.
    pub msg_index: u64,
}

impl fmt::Display for IntentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.pool_id, self.msg_index)
    }
}

// ---------------------------------------------------------------------------
// Deposit
// ---------------------------------------------------------------------------

/// A queued proportional deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositState {
    /// Tick at which the intent was accepted.
    pub msg_height: u64,
    /// Unique message index within the pool's deposit stream.
    pub msg_index: u64,
    /// Owning pool.
    pub pool_id: u64,
    /// Depositor account.
    pub depositor: Address,
    /// Escrowed deposit for the pair's first denom.
    pub deposit_a: Coin,
    /// Escrowed deposit for the pair's second denom.
    pub deposit_b: Coin,
    /// Seen by an execution attempt.
    pub executed: bool,
    /// Settled favorably.
    pub succeeded: bool,
    /// Eligible for deletion at the next tick begin.
    pub to_be_retired: bool,
}

// ---------------------------------------------------------------------------
// Withdraw
// ---------------------------------------------------------------------------

/// A queued proportional withdrawal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawState {
    /// Tick at which the intent was accepted.
    pub msg_height: u64,
    /// Unique message index within the pool's withdraw stream.
    pub msg_index: u64,
    /// Owning pool.
    pub pool_id: u64,
    /// Withdrawer account.
    pub withdrawer: Address,
    /// Escrowed pool coin to burn.
    pub pool_coin: Coin,
    /// Seen by an execution attempt.
    pub executed: bool,
    /// Settled favorably.
    pub succeeded: bool,
    /// Eligible for deletion at the next tick begin.
    pub to_be_retired: bool,
}

// ---------------------------------------------------------------------------
// Swap
// ---------------------------------------------------------------------------

/// A queued limit swap.
///
/// A swap may survive several batches: `remaining_offer` shrinks with
/// each partial fill while `exchanged_offer` grows, and the reserved fee
/// drains as per-fill offer fees are taken from it. At
/// `order_expiry_height` the residual offer and fee reservation are
/// refunded and the record retires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapState {
    /// Tick at which the intent was accepted.
    pub msg_height: u64,
    /// Unique message index within the pool's swap stream.
    pub msg_index: u64,
    /// Owning pool.
    pub pool_id: u64,
    /// Swap requester account.
    pub requester: Address,
    /// Original offer.
    pub offer_coin: Coin,
    /// Denomination demanded in exchange.
    pub demand_denom: String,
    /// Worst acceptable clearing price.
    pub order_price: Price,
    /// Tick past which the order refunds instead of matching.
    pub order_expiry_height: u64,
    /// Offer still waiting to transact.
    pub remaining_offer: Amount,
    /// Offer already transacted across previous fills.
    pub exchanged_offer: Amount,
    /// Escrowed fee reservation still available for offer-side fees.
    pub reserved_offer_fee: Amount,
    /// Seen by an execution attempt.
    pub executed: bool,
    /// At least one fill occurred.
    pub succeeded: bool,
    /// Eligible for deletion at the next tick begin.
    pub to_be_retired: bool,
}

impl SwapState {
    /// Whether the order has reached its expiry at tick `now`.
    #[must_use]
    pub const fn is_expired(&self, now: u64) -> bool {
        self.order_expiry_height <= now
    }

    /// Coins this order still pins in escrow: remaining offer plus the
    /// unconsumed fee reservation, both in the offer denomination.
    #[must_use]
    pub fn outstanding(&self) -> Amount {
        &self.remaining_offer + &self.reserved_offer_fee
    }
}

// ---------------------------------------------------------------------------
// Tagged variant
// ---------------------------------------------------------------------------

/// A queued intent of any kind.
///
/// The three intent kinds share their lifecycle flags; polymorphic
/// operations dispatch on the tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    /// Proportional deposit.
    Deposit(DepositState),
    /// Proportional withdrawal.
    Withdraw(WithdrawState),
    /// Limit swap.
    Swap(SwapState),
}

impl Intent {
    /// Whether the intent still pins escrow (not yet flagged for retirement).
    #[must_use]
    pub const fn is_live(&self) -> bool {
        !match self {
            Self::Deposit(s) => s.to_be_retired,
            Self::Withdraw(s) => s.to_be_retired,
            Self::Swap(s) => s.to_be_retired,
        }
    }

    /// The coins this intent currently claims from escrow.
    #[must_use]
    pub fn outstanding_coins(&self) -> Vec<(String, Amount)> {
        match self {
            Self::Deposit(s) => vec![
                (s.deposit_a.denom().to_owned(), s.deposit_a.amount().clone()),
                (s.deposit_b.denom().to_owned(), s.deposit_b.amount().clone()),
            ],
            Self::Withdraw(s) => vec![(s.pool_coin.denom().to_owned(), s.pool_coin.amount().clone())],
            Self::Swap(s) => vec![(s.offer_coin.denom().to_owned(), s.outstanding())],
        }
    }
}

// ---------------------------------------------------------------------------
// Match result
// ---------------------------------------------------------------------------

/// Per-order outcome of a batch matching round.
///
/// All amounts are truncated toward zero; the matcher produces these as a
/// plan and never touches balances itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// Swap message this result settles.
    pub msg_index: u64,
    /// Offer amount that transacted at the clearing price.
    pub transacted_offer: Amount,
    /// Demand-side amount exchanged for the transacted offer.
    pub exchanged_demand: Amount,
    /// Fee taken from the order's reserved fee escrow, in offer denom.
    pub offer_fee: Amount,
    /// Fee withheld from the demand payout, kept in the reserve.
    pub exchanged_fee: Amount,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn coin(denom: &str, amount: u64) -> Coin {
        let Ok(c) = Coin::new(denom, Amount::new(amount)) else {
            panic!("valid coin");
        };
        c
    }

    fn swap_state() -> SwapState {
        SwapState {
            msg_height: 5,
            msg_index: 1,
            pool_id: 1,
            requester: Address::derive("alice"),
            offer_coin: coin("denomX", 1_000),
            demand_denom: "denomY".into(),
            order_price: Price::ONE,
            order_expiry_height: 7,
            remaining_offer: Amount::new(600u32),
            exchanged_offer: Amount::new(400u32),
            reserved_offer_fee: Amount::new(3u32),
            executed: true,
            succeeded: true,
            to_be_retired: false,
        }
    }

    // -- SwapState ------------------------------------------------------------

    #[test]
    fn expiry_is_inclusive() {
        let s = swap_state();
        assert!(!s.is_expired(6));
        assert!(s.is_expired(7));
        assert!(s.is_expired(8));
    }

    #[test]
    fn outstanding_includes_fee_reservation() {
        assert_eq!(swap_state().outstanding(), Amount::new(603u32));
    }

    // -- Intent ---------------------------------------------------------------

    #[test]
    fn liveness_follows_retire_flag() {
        let mut s = swap_state();
        assert!(Intent::Swap(s.clone()).is_live());
        s.to_be_retired = true;
        assert!(!Intent::Swap(s).is_live());
    }

    #[test]
    fn outstanding_coins_per_kind() {
        let dep = Intent::Deposit(DepositState {
            msg_height: 1,
            msg_index: 1,
            pool_id: 1,
            depositor: Address::derive("bob"),
            deposit_a: coin("denomX", 10),
            deposit_b: coin("denomY", 20),
            executed: false,
            succeeded: false,
            to_be_retired: false,
        });
        let coins = dep.outstanding_coins();
        assert_eq!(coins.len(), 2);
        assert_eq!(coins[0], ("denomX".to_owned(), Amount::new(10u32)));

        let swap = Intent::Swap(swap_state());
        assert_eq!(
            swap.outstanding_coins(),
            vec![("denomX".to_owned(), Amount::new(603u32))]
        );
    }

    // -- IntentId -------------------------------------------------------------

    #[test]
    fn intent_id_display() {
        let id = IntentId {
            pool_id: 3,
            msg_index: 9,
        };
        assert_eq!(format!("{id}"), "3/9");
    }
}

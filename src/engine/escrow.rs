//! Module escrow custody.
//!
//! All pending-intent funds live on one module-owned escrow account.
//! Intake holds funds there; execution releases them to the reserve, the
//! user, or back to the user on refund. Batched releases go through a
//! single atomic bank call so a settlement round either lands whole or
//! not at all.

use super::Engine;
use crate::domain::{Address, Coin};
use crate::error::Result;
use crate::host::{AccountLookup, BankLedger, Clock, DistributionSink, Transfer};
use crate::store::KvStore;

impl<S, B, A, D, C> Engine<S, B, A, D, C>
where
    S: KvStore,
    B: BankLedger,
    A: AccountLookup,
    D: DistributionSink,
    C: Clock,
{
    /// Moves coins from a user into the module escrow.
    pub(super) fn hold(&mut self, from: &Address, coins: &[Coin]) -> Result<()> {
        self.bank.send(&[Transfer {
            from: *from,
            to: Address::escrow(),
            coins: coins.to_vec(),
        }])
    }

    /// Moves coins from the module escrow to a user.
    pub(super) fn release(&mut self, to: &Address, coins: &[Coin]) -> Result<()> {
        self.bank.send(&[Transfer {
            from: Address::escrow(),
            to: *to,
            coins: coins.to_vec(),
        }])
    }

    /// Applies a batched settlement atomically.
    pub(super) fn release_multi(&mut self, transfers: &[Transfer]) -> Result<()> {
        let nonempty: Vec<Transfer> = transfers
            .iter()
            .filter(|t| t.coins.iter().any(|c| !c.is_zero()))
            .cloned()
            .collect();
        if nonempty.is_empty() {
            return Ok(());
        }
        self.bank.send(&nonempty)
    }
}

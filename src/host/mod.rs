//! Host capability seams.
//!
//! The engine owns no balances, accounts or clocks of its own — every
//! side effect flows through one of the traits defined here, injected at
//! construction. The traits are deliberately narrow capability
//! interfaces with no back-edges into the engine, mirroring how the
//! module plugs into a chain runtime.
//!
//! [`memory`] provides deterministic in-memory implementations used by
//! the test suites and usable as references for host integrations.

pub mod memory;

use crate::domain::{Address, Amount, Coin};
use crate::error::Result;

/// Resolved account metadata.
///
/// Module-owned accounts (reserve and escrow addresses) never sign
/// transactions, so they carry no public key and a zero sequence; that is
/// how bulk operations tell them apart from user accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountInfo {
    /// Number of transactions the account has signed.
    pub sequence: u64,
    /// Whether a public key is set on the account.
    pub has_public_key: bool,
}

impl AccountInfo {
    /// Returns `true` if the account is module-owned rather than
    /// user-controlled.
    #[must_use]
    pub const fn is_module_owned(&self) -> bool {
        self.sequence == 0 && !self.has_public_key
    }
}

/// One balanced movement of coins between two accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    /// Debited account.
    pub from: Address,
    /// Credited account.
    pub to: Address,
    /// Coins to move; zero-amount coins are skipped.
    pub coins: Vec<Coin>,
}

/// Account/balance bookkeeping provided by the host.
///
/// `send` is atomic over its whole transfer list: either every movement
/// applies or none do. The engine leans on that for the batched
/// escrow-release paths that settle a whole matching round in one call.
pub trait BankLedger {
    /// Balance of one denomination.
    fn balance(&self, address: &Address, denom: &str) -> Amount;

    /// All non-zero balances of an account, sorted by denom.
    fn all_balances(&self, address: &Address) -> Vec<Coin>;

    /// Visits every non-zero balance of every account, in deterministic
    /// order.
    fn visit_all_balances(&self, visitor: &mut dyn FnMut(&Address, &Coin));

    /// Atomically applies a list of transfers.
    ///
    /// # Errors
    ///
    /// Implementations must fail (without partial effect) if any debit
    /// exceeds the payer's balance.
    fn send(&mut self, transfers: &[Transfer]) -> Result<()>;

    /// Mints coins to a module account, growing supply.
    ///
    /// # Errors
    ///
    /// Implementation-defined; minting to a module account normally
    /// cannot fail.
    fn mint(&mut self, module: &Address, coins: &[Coin]) -> Result<()>;

    /// Burns coins from a module account, shrinking supply.
    ///
    /// # Errors
    ///
    /// Fails if the module account does not hold the coins.
    fn burn(&mut self, module: &Address, coins: &[Coin]) -> Result<()>;

    /// Total supply of one denomination.
    fn supply(&self, denom: &str) -> Amount;
}

/// Account metadata lookup provided by the host.
pub trait AccountLookup {
    /// Resolves an address to its account metadata, if the account exists.
    fn resolve(&self, address: &Address) -> Option<AccountInfo>;
}

/// Sink for the pool creation fee and swept residues.
///
/// The engine moves the coins to the community pool account itself (so
/// the bank stays conserved) and then notifies the sink for the host's
/// own accounting.
pub trait DistributionSink {
    /// Records that `coins` were funded to the community pool by `from`.
    ///
    /// # Errors
    ///
    /// Implementation-defined; the reference implementation never fails.
    fn fund_community_pool(&mut self, from: &Address, coins: &[Coin]) -> Result<()>;
}

/// Block-height clock provided by the host.
pub trait Clock {
    /// Current tick height.
    fn block_height(&self) -> u64;
}

/// Registration point for the engine's global invariants.
///
/// The host invokes registered invariants outside any transaction; a
/// failing invariant is expected to halt the chain or page an operator.
pub trait InvariantRegistry<E> {
    /// Registers an invariant under `module/route`.
    fn register(&mut self, module: &str, route: &str, invariant: fn(&E) -> Result<()>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_owned_detection() {
        let module = AccountInfo {
            sequence: 0,
            has_public_key: false,
        };
        assert!(module.is_module_owned());

        let signer = AccountInfo {
            sequence: 0,
            has_public_key: true,
        };
        assert!(!signer.is_module_owned());

        let active = AccountInfo {
            sequence: 3,
            has_public_key: false,
        };
        assert!(!active.is_module_owned());
    }
}

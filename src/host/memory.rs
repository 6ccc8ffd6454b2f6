//! Deterministic in-memory host implementations.
//!
//! These back the test suites and double as reference semantics for real
//! host integrations: `MemoryBank` enforces the same atomicity and
//! supply rules a chain bank module would.

use std::collections::BTreeMap;

use super::{AccountInfo, AccountLookup, BankLedger, Clock, DistributionSink, Transfer};
use crate::domain::{Address, Amount, Coin};
use crate::error::{LiquidityError, Result};

// ---------------------------------------------------------------------------
// MemoryBank
// ---------------------------------------------------------------------------

/// In-memory bank ledger with atomic batched sends and supply tracking.
#[derive(Debug, Clone, Default)]
pub struct MemoryBank {
    balances: BTreeMap<Address, BTreeMap<String, Amount>>,
    supply: BTreeMap<String, Amount>,
}

impl MemoryBank {
    /// Creates an empty bank.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an account balance, growing supply accordingly. Test setup
    /// helper; the engine itself only mints through [`BankLedger::mint`].
    pub fn fund(&mut self, address: &Address, coin: &Coin) {
        if coin.is_zero() {
            return;
        }
        let entry = self
            .balances
            .entry(*address)
            .or_default()
            .entry(coin.denom().to_owned())
            .or_insert_with(Amount::zero);
        *entry += coin.amount();
        let supply = self
            .supply
            .entry(coin.denom().to_owned())
            .or_insert_with(Amount::zero);
        *supply += coin.amount();
    }

    fn credit(
        balances: &mut BTreeMap<Address, BTreeMap<String, Amount>>,
        address: &Address,
        coin: &Coin,
    ) {
        let entry = balances
            .entry(*address)
            .or_default()
            .entry(coin.denom().to_owned())
            .or_insert_with(Amount::zero);
        *entry += coin.amount();
    }

    fn debit(
        balances: &mut BTreeMap<Address, BTreeMap<String, Amount>>,
        address: &Address,
        coin: &Coin,
    ) -> Result<()> {
        let held = balances
            .get_mut(address)
            .and_then(|account| account.get_mut(coin.denom()))
            .ok_or(LiquidityError::InsufficientBalance)?;
        if &*held < coin.amount() {
            return Err(LiquidityError::InsufficientBalance);
        }
        *held -= coin.amount();
        Ok(())
    }
}

impl BankLedger for MemoryBank {
    fn balance(&self, address: &Address, denom: &str) -> Amount {
        self.balances
            .get(address)
            .and_then(|account| account.get(denom))
            .cloned()
            .unwrap_or_else(Amount::zero)
    }

    fn all_balances(&self, address: &Address) -> Vec<Coin> {
        let Some(account) = self.balances.get(address) else {
            return Vec::new();
        };
        account
            .iter()
            .filter(|(_, amount)| !amount.is_zero())
            .filter_map(|(denom, amount)| Coin::new(denom.clone(), amount.clone()).ok())
            .collect()
    }

    fn visit_all_balances(&self, visitor: &mut dyn FnMut(&Address, &Coin)) {
        for (address, account) in &self.balances {
            for (denom, amount) in account {
                if amount.is_zero() {
                    continue;
                }
                if let Ok(coin) = Coin::new(denom.clone(), amount.clone()) {
                    visitor(address, &coin);
                }
            }
        }
    }

    fn send(&mut self, transfers: &[Transfer]) -> Result<()> {
        // Stage on a copy so a failed debit leaves no partial effect.
        let mut staged = self.balances.clone();
        for transfer in transfers {
            for coin in &transfer.coins {
                if coin.is_zero() {
                    continue;
                }
                Self::debit(&mut staged, &transfer.from, coin)?;
                Self::credit(&mut staged, &transfer.to, coin);
            }
        }
        self.balances = staged;
        Ok(())
    }

    fn mint(&mut self, module: &Address, coins: &[Coin]) -> Result<()> {
        for coin in coins {
            if coin.is_zero() {
                continue;
            }
            Self::credit(&mut self.balances, module, coin);
            let supply = self
                .supply
                .entry(coin.denom().to_owned())
                .or_insert_with(Amount::zero);
            *supply += coin.amount();
        }
        Ok(())
    }

    fn burn(&mut self, module: &Address, coins: &[Coin]) -> Result<()> {
        let mut staged = self.balances.clone();
        for coin in coins {
            if coin.is_zero() {
                continue;
            }
            Self::debit(&mut staged, module, coin)?;
        }
        self.balances = staged;
        for coin in coins {
            if coin.is_zero() {
                continue;
            }
            let supply = self
                .supply
                .entry(coin.denom().to_owned())
                .or_insert_with(Amount::zero);
            *supply -= coin.amount();
        }
        Ok(())
    }

    fn supply(&self, denom: &str) -> Amount {
        self.supply.get(denom).cloned().unwrap_or_else(Amount::zero)
    }
}

// ---------------------------------------------------------------------------
// MemoryAccounts
// ---------------------------------------------------------------------------

/// In-memory account metadata registry.
#[derive(Debug, Clone, Default)]
pub struct MemoryAccounts {
    accounts: BTreeMap<Address, AccountInfo>,
}

impl MemoryAccounts {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an account.
    pub fn register(&mut self, address: Address, info: AccountInfo) {
        self.accounts.insert(address, info);
    }

    /// Registers a user-controlled account (signed at least once).
    pub fn register_user(&mut self, address: Address) {
        self.register(
            address,
            AccountInfo {
                sequence: 1,
                has_public_key: true,
            },
        );
    }
}

impl AccountLookup for MemoryAccounts {
    fn resolve(&self, address: &Address) -> Option<AccountInfo> {
        self.accounts.get(address).copied()
    }
}

// ---------------------------------------------------------------------------
// MemoryDistribution
// ---------------------------------------------------------------------------

/// Community-pool sink that tallies funded coins per denom.
#[derive(Debug, Clone, Default)]
pub struct MemoryDistribution {
    funded: BTreeMap<String, Amount>,
}

impl MemoryDistribution {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total funded so far for one denom.
    #[must_use]
    pub fn funded(&self, denom: &str) -> Amount {
        self.funded.get(denom).cloned().unwrap_or_else(Amount::zero)
    }
}

impl DistributionSink for MemoryDistribution {
    fn fund_community_pool(&mut self, _from: &Address, coins: &[Coin]) -> Result<()> {
        for coin in coins {
            let entry = self
                .funded
                .entry(coin.denom().to_owned())
                .or_insert_with(Amount::zero);
            *entry += coin.amount();
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FixedClock
// ---------------------------------------------------------------------------

/// Manually advanced block clock.
#[derive(Debug, Clone, Default)]
pub struct FixedClock {
    height: u64,
}

impl FixedClock {
    /// Creates a clock at the given height.
    #[must_use]
    pub const fn at(height: u64) -> Self {
        Self { height }
    }

    /// Sets the height.
    pub fn set(&mut self, height: u64) {
        self.height = height;
    }

    /// Advances by one tick.
    pub fn advance(&mut self) {
        self.height += 1;
    }
}

impl Clock for FixedClock {
    fn block_height(&self) -> u64 {
        self.height
    }
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

    fn alice() -> Address {
        Address::derive("alice")
    }

    fn bob() -> Address {
        Address::derive("bob")
    }

    // -- MemoryBank: balances & transfers --------------------------------------

    #[test]
    fn fund_and_balance() {
        let mut bank = MemoryBank::new();
        bank.fund(&alice(), &coin("uatom", 100));
        assert_eq!(bank.balance(&alice(), "uatom"), Amount::new(100u32));
        assert_eq!(bank.supply("uatom"), Amount::new(100u32));
    }

    #[test]
    fn send_moves_coins() {
        let mut bank = MemoryBank::new();
        bank.fund(&alice(), &coin("uatom", 100));
        let Ok(()) = bank.send(&[Transfer {
            from: alice(),
            to: bob(),
            coins: vec![coin("uatom", 40)],
        }]) else {
            panic!("send should succeed");
        };
        assert_eq!(bank.balance(&alice(), "uatom"), Amount::new(60u32));
        assert_eq!(bank.balance(&bob(), "uatom"), Amount::new(40u32));
    }

    #[test]
    fn send_is_atomic_on_failure() {
        let mut bank = MemoryBank::new();
        bank.fund(&alice(), &coin("uatom", 100));
        let result = bank.send(&[
            Transfer {
                from: alice(),
                to: bob(),
                coins: vec![coin("uatom", 40)],
            },
            Transfer {
                from: alice(),
                to: bob(),
                coins: vec![coin("uatom", 100)],
            },
        ]);
        assert_eq!(result, Err(LiquidityError::InsufficientBalance));
        // First leg must not have applied
        assert_eq!(bank.balance(&alice(), "uatom"), Amount::new(100u32));
        assert_eq!(bank.balance(&bob(), "uatom"), Amount::zero());
    }

    #[test]
    fn send_skips_zero_coins() {
        let mut bank = MemoryBank::new();
        let Ok(()) = bank.send(&[Transfer {
            from: alice(),
            to: bob(),
            coins: vec![coin("uatom", 0)],
        }]) else {
            panic!("zero transfer should be a no-op");
        };
    }

    #[test]
    fn sequential_sends_within_one_call_compose() {
        let mut bank = MemoryBank::new();
        bank.fund(&alice(), &coin("uatom", 50));
        // Second leg spends coins received in the first
        let Ok(()) = bank.send(&[
            Transfer {
                from: alice(),
                to: bob(),
                coins: vec![coin("uatom", 50)],
            },
            Transfer {
                from: bob(),
                to: alice(),
                coins: vec![coin("uatom", 10)],
            },
        ]) else {
            panic!("composed send should succeed");
        };
        assert_eq!(bank.balance(&bob(), "uatom"), Amount::new(40u32));
    }

    // -- MemoryBank: mint & burn ------------------------------------------------

    #[test]
    fn mint_and_burn_track_supply() {
        let mut bank = MemoryBank::new();
        let module = Address::escrow();
        let Ok(()) = bank.mint(&module, &[coin("poolAB", 1_000)]) else {
            panic!("mint");
        };
        assert_eq!(bank.supply("poolAB"), Amount::new(1_000u32));
        let Ok(()) = bank.burn(&module, &[coin("poolAB", 400)]) else {
            panic!("burn");
        };
        assert_eq!(bank.supply("poolAB"), Amount::new(600u32));
        assert_eq!(bank.balance(&module, "poolAB"), Amount::new(600u32));
    }

    #[test]
    fn burn_requires_holding() {
        let mut bank = MemoryBank::new();
        let module = Address::escrow();
        assert_eq!(
            bank.burn(&module, &[coin("poolAB", 1)]),
            Err(LiquidityError::InsufficientBalance)
        );
    }

    // -- MemoryBank: iteration ---------------------------------------------------

    #[test]
    fn visit_all_balances_is_deterministic() {
        let mut bank = MemoryBank::new();
        bank.fund(&bob(), &coin("uatom", 1));
        bank.fund(&alice(), &coin("uatom", 2));
        let mut seen = Vec::new();
        bank.visit_all_balances(&mut |addr, c| {
            seen.push((*addr, c.clone()));
        });
        assert_eq!(seen.len(), 2);
        // Address order, not insertion order
        assert!(seen[0].0 < seen[1].0);
    }

    // -- MemoryAccounts -----------------------------------------------------------

    #[test]
    fn resolve_registered_account() {
        let mut accounts = MemoryAccounts::new();
        accounts.register_user(alice());
        let Some(info) = accounts.resolve(&alice()) else {
            panic!("registered");
        };
        assert!(!info.is_module_owned());
        assert!(accounts.resolve(&bob()).is_none());
    }

    // -- MemoryDistribution --------------------------------------------------------

    #[test]
    fn distribution_tallies() {
        let mut distribution = MemoryDistribution::new();
        let Ok(()) = distribution.fund_community_pool(&alice(), &[coin("uatom", 5)]) else {
            panic!("fund");
        };
        let Ok(()) = distribution.fund_community_pool(&bob(), &[coin("uatom", 7)]) else {
            panic!("fund");
        };
        assert_eq!(distribution.funded("uatom"), Amount::new(12u32));
    }

    // -- FixedClock -----------------------------------------------------------------

    #[test]
    fn clock_advances() {
        let mut clock = FixedClock::at(10);
        assert_eq!(clock.block_height(), 10);
        clock.advance();
        assert_eq!(clock.block_height(), 11);
        clock.set(100);
        assert_eq!(clock.block_height(), 100);
    }
}

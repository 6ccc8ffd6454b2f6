//! Liquidity pool record and derived identities.

use core::fmt;
use core::fmt::Write as _;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{Address, DenomPair};

/// A two-asset liquidity pool.
///
/// Immutable after creation except for its reserve balances (held in the
/// host's account system) and the pool-coin supply (tracked by the host's
/// bank). The reserve address and pool-coin denomination are pure
/// functions of the pool key, so they never need to be stored alongside
/// anything else to be re-derivable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    id: u64,
    type_id: u32,
    pair: DenomPair,
    reserve_address: Address,
    pool_coin_denom: String,
}

impl Pool {
    /// Creates a pool record, deriving its reserve address and pool-coin
    /// denomination from the denom pair and type id.
    #[must_use]
    pub fn new(id: u64, type_id: u32, pair: DenomPair) -> Self {
        let reserve_address = Self::derive_reserve_address(&pair, type_id);
        let pool_coin_denom = Self::derive_pool_coin_denom(&reserve_address);
        Self {
            id,
            type_id,
            pair,
            reserve_address,
            pool_coin_denom,
        }
    }

    /// The unique key of a pool: `denomA/denomB/typeId`.
    #[must_use]
    pub fn pool_key(pair: &DenomPair, type_id: u32) -> String {
        format!("{}/{}/{}", pair.denom_a(), pair.denom_b(), type_id)
    }

    /// Derives the reserve account address from the pool key.
    #[must_use]
    pub fn derive_reserve_address(pair: &DenomPair, type_id: u32) -> Address {
        Address::derive(&Self::pool_key(pair, type_id))
    }

    /// Derives the pool-coin denomination from the reserve address:
    /// `"pool"` followed by the uppercase hex of the first 20 bytes of
    /// `sha256(reserve_address_bytes)`.
    #[must_use]
    pub fn derive_pool_coin_denom(reserve_address: &Address) -> String {
        let digest = Sha256::digest(reserve_address.bytes());
        let mut denom = String::with_capacity(4 + 2 * Address::LENGTH);
        denom.push_str("pool");
        for b in &digest[..Address::LENGTH] {
            let _ = write!(denom, "{b:02X}");
        }
        denom
    }

    /// Returns the pool id.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Returns the pool type id.
    #[must_use]
    pub const fn type_id(&self) -> u32 {
        self.type_id
    }

    /// Returns the reserve denom pair.
    #[must_use]
    pub const fn pair(&self) -> &DenomPair {
        &self.pair
    }

    /// Returns the address holding the reserves.
    #[must_use]
    pub const fn reserve_address(&self) -> &Address {
        &self.reserve_address
    }

    /// Returns the share-token denomination.
    #[must_use]
    pub fn pool_coin_denom(&self) -> &str {
        &self.pool_coin_denom
    }

    /// Checks that the stored derived identities match a re-derivation,
    /// used when validating imported records.
    #[must_use]
    pub fn identities_consistent(&self) -> bool {
        let reserve = Self::derive_reserve_address(&self.pair, self.type_id);
        reserve == self.reserve_address
            && Self::derive_pool_coin_denom(&reserve) == self.pool_coin_denom
    }
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pool#{}({})", self.id, self.pair)
    }
}

//! Account addresses.

use core::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A 20-byte account address.
///
/// Addresses identify users, pool reserve accounts and the module escrow
/// account alike. Derived addresses are pure functions of their input
/// string, so every replica computes identical reserve and escrow
/// accounts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Address([u8; Address::LENGTH]);

impl Address {
    /// Address length in bytes.
    pub const LENGTH: usize = 20;

    /// Creates an address from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; Self::LENGTH]) -> Self {
        Self(bytes)
    }

    /// Derives an address as the first 20 bytes of `sha256(tag)`.
    #[must_use]
    pub fn derive(tag: &str) -> Self {
        let digest = Sha256::digest(tag.as_bytes());
        let mut bytes = [0u8; Self::LENGTH];
        bytes.copy_from_slice(&digest[..Self::LENGTH]);
        Self(bytes)
    }

    /// The module escrow account holding all pending-intent funds.
    #[must_use]
    pub fn escrow() -> Self {
        Self::derive("tidepool/escrow")
    }

    /// The community pool account receiving creation fees and swept
    /// residues.
    #[must_use]
    pub fn community_pool() -> Self {
        Self::derive("tidepool/community-pool")
    }

    /// Returns the raw address bytes.
    #[must_use]
    pub const fn bytes(&self) -> &[u8; Self::LENGTH] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

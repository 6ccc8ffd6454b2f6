//! Store key schema.
//!
//! | Entity | Key |
//! |---|---|
//! | Pool by id | `pool/` + bigendian(poolId) |
//! | Pool by reserve address | `pool-by-res/` + address bytes |
//! | Pool by denom pair | `pool-by-denoms/` + denomA + `/` + denomB + `/` + typeId |
//! | Pool batch | `batch/` + bigendian(poolId) |
//! | Deposit message | `dep/` + bigendian(poolId) + bigendian(msgIndex) |
//! | Withdraw message | `wd/` + bigendian(poolId) + bigendian(msgIndex) |
//! | Swap message | `sw/` + bigendian(poolId) + bigendian(msgIndex) |
//!
//! Big-endian ids keep byte-lexicographic iteration in numeric order, so
//! prefix scans visit pools and messages ascending.

use crate::domain::{Address, DenomPair};

/// Counter key for the next pool id.
pub const NEXT_POOL_ID: &[u8] = b"pool-id-next";

/// Last height at which `tick_begin` ran (idempotence latch).
pub const TICK_BEGUN: &[u8] = b"tick/begun";

/// Last height at which `tick_end` ran (idempotence latch).
pub const TICK_ENDED: &[u8] = b"tick/ended";

/// Prefix of all pool records.
pub const POOL_PREFIX: &[u8] = b"pool/";

fn concat(prefix: &[u8], suffix: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(prefix.len() + suffix.len());
    key.extend_from_slice(prefix);
    key.extend_from_slice(suffix);
    key
}

/// Primary pool record key.
#[must_use]
pub fn pool(pool_id: u64) -> Vec<u8> {
    concat(POOL_PREFIX, &pool_id.to_be_bytes())
}

/// Reserve-address uniqueness index key.
#[must_use]
pub fn pool_by_reserve(reserve_address: &Address) -> Vec<u8> {
    concat(b"pool-by-res/", reserve_address.bytes())
}

/// Denom-pair uniqueness index key.
#[must_use]
pub fn pool_by_denoms(pair: &DenomPair, type_id: u32) -> Vec<u8> {
    let tail = format!("{}/{}/{}", pair.denom_a(), pair.denom_b(), type_id);
    concat(b"pool-by-denoms/", tail.as_bytes())
}

/// Pool batch key.
#[must_use]
pub fn batch(pool_id: u64) -> Vec<u8> {
    concat(b"batch/", &pool_id.to_be_bytes())
}

/// Prefix of all batch records.
pub const BATCH_PREFIX: &[u8] = b"batch/";

fn msg_key(prefix: &[u8], pool_id: u64, msg_index: u64) -> Vec<u8> {
    let mut key = concat(prefix, &pool_id.to_be_bytes());
    key.extend_from_slice(&msg_index.to_be_bytes());
    key
}

/// Deposit message key.
#[must_use]
pub fn deposit_msg(pool_id: u64, msg_index: u64) -> Vec<u8> {
    msg_key(b"dep/", pool_id, msg_index)
}

/// Prefix of one pool's deposit messages.
#[must_use]
pub fn deposit_msg_prefix(pool_id: u64) -> Vec<u8> {
    concat(b"dep/", &pool_id.to_be_bytes())
}

/// Withdraw message key.
#[must_use]
pub fn withdraw_msg(pool_id: u64, msg_index: u64) -> Vec<u8> {
    msg_key(b"wd/", pool_id, msg_index)
}

/// Prefix of one pool's withdraw messages.
#[must_use]
pub fn withdraw_msg_prefix(pool_id: u64) -> Vec<u8> {
    concat(b"wd/", &pool_id.to_be_bytes())
}

/// Swap message key.
#[must_use]
pub fn swap_msg(pool_id: u64, msg_index: u64) -> Vec<u8> {
    msg_key(b"sw/", pool_id, msg_index)
}

/// Prefix of one pool's swap messages.
#[must_use]
pub fn swap_msg_prefix(pool_id: u64) -> Vec<u8> {
    concat(b"sw/", &pool_id.to_be_bytes())
}

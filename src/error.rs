//! Unified error types for the tidepool engine.
//!
//! All fallible operations across the crate return [`LiquidityError`] as
//! their error type, ensuring a consistent error handling experience for
//! hosts embedding the engine.
//!
//! # Error Code Ranges
//!
//! | Range | Category | Description |
//! |-------|----------|-------------|
//! | 1000–1999 | Validation | Malformed intents, rejected at intake with no escrow effect |
//! | 2000–2999 | State / funds | Missing pools or batches, balance shortfalls |
//! | 3000–3999 | Arithmetic | Division by zero, precision loss, sign violations |
//! | 4000–4999 | Execution | Invariant violations and aborted bulk operations |
//!
//! Recoverable execution outcomes — a dust deposit, an unmatched swap —
//! are **not** errors: they surface through the intent's terminal state
//! with a full refund.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, LiquidityError>;

// ---------------------------------------------------------------------------
// LiquidityError
// ---------------------------------------------------------------------------

/// Unified error enum for the tidepool engine.
///
/// Variants are grouped by numeric error-code ranges so that hosts can
/// pattern-match on categories or inspect individual codes for logging.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LiquidityError {
    // ----- 1000–1999: Validation errors ------------------------------------
    /// A denomination pair is malformed — equal denoms or bad ordering (code 1000).
    #[error("invalid denom pair: {0}")]
    InvalidDenomPair(&'static str),

    /// A coin amount is invalid — zero, negative, or missing (code 1001).
    #[error("invalid amount: {0}")]
    InvalidAmount(&'static str),

    /// An order or pool price is invalid (code 1002).
    #[error("invalid price: {0}")]
    InvalidPrice(&'static str),

    /// The referenced pool type is not registered in the parameters (code 1003).
    #[error("pool type not found")]
    PoolTypeNotFound,

    /// A pool with the same denom pair and type already exists (code 1004).
    #[error("pool already exists")]
    PoolAlreadyExists,

    /// The declared offer-coin fee does not match the canonical reservation (code 1005).
    #[error("bad offer coin fee")]
    BadOfferCoinFee,

    /// A denomination does not belong to the referenced pool (code 1006).
    #[error("invalid denom: {0}")]
    InvalidDenom(&'static str),

    /// Intake is halted by the circuit breaker (code 1007).
    #[error("circuit breaker is enabled")]
    CircuitBreakerEnabled,

    /// A module parameter is out of range (code 1008).
    #[error("invalid params: {0}")]
    InvalidParams(&'static str),

    // ----- 2000–2999: State / funds errors ---------------------------------
    /// The referenced pool does not exist (code 2000).
    #[error("pool not found")]
    PoolNotFound,

    /// The pool has no live batch (code 2001).
    #[error("pool batch not found")]
    BatchNotFound,

    /// The account balance cannot cover the requested transfer (code 2002).
    #[error("insufficient balance")]
    InsufficientBalance,

    /// The creator cannot fund deposits plus the pool creation fee (code 2003).
    #[error("insufficient pool creation fee")]
    InsufficientPoolCreationFee,

    /// An initial deposit is below the configured minimum (code 2004).
    #[error("deposit below minimum initial amount")]
    BelowMinInitDeposit,

    /// A single order exceeds the maximum fraction of the reserve (code 2005).
    #[error("order exceeds maximum order ratio")]
    ExceededMaxOrderRatio,

    /// A deposit would push a reserve past the configured cap (code 2006).
    #[error("reserve coin amount cap exceeded")]
    ExceededReserveCap,

    /// The pool has been drained and accepts no further intents (code 2007).
    #[error("pool is depleted")]
    DepletedPool,

    /// A referenced intent message does not exist in the batch (code 2008).
    #[error("batch message not found")]
    MsgNotFound,

    // ----- 3000–3999: Arithmetic errors ------------------------------------
    /// Division by zero was attempted (code 3000).
    #[error("division by zero")]
    DivisionByZero,

    /// A value cannot be represented without unacceptable precision loss (code 3001).
    #[error("precision loss: {0}")]
    PrecisionLoss(&'static str),

    /// An amount that must be non-negative turned out negative (code 3002).
    #[error("negative amount: {0}")]
    NegativeAmount(&'static str),

    /// A decimal operation overflowed (code 3003).
    #[error("decimal overflow: {0}")]
    DecimalOverflow(&'static str),

    // ----- 4000–4999: Execution errors -------------------------------------
    /// A local post-condition check failed; the host must roll back the tick (code 4000).
    #[error("invariant broken: {0}")]
    InvariantBroken(&'static str),

    /// The module escrow no longer covers all live intents (code 4001).
    #[error("escrow amount invariant broken")]
    EscrowShortfall,

    /// A bulk operation could not complete and was discarded (code 4002).
    #[error("migration incomplete: {0}")]
    MigrationIncomplete(&'static str),

    /// A stored record failed to decode (code 4003).
    #[error("corrupt store record: {0}")]
    CorruptRecord(&'static str),
}

impl LiquidityError {
    /// Returns the numeric error code for this variant.
    ///
    /// Codes are organized into ranges:
    /// - 1000–1999 for validation errors
    /// - 2000–2999 for state and funds errors
    /// - 3000–3999 for arithmetic errors
    /// - 4000–4999 for execution errors
    #[must_use]
    pub const fn error_code(&self) -> u16 {
        match self {
            // Validation (1000–1999)
            Self::InvalidDenomPair(_) => 1000,
            Self::InvalidAmount(_) => 1001,
            Self::InvalidPrice(_) => 1002,
            Self::PoolTypeNotFound => 1003,
            Self::PoolAlreadyExists => 1004,
            Self::BadOfferCoinFee => 1005,
            Self::InvalidDenom(_) => 1006,
            Self::CircuitBreakerEnabled => 1007,
            Self::InvalidParams(_) => 1008,

            // State / funds (2000–2999)
            Self::PoolNotFound => 2000,
            Self::BatchNotFound => 2001,
            Self::InsufficientBalance => 2002,
            Self::InsufficientPoolCreationFee => 2003,
            Self::BelowMinInitDeposit => 2004,
            Self::ExceededMaxOrderRatio => 2005,
            Self::ExceededReserveCap => 2006,
            Self::DepletedPool => 2007,
            Self::MsgNotFound => 2008,

            // Arithmetic (3000–3999)
            Self::DivisionByZero => 3000,
            Self::PrecisionLoss(_) => 3001,
            Self::NegativeAmount(_) => 3002,
            Self::DecimalOverflow(_) => 3003,

            // Execution (4000–4999)
            Self::InvariantBroken(_) => 4000,
            Self::EscrowShortfall => 4001,
            Self::MigrationIncomplete(_) => 4002,
            Self::CorruptRecord(_) => 4003,
        }
    }

    /// Returns `true` if this is a validation error (1000–1999).
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        self.error_code() >= 1000 && self.error_code() < 2000
    }

    /// Returns `true` if this is a state or funds error (2000–2999).
    #[must_use]
    pub const fn is_state(&self) -> bool {
        self.error_code() >= 2000 && self.error_code() < 3000
    }

    /// Returns `true` if this is an arithmetic error (3000–3999).
    #[must_use]
    pub const fn is_arithmetic(&self) -> bool {
        self.error_code() >= 3000 && self.error_code() < 4000
    }

    /// Returns `true` if this is an execution error (4000–4999).
    ///
    /// Execution errors are fatal to the current tick: the host must
    /// discard the tick's writes rather than commit them.
    #[must_use]
    pub const fn is_execution(&self) -> bool {
        self.error_code() >= 4000 && self.error_code() < 5000
    }
}

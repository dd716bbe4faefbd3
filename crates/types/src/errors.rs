use solana_program::pubkey::Pubkey;
use thiserror::Error;

use crate::accounts::{AccountKind, ListingStatus, ProposalStatus};

// ============================================================================
// Error Categories
// ============================================================================

/// Closed taxonomy every protocol error falls into.
///
/// Callers branch on the category rather than on individual variants:
/// transport failures are recoverable from cache, protocol failures need a
/// re-fetch, validation failures never reached the network and arithmetic
/// failures block the single operation that raised them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Transport,
    Protocol,
    Validation,
    Arithmetic,
}

// ============================================================================
// Main Error Enum
// ============================================================================

/// Errors raised by the pure protocol components (address derivation,
/// pricing, voting power, marketplace and governance state machines,
/// input validation and account decoding)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PulseError {
    // ========================================================================
    // Arithmetic Errors
    // ========================================================================
    /// Bonding-curve price computation overflowed u64
    #[error("Price overflow in '{operation}' at supply {supply}")]
    PriceOverflow { operation: String, supply: u64 },

    /// Arithmetic overflow outside of pricing
    #[error("Math overflow in '{operation}' with values: {values:?}")]
    MathOverflow { operation: String, values: Vec<String> },

    /// Arithmetic underflow
    #[error("Math underflow in '{operation}' with values: {values:?}")]
    MathUnderflow { operation: String, values: Vec<String> },

    /// Division by zero
    #[error("Division by zero in context: {context}")]
    DivisionByZero { context: String },

    // ========================================================================
    // Address Derivation Errors
    // ========================================================================
    /// No bump in 0..=255 produced an off-curve address
    #[error("Address space exhausted for seed path with {segments} segments")]
    AddressSpaceExhausted { segments: usize },

    /// Seed segment longer than the ledger allows
    #[error("Seed segment {index} is {len} bytes (max {max})")]
    SeedTooLong { index: usize, len: usize, max: usize },

    /// Too many seed segments
    #[error("Seed path has {count} segments (max {max})")]
    TooManySeeds { count: usize, max: usize },

    // ========================================================================
    // Validation Errors
    // ========================================================================
    /// Invalid parameter
    #[error("Invalid parameter '{parameter}': got '{value}', expected '{expected}'")]
    InvalidParameter { parameter: String, value: String, expected: String },

    /// Required text field is empty
    #[error("'{field}' must not be empty")]
    EmptyContent { field: String },

    /// Text field exceeds its limit
    #[error("'{field}' is {len} bytes (max {max})")]
    ContentTooLong { field: String, len: usize, max: usize },

    /// Amount outside of the accepted range
    #[error("'{field}' = {value} not in [{min}, {max}]")]
    AmountOutOfBounds { field: String, value: u64, min: u64, max: u64 },

    /// Acting on one's own entity where the program forbids it
    #[error("Cannot {action} yourself")]
    SelfAction { action: String },

    /// Preview already violates the caller's price limit
    #[error("Slippage exceeded: quoted {quoted}, limit {limit}")]
    SlippageExceeded { quoted: u64, limit: u64 },

    // ========================================================================
    // Authorization Errors
    // ========================================================================
    /// Unauthorized access attempt
    #[error("Unauthorized: authority {authority} != required {required}")]
    Unauthorized { authority: Pubkey, required: Pubkey },

    // ========================================================================
    // Creator Share Errors
    // ========================================================================
    /// Sell larger than the circulating supply
    #[error("Insufficient supply: requested {requested}, available {available}")]
    InsufficientSupply { requested: u64, available: u64 },

    // ========================================================================
    // Marketplace Errors
    // ========================================================================
    #[error("Listing {listing} not found")]
    ListingNotFound { listing: Pubkey },

    #[error("Listing {listing} already exists")]
    ListingAlreadyExists { listing: Pubkey },

    #[error("Listing {listing} is not active ({status:?})")]
    ListingNotActive { listing: Pubkey, status: ListingStatus },

    #[error("Listing {listing} is still active")]
    ListingStillActive { listing: Pubkey },

    /// Orphaned offers must be withdrawn before the listing is closed
    #[error("Listing {listing} still holds {open} open offer(s)")]
    ListingHasOpenOffers { listing: Pubkey, open: usize },

    #[error("Listing {listing} expired at {expired_at}")]
    ListingExpired { listing: Pubkey, expired_at: i64 },

    #[error("Offer {offer} already exists")]
    OfferAlreadyExists { offer: Pubkey },

    #[error("Offer {offer} not found")]
    OfferNotFound { offer: Pubkey },

    #[error("Offer {offer} expired at {expired_at}")]
    OfferExpired { offer: Pubkey, expired_at: i64 },

    // ========================================================================
    // Governance Errors
    // ========================================================================
    #[error("Stake position for {staker} already exists")]
    StakeAlreadyExists { staker: Pubkey },

    #[error("No stake position for {staker}")]
    StakeNotFound { staker: Pubkey },

    #[error("Tokens locked until {unlocks_at} (now {now})")]
    TokensLocked { unlocks_at: i64, now: i64 },

    #[error("Insufficient voting power: have {have}, required {required}")]
    InsufficientVotingPower { have: u64, required: u64 },

    #[error("{voter} has no voting power")]
    NoVotingPower { voter: Pubkey },

    #[error("{voter} already voted on proposal {proposal}")]
    AlreadyVoted { proposal: Pubkey, voter: Pubkey },

    #[error("Voting on proposal {proposal} closed at {ended_at}")]
    VotingClosed { proposal: Pubkey, ended_at: i64 },

    #[error("Voting on proposal {proposal} is open until {ends_at}")]
    VotingStillOpen { proposal: Pubkey, ends_at: i64 },

    #[error("Proposal {proposal} not found")]
    ProposalNotFound { proposal: Pubkey },

    #[error("Proposal {proposal} already exists")]
    ProposalAlreadyExists { proposal: Pubkey },

    #[error("Proposal {proposal} has not passed ({status:?})")]
    ProposalNotPassed { proposal: Pubkey, status: ProposalStatus },

    #[error("Proposal {proposal} was already executed")]
    AlreadyExecuted { proposal: Pubkey },

    // ========================================================================
    // Account Decoding Errors
    // ========================================================================
    /// Leading discriminator matches no known record
    #[error("Unknown account kind with discriminator {discriminator:?}")]
    UnknownAccountKind { discriminator: [u8; 8] },

    /// Decoded a valid record of the wrong kind
    #[error("Expected {expected:?} account, found {found:?}")]
    AccountKindMismatch { expected: AccountKind, found: AccountKind },

    /// Fewer bytes than the discriminator
    #[error("Account data too short: {len} bytes")]
    AccountDataTooShort { len: usize },

    /// Body failed to deserialize
    #[error("Failed to decode {kind:?} account: {reason}")]
    AccountDecodeFailed { kind: AccountKind, reason: String },

    /// Failed to encode a record or instruction
    #[error("Serialization failed: {reason}")]
    Serialization { reason: String },
}

impl PulseError {
    /// Taxonomy bucket of this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::PriceOverflow { .. }
            | Self::MathOverflow { .. }
            | Self::MathUnderflow { .. }
            | Self::DivisionByZero { .. } => ErrorCategory::Arithmetic,

            Self::SeedTooLong { .. }
            | Self::TooManySeeds { .. }
            | Self::InvalidParameter { .. }
            | Self::EmptyContent { .. }
            | Self::ContentTooLong { .. }
            | Self::AmountOutOfBounds { .. }
            | Self::SelfAction { .. }
            | Self::SlippageExceeded { .. } => ErrorCategory::Validation,

            _ => ErrorCategory::Protocol,
        }
    }

    /// Create a price overflow error
    pub fn price_overflow(operation: &str, supply: u64) -> Self {
        Self::PriceOverflow {
            operation: operation.to_string(),
            supply,
        }
    }

    /// Create a math overflow error with context
    pub fn math_overflow(operation: &str, values: &[&str]) -> Self {
        Self::MathOverflow {
            operation: operation.to_string(),
            values: values.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Create a math underflow error with context
    pub fn math_underflow(operation: &str, values: &[&str]) -> Self {
        Self::MathUnderflow {
            operation: operation.to_string(),
            values: values.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(parameter: &str, value: &str, expected: &str) -> Self {
        Self::InvalidParameter {
            parameter: parameter.to_string(),
            value: value.to_string(),
            expected: expected.to_string(),
        }
    }

    /// Create an amount bounds error
    pub fn amount_out_of_bounds(field: &str, value: u64, min: u64, max: u64) -> Self {
        Self::AmountOutOfBounds {
            field: field.to_string(),
            value,
            min,
            max,
        }
    }

    /// Create an unauthorized error
    pub fn unauthorized(authority: Pubkey, required: Pubkey) -> Self {
        Self::Unauthorized {
            authority,
            required,
        }
    }

    /// Create a self-action error
    pub fn self_action(action: &str) -> Self {
        Self::SelfAction {
            action: action.to_string(),
        }
    }
}

/// Result type alias using the shared error type
pub type PulseResult<T> = std::result::Result<T, PulseError>;

// ============================================================================
// Validation Helpers
// ============================================================================

/// Reject empty or oversized text fields
pub fn validate_text(field: &str, value: &str, max: usize) -> PulseResult<()> {
    if value.trim().is_empty() {
        return Err(PulseError::EmptyContent {
            field: field.to_string(),
        });
    }
    if value.len() > max {
        return Err(PulseError::ContentTooLong {
            field: field.to_string(),
            len: value.len(),
            max,
        });
    }
    Ok(())
}

/// Reject amounts outside `[min, max]`
pub fn validate_amount(field: &str, value: u64, min: u64, max: u64) -> PulseResult<()> {
    if value < min || value > max {
        return Err(PulseError::amount_out_of_bounds(field, value, min, max));
    }
    Ok(())
}

/// Usernames are 1..=32 bytes of lowercase ASCII letters, digits or `_`
pub fn validate_username(username: &str) -> PulseResult<()> {
    validate_text("username", username, crate::constants::MAX_USERNAME_LEN)?;
    let valid = username
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_');
    if !valid {
        return Err(PulseError::invalid_parameter(
            "username",
            username,
            "lowercase letters, digits or '_'",
        ));
    }
    Ok(())
}

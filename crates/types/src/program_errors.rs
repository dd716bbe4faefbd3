/// Custom error codes returned by the program and their user-facing messages.
///
/// Codes start at the framework's custom-error offset (6000) and are
/// append-only; reusing a retired code would mislabel failures.
use serde::{Deserialize, Serialize};

use crate::errors::ErrorCategory;

/// First custom program error code
pub const CUSTOM_ERROR_OFFSET: u32 = 6000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProgramErrorCode {
    InsufficientBalance,
    Unauthorized,
    AlreadyExists,
    ProtocolPaused,
    ArithmeticOverflow,
    SlippageExceeded,
    QuorumNotReached,
    ListingNotActive,
    OfferNotFound,
    OfferExpired,
    TokensLocked,
    AlreadyVoted,
    AlreadyExecuted,
    VotingClosed,
    VotingStillOpen,
    InsufficientVotingPower,
    InvalidAmount,
    TransferTooLarge,
    ContentTooLong,
    SelfAction,
    InsufficientSupply,
    InvalidUsername,
    SubscriptionExpired,
}

impl ProgramErrorCode {
    /// Codes in declaration order; index + offset = numeric code
    pub const ALL: [ProgramErrorCode; 23] = [
        Self::InsufficientBalance,
        Self::Unauthorized,
        Self::AlreadyExists,
        Self::ProtocolPaused,
        Self::ArithmeticOverflow,
        Self::SlippageExceeded,
        Self::QuorumNotReached,
        Self::ListingNotActive,
        Self::OfferNotFound,
        Self::OfferExpired,
        Self::TokensLocked,
        Self::AlreadyVoted,
        Self::AlreadyExecuted,
        Self::VotingClosed,
        Self::VotingStillOpen,
        Self::InsufficientVotingPower,
        Self::InvalidAmount,
        Self::TransferTooLarge,
        Self::ContentTooLong,
        Self::SelfAction,
        Self::InsufficientSupply,
        Self::InvalidUsername,
        Self::SubscriptionExpired,
    ];

    pub fn from_code(code: u32) -> Option<Self> {
        let index = code.checked_sub(CUSTOM_ERROR_OFFSET)? as usize;
        Self::ALL.get(index).copied()
    }

    pub fn code(&self) -> u32 {
        // ALL is declared in variant order
        CUSTOM_ERROR_OFFSET + *self as u32
    }

    /// Message shown to end users
    pub fn message(&self) -> &'static str {
        match self {
            Self::InsufficientBalance => "Insufficient balance",
            Self::Unauthorized => "You are not authorized to perform this action",
            Self::AlreadyExists => "This account already exists",
            Self::ProtocolPaused => "The protocol is paused",
            Self::ArithmeticOverflow => "Arithmetic overflow",
            Self::SlippageExceeded => "Price moved beyond your slippage limit",
            Self::QuorumNotReached => "Quorum not reached",
            Self::ListingNotActive => "This listing is no longer active",
            Self::OfferNotFound => "Offer not found",
            Self::OfferExpired => "This offer has expired",
            Self::TokensLocked => "Tokens are still locked",
            Self::AlreadyVoted => "You have already voted on this proposal",
            Self::AlreadyExecuted => "Proposal was already executed",
            Self::VotingClosed => "Voting has closed",
            Self::VotingStillOpen => "Voting is still open",
            Self::InsufficientVotingPower => "Insufficient voting power",
            Self::InvalidAmount => "Invalid amount",
            Self::TransferTooLarge => "Transfer exceeds the maximum allowed amount",
            Self::ContentTooLong => "Content is too long",
            Self::SelfAction => "You cannot perform this action on yourself",
            Self::InsufficientSupply => "Not enough shares in circulation",
            Self::InvalidUsername => "Invalid username",
            Self::SubscriptionExpired => "Subscription has expired",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ArithmeticOverflow => ErrorCategory::Arithmetic,
            Self::InvalidAmount
            | Self::TransferTooLarge
            | Self::ContentTooLong
            | Self::SelfAction
            | Self::InvalidUsername => ErrorCategory::Validation,
            _ => ErrorCategory::Protocol,
        }
    }
}

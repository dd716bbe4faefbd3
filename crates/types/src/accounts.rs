/// On-ledger account records and the discriminator-keyed decode step.
///
/// Every record is stored as an 8-byte discriminator
/// (`sha256("account:<Name>")[..8]`) followed by its Borsh body. Fixed-size
/// fields come before variable-length ones so that the memcmp offsets in
/// `layout` stay stable.
use borsh::{BorshDeserialize, BorshSerialize};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use solana_program::{hash::hashv, pubkey::Pubkey};

use crate::constants::DISCRIMINATOR_SIZE;
use crate::errors::{PulseError, PulseResult};

// ============================================================================
// Account Kinds
// ============================================================================

/// Every record type the program owns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountKind {
    PlatformConfig,
    UserProfile,
    CreatorPool,
    ShareHolding,
    Subscription,
    Group,
    GroupMember,
    Follow,
    Like,
    Comment,
    Repost,
    UsernameNft,
    Listing,
    Offer,
    StakePosition,
    Proposal,
    VoteRecord,
}

impl AccountKind {
    pub const ALL: [AccountKind; 17] = [
        AccountKind::PlatformConfig,
        AccountKind::UserProfile,
        AccountKind::CreatorPool,
        AccountKind::ShareHolding,
        AccountKind::Subscription,
        AccountKind::Group,
        AccountKind::GroupMember,
        AccountKind::Follow,
        AccountKind::Like,
        AccountKind::Comment,
        AccountKind::Repost,
        AccountKind::UsernameNft,
        AccountKind::Listing,
        AccountKind::Offer,
        AccountKind::StakePosition,
        AccountKind::Proposal,
        AccountKind::VoteRecord,
    ];

    /// Record name as declared in the program
    pub fn name(&self) -> &'static str {
        match self {
            Self::PlatformConfig => "PlatformConfig",
            Self::UserProfile => "UserProfile",
            Self::CreatorPool => "CreatorPool",
            Self::ShareHolding => "ShareHolding",
            Self::Subscription => "Subscription",
            Self::Group => "Group",
            Self::GroupMember => "GroupMember",
            Self::Follow => "Follow",
            Self::Like => "Like",
            Self::Comment => "Comment",
            Self::Repost => "Repost",
            Self::UsernameNft => "UsernameNft",
            Self::Listing => "Listing",
            Self::Offer => "Offer",
            Self::StakePosition => "StakePosition",
            Self::Proposal => "Proposal",
            Self::VoteRecord => "VoteRecord",
        }
    }

    /// Leading 8-byte tag of this record kind
    pub fn discriminator(&self) -> [u8; 8] {
        DISCRIMINATORS
            .iter()
            .find(|(kind, _)| kind == self)
            .map(|(_, disc)| *disc)
            .unwrap_or_else(|| account_discriminator(self.name()))
    }

    /// Resolve a tag back to its kind
    pub fn from_discriminator(discriminator: &[u8; 8]) -> Option<Self> {
        DISCRIMINATORS
            .iter()
            .find(|(_, disc)| disc == discriminator)
            .map(|(kind, _)| *kind)
    }
}

static DISCRIMINATORS: Lazy<Vec<(AccountKind, [u8; 8])>> = Lazy::new(|| {
    AccountKind::ALL
        .iter()
        .map(|kind| (*kind, account_discriminator(kind.name())))
        .collect()
});

/// `sha256("account:<name>")[..8]`
pub fn account_discriminator(name: &str) -> [u8; 8] {
    let hash = hashv(&[b"account:", name.as_bytes()]);
    let mut disc = [0u8; 8];
    disc.copy_from_slice(&hash.to_bytes()[..DISCRIMINATOR_SIZE]);
    disc
}

// ============================================================================
// Status Enums
// ============================================================================

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub enum ListingStatus {
    Active,
    Sold,
    Cancelled,
}

impl ListingStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ListingStatus::Active)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub enum ProposalStatus {
    Active,
    Passed,
    Rejected,
    Executed,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub enum VoteChoice {
    For,
    Against,
    Abstain,
}

// ============================================================================
// Platform and Social Records
// ============================================================================

/// Global program configuration (`platform_config`)
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct PlatformConfig {
    pub authority: Pubkey,
    pub platform_fee_bps: u16,
    /// Bonding curve bucket width the program was built with
    pub price_scale: u64,
    pub min_proposal_power: u64,
    pub quorum_votes: u64,
    pub voting_period_seconds: i64,
    pub paused: bool,
    pub bump: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct UserProfile {
    pub owner: Pubkey,
    pub followers_count: u64,
    pub following_count: u64,
    pub posts_count: u64,
    pub created_at: i64,
    pub bump: u8,
    pub username: String,
    pub bio: String,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Follow {
    pub follower: Pubkey,
    pub followed: Pubkey,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Like {
    pub user: Pubkey,
    pub post: Pubkey,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Comment {
    pub post: Pubkey,
    pub author: Pubkey,
    pub created_at: i64,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Repost {
    pub user: Pubkey,
    pub post: Pubkey,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Subscription {
    pub subscriber: Pubkey,
    pub creator: Pubkey,
    pub tier_id: u8,
    pub price_lamports: u64,
    pub started_at: i64,
    pub expires_at: i64,
    pub bump: u8,
}

impl Subscription {
    pub fn is_active(&self, now: i64) -> bool {
        now < self.expires_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Group {
    pub creator: Pubkey,
    pub members_count: u64,
    pub created_at: i64,
    pub bump: u8,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct GroupMember {
    pub group: Pubkey,
    pub member: Pubkey,
    pub joined_at: i64,
    pub bump: u8,
}

// ============================================================================
// Creator Shares
// ============================================================================

/// Bonding-curve pool of one creator's shares
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct CreatorPool {
    pub creator: Pubkey,
    pub supply: u64,
    pub base_price_lamports: u64,
    pub holders_count: u64,
    pub total_volume: u64,
    pub bump: u8,
}

impl CreatorPool {
    /// Fresh pool with no circulating shares
    pub fn new(creator: Pubkey, base_price_lamports: u64) -> Self {
        Self {
            creator,
            supply: 0,
            base_price_lamports,
            holders_count: 0,
            total_volume: 0,
            bump: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct ShareHolding {
    pub holder: Pubkey,
    pub creator: Pubkey,
    pub amount: u64,
    /// Average cost per share in lamports
    pub average_price: u64,
    pub bump: u8,
}

impl ShareHolding {
    /// A holding with zero shares is treated as removed
    pub fn is_empty(&self) -> bool {
        self.amount == 0
    }
}

// ============================================================================
// Username Marketplace
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct UsernameNft {
    pub owner: Pubkey,
    pub minted_at: i64,
    pub bump: u8,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Listing {
    pub seller: Pubkey,
    /// Username NFT address being sold
    pub asset_id: Pubkey,
    pub price_lamports: u64,
    pub status: ListingStatus,
    pub listed_at: i64,
    pub expires_at: Option<i64>,
    pub bump: u8,
    pub category: String,
}

impl Listing {
    pub fn is_active(&self) -> bool {
        self.status == ListingStatus::Active
    }

    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at.map_or(false, |at| now >= at)
    }
}

/// Escrowed bid on a listing (`offer:{listing, buyer}`)
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Offer {
    pub listing: Pubkey,
    pub buyer: Pubkey,
    /// Escrowed at creation time
    pub amount_lamports: u64,
    pub created_at: i64,
    pub expires_at: i64,
    pub bump: u8,
}

impl Offer {
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }
}

// ============================================================================
// Governance
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct StakePosition {
    pub staker: Pubkey,
    pub amount: u64,
    pub lock_period_seconds: i64,
    pub staked_at: i64,
    pub unlocks_at: i64,
    pub voting_power: u64,
    pub bump: u8,
}

impl StakePosition {
    pub fn is_unlocked(&self, now: i64) -> bool {
        now >= self.unlocks_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Proposal {
    pub proposer: Pubkey,
    pub votes_for: u64,
    pub votes_against: u64,
    pub votes_abstain: u64,
    pub quorum_required: u64,
    pub created_at: i64,
    pub voting_ends_at: i64,
    pub status: ProposalStatus,
    pub executed_at: Option<i64>,
    pub bump: u8,
    pub title: String,
    pub description: String,
}

impl Proposal {
    /// Total weight cast, saturating
    pub fn total_votes(&self) -> u64 {
        self.votes_for
            .saturating_add(self.votes_against)
            .saturating_add(self.votes_abstain)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct VoteRecord {
    pub proposal: Pubkey,
    pub voter: Pubkey,
    pub choice: VoteChoice,
    pub weight: u64,
    pub cast_at: i64,
    pub bump: u8,
}

// ============================================================================
// Typed Decode
// ============================================================================

/// A record type with a known account kind
pub trait AccountRecord: BorshSerialize + BorshDeserialize + Sized {
    const KIND: AccountKind;

    /// Decode discriminator-prefixed account data, rejecting other kinds.
    /// Trailing bytes (allocated but unused space) are ignored.
    fn decode(data: &[u8]) -> PulseResult<Self> {
        let found = read_kind(data)?;
        if found != Self::KIND {
            return Err(PulseError::AccountKindMismatch {
                expected: Self::KIND,
                found,
            });
        }
        decode_body(Self::KIND, &data[DISCRIMINATOR_SIZE..])
    }

    /// Encode with the leading discriminator
    fn encode(&self) -> PulseResult<Vec<u8>> {
        let mut data = Self::KIND.discriminator().to_vec();
        self.serialize(&mut data)
            .map_err(|e| PulseError::Serialization {
                reason: e.to_string(),
            })?;
        Ok(data)
    }
}

fn read_kind(data: &[u8]) -> PulseResult<AccountKind> {
    if data.len() < DISCRIMINATOR_SIZE {
        return Err(PulseError::AccountDataTooShort { len: data.len() });
    }
    let mut disc = [0u8; 8];
    disc.copy_from_slice(&data[..DISCRIMINATOR_SIZE]);
    AccountKind::from_discriminator(&disc)
        .ok_or(PulseError::UnknownAccountKind { discriminator: disc })
}

fn decode_body<T: BorshDeserialize>(kind: AccountKind, mut body: &[u8]) -> PulseResult<T> {
    T::deserialize(&mut body).map_err(|e| PulseError::AccountDecodeFailed {
        kind,
        reason: e.to_string(),
    })
}

macro_rules! account_records {
    ($($record:ident),* $(,)?) => {
        $(
            impl AccountRecord for $record {
                const KIND: AccountKind = AccountKind::$record;
            }
        )*

        /// Any program-owned record, decoded by its leading discriminator
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum ProtocolAccount {
            $($record($record),)*
        }

        impl ProtocolAccount {
            /// Tagged-union decode; unknown tags are an error, never a guess
            pub fn decode(data: &[u8]) -> PulseResult<Self> {
                let kind = read_kind(data)?;
                let body = &data[DISCRIMINATOR_SIZE..];
                match kind {
                    $(AccountKind::$record => decode_body(kind, body).map(ProtocolAccount::$record),)*
                }
            }

            pub fn kind(&self) -> AccountKind {
                match self {
                    $(ProtocolAccount::$record(_) => AccountKind::$record,)*
                }
            }
        }
    };
}

account_records!(
    PlatformConfig,
    UserProfile,
    CreatorPool,
    ShareHolding,
    Subscription,
    Group,
    GroupMember,
    Follow,
    Like,
    Comment,
    Repost,
    UsernameNft,
    Listing,
    Offer,
    StakePosition,
    Proposal,
    VoteRecord,
);

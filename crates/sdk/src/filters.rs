//! Program-account scan filters
//!
//! Relationship queries pair a discriminator match at offset 0 with a
//! pubkey match at the field offset taken from `pulse_types::layout`.

use pulse_types::layout::*;
use pulse_types::{AccountKind, ListingStatus};
use serde_json::{json, Value};
use solana_sdk::pubkey::Pubkey;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountFilter {
    /// Account data must contain `bytes` starting at `offset`
    Memcmp { offset: usize, bytes: Vec<u8> },
    /// Account data must be exactly this many bytes
    DataSize(u64),
}

impl AccountFilter {
    pub fn memcmp(offset: usize, bytes: impl Into<Vec<u8>>) -> Self {
        AccountFilter::Memcmp {
            offset,
            bytes: bytes.into(),
        }
    }

    /// Restrict a scan to one record kind
    pub fn kind(kind: AccountKind) -> Self {
        Self::memcmp(0, kind.discriminator().to_vec())
    }

    pub fn pubkey_at(offset: usize, key: &Pubkey) -> Self {
        Self::memcmp(offset, key.to_bytes().to_vec())
    }

    /// Evaluate locally against raw account data
    pub fn matches(&self, data: &[u8]) -> bool {
        match self {
            AccountFilter::Memcmp { offset, bytes } => data
                .get(*offset..offset.saturating_add(bytes.len()))
                .map_or(false, |window| window == bytes.as_slice()),
            AccountFilter::DataSize(size) => data.len() as u64 == *size,
        }
    }

    /// JSON-RPC form with base58 memcmp bytes
    pub fn to_rpc_json(&self) -> Value {
        match self {
            AccountFilter::Memcmp { offset, bytes } => json!({
                "memcmp": {
                    "offset": offset,
                    "bytes": bs58::encode(bytes).into_string(),
                    "encoding": "base58",
                }
            }),
            AccountFilter::DataSize(size) => json!({ "dataSize": size }),
        }
    }
}

pub fn matches_all(filters: &[AccountFilter], data: &[u8]) -> bool {
    filters.iter().all(|f| f.matches(data))
}

fn relationship(kind: AccountKind, offset: usize, key: &Pubkey) -> Vec<AccountFilter> {
    vec![AccountFilter::kind(kind), AccountFilter::pubkey_at(offset, key)]
}

// ============================================================================
// Social Graph
// ============================================================================

/// Follow records pointing at `user`
pub fn followers_of(user: &Pubkey) -> Vec<AccountFilter> {
    relationship(AccountKind::Follow, FOLLOW_FOLLOWED_OFFSET, user)
}

/// Follow records created by `user`
pub fn following_of(user: &Pubkey) -> Vec<AccountFilter> {
    relationship(AccountKind::Follow, FOLLOW_FOLLOWER_OFFSET, user)
}

pub fn likes_of(post: &Pubkey) -> Vec<AccountFilter> {
    relationship(AccountKind::Like, LIKE_POST_OFFSET, post)
}

pub fn comments_of(post: &Pubkey) -> Vec<AccountFilter> {
    relationship(AccountKind::Comment, COMMENT_POST_OFFSET, post)
}

pub fn comments_by(author: &Pubkey) -> Vec<AccountFilter> {
    relationship(AccountKind::Comment, COMMENT_AUTHOR_OFFSET, author)
}

pub fn reposts_of(post: &Pubkey) -> Vec<AccountFilter> {
    relationship(AccountKind::Repost, REPOST_POST_OFFSET, post)
}

pub fn members_of(group: &Pubkey) -> Vec<AccountFilter> {
    relationship(AccountKind::GroupMember, GROUP_MEMBER_GROUP_OFFSET, group)
}

pub fn subscribers_of(creator: &Pubkey) -> Vec<AccountFilter> {
    relationship(AccountKind::Subscription, SUBSCRIPTION_CREATOR_OFFSET, creator)
}

// ============================================================================
// Shares, Marketplace, Governance
// ============================================================================

pub fn holdings_of(holder: &Pubkey) -> Vec<AccountFilter> {
    relationship(AccountKind::ShareHolding, SHARE_HOLDING_HOLDER_OFFSET, holder)
}

pub fn holders_of(creator: &Pubkey) -> Vec<AccountFilter> {
    relationship(AccountKind::ShareHolding, SHARE_HOLDING_CREATOR_OFFSET, creator)
}

pub fn offers_for_listing(listing: &Pubkey) -> Vec<AccountFilter> {
    relationship(AccountKind::Offer, OFFER_LISTING_OFFSET, listing)
}

pub fn offers_by_buyer(buyer: &Pubkey) -> Vec<AccountFilter> {
    relationship(AccountKind::Offer, OFFER_BUYER_OFFSET, buyer)
}

pub fn listings_by_seller(seller: &Pubkey) -> Vec<AccountFilter> {
    relationship(AccountKind::Listing, LISTING_SELLER_OFFSET, seller)
}

pub fn listings_with_status(status: ListingStatus) -> Vec<AccountFilter> {
    vec![
        AccountFilter::kind(AccountKind::Listing),
        AccountFilter::memcmp(LISTING_STATUS_OFFSET, vec![status as u8]),
    ]
}

pub fn votes_on(proposal: &Pubkey) -> Vec<AccountFilter> {
    relationship(AccountKind::VoteRecord, VOTE_PROPOSAL_OFFSET, proposal)
}

/// Byte offsets of fields used by memcmp relationship queries.
///
/// Offsets include the 8-byte discriminator and are valid for
/// `LAYOUT_VERSION`. Any reordering of the fixed-size prefix of a record in
/// `accounts` must be reflected here; the tests below catch drift.
use crate::constants::{DISCRIMINATOR_SIZE, PUBKEY_SIZE};

const FIRST: usize = DISCRIMINATOR_SIZE;
const SECOND: usize = DISCRIMINATOR_SIZE + PUBKEY_SIZE;

pub const FOLLOW_FOLLOWER_OFFSET: usize = FIRST;
pub const FOLLOW_FOLLOWED_OFFSET: usize = SECOND;

pub const LIKE_USER_OFFSET: usize = FIRST;
pub const LIKE_POST_OFFSET: usize = SECOND;

pub const COMMENT_POST_OFFSET: usize = FIRST;
pub const COMMENT_AUTHOR_OFFSET: usize = SECOND;

pub const REPOST_USER_OFFSET: usize = FIRST;
pub const REPOST_POST_OFFSET: usize = SECOND;

pub const SHARE_HOLDING_HOLDER_OFFSET: usize = FIRST;
pub const SHARE_HOLDING_CREATOR_OFFSET: usize = SECOND;

pub const SUBSCRIPTION_SUBSCRIBER_OFFSET: usize = FIRST;
pub const SUBSCRIPTION_CREATOR_OFFSET: usize = SECOND;

pub const GROUP_MEMBER_GROUP_OFFSET: usize = FIRST;
pub const GROUP_MEMBER_MEMBER_OFFSET: usize = SECOND;

pub const LISTING_SELLER_OFFSET: usize = FIRST;
pub const LISTING_ASSET_OFFSET: usize = SECOND;
/// seller, asset_id, price_lamports
pub const LISTING_STATUS_OFFSET: usize = SECOND + PUBKEY_SIZE + 8;

pub const OFFER_LISTING_OFFSET: usize = FIRST;
pub const OFFER_BUYER_OFFSET: usize = SECOND;

pub const VOTE_PROPOSAL_OFFSET: usize = FIRST;
pub const VOTE_VOTER_OFFSET: usize = SECOND;

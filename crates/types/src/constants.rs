/// Protocol constants shared by the math crate and the SDK.
///
/// Every value here mirrors the deployed program. Changing one without a
/// matching program upgrade makes client previews silently wrong.

// ============================================================================
// Unit Constants
// ============================================================================

/// Subunits (lamports) per whole token
pub const LAMPORTS_PER_TOKEN: u64 = 1_000_000_000;

/// Basis points denominator (10,000 = 100%)
pub const BPS_DENOMINATOR: u64 = 10_000;

// ============================================================================
// Bonding Curve Constants
// ============================================================================

/// Supply bucket width of the creator-share bonding curve
pub const PRICE_SCALE: u64 = 100;

// ============================================================================
// Fee Constants
// ============================================================================

/// Default platform fee (2.5%)
pub const DEFAULT_PLATFORM_FEE_BPS: u16 = 250;

/// Maximum platform fee accepted by the program (10%)
pub const MAX_PLATFORM_FEE_BPS: u16 = 1_000;

// ============================================================================
// Transfer Bounds
// ============================================================================

/// Client-side sanity bound on any single transfer (10,000 tokens)
pub const MAX_TRANSFER_LAMPORTS: u64 = 10_000 * LAMPORTS_PER_TOKEN;

// ============================================================================
// Governance Constants
// ============================================================================

pub const SECONDS_PER_DAY: i64 = 86_400;

/// Voting power required to open a proposal (1,000 tokens)
pub const MIN_PROPOSAL_POWER: u64 = 1_000 * LAMPORTS_PER_TOKEN;

/// Default voting window (3 days)
pub const DEFAULT_VOTING_PERIOD_SECONDS: i64 = 3 * SECONDS_PER_DAY;

/// Default quorum (10,000 tokens of voting power)
pub const DEFAULT_QUORUM_VOTES: u64 = 10_000 * LAMPORTS_PER_TOKEN;

/// Lock tiers as (minimum lock in days, multiplier in bps), longest first
pub const LOCK_MULTIPLIER_TIERS: [(i64, u64); 4] = [
    (365, 30_000),
    (180, 20_000),
    (90, 15_000),
    (30, 12_000),
];

/// Multiplier for stakes below the shortest tier (1.0x)
pub const BASE_LOCK_MULTIPLIER_BPS: u64 = 10_000;

/// Highest multiplier any lock can earn (3.0x)
pub const MAX_LOCK_MULTIPLIER_BPS: u64 = 30_000;

// ============================================================================
// Content Limits
// ============================================================================

/// Maximum length of a single PDA seed segment
pub const MAX_SEED_LEN: usize = 32;

/// Maximum number of seed segments, including the bump
pub const MAX_SEEDS: usize = 16;

pub const MAX_USERNAME_LEN: usize = 32;
pub const MAX_GROUP_NAME_LEN: usize = 32;
pub const MAX_PROPOSAL_TITLE_LEN: usize = 32;
pub const MAX_PROPOSAL_DESCRIPTION_LEN: usize = 512;
pub const MAX_BIO_LEN: usize = 160;
pub const MAX_COMMENT_LEN: usize = 280;
pub const MAX_LISTING_CATEGORY_LEN: usize = 16;

// ============================================================================
// Account Size Constants
// ============================================================================

/// Account discriminator size (8 bytes)
pub const DISCRIMINATOR_SIZE: usize = 8;

/// Size of a Pubkey (32 bytes)
pub const PUBKEY_SIZE: usize = 32;

// ============================================================================
// Versioning
// ============================================================================

/// Seed table revision; bumped together with the program
pub const SEED_TABLE_VERSION: u8 = 1;

/// Account layout revision the memcmp offsets in `layout` were computed for
pub const LAYOUT_VERSION: u8 = 1;

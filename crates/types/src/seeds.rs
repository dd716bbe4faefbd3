/// PDA seed prefixes. Single source of truth for every derived address the
/// client computes; must match the program bit-for-bit.

pub const PLATFORM_CONFIG_SEED: &[u8] = b"platform_config";
pub const USER_PROFILE_SEED: &[u8] = b"user_profile";
pub const CREATOR_POOL_SEED: &[u8] = b"creator_pool";
pub const POOL_VAULT_SEED: &[u8] = b"pool_vault";
pub const SHARE_HOLDING_SEED: &[u8] = b"share_holding";
pub const SUBSCRIPTION_SEED: &[u8] = b"subscription";
pub const GROUP_SEED: &[u8] = b"group";
pub const GROUP_MEMBER_SEED: &[u8] = b"group_member";
pub const STAKE_POSITION_SEED: &[u8] = b"stake_position";
pub const PROPOSAL_SEED: &[u8] = b"proposal";
pub const VOTE_SEED: &[u8] = b"vote";
pub const USERNAME_NFT_SEED: &[u8] = b"username_nft";
pub const LISTING_SEED: &[u8] = b"listing";
pub const OFFER_SEED: &[u8] = b"offer";

/// All seed prefixes, in table order
pub const ALL_SEEDS: [&[u8]; 14] = [
    PLATFORM_CONFIG_SEED,
    USER_PROFILE_SEED,
    CREATOR_POOL_SEED,
    POOL_VAULT_SEED,
    SHARE_HOLDING_SEED,
    SUBSCRIPTION_SEED,
    GROUP_SEED,
    GROUP_MEMBER_SEED,
    STAKE_POSITION_SEED,
    PROPOSAL_SEED,
    VOTE_SEED,
    USERNAME_NFT_SEED,
    LISTING_SEED,
    OFFER_SEED,
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seed_prefixes_are_unique() {
        let unique: HashSet<_> = ALL_SEEDS.iter().collect();
        assert_eq!(unique.len(), ALL_SEEDS.len());
    }
}

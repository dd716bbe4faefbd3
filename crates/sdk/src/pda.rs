use std::collections::HashMap;
use std::sync::RwLock;

use pulse_types::seeds::*;
use pulse_types::{
    validate_text, validate_username, PulseError, PulseResult, MAX_GROUP_NAME_LEN,
    MAX_PROPOSAL_TITLE_LEN, MAX_SEEDS, MAX_SEED_LEN,
};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

/// A program address together with the seeds and bump that produce it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedAddress {
    pub seed_path: Vec<Vec<u8>>,
    pub address: Pubkey,
    pub bump: u8,
}

impl DerivedAddress {
    pub fn into_parts(self) -> (Pubkey, u8) {
        (self.address, self.bump)
    }
}

/// Memo of seed paths already searched
struct PdaCache {
    cache: RwLock<HashMap<Vec<Vec<u8>>, DerivedAddress>>,
}

impl PdaCache {
    fn new() -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn get_or_compute<F>(&self, seed_path: &[&[u8]], compute: F) -> PulseResult<DerivedAddress>
    where
        F: FnOnce() -> PulseResult<DerivedAddress>,
    {
        let key: Vec<Vec<u8>> = seed_path.iter().map(|s| s.to_vec()).collect();
        if let Some(cached) = self
            .cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key)
        {
            return Ok(cached.clone());
        }

        let derived = compute()?;
        self.cache
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, derived.clone());
        Ok(derived)
    }
}

/// Program address derivation for every record the program owns
pub struct PdaBuilder {
    cache: PdaCache,
    pub program_id: Pubkey,
}

impl PdaBuilder {
    pub fn new(program_id: Pubkey) -> Self {
        Self {
            cache: PdaCache::new(),
            program_id,
        }
    }

    /// Search bumps 255 down to 0 for the first off-curve address
    pub fn derive(&self, seed_path: &[&[u8]]) -> PulseResult<DerivedAddress> {
        validate_seeds(seed_path)?;
        self.cache.get_or_compute(seed_path, || {
            let (address, bump) = Pubkey::try_find_program_address(seed_path, &self.program_id)
                .ok_or(PulseError::AddressSpaceExhausted {
                    segments: seed_path.len(),
                })?;
            Ok(DerivedAddress {
                seed_path: seed_path.iter().map(|s| s.to_vec()).collect(),
                address,
                bump,
            })
        })
    }

    // ========================================================================
    // Platform and Social
    // ========================================================================

    pub fn platform_config(&self) -> PulseResult<DerivedAddress> {
        self.derive(&[PLATFORM_CONFIG_SEED])
    }

    pub fn user_profile(&self, owner: &Pubkey) -> PulseResult<DerivedAddress> {
        self.derive(&[USER_PROFILE_SEED, owner.as_ref()])
    }

    pub fn subscription(
        &self,
        subscriber: &Pubkey,
        creator: &Pubkey,
        tier_id: u8,
    ) -> PulseResult<DerivedAddress> {
        self.derive(&[
            SUBSCRIPTION_SEED,
            subscriber.as_ref(),
            creator.as_ref(),
            &[tier_id],
        ])
    }

    pub fn group(&self, creator: &Pubkey, name: &str) -> PulseResult<DerivedAddress> {
        validate_text("group name", name, MAX_GROUP_NAME_LEN)?;
        self.derive(&[GROUP_SEED, creator.as_ref(), name.as_bytes()])
    }

    pub fn group_member(&self, group: &Pubkey, member: &Pubkey) -> PulseResult<DerivedAddress> {
        self.derive(&[GROUP_MEMBER_SEED, group.as_ref(), member.as_ref()])
    }

    // ========================================================================
    // Creator Shares
    // ========================================================================

    pub fn creator_pool(&self, creator: &Pubkey) -> PulseResult<DerivedAddress> {
        self.derive(&[CREATOR_POOL_SEED, creator.as_ref()])
    }

    /// Lamport vault backing a creator's pool
    pub fn pool_vault(&self, creator: &Pubkey) -> PulseResult<DerivedAddress> {
        self.derive(&[POOL_VAULT_SEED, creator.as_ref()])
    }

    pub fn share_holding(&self, holder: &Pubkey, creator: &Pubkey) -> PulseResult<DerivedAddress> {
        self.derive(&[SHARE_HOLDING_SEED, holder.as_ref(), creator.as_ref()])
    }

    // ========================================================================
    // Username Marketplace
    // ========================================================================

    pub fn username_nft(&self, username: &str) -> PulseResult<DerivedAddress> {
        validate_username(username)?;
        self.derive(&[USERNAME_NFT_SEED, username.as_bytes()])
    }

    pub fn listing(&self, username_nft: &Pubkey) -> PulseResult<DerivedAddress> {
        self.derive(&[LISTING_SEED, username_nft.as_ref()])
    }

    pub fn offer(&self, listing: &Pubkey, buyer: &Pubkey) -> PulseResult<DerivedAddress> {
        self.derive(&[OFFER_SEED, listing.as_ref(), buyer.as_ref()])
    }

    // ========================================================================
    // Governance
    // ========================================================================

    pub fn stake_position(&self, staker: &Pubkey) -> PulseResult<DerivedAddress> {
        self.derive(&[STAKE_POSITION_SEED, staker.as_ref()])
    }

    pub fn proposal(&self, proposer: &Pubkey, title: &str) -> PulseResult<DerivedAddress> {
        validate_text("proposal title", title, MAX_PROPOSAL_TITLE_LEN)?;
        self.derive(&[PROPOSAL_SEED, proposer.as_ref(), title.as_bytes()])
    }

    pub fn vote(&self, proposal: &Pubkey, voter: &Pubkey) -> PulseResult<DerivedAddress> {
        self.derive(&[VOTE_SEED, proposal.as_ref(), voter.as_ref()])
    }
}

/// Seed limits enforced by the ledger; the bump occupies one extra segment
fn validate_seeds(seed_path: &[&[u8]]) -> PulseResult<()> {
    let count = seed_path.len() + 1;
    if count > MAX_SEEDS {
        return Err(PulseError::TooManySeeds {
            count,
            max: MAX_SEEDS,
        });
    }
    for (index, seed) in seed_path.iter().enumerate() {
        if seed.len() > MAX_SEED_LEN {
            return Err(PulseError::SeedTooLong {
                index,
                len: seed.len(),
                max: MAX_SEED_LEN,
            });
        }
    }
    Ok(())
}

use std::sync::Arc;

use crate::prelude::*;
use pulse_types::{Follow, UserProfile};

use crate::{
    cache::{keys, Cached},
    client::BaseClient,
    error::SdkResult,
    filters,
    instructions::PulseInstructions,
    pda::PdaBuilder,
    rpc::IndexState,
};

/// Service for profiles, follows and groups
pub struct SocialService {
    base: Arc<BaseClient>,
    pda: Arc<PdaBuilder>,
    ixs: Arc<PulseInstructions>,
}

impl SocialService {
    pub fn new(base: Arc<BaseClient>, pda: Arc<PdaBuilder>, ixs: Arc<PulseInstructions>) -> Self {
        Self { base, pda, ixs }
    }

    pub async fn profile(&self, owner: &Pubkey) -> SdkResult<Cached<UserProfile>> {
        let address = self.pda.user_profile(owner)?.address;
        self.base
            .fetch_cached(
                &keys::profile(owner),
                self.base.config().cache.profile_ttl(),
                &address,
            )
            .await
    }

    /// Wallets following `user`
    pub async fn followers(&self, user: &Pubkey) -> SdkResult<Cached<IndexState<Vec<Pubkey>>>> {
        let records = self
            .base
            .scan_cached::<Follow>(
                &keys::followers(user),
                self.base.config().cache.relationship_ttl(),
                &filters::followers_of(user),
            )
            .await?;
        Ok(records.map(|state| {
            state.map(|follows| follows.into_iter().map(|(_, f)| f.follower).collect())
        }))
    }

    /// Wallets `user` follows
    pub async fn following(&self, user: &Pubkey) -> SdkResult<Cached<IndexState<Vec<Pubkey>>>> {
        let records = self
            .base
            .scan_cached::<Follow>(
                &keys::following(user),
                self.base.config().cache.relationship_ttl(),
                &filters::following_of(user),
            )
            .await?;
        Ok(records.map(|state| {
            state.map(|follows| follows.into_iter().map(|(_, f)| f.followed).collect())
        }))
    }

    /// Follow `followed`. The follow record is a fresh keypair account
    /// whose signature the signer must supply.
    pub async fn follow(&self, followed: Pubkey, follow_account: Pubkey) -> SdkResult<Signature> {
        let follower = self.base.authority()?;
        let ix = self.ixs.follow_user(follower, followed, follow_account)?;
        let signature = self.base.submit("follow_user", vec![ix]).await?;
        self.invalidate_follow(&follower, &followed);
        Ok(signature)
    }

    pub async fn unfollow(&self, followed: Pubkey, follow_account: Pubkey) -> SdkResult<Signature> {
        let follower = self.base.authority()?;
        let ix = self.ixs.unfollow_user(follower, followed, follow_account)?;
        let signature = self.base.submit("unfollow_user", vec![ix]).await?;
        self.invalidate_follow(&follower, &followed);
        Ok(signature)
    }

    pub async fn join_group(&self, group: Pubkey) -> SdkResult<Signature> {
        let ix = self.ixs.join_group(self.base.authority()?, group)?;
        self.base.submit("join_group", vec![ix]).await
    }

    fn invalidate_follow(&self, follower: &Pubkey, followed: &Pubkey) {
        let cache = self.base.cache();
        cache.invalidate(&keys::following(follower));
        cache.invalidate(&keys::followers(followed));
        cache.invalidate(&keys::profile(follower));
        cache.invalidate(&keys::profile(followed));
    }
}

use std::sync::Arc;

use crate::prelude::*;
use pulse_types::{Listing, Offer, PulseError};

use crate::{
    cache::{keys, Cached},
    client::{BaseClient, Records},
    error::{SdkError, SdkResult},
    filters,
    instructions::{ListUsernameParams, MakeOfferParams, PulseInstructions},
    pda::PdaBuilder,
    rpc::IndexState,
};

/// Service for the username marketplace
pub struct MarketplaceService {
    base: Arc<BaseClient>,
    pda: Arc<PdaBuilder>,
    ixs: Arc<PulseInstructions>,
}

impl MarketplaceService {
    pub fn new(base: Arc<BaseClient>, pda: Arc<PdaBuilder>, ixs: Arc<PulseInstructions>) -> Self {
        Self { base, pda, ixs }
    }

    /// Listing address of a username NFT
    pub fn listing_address(&self, username_nft: &Pubkey) -> SdkResult<Pubkey> {
        Ok(self.pda.listing(username_nft)?.address)
    }

    pub async fn listing(&self, listing: &Pubkey) -> SdkResult<Cached<Listing>> {
        self.base
            .fetch_cached(
                &keys::listing(listing),
                self.base.config().cache.listing_ttl(),
                listing,
            )
            .await
    }

    /// Listing of the NFT minted for `username`
    pub async fn listing_for_username(&self, username: &str) -> SdkResult<Cached<Listing>> {
        let nft = self.pda.username_nft(username)?.address;
        let listing = self.listing_address(&nft)?;
        self.listing(&listing).await
    }

    pub async fn offer(&self, listing: &Pubkey, buyer: &Pubkey) -> SdkResult<Cached<Offer>> {
        let address = self.pda.offer(listing, buyer)?.address;
        self.base
            .fetch_cached(
                &keys::offer(&address),
                self.base.config().cache.listing_ttl(),
                &address,
            )
            .await
    }

    pub async fn offers_for(&self, listing: &Pubkey) -> SdkResult<Cached<Records<Offer>>> {
        self.base
            .scan_cached(
                &keys::offers_for(listing),
                self.base.config().cache.relationship_ttl(),
                &filters::offers_for_listing(listing),
            )
            .await
    }

    /// Offers stranded on a sold, cancelled or closed listing
    pub async fn orphaned_offers(&self, listing: &Pubkey) -> SdkResult<Records<Offer>> {
        match self.base.fetch_account::<Listing>(listing).await {
            Ok(record) if record.is_active() => return Ok(IndexState::Ready(Vec::new())),
            Ok(_) | Err(SdkError::AccountNotFound { .. }) => {}
            Err(e) => return Err(e),
        }
        self.base.scan(&filters::offers_for_listing(listing)).await
    }

    pub async fn listings_by(&self, seller: &Pubkey) -> SdkResult<Records<Listing>> {
        self.base.scan(&filters::listings_by_seller(seller)).await
    }

    // ========================================================================
    // Writes
    // ========================================================================

    pub async fn list_username(
        &self,
        username_nft: Pubkey,
        params: ListUsernameParams,
    ) -> SdkResult<Signature> {
        let ix = self
            .ixs
            .list_username(self.base.authority()?, username_nft, params)?;
        let signature = self.base.submit("list_username", vec![ix]).await?;
        self.base
            .cache()
            .invalidate(&keys::listing(&self.listing_address(&username_nft)?));
        Ok(signature)
    }

    pub async fn make_offer(
        &self,
        listing: Pubkey,
        amount_lamports: u64,
        expires_at: i64,
    ) -> SdkResult<Signature> {
        let buyer = self.base.authority()?;
        let ix = self.ixs.make_offer(
            buyer,
            listing,
            MakeOfferParams {
                amount_lamports,
                expires_at,
            },
        )?;
        if expires_at <= self.base.now() {
            return Err(PulseError::invalid_parameter(
                "expires_at",
                &expires_at.to_string(),
                "in the future",
            )
            .into());
        }

        let record = self.base.fetch_account::<Listing>(&listing).await?;
        if record.seller == buyer {
            return Err(PulseError::self_action("make an offer to").into());
        }
        if !record.is_active() {
            return Err(PulseError::ListingNotActive {
                listing,
                status: record.status,
            }
            .into());
        }

        let signature = self.base.submit("make_offer", vec![ix]).await?;
        self.base.cache().invalidate(&keys::offers_for(&listing));
        Ok(signature)
    }

    /// Accept `buyer`'s offer on the listing of `username_nft`
    pub async fn accept_offer(&self, username_nft: Pubkey, buyer: Pubkey) -> SdkResult<Signature> {
        let seller = self.base.authority()?;
        let ix = self.ixs.accept_offer(seller, username_nft, buyer)?;

        let listing = self.listing_address(&username_nft)?;
        let record = self.base.fetch_account::<Listing>(&listing).await?;
        if record.seller != seller {
            return Err(PulseError::unauthorized(seller, record.seller).into());
        }
        if !record.is_active() {
            return Err(PulseError::ListingNotActive {
                listing,
                status: record.status,
            }
            .into());
        }
        let offer = self.pda.offer(&listing, &buyer)?.address;
        let bid = self.base.fetch_account::<Offer>(&offer).await?;
        if bid.is_expired(self.base.now()) {
            return Err(PulseError::OfferExpired {
                offer,
                expired_at: bid.expires_at,
            }
            .into());
        }

        let signature = self.base.submit("accept_offer", vec![ix]).await?;
        self.invalidate_listing(&listing);
        self.base.cache().invalidate(&keys::offer(&offer));
        Ok(signature)
    }

    pub async fn cancel_listing(&self, username_nft: Pubkey) -> SdkResult<Signature> {
        let seller = self.base.authority()?;
        let ix = self.ixs.cancel_listing(seller, username_nft)?;

        let listing = self.listing_address(&username_nft)?;
        let record = self.base.fetch_account::<Listing>(&listing).await?;
        if record.seller != seller {
            return Err(PulseError::unauthorized(seller, record.seller).into());
        }
        if !record.is_active() {
            return Err(PulseError::ListingNotActive {
                listing,
                status: record.status,
            }
            .into());
        }

        let signature = self.base.submit("cancel_listing", vec![ix]).await?;
        self.invalidate_listing(&listing);
        Ok(signature)
    }

    /// Withdraw the caller's offer; works on orphaned offers too
    pub async fn cancel_offer(&self, listing: Pubkey) -> SdkResult<Signature> {
        let buyer = self.base.authority()?;
        let ix = self.ixs.cancel_offer(buyer, listing)?;
        let signature = self.base.submit("cancel_offer", vec![ix]).await?;

        let offer = self.pda.offer(&listing, &buyer)?.address;
        self.base.cache().invalidate(&keys::offer(&offer));
        self.base.cache().invalidate(&keys::offers_for(&listing));
        Ok(signature)
    }

    fn invalidate_listing(&self, listing: &Pubkey) {
        let cache = self.base.cache();
        cache.invalidate(&keys::listing(listing));
        cache.invalidate(&keys::offers_for(listing));
    }
}

//! Username marketplace escrow model
//!
//! An in-memory mirror of the program's listing / offer state machine, used
//! to preview transitions before submitting them. Each transition returns a
//! settlement describing where escrowed lamports went.
//!
//! A listing moves `Active -> Sold` or `Active -> Cancelled` and never back.
//! Offers outlive their listing: once it leaves `Active` they are orphaned
//! and can only be cancelled (refunded) by their buyer.

use std::collections::HashMap;
use std::sync::Arc;

use pulse_math::split_fee;
use pulse_types::{
    validate_amount, validate_text, Listing, ListingStatus, Offer, PulseError, PulseResult,
    MAX_LISTING_CATEGORY_LEN,
};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use tracing::debug;

use crate::pda::PdaBuilder;

/// Movement of lamports caused by one transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Settlement {
    Listed {
        listing: Pubkey,
    },
    /// Buyer funds moved into the offer escrow
    Escrowed {
        offer: Pubkey,
        buyer: Pubkey,
        amount: u64,
    },
    /// Escrow released to the seller and the platform
    Sold {
        listing: Pubkey,
        offer: Pubkey,
        seller: Pubkey,
        buyer: Pubkey,
        seller_proceeds: u64,
        platform_fee: u64,
        /// Offers left behind on the sold listing
        orphaned: Vec<Pubkey>,
    },
    ListingCancelled {
        listing: Pubkey,
        orphaned: Vec<Pubkey>,
    },
    /// Escrow returned to the buyer in full
    Refunded {
        offer: Pubkey,
        buyer: Pubkey,
        amount: u64,
    },
    /// Terminal listing record removed
    ListingClosed {
        listing: Pubkey,
    },
}

pub struct EscrowMarketplace {
    pda: Arc<PdaBuilder>,
    max_transfer_lamports: u64,
    listings: HashMap<Pubkey, Listing>,
    offers: HashMap<Pubkey, Offer>,
}

impl EscrowMarketplace {
    pub fn new(pda: Arc<PdaBuilder>, max_transfer_lamports: u64) -> Self {
        Self {
            pda,
            max_transfer_lamports,
            listings: HashMap::new(),
            offers: HashMap::new(),
        }
    }

    pub fn listing(&self, listing: &Pubkey) -> Option<&Listing> {
        self.listings.get(listing)
    }

    pub fn offer(&self, offer: &Pubkey) -> Option<&Offer> {
        self.offers.get(offer)
    }

    /// Seed the model with a record read from the ledger
    pub fn insert_listing(&mut self, address: Pubkey, listing: Listing) {
        self.listings.insert(address, listing);
    }

    pub fn insert_offer(&mut self, address: Pubkey, offer: Offer) {
        self.offers.insert(address, offer);
    }

    /// Lamports currently held across all offer escrows
    pub fn escrow_total(&self) -> u64 {
        self.offers
            .values()
            .fold(0u64, |acc, offer| acc.saturating_add(offer.amount_lamports))
    }

    /// Offers placed on `listing`, orphaned or not
    pub fn offers_for(&self, listing: &Pubkey) -> Vec<Pubkey> {
        let mut offers: Vec<Pubkey> = self
            .offers
            .iter()
            .filter(|(_, offer)| offer.listing == *listing)
            .map(|(address, _)| *address)
            .collect();
        offers.sort();
        offers
    }

    /// Offers whose listing is no longer active (sold, cancelled or closed)
    pub fn orphaned_offers(&self, listing: &Pubkey) -> Vec<Pubkey> {
        match self.listings.get(listing) {
            Some(record) if record.is_active() => Vec::new(),
            _ => self.offers_for(listing),
        }
    }

    // ========================================================================
    // Listings
    // ========================================================================

    pub fn list(
        &mut self,
        seller: Pubkey,
        username_nft: Pubkey,
        price_lamports: u64,
        category: &str,
        now: i64,
        expires_at: Option<i64>,
    ) -> PulseResult<Settlement> {
        validate_amount("price_lamports", price_lamports, 1, self.max_transfer_lamports)?;
        if !category.is_empty() {
            validate_text("category", category, MAX_LISTING_CATEGORY_LEN)?;
        }
        if let Some(at) = expires_at {
            if at <= now {
                return Err(PulseError::invalid_parameter(
                    "expires_at",
                    &at.to_string(),
                    "in the future",
                ));
            }
        }

        let listing = self.pda.listing(&username_nft)?.address;
        if self.listings.contains_key(&listing) {
            return Err(PulseError::ListingAlreadyExists { listing });
        }

        self.listings.insert(
            listing,
            Listing {
                seller,
                asset_id: username_nft,
                price_lamports,
                status: ListingStatus::Active,
                listed_at: now,
                expires_at,
                bump: 0,
                category: category.to_string(),
            },
        );
        debug!("Listed {} as {}", username_nft, listing);

        Ok(Settlement::Listed { listing })
    }

    /// Remove a sold or cancelled listing so the asset can be listed again
    pub fn close_listing(&mut self, listing: &Pubkey, caller: &Pubkey) -> PulseResult<Settlement> {
        let record = self.existing_listing(listing)?;
        if record.seller != *caller {
            return Err(PulseError::unauthorized(*caller, record.seller));
        }
        if record.is_active() {
            return Err(PulseError::ListingStillActive { listing: *listing });
        }
        let open = self.offers_for(listing).len();
        if open > 0 {
            return Err(PulseError::ListingHasOpenOffers {
                listing: *listing,
                open,
            });
        }

        self.listings.remove(listing);
        Ok(Settlement::ListingClosed { listing: *listing })
    }

    pub fn cancel_listing(&mut self, listing: &Pubkey, caller: &Pubkey) -> PulseResult<Settlement> {
        let record = self.existing_listing(listing)?;
        if record.seller != *caller {
            return Err(PulseError::unauthorized(*caller, record.seller));
        }
        if !record.is_active() {
            return Err(PulseError::ListingNotActive {
                listing: *listing,
                status: record.status,
            });
        }

        self.set_status(listing, ListingStatus::Cancelled);
        Ok(Settlement::ListingCancelled {
            listing: *listing,
            orphaned: self.offers_for(listing),
        })
    }

    // ========================================================================
    // Offers
    // ========================================================================

    pub fn make_offer(
        &mut self,
        listing: &Pubkey,
        buyer: Pubkey,
        amount_lamports: u64,
        now: i64,
        expires_at: i64,
    ) -> PulseResult<Settlement> {
        let record = self.existing_listing(listing)?;
        if record.seller == buyer {
            return Err(PulseError::self_action("make an offer to"));
        }
        validate_amount("amount_lamports", amount_lamports, 1, self.max_transfer_lamports)?;
        if expires_at <= now {
            return Err(PulseError::invalid_parameter(
                "expires_at",
                &expires_at.to_string(),
                "in the future",
            ));
        }
        if !record.is_active() {
            return Err(PulseError::ListingNotActive {
                listing: *listing,
                status: record.status,
            });
        }
        if record.is_expired(now) {
            return Err(PulseError::ListingExpired {
                listing: *listing,
                expired_at: record.expires_at.unwrap_or(now),
            });
        }

        let offer = self.pda.offer(listing, &buyer)?.address;
        if self.offers.contains_key(&offer) {
            return Err(PulseError::OfferAlreadyExists { offer });
        }

        self.offers.insert(
            offer,
            Offer {
                listing: *listing,
                buyer,
                amount_lamports,
                created_at: now,
                expires_at,
                bump: 0,
            },
        );

        Ok(Settlement::Escrowed {
            offer,
            buyer,
            amount: amount_lamports,
        })
    }

    /// Sell to `offer`; the escrow goes to the seller net of the platform fee
    pub fn accept_offer(
        &mut self,
        listing: &Pubkey,
        offer: &Pubkey,
        caller: &Pubkey,
        fee_bps: u16,
        now: i64,
    ) -> PulseResult<Settlement> {
        let record = self.existing_listing(listing)?;
        if record.seller != *caller {
            return Err(PulseError::unauthorized(*caller, record.seller));
        }
        if !record.is_active() {
            return Err(PulseError::ListingNotActive {
                listing: *listing,
                status: record.status,
            });
        }
        let seller = record.seller;

        let bid = match self.offers.get(offer) {
            Some(bid) if bid.listing == *listing => bid,
            _ => return Err(PulseError::OfferNotFound { offer: *offer }),
        };
        if bid.is_expired(now) {
            return Err(PulseError::OfferExpired {
                offer: *offer,
                expired_at: bid.expires_at,
            });
        }

        // a rejected fee must leave state untouched
        let split = split_fee(bid.amount_lamports, fee_bps)?;
        let buyer = bid.buyer;

        self.offers.remove(offer);
        self.set_status(listing, ListingStatus::Sold);
        debug!(
            "Sold {} to {}: {} to seller, {} fee",
            listing, buyer, split.net, split.fee
        );

        Ok(Settlement::Sold {
            listing: *listing,
            offer: *offer,
            seller,
            buyer,
            seller_proceeds: split.net,
            platform_fee: split.fee,
            orphaned: self.offers_for(listing),
        })
    }

    /// Refund an offer. Allowed whatever state its listing is in.
    pub fn cancel_offer(&mut self, offer: &Pubkey, caller: &Pubkey) -> PulseResult<Settlement> {
        let bid = self
            .offers
            .get(offer)
            .ok_or(PulseError::OfferNotFound { offer: *offer })?;
        if bid.buyer != *caller {
            return Err(PulseError::unauthorized(*caller, bid.buyer));
        }

        let amount = bid.amount_lamports;
        let buyer = bid.buyer;
        self.offers.remove(offer);

        Ok(Settlement::Refunded {
            offer: *offer,
            buyer,
            amount,
        })
    }

    fn existing_listing(&self, listing: &Pubkey) -> PulseResult<&Listing> {
        self.listings
            .get(listing)
            .ok_or(PulseError::ListingNotFound { listing: *listing })
    }

    fn set_status(&mut self, listing: &Pubkey, status: ListingStatus) {
        if let Some(record) = self.listings.get_mut(listing) {
            record.status = status;
        }
    }
}

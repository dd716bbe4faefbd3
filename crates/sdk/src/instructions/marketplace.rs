use crate::prelude::*;
use pulse_types::{validate_text, PulseError, MAX_LISTING_CATEGORY_LEN};

use crate::{error::SdkResult, impl_instruction, instructions::InstructionBuilder};

use super::PulseInstructions;

// Instruction discriminators
const LIST_USERNAME_DISCRIMINATOR: [u8; 8] = [239, 211, 152, 104, 105, 21, 227, 11];
const MAKE_OFFER_DISCRIMINATOR: [u8; 8] = [214, 98, 97, 35, 59, 12, 44, 178];
const ACCEPT_OFFER_DISCRIMINATOR: [u8; 8] = [227, 82, 234, 131, 1, 18, 48, 2];
const CANCEL_LISTING_DISCRIMINATOR: [u8; 8] = [41, 183, 50, 232, 230, 233, 157, 70];
const CANCEL_OFFER_DISCRIMINATOR: [u8; 8] = [92, 203, 223, 40, 92, 89, 53, 119];

/// Parameters for listing a username NFT
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub struct ListUsernameParams {
    pub price_lamports: u64,
    pub category: String,
    pub expires_at: Option<i64>,
}

impl_instruction!(ListUsernameParams, LIST_USERNAME_DISCRIMINATOR);

/// Parameters for an escrowed offer
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub struct MakeOfferParams {
    pub amount_lamports: u64,
    pub expires_at: i64,
}

impl_instruction!(MakeOfferParams, MAKE_OFFER_DISCRIMINATOR);

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub struct AcceptOfferParams {}

impl_instruction!(AcceptOfferParams, ACCEPT_OFFER_DISCRIMINATOR);

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub struct CancelListingParams {}

impl_instruction!(CancelListingParams, CANCEL_LISTING_DISCRIMINATOR);

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub struct CancelOfferParams {}

impl_instruction!(CancelOfferParams, CANCEL_OFFER_DISCRIMINATOR);

impl PulseInstructions {
    /// Build list username instruction
    pub fn list_username(
        &self,
        seller: Pubkey,
        username_nft: Pubkey,
        params: ListUsernameParams,
    ) -> SdkResult<Instruction> {
        self.check_transfer("price_lamports", params.price_lamports)?;
        if !params.category.is_empty() {
            validate_text("category", &params.category, MAX_LISTING_CATEGORY_LEN)?;
        }

        let config = self.pda.platform_config()?;
        let listing = self.pda.listing(&username_nft)?;

        Ok(self
            .builder()
            .add_signer(seller)
            .add_writable(username_nft)
            .add_writable(listing.address)
            .add_readonly(config.address)
            .add_readonly(system_program::id())
            .with_data(params.build_data()?)
            .build())
    }

    /// Build make offer instruction; the amount moves into the offer escrow
    pub fn make_offer(
        &self,
        buyer: Pubkey,
        listing: Pubkey,
        params: MakeOfferParams,
    ) -> SdkResult<Instruction> {
        self.check_transfer("amount_lamports", params.amount_lamports)?;

        let offer = self.pda.offer(&listing, &buyer)?;

        Ok(self
            .builder()
            .add_signer(buyer)
            .add_readonly(listing)
            .add_writable(offer.address)
            .add_readonly(system_program::id())
            .with_data(params.build_data()?)
            .build())
    }

    /// Build accept offer instruction
    pub fn accept_offer(
        &self,
        seller: Pubkey,
        username_nft: Pubkey,
        buyer: Pubkey,
    ) -> SdkResult<Instruction> {
        if seller == buyer {
            return Err(PulseError::self_action("accept an offer from").into());
        }

        let config = self.pda.platform_config()?;
        let listing = self.pda.listing(&username_nft)?;
        let offer = self.pda.offer(&listing.address, &buyer)?;

        Ok(self
            .builder()
            .add_signer(seller)
            .add_writable(buyer)
            .add_writable(username_nft)
            .add_writable(listing.address)
            .add_writable(offer.address)
            .add_readonly(config.address)
            .add_readonly(system_program::id())
            .with_data(AcceptOfferParams {}.build_data()?)
            .build())
    }

    /// Build cancel listing instruction
    pub fn cancel_listing(&self, seller: Pubkey, username_nft: Pubkey) -> SdkResult<Instruction> {
        let listing = self.pda.listing(&username_nft)?;

        Ok(self
            .builder()
            .add_signer(seller)
            .add_writable(listing.address)
            .with_data(CancelListingParams {}.build_data()?)
            .build())
    }

    /// Build cancel offer instruction; refunds the escrow to the buyer
    pub fn cancel_offer(&self, buyer: Pubkey, listing: Pubkey) -> SdkResult<Instruction> {
        let offer = self.pda.offer(&listing, &buyer)?;

        Ok(self
            .builder()
            .add_signer(buyer)
            .add_readonly(listing)
            .add_writable(offer.address)
            .with_data(CancelOfferParams {}.build_data()?)
            .build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pda::PdaBuilder;
    use pulse_types::MAX_TRANSFER_LAMPORTS;
    use std::sync::Arc;

    fn instructions() -> PulseInstructions {
        PulseInstructions::new(
            Arc::new(PdaBuilder::new(Pubkey::new_unique())),
            MAX_TRANSFER_LAMPORTS,
        )
    }

    #[test]
    fn test_accept_offer_targets_derived_offer() {
        let ixs = instructions();
        let (seller, nft, buyer) = (Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
        let ix = ixs.accept_offer(seller, nft, buyer).unwrap();

        let listing = ixs.pda.listing(&nft).unwrap().address;
        let offer = ixs.pda.offer(&listing, &buyer).unwrap().address;
        assert_eq!(ix.accounts[3].pubkey, listing);
        assert_eq!(ix.accounts[4].pubkey, offer);
        assert!(ix.accounts[4].is_writable);
    }

    #[test]
    fn test_list_username_validates_category() {
        let ixs = instructions();
        let params = ListUsernameParams {
            price_lamports: 1_000,
            category: "x".repeat(MAX_LISTING_CATEGORY_LEN + 1),
            expires_at: None,
        };
        assert!(ixs
            .list_username(Pubkey::new_unique(), Pubkey::new_unique(), params)
            .is_err());
    }

    #[test]
    fn test_offer_amount_bounds() {
        let ixs = instructions();
        let params = MakeOfferParams {
            amount_lamports: MAX_TRANSFER_LAMPORTS + 1,
            expires_at: 10,
        };
        assert!(ixs
            .make_offer(Pubkey::new_unique(), Pubkey::new_unique(), params)
            .is_err());
    }

    #[test]
    fn test_list_username_data_encoding() {
        let params = ListUsernameParams {
            price_lamports: 5,
            category: "og".to_string(),
            expires_at: Some(99),
        };
        let data = params.build_data().unwrap();
        // disc + u64 + (u32 len + 2 bytes) + (1 tag + i64)
        assert_eq!(data.len(), 8 + 8 + 4 + 2 + 1 + 8);
    }
}

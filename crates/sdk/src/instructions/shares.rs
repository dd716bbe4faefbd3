use crate::prelude::*;
use pulse_types::PulseError;

use crate::{error::SdkResult, impl_instruction, instructions::InstructionBuilder};

use super::PulseInstructions;

// Instruction discriminators
const BUY_SHARES_DISCRIMINATOR: [u8; 8] = [40, 239, 138, 154, 8, 37, 106, 108];
const SELL_SHARES_DISCRIMINATOR: [u8; 8] = [184, 164, 169, 16, 231, 158, 199, 196];
const TIP_CREATOR_DISCRIMINATOR: [u8; 8] = [48, 126, 181, 9, 20, 187, 187, 133];
const SUBSCRIBE_DISCRIMINATOR: [u8; 8] = [254, 28, 191, 138, 156, 179, 183, 53];

/// Parameters for buying creator shares
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub struct BuySharesParams {
    pub amount: u64,
    /// Program rejects the trade if cost plus fee exceeds this
    pub max_cost: u64,
}

impl_instruction!(BuySharesParams, BUY_SHARES_DISCRIMINATOR);

/// Parameters for selling creator shares
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub struct SellSharesParams {
    pub amount: u64,
    /// Program rejects the trade if proceeds after fee fall below this
    pub min_proceeds: u64,
}

impl_instruction!(SellSharesParams, SELL_SHARES_DISCRIMINATOR);

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub struct TipCreatorParams {
    pub amount: u64,
}

impl_instruction!(TipCreatorParams, TIP_CREATOR_DISCRIMINATOR);

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub struct SubscribeParams {
    pub tier_id: u8,
    pub price_lamports: u64,
}

impl_instruction!(SubscribeParams, SUBSCRIBE_DISCRIMINATOR);

impl PulseInstructions {
    /// Build buy shares instruction
    pub fn buy_shares(
        &self,
        buyer: Pubkey,
        creator: Pubkey,
        params: BuySharesParams,
    ) -> SdkResult<Instruction> {
        if params.amount == 0 {
            return Err(PulseError::amount_out_of_bounds("amount", 0, 1, u64::MAX).into());
        }
        self.check_transfer("max_cost", params.max_cost)?;

        let config = self.pda.platform_config()?;
        let pool = self.pda.creator_pool(&creator)?;
        let vault = self.pda.pool_vault(&creator)?;
        let holding = self.pda.share_holding(&buyer, &creator)?;

        Ok(self
            .builder()
            .add_signer(buyer)
            .add_readonly(config.address)
            .add_writable(pool.address)
            .add_writable(vault.address)
            .add_writable(holding.address)
            .add_readonly(system_program::id())
            .with_data(params.build_data()?)
            .build())
    }

    /// Build sell shares instruction
    pub fn sell_shares(
        &self,
        seller: Pubkey,
        creator: Pubkey,
        params: SellSharesParams,
    ) -> SdkResult<Instruction> {
        if params.amount == 0 {
            return Err(PulseError::amount_out_of_bounds("amount", 0, 1, u64::MAX).into());
        }

        let config = self.pda.platform_config()?;
        let pool = self.pda.creator_pool(&creator)?;
        let vault = self.pda.pool_vault(&creator)?;
        let holding = self.pda.share_holding(&seller, &creator)?;

        Ok(self
            .builder()
            .add_signer(seller)
            .add_readonly(config.address)
            .add_writable(pool.address)
            .add_writable(vault.address)
            .add_writable(holding.address)
            .add_readonly(system_program::id())
            .with_data(params.build_data()?)
            .build())
    }

    /// Build tip creator instruction
    pub fn tip_creator(&self, tipper: Pubkey, creator: Pubkey, amount: u64) -> SdkResult<Instruction> {
        if tipper == creator {
            return Err(PulseError::self_action("tip").into());
        }
        self.check_transfer("amount", amount)?;

        let profile = self.pda.user_profile(&creator)?;

        Ok(self
            .builder()
            .add_signer(tipper)
            .add_writable(creator)
            .add_readonly(profile.address)
            .add_readonly(system_program::id())
            .with_data(TipCreatorParams { amount }.build_data()?)
            .build())
    }

    /// Build subscribe instruction
    pub fn subscribe(
        &self,
        subscriber: Pubkey,
        creator: Pubkey,
        params: SubscribeParams,
    ) -> SdkResult<Instruction> {
        if subscriber == creator {
            return Err(PulseError::self_action("subscribe to").into());
        }
        self.check_transfer("price_lamports", params.price_lamports)?;

        let subscription = self
            .pda
            .subscription(&subscriber, &creator, params.tier_id)?;

        Ok(self
            .builder()
            .add_signer(subscriber)
            .add_writable(creator)
            .add_writable(subscription.address)
            .add_readonly(system_program::id())
            .with_data(params.build_data()?)
            .build())
    }
}

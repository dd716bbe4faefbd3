use std::sync::Arc;

use crate::prelude::*;
use pulse_types::{validate_amount, DISCRIMINATOR_SIZE};
use solana_sdk::hash::hashv;

use crate::error::{SdkError, SdkResult};
use crate::pda::PdaBuilder;

/// Trait for building instructions with consistent patterns
pub trait InstructionBuilder: BorshSerialize {
    /// The 8-byte instruction discriminator
    const DISCRIMINATOR: [u8; 8];

    /// Build the instruction data (discriminator + serialized params)
    fn build_data(&self) -> SdkResult<Vec<u8>> {
        let mut data = Self::DISCRIMINATOR.to_vec();
        data.extend_from_slice(&borsh::to_vec(self).map_err(SdkError::serialization)?);
        Ok(data)
    }
}

/// `sha256("global:<name>")[..8]`
pub fn instruction_discriminator(name: &str) -> [u8; 8] {
    let hash = hashv(&[b"global:", name.as_bytes()]);
    let mut disc = [0u8; 8];
    disc.copy_from_slice(&hash.to_bytes()[..DISCRIMINATOR_SIZE]);
    disc
}

/// Builder for constructing Solana instructions
pub struct PulseInstructionBuilder {
    program_id: Pubkey,
    accounts: Vec<AccountMeta>,
    data: Vec<u8>,
}

impl PulseInstructionBuilder {
    pub fn with_program_id(program_id: Pubkey) -> Self {
        Self {
            program_id,
            accounts: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Add a writable signer account
    pub fn add_signer(mut self, pubkey: Pubkey) -> Self {
        self.accounts.push(AccountMeta::new(pubkey, true));
        self
    }

    /// Add a writable non-signer account
    pub fn add_writable(mut self, pubkey: Pubkey) -> Self {
        self.accounts.push(AccountMeta::new(pubkey, false));
        self
    }

    /// Add a readonly account
    pub fn add_readonly(mut self, pubkey: Pubkey) -> Self {
        self.accounts.push(AccountMeta::new_readonly(pubkey, false));
        self
    }

    /// Set the instruction data
    pub fn with_data(mut self, data: Vec<u8>) -> Self {
        self.data = data;
        self
    }

    /// Build the final instruction
    pub fn build(self) -> Instruction {
        Instruction {
            program_id: self.program_id,
            accounts: self.accounts,
            data: self.data,
        }
    }
}

/// Macro for implementing InstructionBuilder for a params struct
#[macro_export]
macro_rules! impl_instruction {
    ($name:ident, $discriminator:expr) => {
        impl $crate::instructions::InstructionBuilder for $name {
            const DISCRIMINATOR: [u8; 8] = $discriminator;
        }
    };
}

/// Typed builders for every program instruction.
///
/// Inputs are validated here so that malformed requests fail before any
/// network call. Per-domain builders live in the sibling modules.
pub struct PulseInstructions {
    pub(crate) pda: Arc<PdaBuilder>,
    pub(crate) max_transfer_lamports: u64,
}

impl PulseInstructions {
    pub fn new(pda: Arc<PdaBuilder>, max_transfer_lamports: u64) -> Self {
        Self {
            pda,
            max_transfer_lamports,
        }
    }

    pub fn program_id(&self) -> Pubkey {
        self.pda.program_id
    }

    pub(crate) fn builder(&self) -> PulseInstructionBuilder {
        PulseInstructionBuilder::with_program_id(self.pda.program_id)
    }

    /// Transfers must be non-zero and within the client bound
    pub(crate) fn check_transfer(&self, field: &str, lamports: u64) -> SdkResult<()> {
        validate_amount(field, lamports, 1, self.max_transfer_lamports)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instructions::*;

    #[test]
    fn test_discriminators_match_global_namespace() {
        let table: [([u8; 8], &str); 17] = [
            (BuySharesParams::DISCRIMINATOR, "buy_shares"),
            (SellSharesParams::DISCRIMINATOR, "sell_shares"),
            (TipCreatorParams::DISCRIMINATOR, "tip_creator"),
            (FollowUserParams::DISCRIMINATOR, "follow_user"),
            (UnfollowUserParams::DISCRIMINATOR, "unfollow_user"),
            (SubscribeParams::DISCRIMINATOR, "subscribe"),
            (JoinGroupParams::DISCRIMINATOR, "join_group"),
            (ListUsernameParams::DISCRIMINATOR, "list_username"),
            (MakeOfferParams::DISCRIMINATOR, "make_offer"),
            (AcceptOfferParams::DISCRIMINATOR, "accept_offer"),
            (CancelListingParams::DISCRIMINATOR, "cancel_listing"),
            (CancelOfferParams::DISCRIMINATOR, "cancel_offer"),
            (StakeTokensParams::DISCRIMINATOR, "stake_tokens"),
            (UnstakeTokensParams::DISCRIMINATOR, "unstake_tokens"),
            (CreateProposalParams::DISCRIMINATOR, "create_proposal"),
            (CastVoteParams::DISCRIMINATOR, "cast_vote"),
            (ExecuteProposalParams::DISCRIMINATOR, "execute_proposal"),
        ];
        for (disc, name) in table {
            assert_eq!(disc, instruction_discriminator(name), "{}", name);
        }
    }

    #[test]
    fn test_build_data_layout() {
        let params = BuySharesParams {
            amount: 3,
            max_cost: 1_000,
        };
        let data = params.build_data().unwrap();
        assert_eq!(&data[..8], &BuySharesParams::DISCRIMINATOR);
        assert_eq!(&data[8..16], &3u64.to_le_bytes());
        assert_eq!(&data[16..24], &1_000u64.to_le_bytes());
        assert_eq!(data.len(), 24);
    }

    #[test]
    fn test_builder_account_flags() {
        let program_id = Pubkey::new_unique();
        let (signer, writable, readonly) =
            (Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
        let ix = PulseInstructionBuilder::with_program_id(program_id)
            .add_signer(signer)
            .add_writable(writable)
            .add_readonly(readonly)
            .with_data(vec![1])
            .build();

        assert_eq!(ix.program_id, program_id);
        assert!(ix.accounts[0].is_signer && ix.accounts[0].is_writable);
        assert!(!ix.accounts[1].is_signer && ix.accounts[1].is_writable);
        assert!(!ix.accounts[2].is_signer && !ix.accounts[2].is_writable);
        assert_eq!(ix.data, vec![1]);
    }
}

use crate::prelude::*;
use pulse_types::{
    validate_text, VoteChoice, MAX_PROPOSAL_DESCRIPTION_LEN, MAX_PROPOSAL_TITLE_LEN,
};

use crate::{error::SdkResult, impl_instruction, instructions::InstructionBuilder};

use super::PulseInstructions;

// Instruction discriminators
const STAKE_TOKENS_DISCRIMINATOR: [u8; 8] = [136, 126, 91, 162, 40, 131, 13, 127];
const UNSTAKE_TOKENS_DISCRIMINATOR: [u8; 8] = [58, 119, 215, 143, 203, 223, 32, 86];
const CREATE_PROPOSAL_DISCRIMINATOR: [u8; 8] = [132, 116, 68, 174, 216, 160, 198, 22];
const CAST_VOTE_DISCRIMINATOR: [u8; 8] = [20, 212, 15, 189, 69, 180, 69, 151];
const EXECUTE_PROPOSAL_DISCRIMINATOR: [u8; 8] = [186, 60, 116, 133, 108, 128, 111, 28];

/// Parameters for staking governance tokens
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub struct StakeTokensParams {
    pub amount: u64,
    pub lock_period_seconds: i64,
}

impl_instruction!(StakeTokensParams, STAKE_TOKENS_DISCRIMINATOR);

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub struct UnstakeTokensParams {}

impl_instruction!(UnstakeTokensParams, UNSTAKE_TOKENS_DISCRIMINATOR);

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub struct CreateProposalParams {
    pub title: String,
    pub description: String,
}

impl_instruction!(CreateProposalParams, CREATE_PROPOSAL_DISCRIMINATOR);

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub struct CastVoteParams {
    pub choice: VoteChoice,
}

impl_instruction!(CastVoteParams, CAST_VOTE_DISCRIMINATOR);

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub struct ExecuteProposalParams {}

impl_instruction!(ExecuteProposalParams, EXECUTE_PROPOSAL_DISCRIMINATOR);

impl PulseInstructions {
    /// Build stake tokens instruction
    pub fn stake_tokens(&self, staker: Pubkey, params: StakeTokensParams) -> SdkResult<Instruction> {
        self.check_transfer("amount", params.amount)?;
        // rejects negative lock periods
        pulse_math::voting_power(params.amount, params.lock_period_seconds)?;

        let config = self.pda.platform_config()?;
        let stake = self.pda.stake_position(&staker)?;

        Ok(self
            .builder()
            .add_signer(staker)
            .add_writable(stake.address)
            .add_readonly(config.address)
            .add_readonly(system_program::id())
            .with_data(params.build_data()?)
            .build())
    }

    /// Build unstake tokens instruction
    pub fn unstake_tokens(&self, staker: Pubkey) -> SdkResult<Instruction> {
        let stake = self.pda.stake_position(&staker)?;

        Ok(self
            .builder()
            .add_signer(staker)
            .add_writable(stake.address)
            .with_data(UnstakeTokensParams {}.build_data()?)
            .build())
    }

    /// Build create proposal instruction
    pub fn create_proposal(
        &self,
        proposer: Pubkey,
        params: CreateProposalParams,
    ) -> SdkResult<Instruction> {
        validate_text("title", &params.title, MAX_PROPOSAL_TITLE_LEN)?;
        validate_text("description", &params.description, MAX_PROPOSAL_DESCRIPTION_LEN)?;

        let config = self.pda.platform_config()?;
        let stake = self.pda.stake_position(&proposer)?;
        let proposal = self.pda.proposal(&proposer, &params.title)?;

        Ok(self
            .builder()
            .add_signer(proposer)
            .add_writable(proposal.address)
            .add_readonly(stake.address)
            .add_readonly(config.address)
            .add_readonly(system_program::id())
            .with_data(params.build_data()?)
            .build())
    }

    /// Build cast vote instruction
    pub fn cast_vote(
        &self,
        voter: Pubkey,
        proposal: Pubkey,
        choice: VoteChoice,
    ) -> SdkResult<Instruction> {
        let stake = self.pda.stake_position(&voter)?;
        let vote = self.pda.vote(&proposal, &voter)?;

        Ok(self
            .builder()
            .add_signer(voter)
            .add_writable(proposal)
            .add_writable(vote.address)
            .add_readonly(stake.address)
            .add_readonly(system_program::id())
            .with_data(CastVoteParams { choice }.build_data()?)
            .build())
    }

    /// Build execute proposal instruction
    pub fn execute_proposal(&self, executor: Pubkey, proposal: Pubkey) -> SdkResult<Instruction> {
        Ok(self
            .builder()
            .add_signer(executor)
            .add_writable(proposal)
            .with_data(ExecuteProposalParams {}.build_data()?)
            .build())
    }
}

use std::sync::Arc;

use crate::prelude::*;
use pulse_math::{tally_outcome, voting_power, TallyOutcome};
use pulse_types::{Proposal, ProposalStatus, PulseError, StakePosition, VoteChoice, VoteRecord};

use crate::{
    cache::{keys, Cached},
    client::{BaseClient, Records},
    error::SdkResult,
    filters,
    instructions::{CreateProposalParams, PulseInstructions, StakeTokensParams},
    pda::PdaBuilder,
};

/// Service for staking, proposals and voting
pub struct GovernanceService {
    base: Arc<BaseClient>,
    pda: Arc<PdaBuilder>,
    ixs: Arc<PulseInstructions>,
}

impl GovernanceService {
    pub fn new(base: Arc<BaseClient>, pda: Arc<PdaBuilder>, ixs: Arc<PulseInstructions>) -> Self {
        Self { base, pda, ixs }
    }

    pub async fn stake_position(&self, staker: &Pubkey) -> SdkResult<Cached<StakePosition>> {
        let address = self.pda.stake_position(staker)?.address;
        self.base
            .fetch_cached(
                &keys::stake_position(staker),
                self.base.config().cache.governance_ttl(),
                &address,
            )
            .await
    }

    pub async fn proposal(&self, proposal: &Pubkey) -> SdkResult<Cached<Proposal>> {
        self.base
            .fetch_cached(
                &keys::proposal(proposal),
                self.base.config().cache.governance_ttl(),
                proposal,
            )
            .await
    }

    pub async fn votes_on(&self, proposal: &Pubkey) -> SdkResult<Records<VoteRecord>> {
        self.base.scan(&filters::votes_on(proposal)).await
    }

    /// Voting power a stake would carry, without touching the ledger
    pub fn preview_voting_power(&self, amount: u64, lock_period_seconds: i64) -> SdkResult<u64> {
        Ok(voting_power(amount, lock_period_seconds)?)
    }

    /// Outcome the proposal's current tally would produce
    pub async fn preview_outcome(&self, proposal: &Pubkey) -> SdkResult<TallyOutcome> {
        let record = self.proposal(proposal).await?.value;
        Ok(outcome_of(&record))
    }

    // ========================================================================
    // Writes
    // ========================================================================

    pub async fn stake(&self, amount: u64, lock_period_seconds: i64) -> SdkResult<Signature> {
        let staker = self.base.authority()?;
        let ix = self.ixs.stake_tokens(
            staker,
            StakeTokensParams {
                amount,
                lock_period_seconds,
            },
        )?;
        let signature = self.base.submit("stake_tokens", vec![ix]).await?;
        self.base.cache().invalidate(&keys::stake_position(&staker));
        Ok(signature)
    }

    /// Withdraw the caller's stake; refused locally while still locked
    pub async fn unstake(&self) -> SdkResult<Signature> {
        let staker = self.base.authority()?;
        let ix = self.ixs.unstake_tokens(staker)?;

        let position = self.stake_position(&staker).await?.value;
        let now = self.base.now();
        if !position.is_unlocked(now) {
            return Err(PulseError::TokensLocked {
                unlocks_at: position.unlocks_at,
                now,
            }
            .into());
        }

        let signature = self.base.submit("unstake_tokens", vec![ix]).await?;
        self.base.cache().invalidate(&keys::stake_position(&staker));
        Ok(signature)
    }

    /// Open a proposal; returns its address with the signature
    pub async fn create_proposal(
        &self,
        title: &str,
        description: &str,
    ) -> SdkResult<(Pubkey, Signature)> {
        let proposer = self.base.authority()?;
        let ix = self.ixs.create_proposal(
            proposer,
            CreateProposalParams {
                title: title.to_string(),
                description: description.to_string(),
            },
        )?;

        let required = self.base.platform_config().await?.value.min_proposal_power;
        let have = self.stake_position(&proposer).await?.value.voting_power;
        if have < required {
            return Err(PulseError::InsufficientVotingPower { have, required }.into());
        }

        let signature = self.base.submit("create_proposal", vec![ix]).await?;
        Ok((self.pda.proposal(&proposer, title)?.address, signature))
    }

    pub async fn cast_vote(&self, proposal: Pubkey, choice: VoteChoice) -> SdkResult<Signature> {
        let voter = self.base.authority()?;
        let ix = self.ixs.cast_vote(voter, proposal, choice)?;

        let record = self.proposal(&proposal).await?.value;
        if record.status != ProposalStatus::Active || self.base.now() >= record.voting_ends_at {
            return Err(PulseError::VotingClosed {
                proposal,
                ended_at: record.voting_ends_at,
            }
            .into());
        }

        let signature = self.base.submit("cast_vote", vec![ix]).await?;
        self.base.cache().invalidate(&keys::proposal(&proposal));
        Ok(signature)
    }

    /// Execute a passed proposal. An ended but unfinalized proposal is
    /// judged by its tally.
    pub async fn execute(&self, proposal: Pubkey) -> SdkResult<Signature> {
        let executor = self.base.authority()?;
        let ix = self.ixs.execute_proposal(executor, proposal)?;

        // skip the cache so an execution by someone else is seen
        let record = self.base.fetch_account::<Proposal>(&proposal).await?;
        let status = match record.status {
            ProposalStatus::Active if self.base.now() < record.voting_ends_at => {
                return Err(PulseError::VotingStillOpen {
                    proposal,
                    ends_at: record.voting_ends_at,
                }
                .into());
            }
            ProposalStatus::Active if outcome_of(&record).is_passed() => ProposalStatus::Passed,
            ProposalStatus::Active => ProposalStatus::Rejected,
            status => status,
        };
        match status {
            ProposalStatus::Passed => {}
            ProposalStatus::Executed => return Err(PulseError::AlreadyExecuted { proposal }.into()),
            status => return Err(PulseError::ProposalNotPassed { proposal, status }.into()),
        }

        let signature = self.base.submit("execute_proposal", vec![ix]).await?;
        self.base.cache().invalidate(&keys::proposal(&proposal));
        Ok(signature)
    }
}

fn outcome_of(proposal: &Proposal) -> TallyOutcome {
    tally_outcome(
        proposal.votes_for,
        proposal.votes_against,
        proposal.votes_abstain,
        proposal.quorum_required,
    )
}

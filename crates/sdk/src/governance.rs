//! Governance staking model
//!
//! Mirrors the program's stake / proposal / vote lifecycle in memory so that
//! callers can preview eligibility and outcomes. Quorum, voting period and
//! the proposal threshold are taken from the platform config.

use std::collections::HashMap;
use std::sync::Arc;

use pulse_math::{tally_outcome, voting_power, TallyOutcome};
use pulse_types::{
    validate_amount, validate_text, PlatformConfig, Proposal, ProposalStatus, PulseError,
    PulseResult, StakePosition, VoteChoice, VoteRecord, MAX_PROPOSAL_DESCRIPTION_LEN,
    MAX_PROPOSAL_TITLE_LEN,
};
use solana_sdk::pubkey::Pubkey;
use tracing::debug;

use crate::pda::PdaBuilder;

/// Governance parameters read from `PlatformConfig`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GovernanceParams {
    pub min_proposal_power: u64,
    pub quorum_votes: u64,
    pub voting_period_seconds: i64,
}

impl From<&PlatformConfig> for GovernanceParams {
    fn from(config: &PlatformConfig) -> Self {
        Self {
            min_proposal_power: config.min_proposal_power,
            quorum_votes: config.quorum_votes,
            voting_period_seconds: config.voting_period_seconds,
        }
    }
}

pub struct GovernanceStaking {
    pda: Arc<PdaBuilder>,
    params: GovernanceParams,
    stakes: HashMap<Pubkey, StakePosition>,
    proposals: HashMap<Pubkey, Proposal>,
    votes: HashMap<Pubkey, VoteRecord>,
}

impl GovernanceStaking {
    pub fn new(pda: Arc<PdaBuilder>, config: &PlatformConfig) -> Self {
        Self {
            pda,
            params: GovernanceParams::from(config),
            stakes: HashMap::new(),
            proposals: HashMap::new(),
            votes: HashMap::new(),
        }
    }

    pub fn params(&self) -> GovernanceParams {
        self.params
    }

    /// Stake position keyed by staker wallet
    pub fn stake_position(&self, staker: &Pubkey) -> Option<&StakePosition> {
        self.stakes.get(staker)
    }

    pub fn proposal(&self, proposal: &Pubkey) -> Option<&Proposal> {
        self.proposals.get(proposal)
    }

    pub fn vote(&self, proposal: &Pubkey, voter: &Pubkey) -> PulseResult<Option<&VoteRecord>> {
        let address = self.pda.vote(proposal, voter)?.address;
        Ok(self.votes.get(&address))
    }

    pub fn insert_stake(&mut self, position: StakePosition) {
        self.stakes.insert(position.staker, position);
    }

    pub fn insert_proposal(&mut self, address: Pubkey, proposal: Proposal) {
        self.proposals.insert(address, proposal);
    }

    // ========================================================================
    // Staking
    // ========================================================================

    pub fn stake(
        &mut self,
        staker: Pubkey,
        amount: u64,
        lock_period_seconds: i64,
        now: i64,
    ) -> PulseResult<StakePosition> {
        validate_amount("amount", amount, 1, u64::MAX)?;
        let power = voting_power(amount, lock_period_seconds)?;
        if self.stakes.contains_key(&staker) {
            return Err(PulseError::StakeAlreadyExists { staker });
        }
        let unlocks_at = now.checked_add(lock_period_seconds).ok_or_else(|| {
            PulseError::math_overflow(
                "stake unlock time",
                &[&now.to_string(), &lock_period_seconds.to_string()],
            )
        })?;

        let position = StakePosition {
            staker,
            amount,
            lock_period_seconds,
            staked_at: now,
            unlocks_at,
            voting_power: power,
            bump: 0,
        };
        self.stakes.insert(staker, position.clone());
        debug!("{} staked {} for {}s, power {}", staker, amount, lock_period_seconds, power);

        Ok(position)
    }

    /// Withdraw the whole position once its lock has elapsed
    pub fn unstake(&mut self, staker: &Pubkey, now: i64) -> PulseResult<StakePosition> {
        let position = self
            .stakes
            .get(staker)
            .ok_or(PulseError::StakeNotFound { staker: *staker })?;
        if !position.is_unlocked(now) {
            return Err(PulseError::TokensLocked {
                unlocks_at: position.unlocks_at,
                now,
            });
        }

        self.stakes
            .remove(staker)
            .ok_or(PulseError::StakeNotFound { staker: *staker })
    }

    // ========================================================================
    // Proposals
    // ========================================================================

    pub fn create_proposal(
        &mut self,
        proposer: Pubkey,
        title: &str,
        description: &str,
        now: i64,
    ) -> PulseResult<Pubkey> {
        validate_text("title", title, MAX_PROPOSAL_TITLE_LEN)?;
        validate_text("description", description, MAX_PROPOSAL_DESCRIPTION_LEN)?;

        let have = self
            .stakes
            .get(&proposer)
            .map(|position| position.voting_power)
            .unwrap_or(0);
        if have < self.params.min_proposal_power {
            return Err(PulseError::InsufficientVotingPower {
                have,
                required: self.params.min_proposal_power,
            });
        }

        let address = self.pda.proposal(&proposer, title)?.address;
        if self.proposals.contains_key(&address) {
            return Err(PulseError::ProposalAlreadyExists { proposal: address });
        }
        let voting_ends_at = now
            .checked_add(self.params.voting_period_seconds)
            .ok_or_else(|| PulseError::math_overflow("voting end", &[&now.to_string()]))?;

        self.proposals.insert(
            address,
            Proposal {
                proposer,
                votes_for: 0,
                votes_against: 0,
                votes_abstain: 0,
                quorum_required: self.params.quorum_votes,
                created_at: now,
                voting_ends_at,
                status: ProposalStatus::Active,
                executed_at: None,
                bump: 0,
                title: title.to_string(),
                description: description.to_string(),
            },
        );

        Ok(address)
    }

    /// Record a vote weighted by the voter's staked power
    pub fn cast_vote(
        &mut self,
        proposal: &Pubkey,
        voter: Pubkey,
        choice: VoteChoice,
        now: i64,
    ) -> PulseResult<VoteRecord> {
        let weight = match self.stakes.get(&voter) {
            Some(position) if position.voting_power > 0 => position.voting_power,
            _ => return Err(PulseError::NoVotingPower { voter }),
        };

        let record = self.existing_proposal(proposal)?;
        if record.status != ProposalStatus::Active || now >= record.voting_ends_at {
            return Err(PulseError::VotingClosed {
                proposal: *proposal,
                ended_at: record.voting_ends_at,
            });
        }

        let vote_address = self.pda.vote(proposal, &voter)?.address;
        if self.votes.contains_key(&vote_address) {
            return Err(PulseError::AlreadyVoted {
                proposal: *proposal,
                voter,
            });
        }

        let (tally, label) = match choice {
            VoteChoice::For => (record.votes_for, "votes_for"),
            VoteChoice::Against => (record.votes_against, "votes_against"),
            VoteChoice::Abstain => (record.votes_abstain, "votes_abstain"),
        };
        let updated = tally
            .checked_add(weight)
            .ok_or_else(|| PulseError::math_overflow(label, &[&tally.to_string(), &weight.to_string()]))?;

        if let Some(record) = self.proposals.get_mut(proposal) {
            match choice {
                VoteChoice::For => record.votes_for = updated,
                VoteChoice::Against => record.votes_against = updated,
                VoteChoice::Abstain => record.votes_abstain = updated,
            }
        }

        let vote = VoteRecord {
            proposal: *proposal,
            voter,
            choice,
            weight,
            cast_at: now,
            bump: 0,
        };
        self.votes.insert(vote_address, vote.clone());

        Ok(vote)
    }

    /// Outcome the current tally would produce, without changing anything
    pub fn preview_outcome(&self, proposal: &Pubkey) -> PulseResult<TallyOutcome> {
        let record = self.existing_proposal(proposal)?;
        Ok(outcome_of(record))
    }

    /// Close voting and settle `Passed` / `Rejected`.
    ///
    /// Already finalized proposals report their status unchanged.
    pub fn finalize(&mut self, proposal: &Pubkey, now: i64) -> PulseResult<ProposalStatus> {
        let record = self.existing_proposal(proposal)?;
        if record.status != ProposalStatus::Active {
            return Ok(record.status);
        }
        if now < record.voting_ends_at {
            return Err(PulseError::VotingStillOpen {
                proposal: *proposal,
                ends_at: record.voting_ends_at,
            });
        }

        let status = match outcome_of(record) {
            TallyOutcome::Passed => ProposalStatus::Passed,
            TallyOutcome::Rejected(_) => ProposalStatus::Rejected,
        };
        if let Some(record) = self.proposals.get_mut(proposal) {
            record.status = status;
        }
        debug!("Proposal {} finalized as {:?}", proposal, status);

        Ok(status)
    }

    /// `Passed -> Executed`, exactly once
    pub fn execute(&mut self, proposal: &Pubkey, now: i64) -> PulseResult<&Proposal> {
        let record = self
            .proposals
            .get_mut(proposal)
            .ok_or(PulseError::ProposalNotFound { proposal: *proposal })?;

        match record.status {
            ProposalStatus::Executed => Err(PulseError::AlreadyExecuted {
                proposal: *proposal,
            }),
            ProposalStatus::Passed => {
                record.status = ProposalStatus::Executed;
                record.executed_at = Some(now);
                Ok(&*record)
            }
            status => Err(PulseError::ProposalNotPassed {
                proposal: *proposal,
                status,
            }),
        }
    }

    fn existing_proposal(&self, proposal: &Pubkey) -> PulseResult<&Proposal> {
        self.proposals
            .get(proposal)
            .ok_or(PulseError::ProposalNotFound { proposal: *proposal })
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

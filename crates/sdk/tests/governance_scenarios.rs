//! End-to-end scenarios over the in-memory state machines.

use std::sync::Arc;

use pulse_sdk::{
    governance::GovernanceStaking,
    marketplace::{EscrowMarketplace, Settlement},
    quote, voting_power, CreatorPool, ListingStatus, PdaBuilder, PlatformConfig, ProposalStatus,
    PulseError, Side, VoteChoice, DEFAULT_PLATFORM_FEE_BPS, DEFAULT_VOTING_PERIOD_SECONDS,
    LAMPORTS_PER_TOKEN, MAX_TRANSFER_LAMPORTS, MIN_PROPOSAL_POWER, PRICE_SCALE, SECONDS_PER_DAY,
};
use solana_sdk::pubkey::Pubkey;

const NOW: i64 = 1_700_000_000;

fn config(quorum_votes: u64) -> PlatformConfig {
    PlatformConfig {
        authority: Pubkey::new_unique(),
        platform_fee_bps: DEFAULT_PLATFORM_FEE_BPS,
        price_scale: PRICE_SCALE,
        min_proposal_power: MIN_PROPOSAL_POWER,
        quorum_votes,
        voting_period_seconds: DEFAULT_VOTING_PERIOD_SECONDS,
        paused: false,
        bump: 255,
    }
}

#[test]
fn test_thirty_day_lock_scales_power() {
    assert_eq!(voting_power(100, 30 * SECONDS_PER_DAY).unwrap(), 120);

    let pda = Arc::new(PdaBuilder::new(Pubkey::new_unique()));
    let mut governance = GovernanceStaking::new(pda, &config(1));
    let staker = Pubkey::new_unique();
    let position = governance
        .stake(staker, 100, 30 * SECONDS_PER_DAY, NOW)
        .unwrap();
    assert_eq!(position.voting_power, 120);
    assert_eq!(position.unlocks_at, NOW + 30 * SECONDS_PER_DAY);
}

#[test]
fn test_proposal_lifecycle_executes_once() {
    let pda = Arc::new(PdaBuilder::new(Pubkey::new_unique()));
    let mut governance = GovernanceStaking::new(pda, &config(1_000 * LAMPORTS_PER_TOKEN));
    let alice = Pubkey::new_unique();
    let bob = Pubkey::new_unique();

    governance
        .stake(alice, 1_000 * LAMPORTS_PER_TOKEN, 30 * SECONDS_PER_DAY, NOW)
        .unwrap();
    governance
        .stake(bob, 50 * LAMPORTS_PER_TOKEN, 0, NOW)
        .unwrap();

    let err = governance
        .create_proposal(bob, "Raise fees", "Double the platform fee", NOW)
        .unwrap_err();
    assert!(matches!(err, PulseError::InsufficientVotingPower { .. }));

    let proposal = governance
        .create_proposal(alice, "Lower fees", "Halve the platform fee", NOW)
        .unwrap();
    governance
        .cast_vote(&proposal, alice, VoteChoice::For, NOW + 10)
        .unwrap();
    governance
        .cast_vote(&proposal, bob, VoteChoice::Against, NOW + 20)
        .unwrap();
    assert_eq!(
        governance
            .cast_vote(&proposal, bob, VoteChoice::For, NOW + 30)
            .unwrap_err(),
        PulseError::AlreadyVoted {
            proposal,
            voter: bob
        }
    );

    let ends_at = NOW + DEFAULT_VOTING_PERIOD_SECONDS;
    assert!(matches!(
        governance.finalize(&proposal, ends_at - 1),
        Err(PulseError::VotingStillOpen { .. })
    ));
    assert_eq!(
        governance.finalize(&proposal, ends_at).unwrap(),
        ProposalStatus::Passed
    );

    let executed = governance.execute(&proposal, ends_at + 5).unwrap();
    assert_eq!(executed.status, ProposalStatus::Executed);
    assert_eq!(executed.executed_at, Some(ends_at + 5));

    assert_eq!(
        governance.execute(&proposal, ends_at + 6).unwrap_err(),
        PulseError::AlreadyExecuted { proposal }
    );
    assert_eq!(
        governance.finalize(&proposal, ends_at + 7).unwrap(),
        ProposalStatus::Executed
    );
    assert_eq!(
        governance.proposal(&proposal).unwrap().executed_at,
        Some(ends_at + 5)
    );
}

#[test]
fn test_offer_on_sold_listing_refunds_in_full() {
    let pda = Arc::new(PdaBuilder::new(Pubkey::new_unique()));
    let mut market = EscrowMarketplace::new(pda.clone(), MAX_TRANSFER_LAMPORTS);
    let seller = Pubkey::new_unique();
    let winner = Pubkey::new_unique();
    let loser = Pubkey::new_unique();
    let nft = Pubkey::new_unique();
    let listing = pda.listing(&nft).unwrap().address;

    market
        .list(seller, nft, 5 * LAMPORTS_PER_TOKEN, "short", NOW, None)
        .unwrap();
    market
        .make_offer(&listing, winner, 6 * LAMPORTS_PER_TOKEN, NOW, NOW + SECONDS_PER_DAY)
        .unwrap();
    market
        .make_offer(&listing, loser, 4 * LAMPORTS_PER_TOKEN, NOW, NOW + SECONDS_PER_DAY)
        .unwrap();

    let winning_offer = pda.offer(&listing, &winner).unwrap().address;
    let losing_offer = pda.offer(&listing, &loser).unwrap().address;
    let sold = market
        .accept_offer(&listing, &winning_offer, &seller, DEFAULT_PLATFORM_FEE_BPS, NOW + 1)
        .unwrap();
    match sold {
        Settlement::Sold { orphaned, .. } => assert_eq!(orphaned, vec![losing_offer]),
        other => panic!("unexpected settlement {:?}", other),
    }
    assert_eq!(market.listing(&listing).unwrap().status, ListingStatus::Sold);
    assert_eq!(market.orphaned_offers(&listing), vec![losing_offer]);

    assert_eq!(
        market.cancel_offer(&losing_offer, &loser).unwrap(),
        Settlement::Refunded {
            offer: losing_offer,
            buyer: loser,
            amount: 4 * LAMPORTS_PER_TOKEN,
        }
    );
    assert_eq!(market.escrow_total(), 0);
}

#[test]
fn test_concrete_share_prices() {
    let creator = Pubkey::new_unique();
    let fresh = CreatorPool::new(creator, 1_000);
    assert_eq!(quote(&fresh, 1, Side::Buy).unwrap(), 1_000);

    let grown = CreatorPool {
        supply: 250,
        ..CreatorPool::new(creator, 1_000)
    };
    assert_eq!(quote(&grown, 1, Side::Buy).unwrap(), 4_000);
}

#[test]
fn test_addresses_are_deterministic() {
    let program = Pubkey::new_unique();
    let owner = Pubkey::new_unique();

    let first = PdaBuilder::new(program);
    let second = PdaBuilder::new(program);
    assert_eq!(
        first.user_profile(&owner).unwrap(),
        second.user_profile(&owner).unwrap()
    );
    assert_eq!(
        first.username_nft("alice").unwrap(),
        second.username_nft("alice").unwrap()
    );

    let elsewhere = PdaBuilder::new(Pubkey::new_unique());
    assert_ne!(
        first.user_profile(&owner).unwrap().address,
        elsewhere.user_profile(&owner).unwrap().address
    );
}

/// Governance voting power and proposal tallies.
///
/// Longer locks earn a higher multiplier; the multiplier is a step function
/// over whole days and never exceeds `MAX_LOCK_MULTIPLIER_BPS`.
use pulse_types::{
    PulseError, PulseResult, BASE_LOCK_MULTIPLIER_BPS, BPS_DENOMINATOR, LOCK_MULTIPLIER_TIERS,
    SECONDS_PER_DAY,
};
use serde::{Deserialize, Serialize};

use crate::safe::mul_div_u64;

// ============================================================================
// Voting Power
// ============================================================================

/// Multiplier in basis points for a lock of `lock_seconds`
pub fn lock_multiplier_bps(lock_seconds: i64) -> u64 {
    let days = lock_seconds.max(0) / SECONDS_PER_DAY;
    LOCK_MULTIPLIER_TIERS
        .iter()
        .find(|(min_days, _)| days >= *min_days)
        .map(|(_, bps)| *bps)
        .unwrap_or(BASE_LOCK_MULTIPLIER_BPS)
}

/// `amount * multiplier / 10_000`, rounding down
pub fn voting_power(amount: u64, lock_seconds: i64) -> PulseResult<u64> {
    if lock_seconds < 0 {
        return Err(PulseError::invalid_parameter(
            "lock_period_seconds",
            &lock_seconds.to_string(),
            "non-negative",
        ));
    }
    mul_div_u64(amount, lock_multiplier_bps(lock_seconds), BPS_DENOMINATOR)
}

// ============================================================================
// Tally
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectionReason {
    QuorumNotReached,
    MajorityNotInFavor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TallyOutcome {
    Passed,
    Rejected(RejectionReason),
}

impl TallyOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, TallyOutcome::Passed)
    }
}

/// Abstentions count toward quorum but not toward the majority
pub fn tally_outcome(
    votes_for: u64,
    votes_against: u64,
    votes_abstain: u64,
    quorum: u64,
) -> TallyOutcome {
    let total = votes_for
        .saturating_add(votes_against)
        .saturating_add(votes_abstain);

    if total < quorum {
        TallyOutcome::Rejected(RejectionReason::QuorumNotReached)
    } else if votes_for <= votes_against {
        TallyOutcome::Rejected(RejectionReason::MajorityNotInFavor)
    } else {
        TallyOutcome::Passed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = SECONDS_PER_DAY;

    #[test]
    fn test_multiplier_tiers() {
        assert_eq!(lock_multiplier_bps(0), 10_000);
        assert_eq!(lock_multiplier_bps(29 * DAY), 10_000);
        assert_eq!(lock_multiplier_bps(30 * DAY), 12_000);
        assert_eq!(lock_multiplier_bps(90 * DAY), 15_000);
        assert_eq!(lock_multiplier_bps(180 * DAY), 20_000);
        assert_eq!(lock_multiplier_bps(365 * DAY), 30_000);
        assert_eq!(lock_multiplier_bps(10 * 365 * DAY), 30_000);
    }

    #[test]
    fn test_partial_day_does_not_reach_tier() {
        assert_eq!(lock_multiplier_bps(30 * DAY - 1), 10_000);
    }

    #[test]
    fn test_voting_power() {
        assert_eq!(voting_power(100, 30 * DAY).unwrap(), 120);
        assert_eq!(voting_power(100, 365 * DAY).unwrap(), 300);
        assert_eq!(voting_power(100, 0).unwrap(), 100);
        assert!(voting_power(100, -1).is_err());
    }

    #[test]
    fn test_voting_power_large_amount() {
        // the intermediate product is wider than u64; the result must still fit
        assert!(voting_power(u64::MAX, 365 * DAY).is_err());
        assert_eq!(
            voting_power(u64::MAX / 3, 365 * DAY).unwrap(),
            (u64::MAX / 3) * 3
        );
    }

    #[test]
    fn test_tally() {
        assert_eq!(tally_outcome(60, 40, 0, 100), TallyOutcome::Passed);
        assert_eq!(
            tally_outcome(60, 30, 0, 100),
            TallyOutcome::Rejected(RejectionReason::QuorumNotReached)
        );
        assert_eq!(
            tally_outcome(50, 50, 10, 100),
            TallyOutcome::Rejected(RejectionReason::MajorityNotInFavor)
        );
        // abstentions help reach quorum
        assert_eq!(tally_outcome(10, 5, 85, 100), TallyOutcome::Passed);
    }
}

/// Property-based tests for share pricing, fees and voting power.
use proptest::prelude::*;
use pulse_math::*;
use pulse_types::{CreatorPool, PulseError, MAX_PLATFORM_FEE_BPS, SECONDS_PER_DAY};
use solana_program::pubkey::Pubkey;

// ============================================================================
// Test Strategies
// ============================================================================

/// Base prices from 1 lamport to 0.01 tokens
fn base_price() -> impl Strategy<Value = u64> {
    1u64..10_000_000
}

/// Supplies spanning several price buckets
fn supply() -> impl Strategy<Value = u64> {
    0u64..5_000
}

fn trade_amount() -> impl Strategy<Value = u64> {
    0u64..800
}

fn lock_seconds() -> impl Strategy<Value = i64> {
    0i64..(4 * 365 * SECONDS_PER_DAY)
}

fn pool(supply: u64, base_price: u64) -> CreatorPool {
    CreatorPool {
        supply,
        ..CreatorPool::new(Pubkey::new_unique(), base_price)
    }
}

/// Per-share reference sum
fn per_share_sum(pool: &CreatorPool, amount: u64, side: Side) -> Result<u64, PulseError> {
    let mut total = 0u64;
    for i in 0..amount {
        let s = match side {
            Side::Buy => pool.supply + i,
            Side::Sell => pool.supply - i,
        };
        total = safe_add_u64(total, unit_price(pool.base_price_lamports, s)?)?;
    }
    Ok(total)
}

// ============================================================================
// Pricing Properties
// ============================================================================

proptest! {
    /// Unit price never decreases as supply grows
    #[test]
    fn prop_unit_price_monotonic(base in base_price(), s in supply(), delta in 0u64..1_000) {
        let lower = unit_price(base, s).unwrap();
        let higher = unit_price(base, s + delta).unwrap();
        prop_assert!(higher >= lower);
        prop_assert!(lower >= base);
    }

    /// Buying the same amount later on the curve never costs less
    #[test]
    fn prop_buy_cost_monotonic_in_supply(
        base in base_price(),
        s in supply(),
        delta in 0u64..1_000,
        amount in trade_amount(),
    ) {
        let earlier = quote(&pool(s, base), amount, Side::Buy).unwrap();
        let later = quote(&pool(s + delta, base), amount, Side::Buy).unwrap();
        prop_assert!(later >= earlier);
    }

    /// The bucketed evaluation is exactly the per-share sum
    #[test]
    fn prop_bucketed_buy_matches_per_share(
        base in base_price(),
        s in supply(),
        amount in trade_amount(),
    ) {
        let p = pool(s, base);
        prop_assert_eq!(
            quote(&p, amount, Side::Buy).unwrap(),
            per_share_sum(&p, amount, Side::Buy).unwrap()
        );
    }

    #[test]
    fn prop_bucketed_sell_matches_per_share(
        base in base_price(),
        s in supply(),
        amount in trade_amount(),
    ) {
        let p = pool(s, base);
        if amount <= s {
            prop_assert_eq!(
                quote(&p, amount, Side::Sell).unwrap(),
                per_share_sum(&p, amount, Side::Sell).unwrap()
            );
        } else {
            let is_insufficient = matches!(
                quote(&p, amount, Side::Sell),
                Err(PulseError::InsufficientSupply { .. })
            );
            prop_assert!(is_insufficient);
        }
    }

    /// Selling right after a buy prices the supplies one share higher, so the
    /// round trip differs by exactly the spread between the two end prices
    #[test]
    fn prop_buy_then_sell_never_profits(
        base in base_price(),
        s in supply(),
        amount in 1u64..800,
    ) {
        let before = pool(s, base);
        let cost = quote(&before, amount, Side::Buy).unwrap();
        let after = pool(s + amount, base);
        let proceeds = quote(&after, amount, Side::Sell).unwrap();
        // sell prices supplies s+1..=s+amount, buy prices s..s+amount
        prop_assert!(proceeds >= cost);
        let gap = unit_price(base, s + amount).unwrap() - unit_price(base, s).unwrap();
        prop_assert_eq!(proceeds - cost, gap);
    }

    /// The largest affordable buy fits the budget and one more share does not
    #[test]
    fn prop_max_shares_for_budget_is_tight(
        base in base_price(),
        s in supply(),
        budget in 0u64..1_000_000_000,
        fee_bps in 0u16..=MAX_PLATFORM_FEE_BPS,
    ) {
        let p = pool(s, base);
        let n = max_shares_for_budget(&p, budget, fee_bps).unwrap();
        prop_assert!(quote_trade(&p, n, Side::Buy, fee_bps).unwrap().total <= budget);
        prop_assert!(quote_trade(&p, n + 1, Side::Buy, fee_bps).unwrap().total > budget);
    }
}

// ============================================================================
// Fee and Voting Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_fee_split_conserves_amount(amount in any::<u64>(), fee_bps in 0u16..=MAX_PLATFORM_FEE_BPS) {
        let split = split_fee(amount, fee_bps).unwrap();
        prop_assert_eq!(split.net as u128 + split.fee as u128, amount as u128);
        prop_assert!(split.fee <= split.net);
    }

    /// Voting power lies between the staked amount and three times it
    #[test]
    fn prop_voting_power_bounded(amount in 0u64..(u64::MAX / 3), lock in lock_seconds()) {
        let power = voting_power(amount, lock).unwrap();
        prop_assert!(power >= amount);
        prop_assert!(power <= amount * 3);
    }

    /// Locking longer never lowers voting power
    #[test]
    fn prop_voting_power_monotonic_in_lock(
        amount in 0u64..1_000_000_000_000,
        lock in lock_seconds(),
        extra in 0i64..(365 * SECONDS_PER_DAY),
    ) {
        prop_assert!(voting_power(amount, lock + extra).unwrap() >= voting_power(amount, lock).unwrap());
    }
}

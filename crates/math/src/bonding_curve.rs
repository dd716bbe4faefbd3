/// Creator-share bonding curve.
///
/// Mirrors the program's pricing: the `i`-th share of a trade is priced at
/// supply `s = supply ± i` as `max(base, base * (s / PRICE_SCALE)^2)`. All
/// arithmetic stays in u64 and overflow surfaces as `PriceOverflow`.
use pulse_types::{CreatorPool, PulseError, PulseResult, PRICE_SCALE};
use serde::{Deserialize, Serialize};

use crate::safe::apply_bps;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

// ============================================================================
// Unit Price
// ============================================================================

/// Price of one share at the given circulating supply
pub fn unit_price(base_price: u64, supply: u64) -> PulseResult<u64> {
    let scaled = supply / PRICE_SCALE;
    let squared = scaled
        .checked_mul(scaled)
        .ok_or_else(|| PulseError::price_overflow("scaled supply squared", supply))?;
    let curve_price = base_price
        .checked_mul(squared)
        .ok_or_else(|| PulseError::price_overflow("base price * scaled^2", supply))?;
    Ok(curve_price.max(base_price))
}

/// Price of the next share bought from the pool
pub fn spot_price(pool: &CreatorPool) -> PulseResult<u64> {
    unit_price(pool.base_price_lamports, pool.supply)
}

// ============================================================================
// Quotes
// ============================================================================

/// Total cost in lamports of buying or selling `amount` shares.
///
/// Supplies sharing one `s / PRICE_SCALE` value share one unit price, so the
/// sum is taken bucket by bucket; the result equals the per-share sum
/// exactly.
pub fn quote(pool: &CreatorPool, amount: u64, side: Side) -> PulseResult<u64> {
    if pool.base_price_lamports == 0 {
        return Err(PulseError::invalid_parameter(
            "base_price_lamports",
            "0",
            "greater than 0",
        ));
    }
    if amount == 0 {
        return Ok(0);
    }

    let base = pool.base_price_lamports;
    let mut supply = pool.supply;
    let mut remaining = amount;
    let mut total: u64 = 0;

    if side == Side::Sell && amount > pool.supply {
        return Err(PulseError::InsufficientSupply {
            requested: amount,
            available: pool.supply,
        });
    }

    while remaining > 0 {
        let in_bucket = match side {
            Side::Buy => PRICE_SCALE - supply % PRICE_SCALE,
            Side::Sell => supply % PRICE_SCALE + 1,
        };
        let steps = remaining.min(in_bucket);

        let price = unit_price(base, supply)?;
        let bucket_cost = price
            .checked_mul(steps)
            .ok_or_else(|| PulseError::price_overflow("bucket cost", supply))?;
        total = total
            .checked_add(bucket_cost)
            .ok_or_else(|| PulseError::price_overflow("running total", supply))?;

        remaining -= steps;
        if remaining == 0 {
            break;
        }
        supply = match side {
            Side::Buy => supply
                .checked_add(steps)
                .ok_or_else(|| PulseError::price_overflow("supply after buy", supply))?,
            // amount <= pool.supply keeps this in range
            Side::Sell => supply - steps,
        };
    }

    Ok(total)
}

/// Cost of a trade together with the platform fee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeQuote {
    pub side: Side,
    pub amount: u64,
    /// Curve cost before fees
    pub cost: u64,
    pub platform_fee: u64,
    /// Paid by the buyer (cost + fee) or received by the seller (cost - fee)
    pub total: u64,
}

pub fn quote_trade(
    pool: &CreatorPool,
    amount: u64,
    side: Side,
    fee_bps: u16,
) -> PulseResult<TradeQuote> {
    let cost = quote(pool, amount, side)?;
    let platform_fee = apply_bps(cost, fee_bps as u64)?;
    let total = match side {
        Side::Buy => cost
            .checked_add(platform_fee)
            .ok_or_else(|| PulseError::price_overflow("cost + fee", pool.supply))?,
        Side::Sell => cost.checked_sub(platform_fee).ok_or_else(|| {
            PulseError::math_underflow("cost - fee", &[&cost.to_string(), &platform_fee.to_string()])
        })?,
    };

    Ok(TradeQuote {
        side,
        amount,
        cost,
        platform_fee,
        total,
    })
}

/// Largest number of shares whose buy total (fee included) fits `budget`
pub fn max_shares_for_budget(pool: &CreatorPool, budget: u64, fee_bps: u16) -> PulseResult<u64> {
    if pool.base_price_lamports == 0 {
        return Err(PulseError::invalid_parameter(
            "base_price_lamports",
            "0",
            "greater than 0",
        ));
    }

    let fits = |amount: u64| -> bool {
        quote_trade(pool, amount, Side::Buy, fee_bps)
            .map(|q| q.total <= budget)
            .unwrap_or(false)
    };

    // Grow an upper bound, then binary search inside it
    let mut low = 0u64;
    let mut high = 1u64;
    while fits(high) {
        low = high;
        high = match high.checked_mul(2) {
            Some(next) => next,
            None => return Ok(low),
        };
    }

    while high - low > 1 {
        let mid = low + (high - low) / 2;
        if fits(mid) {
            low = mid;
        } else {
            high = mid;
        }
    }

    Ok(low)
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_program::pubkey::Pubkey;

    fn pool(supply: u64, base_price: u64) -> CreatorPool {
        CreatorPool {
            supply,
            ..CreatorPool::new(Pubkey::new_unique(), base_price)
        }
    }

    /// Straight per-share iteration
    fn quote_per_share(pool: &CreatorPool, amount: u64, side: Side) -> PulseResult<u64> {
        let mut total = 0u64;
        for i in 0..amount {
            let s = match side {
                Side::Buy => pool.supply + i,
                Side::Sell => pool.supply - i,
            };
            total = total
                .checked_add(unit_price(pool.base_price_lamports, s)?)
                .ok_or_else(|| PulseError::price_overflow("total", s))?;
        }
        Ok(total)
    }

    #[test]
    fn test_first_share_costs_base_price() {
        assert_eq!(quote(&pool(0, 1000), 1, Side::Buy).unwrap(), 1000);
    }

    #[test]
    fn test_scaled_supply_price() {
        // scaled = 250 / 100 = 2, multiplier 4
        assert_eq!(quote(&pool(250, 1000), 1, Side::Buy).unwrap(), 4000);
    }

    #[test]
    fn test_zero_base_price_is_rejected() {
        let err = quote(&pool(0, 0), u64::MAX, Side::Buy).unwrap_err();
        assert!(matches!(err, PulseError::InvalidParameter { .. }));
        assert!(quote_trade(&pool(10, 0), 1, Side::Sell, 250).is_err());
    }

    #[test]
    fn test_zero_amount_is_free() {
        assert_eq!(quote(&pool(500, 1000), 0, Side::Buy).unwrap(), 0);
        assert_eq!(quote(&pool(0, 1000), 0, Side::Sell).unwrap(), 0);
    }

    #[test]
    fn test_bucketed_sum_matches_per_share_sum() {
        for &(supply, amount) in &[(0, 250), (99, 2), (150, 333), (1_000, 1), (7, 1_000)] {
            let p = pool(supply, 1_000);
            assert_eq!(
                quote(&p, amount, Side::Buy).unwrap(),
                quote_per_share(&p, amount, Side::Buy).unwrap(),
                "buy supply={} amount={}",
                supply,
                amount
            );
            if amount <= supply {
                assert_eq!(
                    quote(&p, amount, Side::Sell).unwrap(),
                    quote_per_share(&p, amount, Side::Sell).unwrap(),
                    "sell supply={} amount={}",
                    supply,
                    amount
                );
            }
        }
    }

    #[test]
    fn test_crossing_bucket_boundary() {
        // 99 at 1x, 100 and 101 at 1x (scaled 1), all base price
        assert_eq!(quote(&pool(99, 10), 3, Side::Buy).unwrap(), 30);
        // 199 at scaled 1, 200 at scaled 2 -> 10 + 40
        assert_eq!(quote(&pool(199, 10), 2, Side::Buy).unwrap(), 50);
        // selling from 200 walks down: 200 (x4), 199 (x1)
        assert_eq!(quote(&pool(200, 10), 2, Side::Sell).unwrap(), 50);
    }

    #[test]
    fn test_sell_more_than_supply() {
        assert_eq!(
            quote(&pool(5, 1000), 6, Side::Sell),
            Err(PulseError::InsufficientSupply {
                requested: 6,
                available: 5
            })
        );
    }

    #[test]
    fn test_overflow_is_surfaced() {
        let huge = pool(u64::MAX - 10, 1000);
        assert!(matches!(
            quote(&huge, 1, Side::Buy),
            Err(PulseError::PriceOverflow { .. })
        ));

        let expensive = pool(100 * 1_000_000, u64::MAX / 2);
        assert!(matches!(
            quote(&expensive, 1, Side::Buy),
            Err(PulseError::PriceOverflow { .. })
        ));
    }

    #[test]
    fn test_trade_quote_fees() {
        let p = pool(0, 10_000);
        let buy = quote_trade(&p, 1, Side::Buy, 250).unwrap();
        assert_eq!(buy.cost, 10_000);
        assert_eq!(buy.platform_fee, 250);
        assert_eq!(buy.total, 10_250);

        let p = pool(1, 10_000);
        let sell = quote_trade(&p, 1, Side::Sell, 250).unwrap();
        assert_eq!(sell.total, 9_750);
    }

    #[test]
    fn test_max_shares_for_budget() {
        let p = pool(0, 1_000);
        // 99 shares at 1000 each; the 100th jumps to scaled 1 (still 1000)
        assert_eq!(max_shares_for_budget(&p, 5_500, 0).unwrap(), 5);
        assert_eq!(max_shares_for_budget(&p, 999, 0).unwrap(), 0);

        let n = max_shares_for_budget(&p, 1_000_000, 250).unwrap();
        assert!(quote_trade(&p, n, Side::Buy, 250).unwrap().total <= 1_000_000);
        assert!(quote_trade(&p, n + 1, Side::Buy, 250).unwrap().total > 1_000_000);
    }
}

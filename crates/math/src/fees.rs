/// Platform fee arithmetic
use pulse_types::{PulseError, PulseResult, MAX_PLATFORM_FEE_BPS};
use serde::{Deserialize, Serialize};

use crate::safe::{apply_bps, safe_sub_u64};

/// An amount divided between its recipient and the platform.
///
/// `net + fee` always equals the amount that was split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    pub net: u64,
    pub fee: u64,
}

/// Reject fee rates above the platform maximum
pub fn validate_fee_bps(fee_bps: u16) -> PulseResult<()> {
    if fee_bps > MAX_PLATFORM_FEE_BPS {
        return Err(PulseError::amount_out_of_bounds(
            "platform_fee_bps",
            fee_bps as u64,
            0,
            MAX_PLATFORM_FEE_BPS as u64,
        ));
    }
    Ok(())
}

/// Split `amount` into recipient proceeds and the platform fee.
///
/// The fee rounds down, so any remainder stays with the recipient.
pub fn split_fee(amount: u64, fee_bps: u16) -> PulseResult<FeeSplit> {
    validate_fee_bps(fee_bps)?;
    let fee = apply_bps(amount, fee_bps as u64)?;
    let net = safe_sub_u64(amount, fee)?;
    Ok(FeeSplit { net, fee })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_fee_split() {
        let split = split_fee(1_000_000, 250).unwrap();
        assert_eq!(split.fee, 25_000);
        assert_eq!(split.net, 975_000);
    }

    #[test]
    fn test_split_conserves_amount() {
        for amount in [0u64, 1, 39, 40, 12_345, u64::MAX] {
            let split = split_fee(amount, 1000).unwrap();
            assert_eq!(split.net + split.fee, amount);
        }
    }

    #[test]
    fn test_fee_rounds_down() {
        // 39 * 250 / 10_000 = 0.975
        assert_eq!(split_fee(39, 250).unwrap(), FeeSplit { net: 39, fee: 0 });
    }

    #[test]
    fn test_fee_above_maximum_rejected() {
        assert!(split_fee(100, MAX_PLATFORM_FEE_BPS + 1).is_err());
        assert!(validate_fee_bps(MAX_PLATFORM_FEE_BPS).is_ok());
    }
}

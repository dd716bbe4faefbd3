/// Safe arithmetic operations with overflow protection
///
/// All operations return errors instead of panicking or wrapping.
use pulse_types::{PulseError, PulseResult, BPS_DENOMINATOR};

// ============================================================================
// Safe Basic Arithmetic
// ============================================================================

/// Safe addition for u64 values
pub fn safe_add_u64(a: u64, b: u64) -> PulseResult<u64> {
    a.checked_add(b)
        .ok_or_else(|| PulseError::math_overflow("u64 addition", &[&a.to_string(), &b.to_string()]))
}

/// Safe subtraction for u64 values
pub fn safe_sub_u64(a: u64, b: u64) -> PulseResult<u64> {
    a.checked_sub(b).ok_or_else(|| {
        PulseError::math_underflow("u64 subtraction", &[&a.to_string(), &b.to_string()])
    })
}

/// Safe multiplication for u64 values
pub fn safe_mul_u64(a: u64, b: u64) -> PulseResult<u64> {
    a.checked_mul(b).ok_or_else(|| {
        PulseError::math_overflow("u64 multiplication", &[&a.to_string(), &b.to_string()])
    })
}

/// Safe division for u64 values
pub fn safe_div_u64(a: u64, b: u64) -> PulseResult<u64> {
    if b == 0 {
        return Err(PulseError::DivisionByZero {
            context: format!("u64 division: {} / {}", a, b),
        });
    }
    Ok(a / b)
}

/// `a * b / denominator` with a u128 intermediate, rounding down
pub fn mul_div_u64(a: u64, b: u64, denominator: u64) -> PulseResult<u64> {
    if denominator == 0 {
        return Err(PulseError::DivisionByZero {
            context: format!("mul_div: {} * {} / 0", a, b),
        });
    }
    let result = (a as u128) * (b as u128) / (denominator as u128);
    u64::try_from(result).map_err(|_| {
        PulseError::math_overflow(
            "mul_div",
            &[&a.to_string(), &b.to_string(), &denominator.to_string()],
        )
    })
}

// ============================================================================
// Basis Point Calculations
// ============================================================================

/// `value * bps / 10_000`, rounding down
pub fn apply_bps(value: u64, bps: u64) -> PulseResult<u64> {
    mul_div_u64(value, bps, BPS_DENOMINATOR)
}

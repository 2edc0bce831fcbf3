//! Numeric parsing for user-entered amounts.
//!
//! Two deliberately separate passes. The lenient one feeds the live totals:
//! it never errors, coercing junk and negative numbers to zero so the
//! displayed figures stay stable while the user types. The strict one backs
//! save-time validation: text that actually parses to a negative number is
//! a hard rejection there. Do not unify them.

/// Coercing parse used on the live recalculation path and when building
/// records at save time. Unparseable text and negatives both become 0.0.
pub fn lenient_amount(input: &str) -> f64 {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| *value >= 0.0)
        .unwrap_or(0.0)
}

/// Strict negativity check used only at save time. Only text that parses
/// to a number below zero counts; junk is not negative.
pub fn is_negative(input: &str) -> bool {
    input
        .trim()
        .parse::<f64>()
        .map(|value| value < 0.0)
        .unwrap_or(false)
}

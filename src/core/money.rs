use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places of the ledger's currency (cents)
pub const SCALE: u32 = 2;

/// Round a monetary value to the minor unit, half-up.
///
/// All derived amounts (fees, taxes, line totals) are rounded through this
/// single function before they are stored or added to a running sum, so that
/// repeated additions can never accumulate fractional-cent drift.
pub fn round(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert a monetary value to integer minor units (cents), rounding first.
pub fn to_minor_units(amount: Decimal) -> i64 {
    let scaled = round(amount) * Decimal::from(100);
    scaled.try_into().unwrap_or_else(|_| {
        debug_assert!(false, "monetary value out of i64 minor-unit range");
        0
    })
}

/// Convert integer minor units (cents) back to a decimal amount.
pub fn from_minor_units(cents: i64) -> Decimal {
    Decimal::new(cents, SCALE)
}

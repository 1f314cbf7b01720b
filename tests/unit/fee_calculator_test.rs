use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use payledger::config::FeeScheduleConfig;
use payledger::core::money;
use payledger::modules::payments::models::PaymentMethod;
use payledger::modules::payments::FeeCalculator;

/// Property-based tests for the fee calculator
///
/// Validates:
/// - processing_fee + platform_fee + net_amount == amount, exactly, in minor
///   units, for every amount and method
/// - fee components carry no sub-cent precision
/// - the per-method schedule (card carries the processor formula, offline
///   methods do not)

fn calculator() -> FeeCalculator {
    FeeCalculator::new(FeeScheduleConfig::default())
}

fn any_method() -> impl Strategy<Value = PaymentMethod> {
    prop::sample::select(vec![
        PaymentMethod::Card,
        PaymentMethod::Ach,
        PaymentMethod::Check,
        PaymentMethod::Cash,
    ])
}

proptest! {
    #[test]
    fn test_fee_components_recombine_exactly(
        amount_cents in 1i64..100_000_000i64,  // $0.01 to $1,000,000
        method in any_method()
    ) {
        let amount = Decimal::new(amount_cents, 2);
        let breakdown = calculator().calculate(amount, method).unwrap();

        prop_assert_eq!(
            breakdown.processing_fee + breakdown.platform_fee + breakdown.net_amount,
            amount
        );

        // Minor-unit check: the same identity must hold in integer cents
        prop_assert_eq!(
            money::to_minor_units(breakdown.processing_fee)
                + money::to_minor_units(breakdown.platform_fee)
                + money::to_minor_units(breakdown.net_amount),
            amount_cents
        );
    }

    #[test]
    fn test_fees_have_no_sub_cent_precision(
        amount_cents in 1i64..100_000_000i64,
        method in any_method()
    ) {
        let amount = Decimal::new(amount_cents, 2);
        let breakdown = calculator().calculate(amount, method).unwrap();

        prop_assert!(breakdown.processing_fee.scale() <= 2);
        prop_assert!(breakdown.platform_fee.scale() <= 2);
        prop_assert!(breakdown.net_amount.scale() <= 2);
    }

    #[test]
    fn test_fees_are_monotone_in_amount(
        amount_cents in 100i64..50_000_000i64,
        delta_cents in 1i64..1_000_000i64
    ) {
        let calc = calculator();
        let small = calc
            .calculate(Decimal::new(amount_cents, 2), PaymentMethod::Card)
            .unwrap();
        let large = calc
            .calculate(Decimal::new(amount_cents + delta_cents, 2), PaymentMethod::Card)
            .unwrap();

        prop_assert!(large.processing_fee >= small.processing_fee);
        prop_assert!(large.platform_fee >= small.platform_fee);
    }
}

#[test]
fn test_card_fee_reference_values() {
    // 2700 at the default schedule: 2700 * 0.029 = 78.30, + 0.30 = 78.60
    // processing; 2700 * 0.02 = 54.00 platform; net 2567.40
    let breakdown = calculator()
        .calculate(dec!(2700), PaymentMethod::Card)
        .unwrap();

    assert_eq!(breakdown.processing_fee, dec!(78.60));
    assert_eq!(breakdown.platform_fee, dec!(54.00));
    assert_eq!(breakdown.net_amount, dec!(2567.40));
}

#[test]
fn test_fractional_fee_rounds_half_up() {
    // 17.35 * 0.029 = 0.50315 -> 0.50; + 0.30 = 0.80
    // 17.35 * 0.02 = 0.347 -> 0.35
    let breakdown = calculator()
        .calculate(dec!(17.35), PaymentMethod::Card)
        .unwrap();

    assert_eq!(breakdown.processing_fee, dec!(0.80));
    assert_eq!(breakdown.platform_fee, dec!(0.35));
    assert_eq!(breakdown.net_amount, dec!(16.20));
}

#[test]
fn test_cash_payment_only_pays_platform_fee() {
    let breakdown = calculator()
        .calculate(dec!(1000), PaymentMethod::Cash)
        .unwrap();

    assert_eq!(breakdown.processing_fee, Decimal::ZERO);
    assert_eq!(breakdown.platform_fee, dec!(20.00));
    assert_eq!(breakdown.net_amount, dec!(980.00));
}

#[test]
fn test_non_positive_amounts_rejected() {
    assert!(calculator()
        .calculate(Decimal::ZERO, PaymentMethod::Card)
        .is_err());
    assert!(calculator()
        .calculate(dec!(-0.01), PaymentMethod::Card)
        .is_err());
}

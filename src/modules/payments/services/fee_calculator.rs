// Pure fee math. Given a gross amount and a payment method, splits it into
// the processor's cut, the platform's cut, and the merchant's net settlement.
// Each fee component is rounded half-up to the minor unit before the net is
// taken, so the three parts always recombine to the gross amount exactly.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::FeeScheduleConfig;
use crate::core::{money, AppError, Result};
use crate::modules::payments::models::PaymentMethod;

/// Fee split for a single payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeeBreakdown {
    pub processing_fee: Decimal,
    pub platform_fee: Decimal,
    pub net_amount: Decimal,
}

/// Computes fee breakdowns from the configured schedule.
///
/// No side effects; the only failure mode is a non-positive amount.
#[derive(Debug, Clone)]
pub struct FeeCalculator {
    schedule: FeeScheduleConfig,
}

impl FeeCalculator {
    pub fn new(schedule: FeeScheduleConfig) -> Self {
        Self { schedule }
    }

    /// Compute the fee breakdown for a payment.
    ///
    /// processing_fee = round(amount * method_rate + method_fixed_fee)
    /// platform_fee   = round(amount * platform_rate)
    /// net_amount     = amount - processing_fee - platform_fee (exact)
    pub fn calculate(&self, amount: Decimal, method: PaymentMethod) -> Result<FeeBreakdown> {
        if amount <= Decimal::ZERO {
            return Err(AppError::validation(format!(
                "Payment amount must be positive, got: {}",
                amount
            )));
        }

        let (rate, fixed) = self.method_fees(method);

        let processing_fee = money::round(amount * rate + fixed);
        let platform_fee = money::round(amount * self.schedule.platform_rate);
        let net_amount = amount - processing_fee - platform_fee;

        Ok(FeeBreakdown {
            processing_fee,
            platform_fee,
            net_amount,
        })
    }

    fn method_fees(&self, method: PaymentMethod) -> (Decimal, Decimal) {
        match method {
            PaymentMethod::Card => (self.schedule.card_rate, self.schedule.card_fixed_fee),
            PaymentMethod::Ach => (self.schedule.ach_rate, self.schedule.ach_fixed_fee),
            PaymentMethod::Check => (self.schedule.check_rate, self.schedule.check_fixed_fee),
            PaymentMethod::Cash => (self.schedule.cash_rate, self.schedule.cash_fixed_fee),
        }
    }
}

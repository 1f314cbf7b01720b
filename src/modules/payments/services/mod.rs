pub mod fee_calculator;
pub mod payment_service;

pub use fee_calculator::{FeeBreakdown, FeeCalculator};
pub use payment_service::PaymentService;

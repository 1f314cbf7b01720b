use crate::core::{AppError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;
use std::str::FromStr;

pub mod database;
pub mod server;

pub use database::DatabaseConfig;
pub use server::ServerConfig;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub billing: BillingConfig,
    pub fees: FeeScheduleConfig,
    pub webhook: WebhookConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
}

/// Invoice-level defaults applied when a request omits them
#[derive(Debug, Clone)]
pub struct BillingConfig {
    pub default_tax_rate: Decimal,
    pub default_due_in_days: i64,
}

/// Fee schedule for payment recording.
///
/// Processor fees are configured per payment method: card payments carry the
/// processor's percentage-plus-fixed formula, while offline methods (cash,
/// check) default to no processor fee at all. The platform rate applies to
/// every method.
#[derive(Debug, Clone)]
pub struct FeeScheduleConfig {
    pub platform_rate: Decimal,
    pub card_rate: Decimal,
    pub card_fixed_fee: Decimal,
    pub ach_rate: Decimal,
    pub ach_fixed_fee: Decimal,
    pub check_rate: Decimal,
    pub check_fixed_fee: Decimal,
    pub cash_rate: Decimal,
    pub cash_fixed_fee: Decimal,
}

#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub secret: String,
}

fn decimal_var(name: &str, default: &str) -> Result<Decimal> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    Decimal::from_str(&raw).map_err(|_| AppError::Configuration(format!("Invalid {}", name)))
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            },
            database: DatabaseConfig::from_env()?,
            server: ServerConfig::from_env()?,
            billing: BillingConfig {
                default_tax_rate: decimal_var("DEFAULT_TAX_RATE", "0.08")?,
                default_due_in_days: env::var("DEFAULT_DUE_IN_DAYS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .map_err(|_| {
                        AppError::Configuration("Invalid DEFAULT_DUE_IN_DAYS".to_string())
                    })?,
            },
            fees: FeeScheduleConfig::from_env()?,
            webhook: WebhookConfig {
                secret: env::var("WEBHOOK_SECRET")
                    .map_err(|_| AppError::Configuration("WEBHOOK_SECRET not set".to_string()))?,
            },
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.billing.default_due_in_days <= 0 {
            return Err(AppError::Configuration(
                "Default due-in days must be greater than 0".to_string(),
            ));
        }

        if self.billing.default_tax_rate < Decimal::ZERO
            || self.billing.default_tax_rate >= Decimal::ONE
        {
            return Err(AppError::Configuration(
                "Default tax rate must be in [0, 1)".to_string(),
            ));
        }

        self.fees.validate()
    }
}

impl FeeScheduleConfig {
    pub fn from_env() -> Result<Self> {
        Ok(FeeScheduleConfig {
            platform_rate: decimal_var("PLATFORM_FEE_RATE", "0.02")?,
            card_rate: decimal_var("CARD_FEE_RATE", "0.029")?,
            card_fixed_fee: decimal_var("CARD_FIXED_FEE", "0.30")?,
            ach_rate: decimal_var("ACH_FEE_RATE", "0")?,
            ach_fixed_fee: decimal_var("ACH_FIXED_FEE", "0")?,
            check_rate: decimal_var("CHECK_FEE_RATE", "0")?,
            check_fixed_fee: decimal_var("CHECK_FIXED_FEE", "0")?,
            cash_rate: decimal_var("CASH_FEE_RATE", "0")?,
            cash_fixed_fee: decimal_var("CASH_FIXED_FEE", "0")?,
        })
    }

    pub fn validate(&self) -> Result<()> {
        let rates = [
            ("PLATFORM_FEE_RATE", self.platform_rate),
            ("CARD_FEE_RATE", self.card_rate),
            ("ACH_FEE_RATE", self.ach_rate),
            ("CHECK_FEE_RATE", self.check_rate),
            ("CASH_FEE_RATE", self.cash_rate),
        ];
        for (name, rate) in rates {
            if rate < Decimal::ZERO || rate >= Decimal::ONE {
                return Err(AppError::Configuration(format!(
                    "{} must be in [0, 1)",
                    name
                )));
            }
        }

        let fixed = [
            ("CARD_FIXED_FEE", self.card_fixed_fee),
            ("ACH_FIXED_FEE", self.ach_fixed_fee),
            ("CHECK_FIXED_FEE", self.check_fixed_fee),
            ("CASH_FIXED_FEE", self.cash_fixed_fee),
        ];
        for (name, fee) in fixed {
            if fee < Decimal::ZERO {
                return Err(AppError::Configuration(format!(
                    "{} must be non-negative",
                    name
                )));
            }
        }

        Ok(())
    }
}

impl Default for FeeScheduleConfig {
    fn default() -> Self {
        FeeScheduleConfig {
            platform_rate: Decimal::from_str("0.02").unwrap(),
            card_rate: Decimal::from_str("0.029").unwrap(),
            card_fixed_fee: Decimal::from_str("0.30").unwrap(),
            ach_rate: Decimal::ZERO,
            ach_fixed_fee: Decimal::ZERO,
            check_rate: Decimal::ZERO,
            check_fixed_fee: Decimal::ZERO,
            cash_rate: Decimal::ZERO,
            cash_fixed_fee: Decimal::ZERO,
        }
    }
}

// Payment ledger entry. A payment is created exactly once by the ledger's
// atomic commit and is immutable afterwards; its fee breakdown is computed at
// recording time and never recomputed, so historical entries stay auditable
// even if the fee schedule later changes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{AppError, Result};

/// How a payment was collected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    Ach,
    Check,
    Cash,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Card => write!(f, "card"),
            PaymentMethod::Ach => write!(f, "ach"),
            PaymentMethod::Check => write!(f, "check"),
            PaymentMethod::Cash => write!(f, "cash"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "card" => Ok(PaymentMethod::Card),
            "ach" => Ok(PaymentMethod::Ach),
            "check" => Ok(PaymentMethod::Check),
            "cash" => Ok(PaymentMethod::Cash),
            _ => Err(format!("Invalid payment method: {}", s)),
        }
    }
}

/// Payment status. The ledger only records settled outcomes; pending and
/// failed gateway states never enter it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Completed,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "completed" => Ok(PaymentStatus::Completed),
            _ => Err(format!("Invalid payment status: {}", s)),
        }
    }
}

/// A settled payment against an invoice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Unique payment ID (UUID)
    pub id: String,

    /// Owning invoice; a payment never outlives or moves between invoices
    pub invoice_id: String,

    /// Owning tenant
    pub tenant_id: String,

    /// Gross amount paid (strictly positive)
    pub amount: Decimal,

    pub method: PaymentMethod,

    /// Processor's cut, frozen at recording time
    pub processing_fee: Decimal,

    /// Platform operator's cut, frozen at recording time
    pub platform_fee: Decimal,

    /// Merchant settlement: amount - processing_fee - platform_fee, exact
    pub net_amount: Decimal,

    pub status: PaymentStatus,

    /// Gateway-supplied idempotency key, unique per invoice
    pub external_ref: String,

    /// Recording time, immutable
    pub date: DateTime<Utc>,
}

impl Payment {
    /// Create a new payment record
    ///
    /// # Arguments
    /// * `invoice_id` / `tenant_id` - Owning invoice and tenant
    /// * `amount` - Gross amount (must be strictly positive)
    /// * `method` - Collection method
    /// * `processing_fee` / `platform_fee` / `net_amount` - Fee breakdown from
    ///   the fee calculator
    /// * `external_ref` - Gateway idempotency key (must not be empty)
    pub fn new(
        invoice_id: String,
        tenant_id: String,
        amount: Decimal,
        method: PaymentMethod,
        processing_fee: Decimal,
        platform_fee: Decimal,
        net_amount: Decimal,
        external_ref: String,
    ) -> Result<Self> {
        if amount <= Decimal::ZERO {
            return Err(AppError::validation(format!(
                "Payment amount must be positive, got: {}",
                amount
            )));
        }

        if external_ref.trim().is_empty() {
            return Err(AppError::validation(
                "External transaction reference cannot be empty",
            ));
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            invoice_id,
            tenant_id,
            amount,
            method,
            processing_fee,
            platform_fee,
            net_amount,
            status: PaymentStatus::Completed,
            external_ref,
            date: Utc::now(),
        })
    }
}

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::payment::{Payment, PaymentMethod, PaymentStatus};
use crate::modules::invoices::models::InvoiceResponse;

/// Request body for recording a settled payment
#[derive(Debug, Clone, Deserialize)]
pub struct RecordPaymentRequest {
    pub amount: Decimal,
    pub method: PaymentMethod,
    /// Gateway transaction reference used for idempotency
    pub external_transaction_id: String,
}

/// Payment as exposed to dashboards and reporting
#[derive(Debug, Clone, Serialize)]
pub struct PaymentResponse {
    pub id: String,
    pub invoice_id: String,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub processing_fee: Decimal,
    pub platform_fee: Decimal,
    pub net_amount: Decimal,
    pub status: PaymentStatus,
    pub external_transaction_id: String,
    pub date: DateTime<Utc>,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        PaymentResponse {
            id: payment.id,
            invoice_id: payment.invoice_id,
            amount: payment.amount,
            method: payment.method,
            processing_fee: payment.processing_fee,
            platform_fee: payment.platform_fee,
            net_amount: payment.net_amount,
            status: payment.status,
            external_transaction_id: payment.external_ref,
            date: payment.date,
        }
    }
}

/// Result of recording a payment: the payment plus the invoice it updated
#[derive(Debug, Clone, Serialize)]
pub struct RecordPaymentResponse {
    pub payment: PaymentResponse,
    pub invoice: InvoiceResponse,
    /// True when the call matched an already-recorded external reference
    pub duplicate: bool,
}

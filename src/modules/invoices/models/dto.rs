use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::invoice::{Invoice, InvoiceStatus};

/// Request body for invoice creation
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvoiceRequest {
    pub lead_id: String,
    pub lead_name: String,
    pub items: Vec<CreateLineItemRequest>,
    /// Defaults to the configured tax rate when omitted
    pub tax_rate: Option<Decimal>,
    /// Defaults to the configured due window when omitted
    pub due_in_days: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateLineItemRequest {
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Invoice as exposed to dashboards and reporting
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceResponse {
    pub id: String,
    pub lead_id: String,
    pub lead_name: String,
    pub number: String,
    /// Effective status with the overdue policy applied
    pub status: InvoiceStatus,
    pub items: Vec<LineItemResponse>,
    pub subtotal: Decimal,
    pub tax_rate: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub amount_paid: Decimal,
    pub balance_due: Decimal,
    pub date_issued: DateTime<Utc>,
    pub date_due: DateTime<Utc>,
    pub payment_link: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineItemResponse {
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

impl InvoiceResponse {
    /// Project an invoice for callers, deriving the effective status at `now`
    pub fn from_invoice(invoice: Invoice, now: DateTime<Utc>) -> Self {
        let status = invoice.effective_status(now);
        let balance_due = (invoice.total - invoice.amount_paid).max(Decimal::ZERO);

        InvoiceResponse {
            id: invoice.id,
            lead_id: invoice.lead_id,
            lead_name: invoice.lead_name,
            number: invoice.number,
            status,
            items: invoice
                .items
                .into_iter()
                .map(|item| LineItemResponse {
                    description: item.description,
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    line_total: item.line_total,
                })
                .collect(),
            subtotal: invoice.subtotal,
            tax_rate: invoice.tax_rate,
            tax: invoice.tax,
            total: invoice.total,
            amount_paid: invoice.amount_paid,
            balance_due,
            date_issued: invoice.date_issued,
            date_due: invoice.date_due,
            payment_link: invoice.payment_link,
            created_at: invoice.created_at,
            updated_at: invoice.updated_at,
        }
    }
}

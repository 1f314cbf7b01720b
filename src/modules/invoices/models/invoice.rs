// Invoice aggregate: owns line items, tax computation, and the authoritative
// total, and is the unit of consistency for payment recording. All derived
// totals are recomputed from line items on read; amount_paid and status are
// only ever rewritten through the ledger's atomic commit.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::line_item::LineItem;
use crate::core::{money, AppError, Result};

/// Invoice status lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Created, not yet sent to the client
    Draft,

    /// Sent to the client, awaiting payment
    Sent,

    /// At least one payment recorded, balance outstanding
    PartiallyPaid,

    /// Fully paid; terminal for payment recording
    Paid,

    /// Past due date with a balance outstanding. Derived lazily on read and
    /// never stored; see `effective_status`.
    Overdue,
}

impl Default for InvoiceStatus {
    fn default() -> Self {
        InvoiceStatus::Draft
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvoiceStatus::Draft => write!(f, "draft"),
            InvoiceStatus::Sent => write!(f, "sent"),
            InvoiceStatus::PartiallyPaid => write!(f, "partially_paid"),
            InvoiceStatus::Paid => write!(f, "paid"),
            InvoiceStatus::Overdue => write!(f, "overdue"),
        }
    }
}

impl std::str::FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "draft" => Ok(InvoiceStatus::Draft),
            "sent" => Ok(InvoiceStatus::Sent),
            "partially_paid" => Ok(InvoiceStatus::PartiallyPaid),
            "paid" => Ok(InvoiceStatus::Paid),
            "overdue" => Ok(InvoiceStatus::Overdue),
            _ => Err(format!("Invalid invoice status: {}", s)),
        }
    }
}

/// Represents an invoice and its derived ledger state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique invoice ID (UUID)
    pub id: String,

    /// Owning tenant
    pub tenant_id: String,

    /// Billed lead; the invoice does not own the lead record
    pub lead_id: String,

    /// Cached display name of the billed lead
    pub lead_name: String,

    /// Human-readable number, unique per tenant, issued at creation
    pub number: String,

    /// Ordered line items
    pub items: Vec<LineItem>,

    /// Sum of line totals
    pub subtotal: Decimal,

    /// Tax rate applied to the subtotal
    pub tax_rate: Decimal,

    /// round(subtotal * tax_rate)
    pub tax: Decimal,

    /// subtotal + tax
    pub total: Decimal,

    /// Sum of settled payment amounts; monotone non-decreasing
    pub amount_paid: Decimal,

    /// Stored status (never Overdue; that is derived on read)
    pub status: InvoiceStatus,

    pub date_issued: DateTime<Utc>,
    pub date_due: DateTime<Utc>,

    /// Opaque stable payment reference, generated once at creation
    pub payment_link: String,

    /// Optimistic-concurrency counter, bumped on every ledger commit
    #[serde(skip_deserializing)]
    pub version: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Create a new invoice with validation and derived totals
    ///
    /// # Arguments
    /// * `tenant_id` - Owning tenant
    /// * `lead_id` / `lead_name` - Billed party reference and cached name
    /// * `number` - Tenant-unique invoice number issued by the store
    /// * `items` - Line items (must not be empty)
    /// * `tax_rate` - Fraction in [0, 1)
    /// * `due_in_days` - Days from issue until due
    pub fn new(
        tenant_id: String,
        lead_id: String,
        lead_name: String,
        number: String,
        items: Vec<LineItem>,
        tax_rate: Decimal,
        due_in_days: i64,
    ) -> Result<Self> {
        if items.is_empty() {
            return Err(AppError::validation(
                "Invoice must have at least one line item",
            ));
        }

        if tax_rate < Decimal::ZERO || tax_rate >= Decimal::ONE {
            return Err(AppError::validation(format!(
                "Tax rate must be in [0, 1), got: {}",
                tax_rate
            )));
        }

        if due_in_days <= 0 {
            return Err(AppError::validation(format!(
                "Due-in days must be positive, got: {}",
                due_in_days
            )));
        }

        let now = Utc::now();

        let mut invoice = Self {
            id: Uuid::new_v4().to_string(),
            tenant_id,
            lead_id,
            lead_name,
            number,
            items,
            subtotal: Decimal::ZERO,
            tax_rate,
            tax: Decimal::ZERO,
            total: Decimal::ZERO,
            amount_paid: Decimal::ZERO,
            status: InvoiceStatus::Draft,
            date_issued: now,
            date_due: now + Duration::days(due_in_days),
            payment_link: format!("pay_{}", Uuid::new_v4().simple()),
            version: 0,
            created_at: now,
            updated_at: now,
        };

        invoice.recompute_totals();

        Ok(invoice)
    }

    /// Recompute subtotal, tax, and total from line items.
    ///
    /// Applied on every read path; cached values are never trusted once an
    /// invoice has left storage.
    pub fn recompute_totals(&mut self) {
        for item in &mut self.items {
            item.recompute_total();
        }

        self.subtotal = self.items.iter().map(|item| item.line_total).sum();
        self.tax = money::round(self.subtotal * self.tax_rate);
        self.total = self.subtotal + self.tax;
    }

    /// Transition Draft -> Sent
    pub fn send(&mut self) -> Result<()> {
        if self.status != InvoiceStatus::Draft {
            return Err(AppError::invalid_transition(
                self.status.to_string(),
                "only a draft invoice can be sent",
            ));
        }

        self.status = InvoiceStatus::Sent;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Status to store after a payment brings amount_paid to the given value.
    ///
    /// Paid once the total is covered, PartiallyPaid while a positive balance
    /// has been paid, otherwise the current status is kept.
    pub fn status_for_amount_paid(&self, amount_paid: Decimal) -> InvoiceStatus {
        if amount_paid >= self.total {
            InvoiceStatus::Paid
        } else if amount_paid > Decimal::ZERO {
            InvoiceStatus::PartiallyPaid
        } else {
            self.status
        }
    }

    /// Status as reported to callers, with the overdue policy applied.
    ///
    /// An invoice that is Sent or PartiallyPaid, past its due date, and not
    /// fully paid reads as Overdue. The stored status is left untouched so an
    /// overdue invoice can still take payments and reach Paid.
    pub fn effective_status(&self, now: DateTime<Utc>) -> InvoiceStatus {
        match self.status {
            InvoiceStatus::Sent | InvoiceStatus::PartiallyPaid
                if now > self.date_due && self.amount_paid < self.total =>
            {
                InvoiceStatus::Overdue
            }
            status => status,
        }
    }

    pub fn is_fully_paid(&self) -> bool {
        self.amount_paid >= self.total
    }
}

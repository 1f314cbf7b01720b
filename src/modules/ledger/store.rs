// Persistence seam for the invoice and payment ledger. The ledger service is
// written against this trait; production runs on MySQL, tests and local runs
// on the in-memory implementation. Both provide the same compare-and-swap
// semantics for `commit_payment`, which is the only place an invoice's
// amount_paid and status are ever rewritten.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::core::Result;
use crate::modules::invoices::models::{Invoice, InvoiceStatus};
use crate::modules::payments::models::Payment;

/// Filters for the invoice list projection
#[derive(Debug, Clone)]
pub struct InvoiceFilter {
    pub status: Option<InvoiceStatus>,
    pub lead_id: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for InvoiceFilter {
    fn default() -> Self {
        InvoiceFilter {
            status: None,
            lead_id: None,
            limit: 50,
            offset: 0,
        }
    }
}

/// Outcome of the atomic payment commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Payment inserted and invoice updated in one unit
    Committed,

    /// The invoice row changed since it was read; reload and retry
    VersionConflict,

    /// A payment with this external reference was inserted concurrently;
    /// the caller should fetch and return the existing record
    DuplicateExternalRef,
}

/// Storage abstraction for invoices and their payment ledger
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Persist a freshly created invoice with its line items
    async fn create_invoice(&self, invoice: &Invoice) -> Result<()>;

    /// Load an invoice (with line items) scoped to a tenant
    async fn find_invoice(&self, tenant_id: &str, invoice_id: &str) -> Result<Option<Invoice>>;

    /// List invoices for a tenant, newest first
    async fn list_invoices(&self, tenant_id: &str, filter: &InvoiceFilter)
        -> Result<Vec<Invoice>>;

    /// Conditionally transition an invoice's stored status.
    ///
    /// Returns false when the invoice was not in `from` anymore; the caller
    /// reloads and reports the actual state.
    async fn transition_status(
        &self,
        tenant_id: &str,
        invoice_id: &str,
        from: InvoiceStatus,
        to: InvoiceStatus,
    ) -> Result<bool>;

    /// Issue the next value of the tenant's invoice-number sequence
    async fn next_invoice_number(&self, tenant_id: &str) -> Result<u64>;

    /// Look up a payment by its gateway idempotency key
    async fn find_payment_by_external_ref(
        &self,
        tenant_id: &str,
        invoice_id: &str,
        external_ref: &str,
    ) -> Result<Option<Payment>>;

    /// List all payments recorded against an invoice, oldest first
    async fn list_payments(&self, tenant_id: &str, invoice_id: &str) -> Result<Vec<Payment>>;

    /// Atomically insert a payment and update the owning invoice.
    ///
    /// The invoice update is guarded by `expected_version`; when the guard
    /// fails nothing is written and `VersionConflict` is returned. A unique
    /// constraint on `(invoice_id, external_ref)` turns a concurrent
    /// duplicate submission into `DuplicateExternalRef`, again with nothing
    /// written.
    async fn commit_payment(
        &self,
        tenant_id: &str,
        invoice_id: &str,
        expected_version: i64,
        new_amount_paid: Decimal,
        new_status: InvoiceStatus,
        payment: &Payment,
    ) -> Result<CommitOutcome>;
}

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::config::BillingConfig;
use crate::core::{AppError, Result};
use crate::modules::invoices::models::{
    CreateInvoiceRequest, Invoice, InvoiceResponse, InvoiceStatus, LineItem,
};
use crate::modules::ledger::{InvoiceFilter, LedgerStore};

/// Service for invoice business logic
pub struct InvoiceService {
    store: Arc<dyn LedgerStore>,
    billing: BillingConfig,
}

impl InvoiceService {
    pub fn new(store: Arc<dyn LedgerStore>, billing: BillingConfig) -> Self {
        Self { store, billing }
    }

    /// Create a new invoice with line items
    pub async fn create_invoice(
        &self,
        tenant_id: &str,
        request: CreateInvoiceRequest,
    ) -> Result<InvoiceResponse> {
        if request.items.is_empty() {
            return Err(AppError::validation(
                "Invoice must have at least one line item",
            ));
        }

        let items = request
            .items
            .into_iter()
            .map(|item| LineItem::new(item.description, item.quantity, item.unit_price))
            .collect::<Result<Vec<_>>>()?;

        let tax_rate = request.tax_rate.unwrap_or(self.billing.default_tax_rate);
        let due_in_days = request
            .due_in_days
            .unwrap_or(self.billing.default_due_in_days);

        let seq = self.store.next_invoice_number(tenant_id).await?;
        let number = format!("INV-{:06}", seq);

        let invoice = Invoice::new(
            tenant_id.to_string(),
            request.lead_id,
            request.lead_name,
            number,
            items,
            tax_rate,
            due_in_days,
        )?;

        self.store.create_invoice(&invoice).await?;

        info!(
            tenant_id = tenant_id,
            invoice_id = invoice.id.as_str(),
            number = invoice.number.as_str(),
            total = %invoice.total,
            "Invoice created"
        );

        Ok(InvoiceResponse::from_invoice(invoice, Utc::now()))
    }

    /// Transition an invoice from Draft to Sent
    pub async fn send_invoice(&self, tenant_id: &str, invoice_id: &str) -> Result<InvoiceResponse> {
        let invoice = self.load(tenant_id, invoice_id).await?;

        if invoice.status != InvoiceStatus::Draft {
            return Err(AppError::invalid_transition(
                invoice.status.to_string(),
                "only a draft invoice can be sent",
            ));
        }

        let updated = self
            .store
            .transition_status(tenant_id, invoice_id, InvoiceStatus::Draft, InvoiceStatus::Sent)
            .await?;

        if !updated {
            // Lost a race with another caller; report the state as it is now
            let current = self.load(tenant_id, invoice_id).await?;
            return Err(AppError::invalid_transition(
                current.status.to_string(),
                "only a draft invoice can be sent",
            ));
        }

        info!(
            tenant_id = tenant_id,
            invoice_id = invoice_id,
            "Invoice sent"
        );

        let invoice = self.load(tenant_id, invoice_id).await?;
        Ok(InvoiceResponse::from_invoice(invoice, Utc::now()))
    }

    /// Get invoice by ID
    pub async fn get_invoice(&self, tenant_id: &str, invoice_id: &str) -> Result<InvoiceResponse> {
        let invoice = self.load(tenant_id, invoice_id).await?;
        Ok(InvoiceResponse::from_invoice(invoice, Utc::now()))
    }

    /// List invoices for a tenant
    pub async fn list_invoices(
        &self,
        tenant_id: &str,
        filter: InvoiceFilter,
    ) -> Result<Vec<InvoiceResponse>> {
        let invoices = self.store.list_invoices(tenant_id, &filter).await?;
        let now = Utc::now();

        Ok(invoices
            .into_iter()
            .map(|mut invoice| {
                invoice.recompute_totals();
                InvoiceResponse::from_invoice(invoice, now)
            })
            .collect())
    }

    /// Load an invoice with derived totals recomputed.
    ///
    /// Stored totals are never trusted on read; a drifted cache from a prior
    /// bug gets silently corrected here.
    async fn load(&self, tenant_id: &str, invoice_id: &str) -> Result<Invoice> {
        let mut invoice = self
            .store
            .find_invoice(tenant_id, invoice_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Invoice '{}' not found", invoice_id)))?;

        invoice.recompute_totals();
        Ok(invoice)
    }
}

// In-memory ledger store. Backs the test suite and local development runs;
// mirrors the MySQL store's compare-and-swap semantics under a single mutex
// so the ledger's retry loop is exercised the same way against both.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use super::store::{CommitOutcome, InvoiceFilter, LedgerStore};
use crate::core::Result;
use crate::modules::invoices::models::{Invoice, InvoiceStatus};
use crate::modules::payments::models::Payment;

#[derive(Default)]
struct LedgerState {
    /// invoice id -> invoice (line items embedded)
    invoices: HashMap<String, Invoice>,
    /// invoice id -> payments in recording order
    payments: HashMap<String, Vec<Payment>>,
    /// tenant id -> last issued invoice-number sequence value
    sequences: HashMap<String, u64>,
}

/// Hash-map ledger store guarded by a mutex
#[derive(Clone, Default)]
pub struct InMemoryLedgerStore {
    state: Arc<Mutex<LedgerState>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn owned_by(invoice: &Invoice, tenant_id: &str) -> bool {
    invoice.tenant_id == tenant_id
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn create_invoice(&self, invoice: &Invoice) -> Result<()> {
        let mut state = self.state.lock().await;
        state.invoices.insert(invoice.id.clone(), invoice.clone());
        state.payments.entry(invoice.id.clone()).or_default();
        Ok(())
    }

    async fn find_invoice(&self, tenant_id: &str, invoice_id: &str) -> Result<Option<Invoice>> {
        let state = self.state.lock().await;
        Ok(state
            .invoices
            .get(invoice_id)
            .filter(|invoice| owned_by(invoice, tenant_id))
            .cloned())
    }

    async fn list_invoices(
        &self,
        tenant_id: &str,
        filter: &InvoiceFilter,
    ) -> Result<Vec<Invoice>> {
        let state = self.state.lock().await;

        let mut invoices: Vec<Invoice> = state
            .invoices
            .values()
            .filter(|invoice| owned_by(invoice, tenant_id))
            .filter(|invoice| filter.status.is_none_or(|s| invoice.status == s))
            .filter(|invoice| {
                filter
                    .lead_id
                    .as_deref()
                    .is_none_or(|lead| invoice.lead_id == lead)
            })
            .cloned()
            .collect();

        invoices.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(invoices
            .into_iter()
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .collect())
    }

    async fn transition_status(
        &self,
        tenant_id: &str,
        invoice_id: &str,
        from: InvoiceStatus,
        to: InvoiceStatus,
    ) -> Result<bool> {
        let mut state = self.state.lock().await;

        let Some(invoice) = state
            .invoices
            .get_mut(invoice_id)
            .filter(|invoice| owned_by(invoice, tenant_id))
        else {
            return Ok(false);
        };

        if invoice.status != from {
            return Ok(false);
        }

        invoice.status = to;
        invoice.version += 1;
        invoice.updated_at = chrono::Utc::now();
        Ok(true)
    }

    async fn next_invoice_number(&self, tenant_id: &str) -> Result<u64> {
        let mut state = self.state.lock().await;
        let seq = state.sequences.entry(tenant_id.to_string()).or_insert(0);
        *seq += 1;
        Ok(*seq)
    }

    async fn find_payment_by_external_ref(
        &self,
        tenant_id: &str,
        invoice_id: &str,
        external_ref: &str,
    ) -> Result<Option<Payment>> {
        let state = self.state.lock().await;
        Ok(state
            .payments
            .get(invoice_id)
            .and_then(|payments| {
                payments
                    .iter()
                    .find(|p| p.tenant_id == tenant_id && p.external_ref == external_ref)
            })
            .cloned())
    }

    async fn list_payments(&self, tenant_id: &str, invoice_id: &str) -> Result<Vec<Payment>> {
        let state = self.state.lock().await;
        Ok(state
            .payments
            .get(invoice_id)
            .map(|payments| {
                payments
                    .iter()
                    .filter(|p| p.tenant_id == tenant_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn commit_payment(
        &self,
        tenant_id: &str,
        invoice_id: &str,
        expected_version: i64,
        new_amount_paid: Decimal,
        new_status: InvoiceStatus,
        payment: &Payment,
    ) -> Result<CommitOutcome> {
        let mut state = self.state.lock().await;

        // Idempotency guard first, matching the MySQL unique key
        let duplicate = state
            .payments
            .get(invoice_id)
            .is_some_and(|payments| payments.iter().any(|p| p.external_ref == payment.external_ref));
        if duplicate {
            return Ok(CommitOutcome::DuplicateExternalRef);
        }

        let Some(invoice) = state
            .invoices
            .get_mut(invoice_id)
            .filter(|invoice| owned_by(invoice, tenant_id))
        else {
            return Ok(CommitOutcome::VersionConflict);
        };

        if invoice.version != expected_version {
            return Ok(CommitOutcome::VersionConflict);
        }

        invoice.amount_paid = new_amount_paid;
        invoice.status = new_status;
        invoice.version += 1;
        invoice.updated_at = chrono::Utc::now();

        state
            .payments
            .entry(invoice_id.to_string())
            .or_default()
            .push(payment.clone());

        Ok(CommitOutcome::Committed)
    }
}

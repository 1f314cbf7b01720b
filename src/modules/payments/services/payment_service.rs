// The payment ledger. Appends settled payments against invoices and keeps
// the invoice's amount_paid and status in step, under the invariant
// amount_paid == sum of the invoice's payment amounts. That sum is maintained
// in exactly one place: the store's atomic commit, guarded by the invoice
// version. On contention the ledger retries on its own, because the payment
// already settled at the gateway and must not be dropped.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::core::{AppError, Result};
use crate::modules::invoices::models::{Invoice, InvoiceResponse, InvoiceStatus};
use crate::modules::ledger::{CommitOutcome, LedgerStore};
use crate::modules::payments::models::{
    Payment, PaymentResponse, RecordPaymentRequest, RecordPaymentResponse,
};
use crate::modules::payments::services::fee_calculator::FeeCalculator;

/// Bounded retry budget for version conflicts between concurrent payments
const MAX_COMMIT_ATTEMPTS: u32 = 10;

/// Service that records payments and derives invoice state from them
pub struct PaymentService {
    store: Arc<dyn LedgerStore>,
    fees: FeeCalculator,
}

impl PaymentService {
    pub fn new(store: Arc<dyn LedgerStore>, fees: FeeCalculator) -> Self {
        Self { store, fees }
    }

    /// Record a settled payment against an invoice.
    ///
    /// At-most-once per `external_transaction_id`: a duplicate submission
    /// (webhook retry, double click) returns the previously recorded payment
    /// unchanged. Rejections leave both records exactly as they were.
    pub async fn record_payment(
        &self,
        tenant_id: &str,
        invoice_id: &str,
        request: RecordPaymentRequest,
    ) -> Result<RecordPaymentResponse> {
        let external_ref = request.external_transaction_id.trim();
        if external_ref.is_empty() {
            return Err(AppError::validation(
                "External transaction reference cannot be empty",
            ));
        }

        for attempt in 1..=MAX_COMMIT_ATTEMPTS {
            let mut invoice = self
                .store
                .find_invoice(tenant_id, invoice_id)
                .await?
                .ok_or_else(|| {
                    AppError::not_found(format!("Invoice '{}' not found", invoice_id))
                })?;
            invoice.recompute_totals();

            // Idempotency check before any state is touched
            if let Some(existing) = self
                .store
                .find_payment_by_external_ref(tenant_id, invoice_id, external_ref)
                .await?
            {
                info!(
                    tenant_id = tenant_id,
                    invoice_id = invoice_id,
                    external_ref = external_ref,
                    payment_id = existing.id.as_str(),
                    "Duplicate payment submission, returning existing record"
                );
                return Ok(self.duplicate_response(invoice, existing));
            }

            if invoice.status == InvoiceStatus::Paid {
                return Err(AppError::invalid_transition(
                    invoice.status.to_string(),
                    "invoice is already fully paid",
                ));
            }

            let breakdown = self.fees.calculate(request.amount, request.method)?;

            let payment = Payment::new(
                invoice.id.clone(),
                tenant_id.to_string(),
                request.amount,
                request.method,
                breakdown.processing_fee,
                breakdown.platform_fee,
                breakdown.net_amount,
                external_ref.to_string(),
            )?;

            let new_amount_paid = invoice.amount_paid + request.amount;
            let new_status = invoice.status_for_amount_paid(new_amount_paid);

            match self
                .store
                .commit_payment(
                    tenant_id,
                    invoice_id,
                    invoice.version,
                    new_amount_paid,
                    new_status,
                    &payment,
                )
                .await?
            {
                CommitOutcome::Committed => {
                    invoice.amount_paid = new_amount_paid;
                    invoice.status = new_status;
                    invoice.version += 1;
                    invoice.updated_at = Utc::now();

                    info!(
                        tenant_id = tenant_id,
                        invoice_id = invoice_id,
                        payment_id = payment.id.as_str(),
                        external_ref = external_ref,
                        amount = %payment.amount,
                        net_amount = %payment.net_amount,
                        status = %invoice.status,
                        "Payment recorded"
                    );

                    return Ok(RecordPaymentResponse {
                        payment: PaymentResponse::from(payment),
                        invoice: InvoiceResponse::from_invoice(invoice, Utc::now()),
                        duplicate: false,
                    });
                }
                CommitOutcome::DuplicateExternalRef => {
                    // Raced with an identical submission; hand back its result
                    let existing = self
                        .store
                        .find_payment_by_external_ref(tenant_id, invoice_id, external_ref)
                        .await?
                        .ok_or_else(|| {
                            AppError::internal(
                                "Duplicate external reference reported but payment not found",
                            )
                        })?;
                    let mut invoice = self
                        .store
                        .find_invoice(tenant_id, invoice_id)
                        .await?
                        .ok_or_else(|| {
                            AppError::not_found(format!("Invoice '{}' not found", invoice_id))
                        })?;
                    invoice.recompute_totals();
                    return Ok(self.duplicate_response(invoice, existing));
                }
                CommitOutcome::VersionConflict => {
                    debug!(
                        tenant_id = tenant_id,
                        invoice_id = invoice_id,
                        attempt = attempt,
                        "Concurrent update detected, retrying payment commit"
                    );
                }
            }
        }

        warn!(
            tenant_id = tenant_id,
            invoice_id = invoice_id,
            external_ref = external_ref,
            "Payment commit retries exhausted"
        );

        Err(AppError::conflict(format!(
            "Could not record payment for invoice '{}' after {} attempts",
            invoice_id, MAX_COMMIT_ATTEMPTS
        )))
    }

    /// List all payments recorded against an invoice
    pub async fn list_payments(
        &self,
        tenant_id: &str,
        invoice_id: &str,
    ) -> Result<Vec<PaymentResponse>> {
        self.store
            .find_invoice(tenant_id, invoice_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Invoice '{}' not found", invoice_id)))?;

        let payments = self.store.list_payments(tenant_id, invoice_id).await?;
        Ok(payments.into_iter().map(PaymentResponse::from).collect())
    }

    fn duplicate_response(&self, invoice: Invoice, payment: Payment) -> RecordPaymentResponse {
        RecordPaymentResponse {
            payment: PaymentResponse::from(payment),
            invoice: InvoiceResponse::from_invoice(invoice, Utc::now()),
            duplicate: true,
        }
    }
}

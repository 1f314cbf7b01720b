// Overdue is a read-time projection: a sent invoice past its due date reads
// as overdue without any stored state changing, and paying it off still
// reaches the paid state.

#[path = "../helpers/mod.rs"]
mod helpers;

use chrono::{Duration, Utc};
use rust_decimal_macros::dec;

use helpers::{payment_request, test_context, TestContext, TENANT};
use payledger::modules::invoices::models::{Invoice, InvoiceStatus, LineItem};
use payledger::modules::ledger::LedgerStore;

/// Seed a sent invoice whose due date is already in the past
async fn overdue_invoice(ctx: &TestContext) -> String {
    let items = vec![LineItem::new("Roof repair".to_string(), 1, dec!(5000)).unwrap()];
    let mut invoice = Invoice::new(
        TENANT.to_string(),
        "lead-1".to_string(),
        "Dana Whitfield".to_string(),
        "INV-000001".to_string(),
        items,
        dec!(0.08),
        30,
    )
    .unwrap();

    invoice.send().unwrap();
    invoice.date_due = Utc::now() - Duration::days(5);

    ctx.store.create_invoice(&invoice).await.unwrap();
    invoice.id
}

#[tokio::test]
async fn test_past_due_invoice_reads_as_overdue() {
    let ctx = test_context();
    let invoice_id = overdue_invoice(&ctx).await;

    let invoice = ctx.invoices.get_invoice(TENANT, &invoice_id).await.unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Overdue);
    assert_eq!(invoice.balance_due, dec!(5400.00));

    // The stored status is untouched
    let stored = ctx
        .store
        .find_invoice(TENANT, &invoice_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, InvoiceStatus::Sent);
}

#[tokio::test]
async fn test_overdue_invoice_still_takes_payments() {
    let ctx = test_context();
    let invoice_id = overdue_invoice(&ctx).await;

    let partial = ctx
        .payments
        .record_payment(TENANT, &invoice_id, payment_request(2700, "txn-1"))
        .await
        .unwrap();

    // Partially paid but past due still reads overdue
    assert_eq!(partial.invoice.status, InvoiceStatus::Overdue);
    assert_eq!(partial.invoice.amount_paid, dec!(2700));

    let full = ctx
        .payments
        .record_payment(TENANT, &invoice_id, payment_request(2700, "txn-2"))
        .await
        .unwrap();

    // Fully paid clears the overdue projection for good
    assert_eq!(full.invoice.status, InvoiceStatus::Paid);
    assert_eq!(full.invoice.balance_due, dec!(0));

    let invoice = ctx.invoices.get_invoice(TENANT, &invoice_id).await.unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Paid);
}

#[tokio::test]
async fn test_overdue_appears_in_list_projection() {
    let ctx = test_context();
    overdue_invoice(&ctx).await;

    let listed = ctx
        .invoices
        .list_invoices(TENANT, Default::default())
        .await
        .unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status, InvoiceStatus::Overdue);
}

#[tokio::test]
async fn test_draft_never_reads_overdue() {
    let ctx = test_context();

    let items = vec![LineItem::new("Roof repair".to_string(), 1, dec!(1000)).unwrap()];
    let mut invoice = Invoice::new(
        TENANT.to_string(),
        "lead-1".to_string(),
        "Dana Whitfield".to_string(),
        "INV-000001".to_string(),
        items,
        dec!(0.08),
        30,
    )
    .unwrap();
    invoice.date_due = Utc::now() - Duration::days(5);

    ctx.store.create_invoice(&invoice).await.unwrap();

    let read = ctx.invoices.get_invoice(TENANT, &invoice.id).await.unwrap();
    assert_eq!(read.status, InvoiceStatus::Draft);
}

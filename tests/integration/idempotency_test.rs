// Duplicate gateway notifications must not double-apply: the external
// transaction id is the idempotency key, and a replay returns the original
// payment record unchanged.

#[path = "../helpers/mod.rs"]
mod helpers;

use rust_decimal_macros::dec;

use helpers::{payment_request, sent_invoice, test_context, TENANT};
use payledger::modules::invoices::models::InvoiceStatus;

#[tokio::test]
async fn test_replayed_payment_is_not_double_applied() {
    let ctx = test_context();
    let invoice_id = sent_invoice(&ctx, 1, 5000).await; // total 5400

    let first = ctx
        .payments
        .record_payment(TENANT, &invoice_id, payment_request(2700, "txn-dup"))
        .await
        .unwrap();
    assert!(!first.duplicate);

    let replay = ctx
        .payments
        .record_payment(TENANT, &invoice_id, payment_request(2700, "txn-dup"))
        .await
        .unwrap();

    assert!(replay.duplicate);
    assert_eq!(replay.payment.id, first.payment.id);
    assert_eq!(replay.payment.amount, dec!(2700));

    // The ledger holds exactly one record and the balance moved only once
    let payments = ctx.payments.list_payments(TENANT, &invoice_id).await.unwrap();
    assert_eq!(payments.len(), 1);

    let invoice = ctx.invoices.get_invoice(TENANT, &invoice_id).await.unwrap();
    assert_eq!(invoice.amount_paid, dec!(2700));
    assert_eq!(invoice.status, InvoiceStatus::PartiallyPaid);
}

#[tokio::test]
async fn test_replay_ignores_differing_amount() {
    // The reference wins: a replay with a different amount still returns the
    // original record rather than recording anything new.
    let ctx = test_context();
    let invoice_id = sent_invoice(&ctx, 1, 5000).await;

    ctx.payments
        .record_payment(TENANT, &invoice_id, payment_request(2700, "txn-dup"))
        .await
        .unwrap();

    let replay = ctx
        .payments
        .record_payment(TENANT, &invoice_id, payment_request(1000, "txn-dup"))
        .await
        .unwrap();

    assert!(replay.duplicate);
    assert_eq!(replay.payment.amount, dec!(2700));

    let invoice = ctx.invoices.get_invoice(TENANT, &invoice_id).await.unwrap();
    assert_eq!(invoice.amount_paid, dec!(2700));
}

#[tokio::test]
async fn test_distinct_references_record_separately() {
    let ctx = test_context();
    let invoice_id = sent_invoice(&ctx, 1, 5000).await;

    let first = ctx
        .payments
        .record_payment(TENANT, &invoice_id, payment_request(2700, "txn-1"))
        .await
        .unwrap();
    let second = ctx
        .payments
        .record_payment(TENANT, &invoice_id, payment_request(2700, "txn-2"))
        .await
        .unwrap();

    assert!(!first.duplicate);
    assert!(!second.duplicate);
    assert_ne!(first.payment.id, second.payment.id);

    let invoice = ctx.invoices.get_invoice(TENANT, &invoice_id).await.unwrap();
    assert_eq!(invoice.amount_paid, dec!(5400));
    assert_eq!(invoice.status, InvoiceStatus::Paid);
}

#[tokio::test]
async fn test_same_reference_on_different_invoices_is_independent() {
    // Gateway ids are only unique per gateway; scoping is per invoice
    let ctx = test_context();
    let first_invoice = sent_invoice(&ctx, 1, 100).await;
    let second_invoice = sent_invoice(&ctx, 1, 100).await;

    let a = ctx
        .payments
        .record_payment(TENANT, &first_invoice, payment_request(50, "txn-shared"))
        .await
        .unwrap();
    let b = ctx
        .payments
        .record_payment(TENANT, &second_invoice, payment_request(50, "txn-shared"))
        .await
        .unwrap();

    assert!(!a.duplicate);
    assert!(!b.duplicate);
    assert_ne!(a.payment.id, b.payment.id);
}

// End-to-end ledger flow over the in-memory store: create an invoice, send
// it, pay it down in parts, and watch the derived state move through the
// lifecycle.

#[path = "../helpers/mod.rs"]
mod helpers;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use helpers::{invoice_request, payment_request, sent_invoice, test_context, TENANT};
use payledger::core::AppError;
use payledger::modules::invoices::models::{CreateLineItemRequest, InvoiceStatus};
use payledger::modules::payments::models::{PaymentMethod, PaymentStatus, RecordPaymentRequest};

#[tokio::test]
async fn test_invoice_creation_totals_and_defaults() {
    let ctx = test_context();

    // {qty: 1, price: 5000} at the default 8% tax rate
    let invoice = ctx
        .invoices
        .create_invoice(TENANT, invoice_request(vec![("Deck construction", 1, 5000)]))
        .await
        .unwrap();

    assert_eq!(invoice.subtotal, dec!(5000));
    assert_eq!(invoice.tax, dec!(400.00));
    assert_eq!(invoice.total, dec!(5400.00));
    assert_eq!(invoice.amount_paid, Decimal::ZERO);
    assert_eq!(invoice.balance_due, dec!(5400.00));
    assert_eq!(invoice.status, InvoiceStatus::Draft);
    assert_eq!(invoice.number, "INV-000001");
    assert!(invoice.payment_link.starts_with("pay_"));
}

#[tokio::test]
async fn test_payment_link_is_stable_across_reads() {
    let ctx = test_context();

    let created = ctx
        .invoices
        .create_invoice(TENANT, invoice_request(vec![("Service", 1, 100)]))
        .await
        .unwrap();

    let first = ctx.invoices.get_invoice(TENANT, &created.id).await.unwrap();
    let second = ctx.invoices.get_invoice(TENANT, &created.id).await.unwrap();

    assert_eq!(created.payment_link, first.payment_link);
    assert_eq!(first.payment_link, second.payment_link);
}

#[tokio::test]
async fn test_invoice_numbers_are_sequential_per_tenant() {
    let ctx = test_context();

    for expected in ["INV-000001", "INV-000002", "INV-000003"] {
        let invoice = ctx
            .invoices
            .create_invoice(TENANT, invoice_request(vec![("Service", 1, 100)]))
            .await
            .unwrap();
        assert_eq!(invoice.number, expected);
    }

    // A different tenant starts its own sequence
    let other = ctx
        .invoices
        .create_invoice("tenant-2", invoice_request(vec![("Service", 1, 100)]))
        .await
        .unwrap();
    assert_eq!(other.number, "INV-000001");
}

#[tokio::test]
async fn test_partial_payment_with_fee_breakdown() {
    let ctx = test_context();
    let invoice_id = sent_invoice(&ctx, 1, 5000).await; // total 5400

    let result = ctx
        .payments
        .record_payment(TENANT, &invoice_id, payment_request(2700, "txn-1"))
        .await
        .unwrap();

    // 2700 * 0.029 = 78.30, + 0.30 fixed = 78.60; platform 2% = 54.00
    assert_eq!(result.payment.amount, dec!(2700));
    assert_eq!(result.payment.processing_fee, dec!(78.60));
    assert_eq!(result.payment.platform_fee, dec!(54.00));
    assert_eq!(result.payment.net_amount, dec!(2567.40));
    assert_eq!(result.payment.status, PaymentStatus::Completed);
    assert!(!result.duplicate);

    assert_eq!(result.invoice.amount_paid, dec!(2700));
    assert_eq!(result.invoice.balance_due, dec!(2700.00));
    assert_eq!(result.invoice.status, InvoiceStatus::PartiallyPaid);
}

#[tokio::test]
async fn test_full_payment_reaches_paid_and_closes_invoice() {
    let ctx = test_context();
    let invoice_id = sent_invoice(&ctx, 1, 5000).await; // total 5400

    ctx.payments
        .record_payment(TENANT, &invoice_id, payment_request(2700, "txn-1"))
        .await
        .unwrap();

    let second = ctx
        .payments
        .record_payment(TENANT, &invoice_id, payment_request(2700, "txn-2"))
        .await
        .unwrap();

    assert_eq!(second.invoice.amount_paid, dec!(5400));
    assert_eq!(second.invoice.status, InvoiceStatus::Paid);
    assert_eq!(second.invoice.balance_due, Decimal::ZERO);

    // A third payment attempt is rejected at the domain level
    let third = ctx
        .payments
        .record_payment(TENANT, &invoice_id, payment_request(100, "txn-3"))
        .await;

    match third {
        Err(AppError::InvalidTransition { current, .. }) => assert_eq!(current, "paid"),
        other => panic!("expected InvalidTransition, got {:?}", other.map(|_| ())),
    }

    // The rejected attempt left the ledger untouched
    let payments = ctx.payments.list_payments(TENANT, &invoice_id).await.unwrap();
    assert_eq!(payments.len(), 2);

    let invoice = ctx.invoices.get_invoice(TENANT, &invoice_id).await.unwrap();
    assert_eq!(invoice.amount_paid, dec!(5400));
}

#[tokio::test]
async fn test_amount_paid_matches_payment_sum() {
    let ctx = test_context();
    let invoice_id = sent_invoice(&ctx, 1, 5000).await;

    for (amount, external_ref) in [(1000, "txn-a"), (2000, "txn-b"), (400, "txn-c")] {
        ctx.payments
            .record_payment(TENANT, &invoice_id, payment_request(amount, external_ref))
            .await
            .unwrap();
    }

    let invoice = ctx.invoices.get_invoice(TENANT, &invoice_id).await.unwrap();
    let payments = ctx.payments.list_payments(TENANT, &invoice_id).await.unwrap();

    let paid: Decimal = payments.iter().map(|p| p.amount).sum();
    assert_eq!(invoice.amount_paid, paid);
    assert_eq!(invoice.amount_paid, dec!(3400));
    assert_eq!(invoice.status, InvoiceStatus::PartiallyPaid);
}

#[tokio::test]
async fn test_send_requires_draft() {
    let ctx = test_context();
    let invoice_id = sent_invoice(&ctx, 1, 100).await;

    let result = ctx.invoices.send_invoice(TENANT, &invoice_id).await;

    match result {
        Err(AppError::InvalidTransition { current, .. }) => assert_eq!(current, "sent"),
        other => panic!("expected InvalidTransition, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_create_invoice_rejects_bad_input() {
    let ctx = test_context();

    // Empty line items
    let result = ctx
        .invoices
        .create_invoice(TENANT, invoice_request(vec![]))
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    // Zero quantity
    let result = ctx
        .invoices
        .create_invoice(TENANT, invoice_request(vec![("Service", 0, 100)]))
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    // Negative unit price
    let mut request = invoice_request(vec![("Service", 1, 100)]);
    request.items = vec![CreateLineItemRequest {
        description: "Service".to_string(),
        quantity: 1,
        unit_price: dec!(-5),
    }];
    let result = ctx.invoices.create_invoice(TENANT, request).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_record_payment_rejects_bad_input() {
    let ctx = test_context();
    let invoice_id = sent_invoice(&ctx, 1, 100).await;

    // Non-positive amount
    let result = ctx
        .payments
        .record_payment(
            TENANT,
            &invoice_id,
            RecordPaymentRequest {
                amount: Decimal::ZERO,
                method: PaymentMethod::Card,
                external_transaction_id: "txn-1".to_string(),
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    // Blank external reference
    let result = ctx
        .payments
        .record_payment(TENANT, &invoice_id, payment_request(50, "   "))
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    // Unknown invoice
    let result = ctx
        .payments
        .record_payment(TENANT, "missing", payment_request(50, "txn-1"))
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    // Nothing was recorded by any of the rejected calls
    let payments = ctx.payments.list_payments(TENANT, &invoice_id).await.unwrap();
    assert!(payments.is_empty());
}

#[tokio::test]
async fn test_invoices_are_tenant_scoped() {
    let ctx = test_context();
    let invoice_id = sent_invoice(&ctx, 1, 100).await;

    let result = ctx.invoices.get_invoice("tenant-2", &invoice_id).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    let result = ctx
        .payments
        .record_payment("tenant-2", &invoice_id, payment_request(50, "txn-1"))
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_list_invoices_filters() {
    let ctx = test_context();

    let draft = ctx
        .invoices
        .create_invoice(TENANT, invoice_request(vec![("Service", 1, 100)]))
        .await
        .unwrap();
    let sent = sent_invoice(&ctx, 1, 200).await;

    let all = ctx
        .invoices
        .list_invoices(TENANT, Default::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 2);

    let drafts = ctx
        .invoices
        .list_invoices(
            TENANT,
            payledger::modules::ledger::InvoiceFilter {
                status: Some(InvoiceStatus::Draft),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].id, draft.id);

    let sents = ctx
        .invoices
        .list_invoices(
            TENANT,
            payledger::modules::ledger::InvoiceFilter {
                status: Some(InvoiceStatus::Sent),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(sents.len(), 1);
    assert_eq!(sents[0].id, sent);

    // Other tenants see nothing
    let other = ctx
        .invoices
        .list_invoices("tenant-2", Default::default())
        .await
        .unwrap();
    assert!(other.is_empty());
}

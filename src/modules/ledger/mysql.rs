// MySQL ledger store. Invoice and payment writes that belong together run in
// one transaction; the invoice row carries a version column and every commit
// is a compare-and-swap on it. `(invoice_id, external_ref)` is unique so a
// racing duplicate submission surfaces as a constraint violation instead of a
// second payment row. Schema lives in migrations/.

use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, QueryBuilder, Row};

use super::store::{CommitOutcome, InvoiceFilter, LedgerStore};
use crate::core::{AppError, Result};
use crate::modules::invoices::models::{Invoice, InvoiceStatus, LineItem};
use crate::modules::payments::models::{Payment, PaymentMethod, PaymentStatus};

/// Ledger store backed by a MySQL pool
pub struct MySqlLedgerStore {
    pool: MySqlPool,
}

impl MySqlLedgerStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn load_line_items(&self, invoice_id: &str) -> Result<Vec<LineItem>> {
        let rows = sqlx::query(
            r#"
            SELECT id, invoice_id, description, quantity, unit_price, line_total
            FROM line_items
            WHERE invoice_id = ?
            ORDER BY position
            "#,
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(line_item_from_row).collect()
    }
}

fn invoice_from_row(row: &MySqlRow, items: Vec<LineItem>) -> Result<Invoice> {
    let status: String = row.try_get("status")?;
    let status = InvoiceStatus::from_str(&status)
        .map_err(|e| AppError::internal(format!("Invalid status in database: {}", e)))?;

    Ok(Invoice {
        id: row.try_get("id")?,
        tenant_id: row.try_get("tenant_id")?,
        lead_id: row.try_get("lead_id")?,
        lead_name: row.try_get("lead_name")?,
        number: row.try_get("number")?,
        items,
        subtotal: row.try_get("subtotal")?,
        tax_rate: row.try_get("tax_rate")?,
        tax: row.try_get("tax")?,
        total: row.try_get("total")?,
        amount_paid: row.try_get("amount_paid")?,
        status,
        date_issued: row.try_get("date_issued")?,
        date_due: row.try_get("date_due")?,
        payment_link: row.try_get("payment_link")?,
        version: row.try_get("version")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn line_item_from_row(row: &MySqlRow) -> Result<LineItem> {
    Ok(LineItem {
        id: row.try_get("id")?,
        invoice_id: row.try_get("invoice_id")?,
        description: row.try_get("description")?,
        quantity: row.try_get("quantity")?,
        unit_price: row.try_get("unit_price")?,
        line_total: row.try_get("line_total")?,
    })
}

fn payment_from_row(row: &MySqlRow) -> Result<Payment> {
    let method: String = row.try_get("method")?;
    let method = PaymentMethod::from_str(&method)
        .map_err(|e| AppError::internal(format!("Invalid payment method in database: {}", e)))?;

    let status: String = row.try_get("status")?;
    let status = PaymentStatus::from_str(&status)
        .map_err(|e| AppError::internal(format!("Invalid payment status in database: {}", e)))?;

    Ok(Payment {
        id: row.try_get("id")?,
        invoice_id: row.try_get("invoice_id")?,
        tenant_id: row.try_get("tenant_id")?,
        amount: row.try_get("amount")?,
        method,
        processing_fee: row.try_get("processing_fee")?,
        platform_fee: row.try_get("platform_fee")?,
        net_amount: row.try_get("net_amount")?,
        status,
        external_ref: row.try_get("external_ref")?,
        date: row.try_get("date")?,
    })
}

const INVOICE_COLUMNS: &str = "id, tenant_id, lead_id, lead_name, number, subtotal, tax_rate, \
     tax, total, amount_paid, status, date_issued, date_due, payment_link, version, \
     created_at, updated_at";

const PAYMENT_COLUMNS: &str = "id, invoice_id, tenant_id, amount, method, processing_fee, \
     platform_fee, net_amount, status, external_ref, date";

#[async_trait]
impl LedgerStore for MySqlLedgerStore {
    async fn create_invoice(&self, invoice: &Invoice) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO invoices (
                id, tenant_id, lead_id, lead_name, number, subtotal, tax_rate,
                tax, total, amount_paid, status, date_issued, date_due,
                payment_link, version, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&invoice.id)
        .bind(&invoice.tenant_id)
        .bind(&invoice.lead_id)
        .bind(&invoice.lead_name)
        .bind(&invoice.number)
        .bind(invoice.subtotal)
        .bind(invoice.tax_rate)
        .bind(invoice.tax)
        .bind(invoice.total)
        .bind(invoice.amount_paid)
        .bind(invoice.status.to_string())
        .bind(invoice.date_issued)
        .bind(invoice.date_due)
        .bind(&invoice.payment_link)
        .bind(invoice.version)
        .bind(invoice.created_at)
        .bind(invoice.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if e.as_database_error().is_some_and(|db| db.is_unique_violation()) {
                AppError::validation(format!(
                    "Invoice number '{}' already exists for tenant",
                    invoice.number
                ))
            } else {
                AppError::Database(e)
            }
        })?;

        for (position, item) in invoice.items.iter().enumerate() {
            let line_id = item
                .id
                .clone()
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

            sqlx::query(
                r#"
                INSERT INTO line_items (
                    id, invoice_id, description, quantity, unit_price, line_total, position
                ) VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(line_id)
            .bind(&invoice.id)
            .bind(&item.description)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.line_total)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_invoice(&self, tenant_id: &str, invoice_id: &str) -> Result<Option<Invoice>> {
        let row = sqlx::query(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = ? AND tenant_id = ?"
        ))
        .bind(invoice_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = self.load_line_items(invoice_id).await?;
        Ok(Some(invoice_from_row(&row, items)?))
    }

    async fn list_invoices(
        &self,
        tenant_id: &str,
        filter: &InvoiceFilter,
    ) -> Result<Vec<Invoice>> {
        let mut builder = QueryBuilder::new(format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE tenant_id = "
        ));
        builder.push_bind(tenant_id);

        if let Some(status) = filter.status {
            builder.push(" AND status = ");
            builder.push_bind(status.to_string());
        }

        if let Some(lead_id) = &filter.lead_id {
            builder.push(" AND lead_id = ");
            builder.push_bind(lead_id);
        }

        builder.push(" ORDER BY created_at DESC LIMIT ");
        builder.push_bind(filter.limit.clamp(0, 100));
        builder.push(" OFFSET ");
        builder.push_bind(filter.offset.max(0));

        let rows = builder.build().fetch_all(&self.pool).await?;

        let mut invoices = Vec::with_capacity(rows.len());
        for row in &rows {
            let id: String = row.try_get("id")?;
            let items = self.load_line_items(&id).await?;
            invoices.push(invoice_from_row(row, items)?);
        }

        Ok(invoices)
    }

    async fn transition_status(
        &self,
        tenant_id: &str,
        invoice_id: &str,
        from: InvoiceStatus,
        to: InvoiceStatus,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE invoices
            SET status = ?, version = version + 1, updated_at = NOW()
            WHERE id = ? AND tenant_id = ? AND status = ?
            "#,
        )
        .bind(to.to_string())
        .bind(invoice_id)
        .bind(tenant_id)
        .bind(from.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn next_invoice_number(&self, tenant_id: &str) -> Result<u64> {
        // LAST_INSERT_ID is per-connection, so both statements must run on
        // the same one. rows_affected is 1 for a fresh tenant row, 2 for the
        // duplicate-key path where LAST_INSERT_ID carries the new sequence.
        let mut conn = self.pool.acquire().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO invoice_sequences (tenant_id, seq)
            VALUES (?, 1)
            ON DUPLICATE KEY UPDATE seq = LAST_INSERT_ID(seq + 1)
            "#,
        )
        .bind(tenant_id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(1);
        }

        let row = sqlx::query("SELECT LAST_INSERT_ID() AS seq")
            .fetch_one(&mut *conn)
            .await?;
        let seq: u64 = row.try_get("seq")?;
        Ok(seq)
    }

    async fn find_payment_by_external_ref(
        &self,
        tenant_id: &str,
        invoice_id: &str,
        external_ref: &str,
    ) -> Result<Option<Payment>> {
        let row = sqlx::query(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments \
             WHERE invoice_id = ? AND tenant_id = ? AND external_ref = ?"
        ))
        .bind(invoice_id)
        .bind(tenant_id)
        .bind(external_ref)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(payment_from_row).transpose()
    }

    async fn list_payments(&self, tenant_id: &str, invoice_id: &str) -> Result<Vec<Payment>> {
        let rows = sqlx::query(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments \
             WHERE invoice_id = ? AND tenant_id = ? ORDER BY date, id"
        ))
        .bind(invoice_id)
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(payment_from_row).collect()
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
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE invoices
            SET amount_paid = ?, status = ?, version = version + 1, updated_at = NOW()
            WHERE id = ? AND tenant_id = ? AND version = ?
            "#,
        )
        .bind(new_amount_paid)
        .bind(new_status.to_string())
        .bind(invoice_id)
        .bind(tenant_id)
        .bind(expected_version)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // Dropped transaction rolls back; nothing was written
            return Ok(CommitOutcome::VersionConflict);
        }

        let insert = sqlx::query(
            r#"
            INSERT INTO payments (
                id, invoice_id, tenant_id, amount, method, processing_fee,
                platform_fee, net_amount, status, external_ref, date
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.invoice_id)
        .bind(&payment.tenant_id)
        .bind(payment.amount)
        .bind(payment.method.to_string())
        .bind(payment.processing_fee)
        .bind(payment.platform_fee)
        .bind(payment.net_amount)
        .bind(payment.status.to_string())
        .bind(&payment.external_ref)
        .bind(payment.date)
        .execute(&mut *tx)
        .await;

        match insert {
            Ok(_) => {
                tx.commit().await?;
                Ok(CommitOutcome::Committed)
            }
            Err(e) if e.as_database_error().is_some_and(|db| db.is_unique_violation()) => {
                Ok(CommitOutcome::DuplicateExternalRef)
            }
            Err(e) => Err(AppError::Database(e)),
        }
    }
}

//! Postgres-backed invoice store.
//!
//! The upsert runs in one transaction: any existing invoice with the
//! same number (within the tenant) is deleted along with its order and
//! lines, then the new records are written. Customers are resolved by
//! their vendor-side external id first, by exact name second, and
//! created when neither matches.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{prepare_lines, ImportOptions, ImportOutcome, InvoiceStore};
use crate::error::StoreError;
use crate::models::invoice::ParsedInvoice;

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }

    async fn tenant_id(&self, slug: &str) -> Result<Uuid, StoreError> {
        let row = sqlx::query("SELECT id FROM tenants WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| r.get("id"))
            .ok_or_else(|| StoreError::UnknownTenant(slug.to_string()))
    }

    /// Customer id for the invoice's bill-to block, creating the
    /// record when no existing one matches.
    async fn resolve_customer(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant_id: Uuid,
        invoice: &ParsedInvoice,
    ) -> Result<(Uuid, bool), StoreError> {
        if let Some(external_id) = invoice.customer.customer_external_id.as_deref() {
            let row = sqlx::query(
                "SELECT id FROM customers WHERE tenant_id = $1 AND external_id = $2",
            )
            .bind(tenant_id)
            .bind(external_id)
            .fetch_optional(&mut **tx)
            .await?;
            if let Some(row) = row {
                return Ok((row.get("id"), false));
            }
        }

        if let Some(name) = invoice.customer.name.as_deref() {
            let row = sqlx::query("SELECT id FROM customers WHERE tenant_id = $1 AND name = $2")
                .bind(tenant_id)
                .bind(name)
                .fetch_optional(&mut **tx)
                .await?;
            if let Some(row) = row {
                return Ok((row.get("id"), false));
            }
        }

        let id = Uuid::new_v4();
        let name = invoice
            .customer
            .name
            .clone()
            .unwrap_or_else(|| "Unknown Customer".to_string());
        info!(customer = %name, "creating customer record");
        sqlx::query(
            "INSERT INTO customers (id, tenant_id, name, external_id, license_number, address_lines) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(id)
        .bind(tenant_id)
        .bind(&name)
        .bind(invoice.customer.customer_external_id.as_deref())
        .bind(invoice.customer.license_number.as_deref())
        .bind(&invoice.customer.lines)
        .execute(&mut **tx)
        .await?;

        Ok((id, true))
    }

    /// Sku id for a line's code. Lookup only: an unknown code means
    /// the line is skipped, never that a catalog record is invented.
    async fn lookup_sku(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant_id: Uuid,
        code: &str,
    ) -> Result<Option<Uuid>, StoreError> {
        let row = sqlx::query("SELECT id FROM skus WHERE tenant_id = $1 AND code = $2")
            .bind(tenant_id)
            .bind(code)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(row.map(|r| r.get("id")))
    }

    /// Delete any existing invoice with this number, with its order
    /// and order lines. Returns whether anything was removed.
    async fn delete_existing(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        tenant_id: Uuid,
        invoice_number: &str,
    ) -> Result<bool, StoreError> {
        let existing = sqlx::query(
            "SELECT id, order_id FROM invoices WHERE tenant_id = $1 AND invoice_number = $2",
        )
        .bind(tenant_id)
        .bind(invoice_number)
        .fetch_optional(&mut **tx)
        .await?;

        let Some(existing) = existing else {
            return Ok(false);
        };
        let invoice_id: Uuid = existing.get("id");
        let order_id: Option<Uuid> = existing.get("order_id");

        debug!(invoice = invoice_number, "replacing existing invoice");
        if let Some(order_id) = order_id {
            sqlx::query("DELETE FROM order_lines WHERE order_id = $1")
                .bind(order_id)
                .execute(&mut **tx)
                .await?;
            sqlx::query("DELETE FROM orders WHERE id = $1")
                .bind(order_id)
                .execute(&mut **tx)
                .await?;
        }
        sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(invoice_id)
            .execute(&mut **tx)
            .await?;

        Ok(true)
    }
}

#[async_trait]
impl InvoiceStore for PostgresStore {
    async fn upsert_invoice(
        &self,
        invoice: &ParsedInvoice,
        options: &ImportOptions,
    ) -> Result<ImportOutcome, StoreError> {
        let tenant_id = self.tenant_id(&options.tenant_slug).await?;
        let (lines, mut lines_skipped) = prepare_lines(invoice, options.default_case_multiplier);

        let mut tx = self.pool.begin().await?;

        let replaced = self
            .delete_existing(&mut tx, tenant_id, &invoice.invoice_number)
            .await?;
        let (customer_id, customer_created) =
            self.resolve_customer(&mut tx, tenant_id, invoice).await?;

        let order_id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO orders (id, tenant_id, customer_id, order_date, currency, source) \
             VALUES ($1, $2, $3, $4, $5, 'invoice-import')",
        )
        .bind(order_id)
        .bind(tenant_id)
        .bind(customer_id)
        .bind(invoice.invoice_date)
        .bind(&options.currency)
        .execute(&mut *tx)
        .await?;

        let invoice_id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO invoices \
             (id, tenant_id, order_id, invoice_number, invoice_date, vendor, total, source_file) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(invoice_id)
        .bind(tenant_id)
        .bind(order_id)
        .bind(&invoice.invoice_number)
        .bind(invoice.invoice_date)
        .bind(&invoice.vendor)
        .bind(invoice.total)
        .bind(&invoice.source_file)
        .execute(&mut *tx)
        .await?;

        let mut lines_written = 0;
        for line in &lines {
            let Some(sku_id) = self.lookup_sku(&mut tx, tenant_id, &line.sku_code).await? else {
                warn!(
                    invoice = %invoice.invoice_number,
                    sku = %line.sku_code,
                    "skipping line with unknown SKU"
                );
                lines_skipped += 1;
                continue;
            };
            sqlx::query(
                "INSERT INTO order_lines \
                 (id, order_id, sku_id, description, quantity, unit_price, amount) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(Uuid::new_v4())
            .bind(order_id)
            .bind(sku_id)
            .bind(&line.description)
            .bind(line.quantity as i32)
            .bind(line.unit_price)
            .bind(line.amount)
            .execute(&mut *tx)
            .await?;
            lines_written += 1;
        }

        tx.commit().await?;

        Ok(ImportOutcome {
            replaced,
            customer_created,
            lines_written,
            lines_skipped,
        })
    }
}

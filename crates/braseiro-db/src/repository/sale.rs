//! # Sale Repository
//!
//! Database operations for immutable sale records.
//!
//! ## Storage Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sales           one header per transaction (total, method, register)  │
//! │  sale_items      frozen product snapshots, ordered by position         │
//! │                                                                         │
//! │  Sales are INSERT-only: no update or delete method exists here.        │
//! │  Register close aggregates are computed by scanning this table, so    │
//! │  they can never disagree with history.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use braseiro_core::{PaymentMethod, Sale, SaleItem};

/// Per-register aggregate computed at close time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterTotals {
    pub total_cents: i64,
    pub sales_count: i64,
    pub by_method: HashMap<PaymentMethod, i64>,
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Inserts a sale header together with its line items.
    ///
    /// ## Snapshot Pattern
    /// Product name and unit price are frozen in `sale_items`; the sale
    /// survives any later catalog edit untouched.
    pub async fn insert(&self, conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
        debug!(id = %sale.id, total_cents = sale.total_cents, "Inserting sale");

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, timestamp, total_cents, payment_method,
                cash_register_id, amount_received_cents, change_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&sale.id)
        .bind(sale.timestamp)
        .bind(sale.total_cents)
        .bind(sale.payment_method.as_str())
        .bind(&sale.cash_register_id)
        .bind(sale.amount_received_cents)
        .bind(sale.change_cents)
        .execute(&mut *conn)
        .await?;

        for (position, item) in sale.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, product_id, product_name,
                    quantity, unit_price_cents, position
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&sale.id)
            .bind(&item.product_id)
            .bind(&item.product_name)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .bind(position as i64)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }

    /// Gets all sales with their items, newest first.
    pub async fn get_all(&self) -> DbResult<Vec<Sale>> {
        let rows = sqlx::query(
            r#"
            SELECT id, timestamp, total_cents, payment_method,
                   cash_register_id, amount_received_cents, change_cents
            FROM sales
            ORDER BY timestamp DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut sales: Vec<Sale> = rows.iter().map(map_sale).collect::<DbResult<_>>()?;

        // One pass over all line items, grouped by sale id.
        let item_rows = sqlx::query(
            r#"
            SELECT sale_id, product_id, product_name, quantity, unit_price_cents
            FROM sale_items
            ORDER BY sale_id, position
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut items_by_sale: HashMap<String, Vec<SaleItem>> = HashMap::new();
        for row in &item_rows {
            let sale_id: String = row.try_get("sale_id")?;
            items_by_sale.entry(sale_id).or_default().push(map_item(row)?);
        }

        for sale in &mut sales {
            if let Some(items) = items_by_sale.remove(&sale.id) {
                sale.items = items;
            }
        }

        Ok(sales)
    }

    /// Checks whether any sale line references the given product.
    ///
    /// Drives the soft-delete rule: products with history are only ever
    /// deactivated.
    pub async fn references_product(&self, product_id: &str) -> DbResult<bool> {
        let exists: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM sale_items WHERE product_id = ?1)",
        )
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists != 0)
    }

    /// Aggregates one register's sales: grand total, count, and the
    /// per-method breakdown. A full scan-and-sum, never incremental, so
    /// the result always agrees with the sale history.
    pub async fn register_totals(&self, register_id: &str) -> DbResult<RegisterTotals> {
        let rows = sqlx::query(
            r#"
            SELECT payment_method, COUNT(*) AS sales_count, SUM(total_cents) AS total_cents
            FROM sales
            WHERE cash_register_id = ?1
            GROUP BY payment_method
            "#,
        )
        .bind(register_id)
        .fetch_all(&self.pool)
        .await?;

        let mut totals = RegisterTotals {
            total_cents: 0,
            sales_count: 0,
            by_method: HashMap::new(),
        };

        for row in &rows {
            let method_raw: String = row.try_get("payment_method")?;
            let method = PaymentMethod::parse(&method_raw).ok_or_else(|| {
                DbError::decode(
                    "sales.payment_method",
                    format!("unknown payment method '{method_raw}'"),
                )
            })?;
            let count: i64 = row.try_get("sales_count")?;
            let amount: i64 = row.try_get("total_cents")?;

            totals.total_cents += amount;
            totals.sales_count += count;
            totals.by_method.insert(method, amount);
        }

        Ok(totals)
    }
}

fn map_sale(row: &SqliteRow) -> DbResult<Sale> {
    let method_raw: String = row.try_get("payment_method")?;
    let payment_method = PaymentMethod::parse(&method_raw).ok_or_else(|| {
        DbError::decode(
            "sales.payment_method",
            format!("unknown payment method '{method_raw}'"),
        )
    })?;

    let timestamp: DateTime<Utc> = row.try_get("timestamp")?;

    Ok(Sale {
        id: row.try_get("id")?,
        timestamp,
        items: Vec::new(), // filled in by the caller
        total_cents: row.try_get("total_cents")?,
        payment_method,
        cash_register_id: row.try_get("cash_register_id")?,
        amount_received_cents: row.try_get("amount_received_cents")?,
        change_cents: row.try_get("change_cents")?,
    })
}

fn map_item(row: &SqliteRow) -> DbResult<SaleItem> {
    Ok(SaleItem {
        product_id: row.try_get("product_id")?,
        product_name: row.try_get("product_name")?,
        quantity: row.try_get("quantity")?,
        unit_price_cents: row.try_get("unit_price_cents")?,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use braseiro_core::{CashRegister, RegisterStatus};

    async fn seed_register(db: &Database, id: &str) {
        let register = CashRegister {
            id: id.to_string(),
            opening_time: Utc::now(),
            closing_time: None,
            status: RegisterStatus::Open,
            initial_balance_cents: 0,
            total_sales_cents: 0,
            sales_count: 0,
            sales_by_method: CashRegister::empty_breakdown(),
        };
        let mut conn = db.pool().acquire().await.unwrap();
        db.registers().insert(&mut conn, &register).await.unwrap();
    }

    fn sale(id: &str, register_id: &str, method: PaymentMethod, total_cents: i64) -> Sale {
        Sale {
            id: id.to_string(),
            timestamp: Utc::now(),
            items: vec![SaleItem {
                product_id: "p1".to_string(),
                product_name: "Espetinho de Carne".to_string(),
                quantity: 1,
                unit_price_cents: total_cents,
            }],
            total_cents,
            payment_method: method,
            cash_register_id: register_id.to_string(),
            amount_received_cents: None,
            change_cents: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_load_with_items() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_register(&db, "reg_1").await;
        let repo = db.sales();

        {
            let mut conn = db.pool().acquire().await.unwrap();
            repo.insert(&mut conn, &sale("s1", "reg_1", PaymentMethod::Cash, 1200))
                .await
                .unwrap();
        }

        let all = repo.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].items.len(), 1);
        assert_eq!(all[0].items[0].product_name, "Espetinho de Carne");

        assert!(repo.references_product("p1").await.unwrap());
        assert!(!repo.references_product("ghost").await.unwrap());
    }

    #[tokio::test]
    async fn test_register_totals_scan() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_register(&db, "reg_1").await;
        seed_register(&db, "reg_other").await;
        let repo = db.sales();

        {
            let mut conn = db.pool().acquire().await.unwrap();
            repo.insert(&mut conn, &sale("s1", "reg_1", PaymentMethod::Cash, 1200))
                .await
                .unwrap();
            repo.insert(&mut conn, &sale("s2", "reg_1", PaymentMethod::Pix, 2800))
                .await
                .unwrap();
            repo.insert(&mut conn, &sale("s3", "reg_1", PaymentMethod::Pix, 600))
                .await
                .unwrap();
            // Another register's sale must not leak into the totals.
            repo.insert(&mut conn, &sale("s4", "reg_other", PaymentMethod::Cash, 9999))
                .await
                .unwrap();
        }

        let totals = repo.register_totals("reg_1").await.unwrap();
        assert_eq!(totals.total_cents, 4600);
        assert_eq!(totals.sales_count, 3);
        assert_eq!(totals.by_method.get(&PaymentMethod::Cash), Some(&1200));
        assert_eq!(totals.by_method.get(&PaymentMethod::Pix), Some(&3400));

        let empty = repo.register_totals("reg_unused").await.unwrap();
        assert_eq!(empty.total_cents, 0);
        assert_eq!(empty.sales_count, 0);
    }
}

//! # Cash Register Repository
//!
//! Database operations for cash drawer sessions. The single-open-register
//! invariant is *checked* by the engine through [`RegisterRepository::find_open`];
//! keeping the check as a store query (not an in-memory flag) means the
//! invariant survives restarts.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use std::collections::HashMap;
use tracing::debug;

use crate::error::{DbError, DbResult};
use braseiro_core::{CashRegister, PaymentMethod, RegisterStatus};

/// Repository for cash register database operations.
#[derive(Debug, Clone)]
pub struct RegisterRepository {
    pool: SqlitePool,
}

impl RegisterRepository {
    /// Creates a new RegisterRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RegisterRepository { pool }
    }

    /// Gets a register by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<CashRegister>> {
        let row = sqlx::query(
            r#"
            SELECT id, opening_time, closing_time, status, initial_balance_cents,
                   total_sales_cents, sales_count, sales_by_method
            FROM cash_registers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_register).transpose()
    }

    /// Gets all registers, newest session first.
    pub async fn get_all(&self) -> DbResult<Vec<CashRegister>> {
        let rows = sqlx::query(
            r#"
            SELECT id, opening_time, closing_time, status, initial_balance_cents,
                   total_sales_cents, sales_count, sales_by_method
            FROM cash_registers
            ORDER BY opening_time DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_register).collect()
    }

    /// Finds the currently open register, if any.
    ///
    /// Scan-by-index over `status`; at most one row can match when the
    /// engine upholds its invariant.
    pub async fn find_open(&self) -> DbResult<Option<CashRegister>> {
        let row = sqlx::query(
            r#"
            SELECT id, opening_time, closing_time, status, initial_balance_cents,
                   total_sales_cents, sales_count, sales_by_method
            FROM cash_registers
            WHERE status = 'open'
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_register).transpose()
    }

    /// Inserts a new register session.
    pub async fn insert(
        &self,
        conn: &mut SqliteConnection,
        register: &CashRegister,
    ) -> DbResult<()> {
        debug!(id = %register.id, "Inserting cash register");

        let by_method = encode_breakdown(&register.sales_by_method)?;

        sqlx::query(
            r#"
            INSERT INTO cash_registers (
                id, opening_time, closing_time, status, initial_balance_cents,
                total_sales_cents, sales_count, sales_by_method
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&register.id)
        .bind(register.opening_time)
        .bind(register.closing_time)
        .bind(register.status.as_str())
        .bind(register.initial_balance_cents)
        .bind(register.total_sales_cents)
        .bind(register.sales_count)
        .bind(by_method)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Stamps a register closed with its scan-computed aggregates.
    pub async fn close(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        closing_time: DateTime<Utc>,
        total_sales_cents: i64,
        sales_count: i64,
        sales_by_method: &HashMap<PaymentMethod, i64>,
    ) -> DbResult<()> {
        let by_method = encode_breakdown(sales_by_method)?;

        let result = sqlx::query(
            r#"
            UPDATE cash_registers SET
                status = 'closed',
                closing_time = ?2,
                total_sales_cents = ?3,
                sales_count = ?4,
                sales_by_method = ?5
            WHERE id = ?1 AND status = 'open'
            "#,
        )
        .bind(id)
        .bind(closing_time)
        .bind(total_sales_cents)
        .bind(sales_count)
        .bind(by_method)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CashRegister (open)", id));
        }

        Ok(())
    }
}

fn encode_breakdown(by_method: &HashMap<PaymentMethod, i64>) -> DbResult<String> {
    serde_json::to_string(by_method)
        .map_err(|e| DbError::decode("cash_registers.sales_by_method", e))
}

fn map_register(row: &SqliteRow) -> DbResult<CashRegister> {
    let status_raw: String = row.try_get("status")?;
    let status = RegisterStatus::parse(&status_raw).ok_or_else(|| {
        DbError::decode(
            "cash_registers.status",
            format!("unknown status '{status_raw}'"),
        )
    })?;

    let by_method_raw: String = row.try_get("sales_by_method")?;
    let sales_by_method: HashMap<PaymentMethod, i64> = serde_json::from_str(&by_method_raw)
        .map_err(|e| DbError::decode("cash_registers.sales_by_method", e))?;

    let opening_time: DateTime<Utc> = row.try_get("opening_time")?;
    let closing_time: Option<DateTime<Utc>> = row.try_get("closing_time")?;

    Ok(CashRegister {
        id: row.try_get("id")?,
        opening_time,
        closing_time,
        status,
        initial_balance_cents: row.try_get("initial_balance_cents")?,
        total_sales_cents: row.try_get("total_sales_cents")?,
        sales_count: row.try_get("sales_count")?,
        sales_by_method,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Cash Register Session Manager
//!
//! Open-to-close drawer sessions. At most one register is open at any
//! time; the check runs against the store (not an in-memory flag) so it
//! survives restarts. Close-time aggregates are computed by scanning
//! the session's sales, never incrementally, so they always agree with
//! history.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::auth::require_admin;
use crate::error::{EngineError, EngineResult};
use crate::LedgerEngine;
use braseiro_core::{
    validation, AuditAction, CashRegister, Money, RegisterStatus, User,
};

impl LedgerEngine {
    /// The currently open register, if any.
    pub async fn active_register(&self) -> EngineResult<Option<CashRegister>> {
        Ok(self.db.registers().find_open().await?)
    }

    /// All register sessions, newest first.
    pub async fn register_history(&self) -> EngineResult<Vec<CashRegister>> {
        Ok(self.db.registers().get_all().await?)
    }

    /// Opens a new register session with dual-control authorization.
    ///
    /// Fails with [`EngineError::ActiveRegisterConflict`] if a session
    /// is already open.
    pub async fn open_register(
        &self,
        solicitor: &User,
        authorizer: &User,
        initial_balance_cents: i64,
    ) -> EngineResult<CashRegister> {
        require_admin(authorizer)?;
        validation::validate_initial_balance(initial_balance_cents)?;

        let _guard = self.write_lock.lock().await;

        if self.db.registers().find_open().await?.is_some() {
            return Err(EngineError::ActiveRegisterConflict);
        }

        let register = CashRegister {
            id: Uuid::new_v4().to_string(),
            opening_time: Utc::now(),
            closing_time: None,
            status: RegisterStatus::Open,
            initial_balance_cents,
            total_sales_cents: 0,
            sales_count: 0,
            sales_by_method: CashRegister::empty_breakdown(),
        };

        let mut tx = self.begin().await?;
        self.db.registers().insert(&mut tx, &register).await?;
        self.record_audit(
            &mut tx,
            solicitor,
            authorizer,
            AuditAction::AberturaCaixa,
            format!(
                "Caixa aberto com {}",
                Money::from_cents(initial_balance_cents)
            ),
            None,
            None,
        )
        .await?;
        tx.commit().await.map_err(braseiro_db::DbError::from)?;

        info!(
            register_id = %register.id,
            initial_balance_cents,
            "Cash register opened"
        );
        Ok(register)
    }

    /// Closes the open register session with dual-control authorization.
    ///
    /// Aggregates (grand total, sale count, per-method breakdown) are
    /// computed by a full scan over the session's sales and stamped on
    /// the closed row. The breakdown always covers every payment
    /// method, zero-filled.
    pub async fn close_register(
        &self,
        solicitor: &User,
        authorizer: &User,
    ) -> EngineResult<CashRegister> {
        require_admin(authorizer)?;

        let _guard = self.write_lock.lock().await;

        let mut register = self
            .db
            .registers()
            .find_open()
            .await?
            .ok_or(EngineError::NoActiveRegister)?;

        let totals = self.db.sales().register_totals(&register.id).await?;
        let mut breakdown = CashRegister::empty_breakdown();
        for (method, cents) in &totals.by_method {
            breakdown.insert(*method, *cents);
        }

        let closing_time = Utc::now();

        let mut tx = self.begin().await?;
        self.db
            .registers()
            .close(
                &mut tx,
                &register.id,
                closing_time,
                totals.total_cents,
                totals.sales_count,
                &breakdown,
            )
            .await?;
        self.record_audit(
            &mut tx,
            solicitor,
            authorizer,
            AuditAction::FechamentoCaixa,
            format!("Total vendido: {}", Money::from_cents(totals.total_cents)),
            None,
            Some(totals.total_cents.to_string()),
        )
        .await?;
        tx.commit().await.map_err(braseiro_db::DbError::from)?;

        register.status = RegisterStatus::Closed;
        register.closing_time = Some(closing_time);
        register.total_sales_cents = totals.total_cents;
        register.sales_count = totals.sales_count;
        register.sales_by_method = breakdown;

        info!(
            register_id = %register.id,
            total_sales_cents = register.total_sales_cents,
            sales_count = register.sales_count,
            "Cash register closed"
        );
        Ok(register)
    }
}

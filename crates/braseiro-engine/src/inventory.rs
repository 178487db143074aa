//! # Inventory Mutator
//!
//! The single gateway for stock quantity changes. Every committed
//! change pairs the new quantity with exactly one signed movement in
//! the same transaction; direct sales deductions come through here too
//! (see the sale module).
//!
//! ## Mutation Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  adjust_stock / set_stock (dual control)                                │
//! │      │                                                                  │
//! │      ├── pre-read item, compute + check new quantity  (under lock)      │
//! │      │                                                                  │
//! │      └── transaction:                                                   │
//! │            UPDATE inventory_items.quantity                              │
//! │            INSERT inventory_movements (signed delta)                    │
//! │            INSERT audit_logs (AJUSTE_ESTOQUE)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::info;
use uuid::Uuid;

use crate::auth::require_admin;
use crate::error::{EngineError, EngineResult};
use crate::LedgerEngine;
use braseiro_core::{
    AuditAction, InventoryItem, InventoryMovement, MovementType, PaymentMethod, User,
    ValidationError,
};

impl LedgerEngine {
    /// Applies one signed delta to an item inside the caller's
    /// transaction and appends the paired movement.
    ///
    /// The caller holds the write lock and passed a fresh pre-read of
    /// `item`. Returns the item's new quantity.
    pub(crate) async fn apply_adjustment(
        &self,
        conn: &mut SqliteConnection,
        item: &InventoryItem,
        delta: i64,
        movement_type: MovementType,
        actor: &User,
        observation: Option<String>,
        payment_method: Option<PaymentMethod>,
    ) -> EngineResult<i64> {
        let new_quantity = item.quantity + delta;
        if new_quantity < 0 {
            return Err(EngineError::InsufficientStock {
                item: item.name.clone(),
                available: item.quantity,
                needed: -delta,
            });
        }

        self.db
            .inventory()
            .update_quantity(conn, &item.id, new_quantity)
            .await?;

        let movement = InventoryMovement {
            id: Uuid::new_v4().to_string(),
            item_id: item.id.clone(),
            item_name: item.name.clone(),
            movement_type,
            quantity: delta,
            timestamp: Utc::now(),
            user_id: actor.id.clone(),
            user_name: actor.name.clone(),
            observation,
            payment_method,
        };
        self.db.inventory().insert_movement(conn, &movement).await?;

        Ok(new_quantity)
    }

    /// Applies a signed stock delta with dual-control authorization.
    ///
    /// `movement_type` categorizes the change (ENTRADA for restock,
    /// SAIDA for loss/breakage, AJUSTE for corrections). Returns the
    /// new quantity; on [`EngineError::InsufficientStock`] nothing is
    /// committed.
    pub async fn adjust_stock(
        &self,
        solicitor: &User,
        authorizer: &User,
        item_id: &str,
        delta: i64,
        movement_type: MovementType,
        observation: Option<String>,
    ) -> EngineResult<i64> {
        require_admin(authorizer)?;
        if delta == 0 {
            return Err(ValidationError::MustBePositive {
                field: "delta".to_string(),
            }
            .into());
        }

        let _guard = self.write_lock.lock().await;

        let item = self
            .db
            .inventory()
            .get(item_id)
            .await?
            .ok_or_else(|| EngineError::not_found("InventoryItem", item_id))?;

        let mut tx = self.begin().await?;
        let new_quantity = self
            .apply_adjustment(
                &mut tx,
                &item,
                delta,
                movement_type,
                solicitor,
                observation,
                None,
            )
            .await?;
        self.record_audit(
            &mut tx,
            solicitor,
            authorizer,
            AuditAction::AjusteEstoque,
            format!(
                "Ajuste de estoque de \"{}\": {:+} {}",
                item.name, delta, item.unit
            ),
            Some(item.quantity.to_string()),
            Some(new_quantity.to_string()),
        )
        .await?;
        tx.commit().await.map_err(braseiro_db::DbError::from)?;

        info!(
            item = %item.name,
            delta,
            new_quantity,
            "Stock adjusted"
        );
        Ok(new_quantity)
    }

    /// Sets an item's quantity to an absolute value (stock count
    /// correction), with dual-control authorization.
    ///
    /// Records one AJUSTE movement carrying the implied delta; a no-op
    /// correction (same quantity) writes the audit entry but no
    /// movement. Returns the previous quantity.
    pub async fn set_stock(
        &self,
        solicitor: &User,
        authorizer: &User,
        item_id: &str,
        new_quantity: i64,
    ) -> EngineResult<i64> {
        require_admin(authorizer)?;
        if new_quantity < 0 {
            return Err(ValidationError::OutOfRange {
                field: "quantity".to_string(),
                min: 0,
                max: i64::MAX,
            }
            .into());
        }

        let _guard = self.write_lock.lock().await;

        let item = self
            .db
            .inventory()
            .get(item_id)
            .await?
            .ok_or_else(|| EngineError::not_found("InventoryItem", item_id))?;
        let previous = item.quantity;
        let delta = new_quantity - previous;

        let mut tx = self.begin().await?;
        if delta != 0 {
            self.apply_adjustment(
                &mut tx,
                &item,
                delta,
                MovementType::Ajuste,
                solicitor,
                None,
                None,
            )
            .await?;
        }
        self.record_audit(
            &mut tx,
            solicitor,
            authorizer,
            AuditAction::AjusteEstoque,
            format!(
                "Ajuste manual de \"{}\" para {} {}",
                item.name, new_quantity, item.unit
            ),
            Some(previous.to_string()),
            Some(new_quantity.to_string()),
        )
        .await?;
        tx.commit().await.map_err(braseiro_db::DbError::from)?;

        info!(item = %item.name, previous, new_quantity, "Stock count corrected");
        Ok(previous)
    }

    /// The full movement ledger, newest first.
    pub async fn stock_movements(&self) -> EngineResult<Vec<InventoryMovement>> {
        Ok(self.db.inventory().all_movements().await?)
    }
}

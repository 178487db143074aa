//! # Inventory Repository
//!
//! Database operations for stock items and the signed movement ledger.
//!
//! ## Pairing Invariant
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every quantity change ↔ exactly one movement row                       │
//! │                                                                         │
//! │  update_quantity(conn, item, new)   ┐                                   │
//! │                                     ├── same transaction (engine)      │
//! │  insert_movement(conn, delta)       ┘                                   │
//! │                                                                         │
//! │  The repository only provides the pieces; the engine's inventory       │
//! │  mutator is the single place allowed to combine them.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use braseiro_core::{InventoryItem, InventoryMovement, MovementType, PaymentMethod};

/// Repository for inventory items and movements.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    /// Creates a new InventoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// Gets an inventory item by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<InventoryItem>> {
        let row = sqlx::query(
            "SELECT id, name, quantity, min_quantity, unit FROM inventory_items WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_item).transpose()
    }

    /// Gets all inventory items ordered by name.
    pub async fn get_all(&self) -> DbResult<Vec<InventoryItem>> {
        let rows = sqlx::query(
            "SELECT id, name, quantity, min_quantity, unit FROM inventory_items ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_item).collect()
    }

    /// Inserts a new inventory item.
    pub async fn insert(&self, conn: &mut SqliteConnection, item: &InventoryItem) -> DbResult<()> {
        debug!(id = %item.id, name = %item.name, "Inserting inventory item");

        sqlx::query(
            r#"
            INSERT INTO inventory_items (id, name, quantity, min_quantity, unit)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(item.quantity)
        .bind(item.min_quantity)
        .bind(&item.unit)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Renames an inventory item (shadow items follow their product's name).
    pub async fn rename(&self, conn: &mut SqliteConnection, id: &str, name: &str) -> DbResult<()> {
        let result = sqlx::query("UPDATE inventory_items SET name = ?2 WHERE id = ?1")
            .bind(id)
            .bind(name)
            .execute(conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("InventoryItem", id));
        }

        Ok(())
    }

    /// Sets an item's quantity to an already-validated value.
    ///
    /// The engine computes and checks the new quantity before calling;
    /// the `CHECK (quantity >= 0)` column constraint is the last line of
    /// defense, not the primary one.
    pub async fn update_quantity(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        quantity: i64,
    ) -> DbResult<()> {
        let result = sqlx::query("UPDATE inventory_items SET quantity = ?2 WHERE id = ?1")
            .bind(id)
            .bind(quantity)
            .execute(conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("InventoryItem", id));
        }

        Ok(())
    }

    /// Deletes an inventory item. Returns `false` if the id did not exist.
    pub async fn delete(&self, conn: &mut SqliteConnection, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM inventory_items WHERE id = ?1")
            .bind(id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Movements
    // =========================================================================

    /// Appends one movement to the stock ledger.
    pub async fn insert_movement(
        &self,
        conn: &mut SqliteConnection,
        movement: &InventoryMovement,
    ) -> DbResult<()> {
        debug!(
            item_id = %movement.item_id,
            movement_type = movement.movement_type.as_str(),
            quantity = movement.quantity,
            "Recording stock movement"
        );

        sqlx::query(
            r#"
            INSERT INTO inventory_movements (
                id, item_id, item_name, movement_type, quantity,
                timestamp, user_id, user_name, observation, payment_method
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&movement.id)
        .bind(&movement.item_id)
        .bind(&movement.item_name)
        .bind(movement.movement_type.as_str())
        .bind(movement.quantity)
        .bind(movement.timestamp)
        .bind(&movement.user_id)
        .bind(&movement.user_name)
        .bind(&movement.observation)
        .bind(movement.payment_method.map(|m| m.as_str()))
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Gets the full movement ledger, newest first.
    pub async fn all_movements(&self) -> DbResult<Vec<InventoryMovement>> {
        let rows = sqlx::query(
            r#"
            SELECT id, item_id, item_name, movement_type, quantity,
                   timestamp, user_id, user_name, observation, payment_method
            FROM inventory_movements
            ORDER BY timestamp DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_movement).collect()
    }

    /// Gets the movements of one item, newest first.
    pub async fn movements_for_item(&self, item_id: &str) -> DbResult<Vec<InventoryMovement>> {
        let rows = sqlx::query(
            r#"
            SELECT id, item_id, item_name, movement_type, quantity,
                   timestamp, user_id, user_name, observation, payment_method
            FROM inventory_movements
            WHERE item_id = ?1
            ORDER BY timestamp DESC
            "#,
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_movement).collect()
    }
}

fn map_item(row: &SqliteRow) -> DbResult<InventoryItem> {
    Ok(InventoryItem {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        quantity: row.try_get("quantity")?,
        min_quantity: row.try_get("min_quantity")?,
        unit: row.try_get("unit")?,
    })
}

fn map_movement(row: &SqliteRow) -> DbResult<InventoryMovement> {
    let type_raw: String = row.try_get("movement_type")?;
    let movement_type = MovementType::parse(&type_raw).ok_or_else(|| {
        DbError::decode(
            "inventory_movements.movement_type",
            format!("unknown movement type '{type_raw}'"),
        )
    })?;

    let method_raw: Option<String> = row.try_get("payment_method")?;
    let payment_method = match method_raw {
        Some(raw) => Some(PaymentMethod::parse(&raw).ok_or_else(|| {
            DbError::decode(
                "inventory_movements.payment_method",
                format!("unknown payment method '{raw}'"),
            )
        })?),
        None => None,
    };

    let timestamp: DateTime<Utc> = row.try_get("timestamp")?;

    Ok(InventoryMovement {
        id: row.try_get("id")?,
        item_id: row.try_get("item_id")?,
        item_name: row.try_get("item_name")?,
        movement_type,
        quantity: row.try_get("quantity")?,
        timestamp,
        user_id: row.try_get("user_id")?,
        user_name: row.try_get("user_name")?,
        observation: row.try_get("observation")?,
        payment_method,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn item(id: &str, name: &str, quantity: i64) -> InventoryItem {
        InventoryItem {
            id: id.to_string(),
            name: name.to_string(),
            quantity,
            min_quantity: 10,
            unit: "un".to_string(),
        }
    }

    #[tokio::test]
    async fn test_item_roundtrip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.inventory();

        {
            let mut conn = db.pool().acquire().await.unwrap();
            repo.insert(&mut conn, &item("inv_1", "Carne (Espetinho)", 150))
                .await
                .unwrap();
            repo.update_quantity(&mut conn, "inv_1", 147).await.unwrap();
            repo.rename(&mut conn, "inv_1", "Carne Bovina").await.unwrap();
        }

        let loaded = repo.get("inv_1").await.unwrap().unwrap();
        assert_eq!(loaded.quantity, 147);
        assert_eq!(loaded.name, "Carne Bovina");
    }

    #[tokio::test]
    async fn test_missing_item_update_is_not_found() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.inventory();

        let mut conn = db.pool().acquire().await.unwrap();
        let err = repo.update_quantity(&mut conn, "ghost", 1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_movement_ledger_roundtrip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.inventory();

        let movement = InventoryMovement {
            id: "move_1".to_string(),
            item_id: "inv_1".to_string(),
            item_name: "Carne (Espetinho)".to_string(),
            movement_type: MovementType::Venda,
            quantity: -3,
            timestamp: Utc::now(),
            user_id: "u1".to_string(),
            user_name: "Caixa 01".to_string(),
            observation: None,
            payment_method: Some(PaymentMethod::Pix),
        };

        {
            let mut conn = db.pool().acquire().await.unwrap();
            repo.insert_movement(&mut conn, &movement).await.unwrap();
        }

        let all = repo.all_movements().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].quantity, -3);
        assert_eq!(all[0].movement_type, MovementType::Venda);
        assert_eq!(all[0].payment_method, Some(PaymentMethod::Pix));

        let for_item = repo.movements_for_item("inv_1").await.unwrap();
        assert_eq!(for_item.len(), 1);
        assert!(repo.movements_for_item("other").await.unwrap().is_empty());
    }
}

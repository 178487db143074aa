//! # Product Repository
//!
//! Database operations for the sellable catalog. Recipes are stored as a
//! JSON array in the `recipe` column and mapped with serde_json.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use braseiro_core::{Product, ProductType, RecipeEntry};

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<Product>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, category, price_cents, product_type, recipe,
                   active, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_product).transpose()
    }

    /// Gets all products (active and inactive) ordered by name.
    ///
    /// Inactive products are included on purpose: the resolver and the
    /// reporting tier both need soft-deleted products for history.
    pub async fn get_all(&self) -> DbResult<Vec<Product>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, category, price_cents, product_type, recipe,
                   active, created_at, updated_at
            FROM products
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_product).collect()
    }

    /// Inserts or replaces a product.
    pub async fn upsert(&self, conn: &mut SqliteConnection, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, name = %product.name, "Upserting product");

        let recipe = serde_json::to_string(&product.recipe)
            .map_err(|e| DbError::decode("products.recipe", e))?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, category, price_cents, product_type, recipe,
                active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT (id) DO UPDATE SET
                name = excluded.name,
                category = excluded.category,
                price_cents = excluded.price_cents,
                product_type = excluded.product_type,
                recipe = excluded.recipe,
                active = excluded.active,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price_cents)
        .bind(product.product_type.as_str())
        .bind(recipe)
        .bind(product.active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Flips the soft-delete flag.
    pub async fn set_active(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        active: bool,
    ) -> DbResult<()> {
        let now = Utc::now();

        let result =
            sqlx::query("UPDATE products SET active = ?2, updated_at = ?3 WHERE id = ?1")
                .bind(id)
                .bind(active)
                .bind(now)
                .execute(conn)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Hard-deletes a product. Returns `false` if the id did not exist.
    pub async fn delete(&self, conn: &mut SqliteConnection, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_product(row: &SqliteRow) -> DbResult<Product> {
    let type_raw: String = row.try_get("product_type")?;
    let product_type = ProductType::parse(&type_raw).ok_or_else(|| {
        DbError::decode(
            "products.product_type",
            format!("unknown product type '{type_raw}'"),
        )
    })?;

    let recipe_raw: String = row.try_get("recipe")?;
    let recipe: Vec<RecipeEntry> = serde_json::from_str(&recipe_raw)
        .map_err(|e| DbError::decode("products.recipe", e))?;

    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at")?;

    Ok(Product {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        category: row.try_get("category")?,
        price_cents: row.try_get("price_cents")?,
        product_type,
        recipe,
        active: row.try_get("active")?,
        created_at,
        updated_at,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn product(id: &str, product_type: ProductType) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            name: "Espetinho de Carne".to_string(),
            category: "Carnes".to_string(),
            price_cents: 1200,
            product_type,
            recipe: vec![RecipeEntry {
                component_id: "inv_1".to_string(),
                quantity: 1,
            }],
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_product_roundtrip_preserves_recipe() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let original = product("p1", ProductType::Composed);
        {
            let mut conn = db.pool().acquire().await.unwrap();
            repo.upsert(&mut conn, &original).await.unwrap();
        }

        let loaded = repo.get("p1").await.unwrap().unwrap();
        assert_eq!(loaded.product_type, ProductType::Composed);
        assert_eq!(loaded.recipe, original.recipe);
        assert_eq!(loaded.price_cents, 1200);
        assert!(loaded.active);
    }

    #[tokio::test]
    async fn test_set_active_and_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        {
            let mut conn = db.pool().acquire().await.unwrap();
            repo.upsert(&mut conn, &product("p1", ProductType::Combo))
                .await
                .unwrap();
            repo.set_active(&mut conn, "p1", false).await.unwrap();
        }

        let loaded = repo.get("p1").await.unwrap().unwrap();
        assert!(!loaded.active);
        // Soft-deleted products remain visible to the catalog.
        assert_eq!(repo.get_all().await.unwrap().len(), 1);

        {
            let mut conn = db.pool().acquire().await.unwrap();
            assert!(repo.delete(&mut conn, "p1").await.unwrap());
            assert!(!repo.delete(&mut conn, "p1").await.unwrap());
        }
        assert!(repo.get("p1").await.unwrap().is_none());
    }
}

//! # User Repository
//!
//! Database operations for operators and administrators.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use braseiro_core::{User, UserRole};

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Gets a user by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<User>> {
        let row = sqlx::query("SELECT id, name, password, role FROM users WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_user).transpose()
    }

    /// Gets a user by display name (operator login lookup).
    pub async fn find_by_name(&self, name: &str) -> DbResult<Option<User>> {
        let row = sqlx::query("SELECT id, name, password, role FROM users WHERE name = ?1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_user).transpose()
    }

    /// Gets all users ordered by name.
    pub async fn get_all(&self) -> DbResult<Vec<User>> {
        let rows = sqlx::query("SELECT id, name, password, role FROM users ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(map_user).collect()
    }

    /// Counts users (used by first-run bootstrap).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Inserts or replaces a user.
    pub async fn upsert(&self, conn: &mut SqliteConnection, user: &User) -> DbResult<()> {
        debug!(id = %user.id, "Upserting user");

        sqlx::query(
            r#"
            INSERT INTO users (id, name, password, role)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (id) DO UPDATE SET
                name = excluded.name,
                password = excluded.password,
                role = excluded.role
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.password)
        .bind(user.role.as_str())
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Deletes a user. Returns `false` if the id did not exist.
    pub async fn delete(&self, conn: &mut SqliteConnection, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_user(row: &SqliteRow) -> DbResult<User> {
    let role_raw: String = row.try_get("role")?;
    let role = UserRole::parse(&role_raw)
        .ok_or_else(|| DbError::decode("users.role", format!("unknown role '{role_raw}'")))?;

    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        password: row.try_get("password")?,
        role,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Audit Log Repository
//!
//! Database operations for the append-only dual-identity audit trail.
//! Insert and read only — no update or delete method exists, on purpose.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use braseiro_core::{AuditAction, AuditLog};

/// Repository for audit log database operations.
#[derive(Debug, Clone)]
pub struct AuditLogRepository {
    pool: SqlitePool,
}

impl AuditLogRepository {
    /// Creates a new AuditLogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AuditLogRepository { pool }
    }

    /// Appends one audit entry.
    pub async fn insert(&self, conn: &mut SqliteConnection, log: &AuditLog) -> DbResult<()> {
        debug!(
            action = log.action.as_str(),
            solicited_by = %log.solicited_by_name,
            authorized_by = %log.authorized_by_name,
            "Recording audit entry"
        );

        sqlx::query(
            r#"
            INSERT INTO audit_logs (
                id, timestamp, solicited_by_id, solicited_by_name,
                authorized_by_id, authorized_by_name, action, details,
                previous_value, new_value
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&log.id)
        .bind(log.timestamp)
        .bind(&log.solicited_by_id)
        .bind(&log.solicited_by_name)
        .bind(&log.authorized_by_id)
        .bind(&log.authorized_by_name)
        .bind(log.action.as_str())
        .bind(&log.details)
        .bind(&log.previous_value)
        .bind(&log.new_value)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Gets the full audit trail, newest first.
    pub async fn get_all(&self) -> DbResult<Vec<AuditLog>> {
        let rows = sqlx::query(
            r#"
            SELECT id, timestamp, solicited_by_id, solicited_by_name,
                   authorized_by_id, authorized_by_name, action, details,
                   previous_value, new_value
            FROM audit_logs
            ORDER BY timestamp DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_log).collect()
    }

    /// Counts entries for one action (used by invariant tests).
    pub async fn count_by_action(&self, action: AuditAction) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM audit_logs WHERE action = ?1")
                .bind(action.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

fn map_log(row: &SqliteRow) -> DbResult<AuditLog> {
    let action_raw: String = row.try_get("action")?;
    let action = AuditAction::parse(&action_raw).ok_or_else(|| {
        DbError::decode("audit_logs.action", format!("unknown action '{action_raw}'"))
    })?;

    let timestamp: DateTime<Utc> = row.try_get("timestamp")?;

    Ok(AuditLog {
        id: row.try_get("id")?,
        timestamp,
        solicited_by_id: row.try_get("solicited_by_id")?,
        solicited_by_name: row.try_get("solicited_by_name")?,
        authorized_by_id: row.try_get("authorized_by_id")?,
        authorized_by_name: row.try_get("authorized_by_name")?,
        action,
        details: row.try_get("details")?,
        previous_value: row.try_get("previous_value")?,
        new_value: row.try_get("new_value")?,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_audit_roundtrip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.audit_logs();

        let log = AuditLog {
            id: "log_1".to_string(),
            timestamp: Utc::now(),
            solicited_by_id: "u2".to_string(),
            solicited_by_name: "Caixa 01".to_string(),
            authorized_by_id: "u1".to_string(),
            authorized_by_name: "Administrador".to_string(),
            action: AuditAction::AjusteEstoque,
            details: "Ajuste manual de \"Carne\" para 140 un".to_string(),
            previous_value: Some("150".to_string()),
            new_value: Some("140".to_string()),
        };

        {
            let mut conn = db.pool().acquire().await.unwrap();
            repo.insert(&mut conn, &log).await.unwrap();
        }

        let all = repo.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].action, AuditAction::AjusteEstoque);
        assert_eq!(all[0].solicited_by_id, "u2");
        assert_eq!(all[0].authorized_by_id, "u1");
        assert_eq!(all[0].previous_value.as_deref(), Some("150"));

        assert_eq!(
            repo.count_by_action(AuditAction::AjusteEstoque).await.unwrap(),
            1
        );
        assert_eq!(
            repo.count_by_action(AuditAction::AberturaCaixa).await.unwrap(),
            0
        );
    }
}

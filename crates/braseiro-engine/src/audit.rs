//! # Dual-Control Audit Recorder
//!
//! Builds and appends audit entries. Always called with the transaction
//! connection of the mutation being recorded, so an entry can never
//! exist without its mutation nor the mutation without its entry.

use chrono::Utc;
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::error::EngineResult;
use crate::LedgerEngine;
use braseiro_core::{AuditAction, AuditLog, User};

impl LedgerEngine {
    /// Appends one audit entry inside the caller's transaction.
    ///
    /// Freezes both identities (solicitor and authorizer) by id *and*
    /// name, so the trail stays readable after a user is deleted.
    #[allow(clippy::too_many_arguments)]
    pub(crate) async fn record_audit(
        &self,
        conn: &mut SqliteConnection,
        solicitor: &User,
        authorizer: &User,
        action: AuditAction,
        details: String,
        previous_value: Option<String>,
        new_value: Option<String>,
    ) -> EngineResult<()> {
        let log = AuditLog {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            solicited_by_id: solicitor.id.clone(),
            solicited_by_name: solicitor.name.clone(),
            authorized_by_id: authorizer.id.clone(),
            authorized_by_name: authorizer.name.clone(),
            action,
            details,
            previous_value,
            new_value,
        };

        self.db.audit_logs().insert(conn, &log).await?;
        Ok(())
    }

    /// The full audit trail, newest first.
    pub async fn audit_trail(&self) -> EngineResult<Vec<AuditLog>> {
        Ok(self.db.audit_logs().get_all().await?)
    }
}

//! # braseiro-engine: Transactional Ledger Engine
//!
//! The orchestration layer of Braseiro POS. Sits between the
//! presentation tier and the ledger store, and is the **only** place
//! allowed to mutate it.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Braseiro POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Frontend (Electron/React)                      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ IPC                                    │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ braseiro-engine (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌───────────┐ ┌─────────────────┐  │   │
//! │  │   │   sale   │ │ register │ │ inventory │ │ catalog / auth  │  │   │
//! │  │   │ process  │ │ open/    │ │ adjust/   │ │ upsert/delete,  │  │   │
//! │  │   │ (atomic) │ │ close    │ │ set stock │ │ dual control    │  │   │
//! │  │   └──────────┘ └──────────┘ └───────────┘ └─────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   SINGLE WRITER • ONE TRANSACTION PER OPERATION • AUDIT PAIRED  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │        braseiro-core (pure)    │    braseiro-db (SQLite)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency Model
//!
//! All mutating operations serialize on one async mutex. The engine
//! reads its pre-images under the lock, then groups every write of the
//! operation (quantity change + movement + audit + the record itself)
//! into a single store transaction. An operation either fully happens
//! or leaves no trace.
//!
//! ## Dual Control
//!
//! Sensitive mutations take a *solicitor* (who asked) and an
//! *authorizer* (the administrator who approved, credential re-verified
//! via [`LedgerEngine::verify_authorizer`]). Both identities are frozen
//! into the audit entry the operation writes.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;

mod audit;
mod auth;
mod catalog;
mod inventory;
mod register;
mod sale;
mod snapshot;

// =============================================================================
// Re-exports
// =============================================================================

pub use catalog::ProductRemoval;
pub use error::{EngineError, EngineResult};
pub use sale::SaleRequest;
pub use snapshot::LedgerSnapshot;

use sqlx::{Sqlite, Transaction};
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use braseiro_core::{User, UserRole};
use braseiro_db::{Database, DbConfig, DbError};

// =============================================================================
// First-Run Defaults
// =============================================================================

/// Name of the administrator seeded into an empty store.
pub const DEFAULT_ADMIN_NAME: &str = "Administrador";

/// Initial credential of the seeded administrator. Deployments are
/// expected to change it on first login.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin";

// =============================================================================
// LedgerEngine
// =============================================================================

/// The transaction and inventory ledger engine.
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
pub struct LedgerEngine {
    pub(crate) db: Database,
    /// Serializes every mutating operation (single-writer model).
    pub(crate) write_lock: Mutex<()>,
}

impl LedgerEngine {
    /// Opens the ledger store and runs pending migrations.
    pub async fn new(config: DbConfig) -> EngineResult<Self> {
        let db = Database::new(config).await?;
        Ok(LedgerEngine {
            db,
            write_lock: Mutex::new(()),
        })
    }

    /// Seeds the default administrator if the store has no users.
    ///
    /// Idempotent: a populated store is left untouched. Runs before any
    /// operator exists, so this is the one mutation without an audit
    /// entry.
    pub async fn bootstrap(&self) -> EngineResult<()> {
        let _guard = self.write_lock.lock().await;

        if self.db.users().count().await? > 0 {
            return Ok(());
        }

        let admin = User {
            id: Uuid::new_v4().to_string(),
            name: DEFAULT_ADMIN_NAME.to_string(),
            password: DEFAULT_ADMIN_PASSWORD.to_string(),
            role: UserRole::Admin,
        };

        let mut tx = self.begin().await?;
        self.db.users().upsert(&mut tx, &admin).await?;
        tx.commit().await.map_err(DbError::from)?;

        info!(name = DEFAULT_ADMIN_NAME, "Seeded default administrator");
        Ok(())
    }

    /// Direct access to the underlying store (read paths, tooling).
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Starts a store transaction.
    pub(crate) async fn begin(&self) -> EngineResult<Transaction<'static, Sqlite>> {
        Ok(self.db.pool().begin().await.map_err(DbError::from)?)
    }
}

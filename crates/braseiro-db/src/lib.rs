//! # braseiro-db: Ledger Store for Braseiro POS
//!
//! This crate provides database access for the Braseiro POS ledger.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Braseiro POS Data Flow                            │
//! │                                                                         │
//! │  Engine operation (process_sale, open_register, ...)                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   braseiro-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (inventory,   │    │  (embedded)  │  │   │
//! │  │   │               │    │  sale, ...)   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ one per table │    │ 001_init.sql │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (WAL mode, foreign keys on)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Transaction Protocol
//!
//! Read methods borrow the pool. Every *mutating* repository method takes
//! `&mut SqliteConnection` instead, so the engine can open one sqlx
//! transaction and commit a quantity change together with its movement
//! record and audit entry — the pairing invariants live or die on this.
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations, one per table family

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::audit::AuditLogRepository;
pub use repository::inventory::InventoryRepository;
pub use repository::product::ProductRepository;
pub use repository::register::RegisterRepository;
pub use repository::sale::SaleRepository;
pub use repository::user::UserRepository;

//! # braseiro-core: Pure Business Logic for Braseiro POS
//!
//! This crate is the **heart** of Braseiro POS. It contains all business
//! logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Braseiro POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Frontend (Electron/React)                      │   │
//! │  │    POS Screen ──► Inventory ──► Products ──► Audit Logs        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ IPC                                    │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   braseiro-engine                               │   │
//! │  │    process_sale, open_register, upsert_product, ...            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ braseiro-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ resolver  │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │  Catalog  │  │   rules   │  │   │
//! │  │   │   Sale    │  │  (cents)  │  │  expand   │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   braseiro-db (Ledger Store)                    │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, CashRegister, AuditLog, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Validation error types
//! - [`resolver`] - Bill-of-materials expansion over the product catalog
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod resolver;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use braseiro_core::Money` instead of
// `use braseiro_core::money::Money`

pub use error::ValidationError;
pub use money::Money;
pub use resolver::{resolve_requirements, Catalog, Requirements};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default stock floor a shadow inventory item is flagged at when the
/// catalog mutator auto-creates it for an individual product.
pub const SHADOW_ITEM_MIN_QUANTITY: i64 = 5;

/// Default unit label for auto-created shadow inventory items.
pub const SHADOW_ITEM_UNIT: &str = "un";

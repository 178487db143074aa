//! # Repository Implementations
//!
//! One repository per table family, each owning the SQL and row mapping
//! for its tables:
//!
//! - [`user`] - operators and administrators
//! - [`inventory`] - stock items and the signed movement ledger
//! - [`product`] - the sellable catalog
//! - [`sale`] - immutable sale headers and line items
//! - [`register`] - cash drawer sessions
//! - [`audit`] - the append-only dual-identity audit trail
//!
//! ## Conventions
//! - Read methods borrow the pool the repository was built with.
//! - Mutating methods take `&mut SqliteConnection`: the engine decides
//!   the transaction boundaries, never the repository.
//! - Nested values (recipes, method breakdowns) live in JSON columns and
//!   are mapped with serde_json; a malformed column surfaces as
//!   [`DbError::Decode`](crate::error::DbError), never a panic.

pub mod audit;
pub mod inventory;
pub mod product;
pub mod register;
pub mod sale;
pub mod user;

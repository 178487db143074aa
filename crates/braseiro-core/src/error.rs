//! # Validation Error Types
//!
//! Domain-level validation errors for braseiro-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  braseiro-core errors (this file)                                      │
//! │  └── ValidationError  - Input/business rule violations                 │
//! │                                                                         │
//! │  braseiro-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  braseiro-engine errors (separate crate)                               │
//! │  └── EngineError      - What the presentation tier sees                │
//! │                                                                         │
//! │  Flow: ValidationError → EngineError → Frontend (message verbatim)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, product id, ...)
//! 3. Errors are enum variants, never String

use thiserror::Error;

/// Input validation errors.
///
/// These errors occur when caller-supplied data violates a business rule.
/// They are raised before any mutation is attempted, so a validation
/// failure never leaves partial state behind.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// The product recipe graph loops back on itself.
    ///
    /// ## When This Occurs
    /// A combo references, directly or through other combos, a product
    /// already on the current expansion path. Nothing in the data model
    /// forbids saving such a catalog, so the resolver must refuse to
    /// expand it instead of recursing forever.
    #[error("Recipe cycle detected involving product {product_id}")]
    CyclicRecipe { product_id: String },
}

/// Convenience type alias for validation results.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================

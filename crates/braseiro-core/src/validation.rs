//! # Validation Module
//!
//! Business rule validation for Braseiro POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend (TypeScript)                                        │
//! │  └── Basic format checks, immediate user feedback                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Engine boundary (Rust)                                       │
//! │  └── THIS MODULE: business rule validation before any mutation         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  └── NOT NULL, CHECK (quantity >= 0), foreign keys                     │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{ValidationError, ValidationResult};
use crate::types::{Product, ProductType, SaleItem, User};

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart/adjustment quantity: must be strictly positive.
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates an opening balance: zero is fine, negative is not.
pub fn validate_initial_balance(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "initial_balance".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

// =============================================================================
// Entity Validators
// =============================================================================

/// Validates a product before it is persisted.
///
/// ## Rules
/// - Name must not be empty, at most 200 characters
/// - Price must be strictly positive
/// - Composed/combo products need at least one recipe entry
///   (individual recipes are overwritten by the catalog mutator)
/// - Every recipe quantity must be strictly positive
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    let name = product.name.trim();
    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }
    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    if product.price_cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }

    if matches!(
        product.product_type,
        ProductType::Composed | ProductType::Combo
    ) && product.recipe.is_empty()
    {
        return Err(ValidationError::Required {
            field: "recipe".to_string(),
        });
    }

    for entry in &product.recipe {
        if entry.quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "recipe quantity".to_string(),
            });
        }
    }

    Ok(())
}

/// Validates a user before it is persisted.
pub fn validate_user(user: &User) -> ValidationResult<()> {
    if user.name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }
    if user.name.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 100,
        });
    }
    if user.password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }
    Ok(())
}

/// Validates the line items of a sale request.
///
/// ## Rules
/// - At least one item
/// - Every quantity strictly positive
/// - No negative unit prices (zero allowed: promotional freebies keep
///   their snapshot even if the catalog forbids zero-priced products)
pub fn validate_sale_items(items: &[SaleItem]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    for item in items {
        if item.quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            });
        }
        if item.unit_price_cents < 0 {
            return Err(ValidationError::OutOfRange {
                field: "unit_price".to_string(),
                min: 0,
                max: i64::MAX,
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RecipeEntry, UserRole};
    use chrono::Utc;

    fn sample_product(product_type: ProductType) -> Product {
        let now = Utc::now();
        Product {
            id: "p1".to_string(),
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

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
    }

    #[test]
    fn test_validate_initial_balance() {
        assert!(validate_initial_balance(0).is_ok());
        assert!(validate_initial_balance(10_000).is_ok());
        assert!(validate_initial_balance(-1).is_err());
    }

    #[test]
    fn test_validate_product() {
        assert!(validate_product(&sample_product(ProductType::Composed)).is_ok());

        let mut p = sample_product(ProductType::Composed);
        p.name = "   ".to_string();
        assert!(validate_product(&p).is_err());

        let mut p = sample_product(ProductType::Composed);
        p.price_cents = 0;
        assert!(validate_product(&p).is_err());

        let mut p = sample_product(ProductType::Combo);
        p.recipe.clear();
        assert!(validate_product(&p).is_err());

        // Individual products may arrive with an empty recipe; the
        // catalog mutator fills it in.
        let mut p = sample_product(ProductType::Individual);
        p.recipe.clear();
        assert!(validate_product(&p).is_ok());

        let mut p = sample_product(ProductType::Composed);
        p.recipe[0].quantity = 0;
        assert!(validate_product(&p).is_err());
    }

    #[test]
    fn test_validate_user() {
        let user = User {
            id: "u1".to_string(),
            name: "Caixa 01".to_string(),
            password: "123".to_string(),
            role: UserRole::Caixa,
        };
        assert!(validate_user(&user).is_ok());

        let mut bad = user.clone();
        bad.name = "".to_string();
        assert!(validate_user(&bad).is_err());

        let mut bad = user;
        bad.password = "".to_string();
        assert!(validate_user(&bad).is_err());
    }

    #[test]
    fn test_validate_sale_items() {
        assert!(validate_sale_items(&[]).is_err());

        let good = SaleItem {
            product_id: "p1".to_string(),
            product_name: "Coca-Cola".to_string(),
            quantity: 2,
            unit_price_cents: 600,
        };
        assert!(validate_sale_items(std::slice::from_ref(&good)).is_ok());

        let mut bad = good.clone();
        bad.quantity = 0;
        assert!(validate_sale_items(&[bad]).is_err());

        let mut bad = good;
        bad.unit_price_cents = -1;
        assert!(validate_sale_items(&[bad]).is_err());
    }
}

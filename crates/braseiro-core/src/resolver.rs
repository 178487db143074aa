//! # Bill-of-Materials Resolver
//!
//! Expands a cart of sold products into net base-inventory requirements.
//!
//! ## Expansion Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Requirement Resolution                              │
//! │                                                                         │
//! │  Cart line: 1 × "Combo Churrasco" (combo)                              │
//! │       │  recipe: 2 × "Espetinho de Carne", 1 × "Coca-Cola"             │
//! │       │                                                                 │
//! │       ├──► "Espetinho de Carne" (composed)                             │
//! │       │        recipe: 1 × inv "Carne"  ──► requires Carne: 2          │
//! │       │                                                                 │
//! │       └──► "Coca-Cola" (individual)                                    │
//! │                recipe: 1 × inv shadow   ──► requires shadow: 1         │
//! │                                                                         │
//! │  Combos recurse (their recipe entries are PRODUCT ids);                │
//! │  individual/composed recipes are terminal (INVENTORY item ids).        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The resolver is a pure function over a point-in-time catalog snapshot:
//! no side effects, identical output for identical input. Combos may
//! reference combos at arbitrary depth; a cycle in the product graph is
//! rejected with [`ValidationError::CyclicRecipe`] instead of recursing
//! forever. Unknown product ids are skipped — catalog drift must not
//! crash a sale, the engine logs it instead.

use std::collections::{BTreeMap, HashMap};

use crate::error::{ValidationError, ValidationResult};
use crate::types::{Product, ProductType};

/// Net requirement per base inventory item id.
///
/// BTreeMap so iteration (and therefore deduction order downstream) is
/// deterministic.
pub type Requirements = BTreeMap<String, i64>;

/// An indexed, point-in-time view of the product catalog.
#[derive(Debug)]
pub struct Catalog<'a> {
    by_id: HashMap<&'a str, &'a Product>,
}

impl<'a> Catalog<'a> {
    /// Indexes a slice of products by id.
    pub fn new(products: &'a [Product]) -> Self {
        Catalog {
            by_id: products.iter().map(|p| (p.id.as_str(), p)).collect(),
        }
    }

    /// Looks up a product by id.
    pub fn get(&self, id: &str) -> Option<&'a Product> {
        self.by_id.get(id).copied()
    }
}

/// Resolves cart lines `(product_id, quantity)` into net inventory
/// requirements.
///
/// ## Contract
/// - Pure: no side effects, idempotent over the same catalog snapshot.
/// - Empty input yields an empty map.
/// - Quantities are assumed positive (validated upstream).
/// - Unknown product ids contribute nothing.
///
/// ## Errors
/// [`ValidationError::CyclicRecipe`] when a combo references itself
/// transitively.
pub fn resolve_requirements<'l>(
    catalog: &Catalog<'_>,
    lines: impl IntoIterator<Item = (&'l str, i64)>,
) -> ValidationResult<Requirements> {
    let mut out = Requirements::new();
    let mut path = Vec::new();

    for (product_id, quantity) in lines {
        resolve_line(catalog, product_id, quantity, &mut path, &mut out)?;
        debug_assert!(path.is_empty());
    }

    Ok(out)
}

/// Recursively expands one line into `out`, multiplying quantities along
/// the way. `path` is the chain of combo ids currently being expanded,
/// used for cycle detection.
fn resolve_line(
    catalog: &Catalog<'_>,
    product_id: &str,
    quantity: i64,
    path: &mut Vec<String>,
    out: &mut Requirements,
) -> ValidationResult<()> {
    let Some(product) = catalog.get(product_id) else {
        // Catalog drift: a cart or combo referencing a product that no
        // longer exists. Skipped, flagged by the caller.
        return Ok(());
    };

    if path.iter().any(|visited| visited == product_id) {
        return Err(ValidationError::CyclicRecipe {
            product_id: product_id.to_string(),
        });
    }

    match product.product_type {
        ProductType::Combo => {
            path.push(product_id.to_string());
            for entry in &product.recipe {
                resolve_line(catalog, &entry.component_id, quantity * entry.quantity, path, out)?;
            }
            path.pop();
        }
        ProductType::Individual | ProductType::Composed => {
            for entry in &product.recipe {
                *out.entry(entry.component_id.clone()).or_insert(0) +=
                    quantity * entry.quantity;
            }
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
    use crate::types::RecipeEntry;
    use chrono::Utc;

    fn product(id: &str, product_type: ProductType, recipe: Vec<(&str, i64)>) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            name: id.to_string(),
            category: "Teste".to_string(),
            price_cents: 1000,
            product_type,
            recipe: recipe
                .into_iter()
                .map(|(component_id, quantity)| RecipeEntry {
                    component_id: component_id.to_string(),
                    quantity,
                })
                .collect(),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_empty_cart_yields_empty_map() {
        let products = vec![product("a", ProductType::Composed, vec![("inv_x", 2)])];
        let catalog = Catalog::new(&products);

        let required = resolve_requirements(&catalog, []).unwrap();
        assert!(required.is_empty());
    }

    #[test]
    fn test_composed_multiplies_recipe_quantity() {
        let products = vec![product("a", ProductType::Composed, vec![("inv_x", 2)])];
        let catalog = Catalog::new(&products);

        let required = resolve_requirements(&catalog, [("a", 3)]).unwrap();
        assert_eq!(required.get("inv_x"), Some(&6));
    }

    #[test]
    fn test_combo_expands_through_products() {
        // Combo of N=2 copies of product A (itself 2 × inv_x), sold M=3
        // times: required(inv_x) = 2 × 2 × 3 = 12.
        let products = vec![
            product("a", ProductType::Composed, vec![("inv_x", 2)]),
            product("combo", ProductType::Combo, vec![("a", 2)]),
        ];
        let catalog = Catalog::new(&products);

        let required = resolve_requirements(&catalog, [("combo", 3)]).unwrap();
        assert_eq!(required.get("inv_x"), Some(&12));
    }

    #[test]
    fn test_combo_of_combo_resolves_recursively() {
        let products = vec![
            product("a", ProductType::Composed, vec![("inv_x", 1)]),
            product("inner", ProductType::Combo, vec![("a", 2)]),
            product("outer", ProductType::Combo, vec![("inner", 3)]),
        ];
        let catalog = Catalog::new(&products);

        let required = resolve_requirements(&catalog, [("outer", 1)]).unwrap();
        assert_eq!(required.get("inv_x"), Some(&6));
    }

    #[test]
    fn test_requirements_accumulate_across_lines() {
        let products = vec![
            product("carne", ProductType::Composed, vec![("inv_carne", 1)]),
            product("coca", ProductType::Individual, vec![("inv_coca", 1)]),
            product(
                "combo",
                ProductType::Combo,
                vec![("carne", 2), ("coca", 1)],
            ),
        ];
        let catalog = Catalog::new(&products);

        let required =
            resolve_requirements(&catalog, [("combo", 1), ("carne", 1)]).unwrap();
        assert_eq!(required.get("inv_carne"), Some(&3));
        assert_eq!(required.get("inv_coca"), Some(&1));
    }

    #[test]
    fn test_unknown_product_is_skipped() {
        let products = vec![product("a", ProductType::Composed, vec![("inv_x", 1)])];
        let catalog = Catalog::new(&products);

        let required = resolve_requirements(&catalog, [("ghost", 5), ("a", 1)]).unwrap();
        assert_eq!(required.len(), 1);
        assert_eq!(required.get("inv_x"), Some(&1));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let products = vec![
            product("a", ProductType::Composed, vec![("inv_x", 2)]),
            product("combo", ProductType::Combo, vec![("a", 2)]),
        ];
        let catalog = Catalog::new(&products);

        let first = resolve_requirements(&catalog, [("combo", 2), ("a", 1)]).unwrap();
        let second = resolve_requirements(&catalog, [("combo", 2), ("a", 1)]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_direct_cycle_is_rejected() {
        let products = vec![product("loop", ProductType::Combo, vec![("loop", 1)])];
        let catalog = Catalog::new(&products);

        let err = resolve_requirements(&catalog, [("loop", 1)]).unwrap_err();
        assert!(matches!(err, ValidationError::CyclicRecipe { .. }));
    }

    #[test]
    fn test_transitive_cycle_is_rejected() {
        let products = vec![
            product("a", ProductType::Combo, vec![("b", 1)]),
            product("b", ProductType::Combo, vec![("a", 1)]),
        ];
        let catalog = Catalog::new(&products);

        let err = resolve_requirements(&catalog, [("a", 1)]).unwrap_err();
        assert!(matches!(err, ValidationError::CyclicRecipe { .. }));
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        // Two combos sharing a component is legal; only a loop on the
        // current expansion path is a cycle.
        let products = vec![
            product("base", ProductType::Composed, vec![("inv_x", 1)]),
            product("left", ProductType::Combo, vec![("base", 1)]),
            product("right", ProductType::Combo, vec![("base", 2)]),
            product("top", ProductType::Combo, vec![("left", 1), ("right", 1)]),
        ];
        let catalog = Catalog::new(&products);

        let required = resolve_requirements(&catalog, [("top", 1)]).unwrap();
        assert_eq!(required.get("inv_x"), Some(&3));
    }
}

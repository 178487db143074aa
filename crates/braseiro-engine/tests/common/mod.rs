//! Shared harness for engine integration tests.

#![allow(dead_code)]

use std::sync::Once;

use chrono::Utc;

use braseiro_core::{
    InventoryItem, Product, ProductType, RecipeEntry, SaleItem, User,
};
use braseiro_db::DbConfig;
use braseiro_engine::{LedgerEngine, DEFAULT_ADMIN_NAME, DEFAULT_ADMIN_PASSWORD};

static TRACING: Once = Once::new();

/// Fresh engine over an in-memory store.
pub async fn engine() -> LedgerEngine {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::from_default_env(),
            )
            .with_test_writer()
            .try_init();
    });

    LedgerEngine::new(DbConfig::in_memory()).await.unwrap()
}

/// Bootstraps the store and logs the default administrator in.
pub async fn admin(engine: &LedgerEngine) -> User {
    engine.bootstrap().await.unwrap();
    engine
        .authenticate(DEFAULT_ADMIN_NAME, DEFAULT_ADMIN_PASSWORD)
        .await
        .unwrap()
}

/// Creates a cashier account through the engine.
pub async fn cashier(engine: &LedgerEngine, admin: &User) -> User {
    let user = User {
        id: String::new(),
        name: "Caixa 01".to_string(),
        password: "123".to_string(),
        role: braseiro_core::UserRole::Caixa,
    };
    engine.upsert_user(admin, admin, user).await.unwrap()
}

/// Seeds a base inventory item directly into the store.
///
/// Matches production, where base items arrive via data import rather
/// than an engine operation.
pub async fn seed_item(engine: &LedgerEngine, id: &str, name: &str, quantity: i64) {
    let item = InventoryItem {
        id: id.to_string(),
        name: name.to_string(),
        quantity,
        min_quantity: 10,
        unit: "un".to_string(),
    };
    let mut conn = engine.database().pool().acquire().await.unwrap();
    engine
        .database()
        .inventory()
        .insert(&mut conn, &item)
        .await
        .unwrap();
}

/// Builds an unsaved product; `id` may be empty to let the engine
/// assign one.
pub fn product(
    id: &str,
    name: &str,
    price_cents: i64,
    product_type: ProductType,
    recipe: Vec<(&str, i64)>,
) -> Product {
    let now = Utc::now();
    Product {
        id: id.to_string(),
        name: name.to_string(),
        category: "Geral".to_string(),
        price_cents,
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

/// One cart line for a saved product.
pub fn line(product: &Product, quantity: i64) -> SaleItem {
    SaleItem {
        product_id: product.id.clone(),
        product_name: product.name.clone(),
        quantity,
        unit_price_cents: product.price_cents,
    }
}

/// Current quantity of an inventory item.
pub async fn quantity_of(engine: &LedgerEngine, item_id: &str) -> i64 {
    engine
        .database()
        .inventory()
        .get(item_id)
        .await
        .unwrap()
        .unwrap()
        .quantity
}

/// The churrascaria fixture: meat stock, a composed skewer, an
/// individual soda (stocked through its shadow item), and a combo.
pub struct Fixture {
    pub admin: User,
    pub espetinho: Product,
    pub coca: Product,
    pub combo: Product,
}

pub const CARNE: &str = "inv_carne";

pub async fn churrascaria(engine: &LedgerEngine) -> Fixture {
    let admin = admin(engine).await;

    seed_item(engine, CARNE, "Carne (Espetinho)", 150).await;

    let espetinho = engine
        .upsert_product(
            &admin,
            &admin,
            product(
                "",
                "Espetinho de Carne",
                1200,
                ProductType::Composed,
                vec![(CARNE, 1)],
            ),
        )
        .await
        .unwrap();

    let coca = engine
        .upsert_product(
            &admin,
            &admin,
            product("", "Coca-Cola", 600, ProductType::Individual, vec![]),
        )
        .await
        .unwrap();
    let coca_shadow = Product::shadow_item_id(&coca.id);
    engine
        .set_stock(&admin, &admin, &coca_shadow, 48)
        .await
        .unwrap();

    let combo = engine
        .upsert_product(
            &admin,
            &admin,
            product(
                "",
                "Combo Churrasco",
                2800,
                ProductType::Combo,
                vec![(espetinho.id.as_str(), 2), (coca.id.as_str(), 1)],
            ),
        )
        .await
        .unwrap();

    Fixture {
        admin,
        espetinho,
        coca,
        combo,
    }
}

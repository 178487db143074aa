//! Sale processing flows: BOM resolution, all-or-nothing commits, and
//! the paired VENDA movement ledger.

mod common;

use braseiro_core::{MovementType, PaymentMethod, Product, ValidationError};
use braseiro_engine::{EngineError, SaleRequest};
use common::*;

fn cash_sale(items: Vec<braseiro_core::SaleItem>) -> SaleRequest {
    SaleRequest {
        items,
        payment_method: PaymentMethod::Cash,
        amount_received_cents: None,
    }
}

#[tokio::test]
async fn test_each_sale_deducts_meat_and_records_movement() {
    let engine = engine().await;
    let fx = churrascaria(&engine).await;
    engine.open_register(&fx.admin, &fx.admin, 0).await.unwrap();

    for _ in 0..3 {
        engine
            .process_sale(&fx.admin, cash_sale(vec![line(&fx.espetinho, 1)]))
            .await
            .unwrap();
    }

    assert_eq!(quantity_of(&engine, CARNE).await, 147);

    let movements = engine
        .database()
        .inventory()
        .movements_for_item(CARNE)
        .await
        .unwrap();
    assert_eq!(movements.len(), 3);
    for movement in &movements {
        assert_eq!(movement.movement_type, MovementType::Venda);
        assert_eq!(movement.quantity, -1);
        assert_eq!(movement.payment_method, Some(PaymentMethod::Cash));
    }
}

#[tokio::test]
async fn test_combo_deducts_every_component() {
    let engine = engine().await;
    let fx = churrascaria(&engine).await;
    engine.open_register(&fx.admin, &fx.admin, 0).await.unwrap();

    let sale = engine
        .process_sale(&fx.admin, cash_sale(vec![line(&fx.combo, 1)]))
        .await
        .unwrap();

    // 2 skewers -> 2 meat; 1 soda -> 1 from its shadow item.
    assert_eq!(quantity_of(&engine, CARNE).await, 148);
    let coca_shadow = Product::shadow_item_id(&fx.coca.id);
    assert_eq!(quantity_of(&engine, &coca_shadow).await, 47);

    assert_eq!(sale.total_cents, 2800);
    assert_eq!(sale.items.len(), 1);
}

#[tokio::test]
async fn test_insufficient_stock_commits_nothing() {
    let engine = engine().await;
    let fx = churrascaria(&engine).await;
    engine.open_register(&fx.admin, &fx.admin, 0).await.unwrap();

    let err = engine
        .process_sale(&fx.admin, cash_sale(vec![line(&fx.espetinho, 200)]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::InsufficientStock {
            available: 150,
            needed: 200,
            ..
        }
    ));

    assert_eq!(quantity_of(&engine, CARNE).await, 150);
    assert!(engine
        .database()
        .inventory()
        .movements_for_item(CARNE)
        .await
        .unwrap()
        .is_empty());
    assert!(engine.sale_history().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_combo_short_one_component_commits_nothing() {
    let engine = engine().await;
    let fx = churrascaria(&engine).await;
    engine.open_register(&fx.admin, &fx.admin, 0).await.unwrap();

    // Drain the soda shadow; meat stays plentiful.
    let coca_shadow = Product::shadow_item_id(&fx.coca.id);
    engine
        .set_stock(&fx.admin, &fx.admin, &coca_shadow, 0)
        .await
        .unwrap();

    let err = engine
        .process_sale(&fx.admin, cash_sale(vec![line(&fx.combo, 1)]))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientStock { .. }));

    // The satisfiable meat requirement must not have been deducted.
    assert_eq!(quantity_of(&engine, CARNE).await, 150);
    assert!(engine.sale_history().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_sale_requires_open_register() {
    let engine = engine().await;
    let fx = churrascaria(&engine).await;

    let err = engine
        .process_sale(&fx.admin, cash_sale(vec![line(&fx.espetinho, 1)]))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NoActiveRegister));
}

#[tokio::test]
async fn test_empty_cart_rejected() {
    let engine = engine().await;
    let fx = churrascaria(&engine).await;
    engine.open_register(&fx.admin, &fx.admin, 0).await.unwrap();

    let err = engine
        .process_sale(&fx.admin, cash_sale(vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn test_cash_change_is_computed() {
    let engine = engine().await;
    let fx = churrascaria(&engine).await;
    engine.open_register(&fx.admin, &fx.admin, 0).await.unwrap();

    let sale = engine
        .process_sale(
            &fx.admin,
            SaleRequest {
                items: vec![line(&fx.espetinho, 2)],
                payment_method: PaymentMethod::Cash,
                amount_received_cents: Some(5000),
            },
        )
        .await
        .unwrap();
    assert_eq!(sale.total_cents, 2400);
    assert_eq!(sale.amount_received_cents, Some(5000));
    assert_eq!(sale.change_cents, Some(2600));

    let err = engine
        .process_sale(
            &fx.admin,
            SaleRequest {
                items: vec![line(&fx.espetinho, 2)],
                payment_method: PaymentMethod::Cash,
                amount_received_cents: Some(2000),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Validation(ValidationError::OutOfRange { .. })
    ));
}

#[tokio::test]
async fn test_cyclic_combo_is_rejected_at_sale_time() {
    let engine = engine().await;
    let fx = churrascaria(&engine).await;
    engine.open_register(&fx.admin, &fx.admin, 0).await.unwrap();

    // Re-point the combo's recipe at itself.
    let mut cyclic = fx.combo.clone();
    cyclic.recipe[0].component_id = cyclic.id.clone();
    engine
        .upsert_product(&fx.admin, &fx.admin, cyclic)
        .await
        .unwrap();

    let err = engine
        .process_sale(&fx.admin, cash_sale(vec![line(&fx.combo, 1)]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Validation(ValidationError::CyclicRecipe { .. })
    ));
    assert_eq!(quantity_of(&engine, CARNE).await, 150);
}

#[tokio::test]
async fn test_unknown_product_line_contributes_nothing() {
    let engine = engine().await;
    let fx = churrascaria(&engine).await;
    engine.open_register(&fx.admin, &fx.admin, 0).await.unwrap();

    // A line whose product vanished from the catalog still sells at its
    // frozen price; it just resolves to no stock requirements.
    let ghost = braseiro_core::SaleItem {
        product_id: "ghost".to_string(),
        product_name: "Produto Removido".to_string(),
        quantity: 1,
        unit_price_cents: 500,
    };
    let sale = engine
        .process_sale(&fx.admin, cash_sale(vec![ghost]))
        .await
        .unwrap();
    assert_eq!(sale.total_cents, 500);
    assert_eq!(quantity_of(&engine, CARNE).await, 150);
}

#[tokio::test]
async fn test_snapshot_reflects_committed_state() {
    let engine = engine().await;
    let fx = churrascaria(&engine).await;
    engine.open_register(&fx.admin, &fx.admin, 0).await.unwrap();
    engine
        .process_sale(&fx.admin, cash_sale(vec![line(&fx.espetinho, 1)]))
        .await
        .unwrap();

    let snapshot = engine.load_snapshot().await.unwrap();
    assert_eq!(snapshot.users.len(), 1);
    assert_eq!(snapshot.products.len(), 3);
    assert_eq!(snapshot.sales.len(), 1);
    assert_eq!(snapshot.cash_registers.len(), 1);
    assert!(snapshot
        .inventory
        .iter()
        .any(|item| item.id == CARNE && item.quantity == 149));
    assert!(!snapshot.movements.is_empty());
    assert!(!snapshot.audit_logs.is_empty());
}

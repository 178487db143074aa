//! # Sale Processor
//!
//! Turns a cart into a committed sale: resolves the bill of materials,
//! pre-validates every stock requirement, then commits all VENDA
//! deductions plus the sale record in one transaction.
//!
//! ## All-or-Nothing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  process_sale                                                           │
//! │      │                                                                  │
//! │      ├── 1. validate cart lines                      (pure)             │
//! │      ├── 2. require an open register                 (read)             │
//! │      ├── 3. resolve requirements over the catalog    (pure)             │
//! │      ├── 4. check EVERY requirement against stock    (read)             │
//! │      │        one short item ──► InsufficientStock, nothing written    │
//! │      │                                                                  │
//! │      └── 5. transaction:                                                │
//! │            deduct each item + VENDA movement (deterministic order)      │
//! │            INSERT sales + sale_items (frozen snapshots)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::LedgerEngine;
use braseiro_core::{
    resolve_requirements, validation, Catalog, InventoryItem, Money, MovementType,
    PaymentMethod, Sale, SaleItem, User, ValidationError,
};

/// A cart submitted by the POS screen.
///
/// The engine stamps the id, timestamp, and register reference itself;
/// the frontend only describes what was sold and how it was paid.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleRequest {
    pub items: Vec<SaleItem>,
    pub payment_method: PaymentMethod,
    /// For cash payments: amount the customer handed over.
    pub amount_received_cents: Option<i64>,
}

impl LedgerEngine {
    /// Processes a sale end to end.
    ///
    /// Any operator may sell; no dual control here. Fails without
    /// writing anything when the cart is invalid, no register is open,
    /// or any resolved requirement exceeds available stock.
    pub async fn process_sale(&self, actor: &User, request: SaleRequest) -> EngineResult<Sale> {
        validation::validate_sale_items(&request.items)?;

        let _guard = self.write_lock.lock().await;

        let register = self
            .db
            .registers()
            .find_open()
            .await?
            .ok_or(EngineError::NoActiveRegister)?;

        let products = self.db.products().get_all().await?;
        let catalog = Catalog::new(&products);
        let lines = request
            .items
            .iter()
            .map(|item| (item.product_id.as_str(), item.quantity));
        let requirements = resolve_requirements(&catalog, lines)?;

        // Pre-validation pass: every requirement must be satisfiable
        // before the first deduction is written.
        let mut deductions: Vec<(InventoryItem, i64)> = Vec::with_capacity(requirements.len());
        for (item_id, needed) in &requirements {
            match self.db.inventory().get(item_id).await? {
                Some(item) => {
                    if item.quantity < *needed {
                        return Err(EngineError::InsufficientStock {
                            item: item.name,
                            available: item.quantity,
                            needed: *needed,
                        });
                    }
                    deductions.push((item, *needed));
                }
                None => {
                    // Catalog drift: a recipe references an item that no
                    // longer exists. The sale proceeds without it.
                    warn!(item_id, "Recipe references missing inventory item");
                }
            }
        }

        let total: Money = request.items.iter().map(SaleItem::subtotal).sum();
        let change_cents = match request.amount_received_cents {
            Some(received) if received < total.cents() => {
                return Err(ValidationError::OutOfRange {
                    field: "amount_received".to_string(),
                    min: total.cents(),
                    max: i64::MAX,
                }
                .into());
            }
            Some(received) => Some(received - total.cents()),
            None => None,
        };

        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            items: request.items,
            total_cents: total.cents(),
            payment_method: request.payment_method,
            cash_register_id: register.id.clone(),
            amount_received_cents: request.amount_received_cents,
            change_cents,
        };

        let mut tx = self.begin().await?;
        for (item, needed) in &deductions {
            self.apply_adjustment(
                &mut tx,
                item,
                -*needed,
                MovementType::Venda,
                actor,
                None,
                Some(request.payment_method),
            )
            .await?;
        }
        self.db.sales().insert(&mut tx, &sale).await?;
        tx.commit().await.map_err(braseiro_db::DbError::from)?;

        info!(
            sale_id = %sale.id,
            total = %sale.total(),
            payment_method = sale.payment_method.as_str(),
            items = sale.items.len(),
            "Sale committed"
        );
        Ok(sale)
    }

    /// All committed sales, newest first.
    pub async fn sale_history(&self) -> EngineResult<Vec<Sale>> {
        Ok(self.db.sales().get_all().await?)
    }
}

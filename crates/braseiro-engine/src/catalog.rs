//! # Catalog Mutator
//!
//! Product and user CRUD, all under dual control.
//!
//! ## Shadow Inventory
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Individual products are stocked as themselves. The mutator owns a     │
//! │  "shadow" inventory item per individual product:                        │
//! │                                                                         │
//! │    product p42  ◄──── recipe forced to [{inv_p42, 1}] ────►  inv_p42   │
//! │                                                                         │
//! │    upsert (new)      create shadow at quantity 0                        │
//! │    upsert (rename)   rename shadow to match                             │
//! │    hard delete       delete shadow                                      │
//! │                                                                         │
//! │  Shadow quantities only change through the inventory mutator and        │
//! │  sales, like any other stock item.                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Soft Delete
//! A product referenced by any sale line is deactivated, never removed:
//! sale history keeps resolving against it. Only history-free products
//! are hard-deleted.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::auth::require_admin;
use crate::error::{EngineError, EngineResult};
use crate::LedgerEngine;
use braseiro_core::{
    validation, AuditAction, InventoryItem, Product, ProductType, RecipeEntry, User,
    SHADOW_ITEM_MIN_QUANTITY, SHADOW_ITEM_UNIT,
};

/// How [`LedgerEngine::delete_product`] disposed of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductRemoval {
    /// Sale history exists: the product was deactivated in place.
    Deactivated,
    /// No history: the product (and its shadow item) was hard-deleted.
    Deleted,
}

impl LedgerEngine {
    /// Creates or updates a product with dual-control authorization.
    ///
    /// An empty id means "create": the engine assigns one. Individual
    /// products get their recipe overwritten with the shadow item line
    /// and the shadow item itself created or renamed as needed.
    /// Timestamps are stamped here; callers never control them.
    pub async fn upsert_product(
        &self,
        solicitor: &User,
        authorizer: &User,
        mut product: Product,
    ) -> EngineResult<Product> {
        require_admin(authorizer)?;
        validation::validate_product(&product)?;

        let _guard = self.write_lock.lock().await;

        if product.id.is_empty() {
            product.id = Uuid::new_v4().to_string();
        }

        let existing = self.db.products().get(&product.id).await?;
        let now = Utc::now();
        product.created_at = existing.as_ref().map_or(now, |e| e.created_at);
        product.updated_at = now;

        let shadow_id = Product::shadow_item_id(&product.id);
        let shadow = if product.product_type == ProductType::Individual {
            product.recipe = vec![RecipeEntry {
                component_id: shadow_id.clone(),
                quantity: 1,
            }];
            self.db.inventory().get(&shadow_id).await?
        } else {
            None
        };

        let (action, verb) = if existing.is_some() {
            (AuditAction::EditarProduto, "Editou")
        } else {
            (AuditAction::AdicionarProduto, "Adicionou")
        };

        let mut tx = self.begin().await?;
        self.db.products().upsert(&mut tx, &product).await?;

        if product.product_type == ProductType::Individual {
            match &shadow {
                None => {
                    let item = InventoryItem {
                        id: shadow_id,
                        name: product.name.clone(),
                        quantity: 0,
                        min_quantity: SHADOW_ITEM_MIN_QUANTITY,
                        unit: SHADOW_ITEM_UNIT.to_string(),
                    };
                    self.db.inventory().insert(&mut tx, &item).await?;
                }
                Some(item) if item.name != product.name => {
                    self.db
                        .inventory()
                        .rename(&mut tx, &shadow_id, &product.name)
                        .await?;
                }
                Some(_) => {}
            }
        }

        self.record_audit(
            &mut tx,
            solicitor,
            authorizer,
            action,
            format!("{verb} o produto \"{}\" ({})", product.name, product.price()),
            existing.as_ref().map(|e| e.price().to_string()),
            Some(product.price().to_string()),
        )
        .await?;
        tx.commit().await.map_err(braseiro_db::DbError::from)?;

        info!(product_id = %product.id, name = %product.name, "Product upserted");
        Ok(product)
    }

    /// Removes a product with dual-control authorization.
    ///
    /// Soft-deletes (deactivates) when the product appears in any sale;
    /// hard-deletes otherwise, taking an individual product's shadow
    /// item with it.
    pub async fn delete_product(
        &self,
        solicitor: &User,
        authorizer: &User,
        product_id: &str,
    ) -> EngineResult<ProductRemoval> {
        require_admin(authorizer)?;

        let _guard = self.write_lock.lock().await;

        let product = self
            .db
            .products()
            .get(product_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Product", product_id))?;
        let has_history = self.db.sales().references_product(product_id).await?;

        let mut tx = self.begin().await?;
        let removal = if has_history {
            self.db.products().set_active(&mut tx, product_id, false).await?;
            self.record_audit(
                &mut tx,
                solicitor,
                authorizer,
                AuditAction::InativarProduto,
                format!("Inativou \"{}\" por ter histórico de vendas", product.name),
                None,
                None,
            )
            .await?;
            ProductRemoval::Deactivated
        } else {
            self.db.products().delete(&mut tx, product_id).await?;
            if product.product_type == ProductType::Individual {
                let shadow_id = Product::shadow_item_id(product_id);
                self.db.inventory().delete(&mut tx, &shadow_id).await?;
            }
            self.record_audit(
                &mut tx,
                solicitor,
                authorizer,
                AuditAction::ExcluirProduto,
                format!("Excluiu \"{}\" permanentemente", product.name),
                None,
                None,
            )
            .await?;
            ProductRemoval::Deleted
        };
        tx.commit().await.map_err(braseiro_db::DbError::from)?;

        info!(product_id, name = %product.name, ?removal, "Product removed");
        Ok(removal)
    }

    /// Creates or updates a user with dual-control authorization.
    ///
    /// An empty id means "create". Passwords are stored as given; see
    /// `braseiro_core::User` for the credential policy.
    pub async fn upsert_user(
        &self,
        solicitor: &User,
        authorizer: &User,
        mut user: User,
    ) -> EngineResult<User> {
        require_admin(authorizer)?;
        validation::validate_user(&user)?;

        let _guard = self.write_lock.lock().await;

        if user.id.is_empty() {
            user.id = Uuid::new_v4().to_string();
        }
        let existing = self.db.users().get(&user.id).await?;

        let (action, verb) = if existing.is_some() {
            (AuditAction::EditarUsuario, "Editou")
        } else {
            (AuditAction::CriarUsuario, "Criou")
        };

        let mut tx = self.begin().await?;
        self.db.users().upsert(&mut tx, &user).await?;
        self.record_audit(
            &mut tx,
            solicitor,
            authorizer,
            action,
            format!("{verb} o usuário \"{}\"", user.name),
            existing.as_ref().map(|e| e.name.clone()),
            Some(user.name.clone()),
        )
        .await?;
        tx.commit().await.map_err(braseiro_db::DbError::from)?;

        info!(user_id = %user.id, name = %user.name, "User upserted");
        Ok(user)
    }

    /// Deletes a user with dual-control authorization.
    ///
    /// Neither the solicitor nor the authorizer may delete their own
    /// account. Audit entries referencing the user keep their frozen
    /// name.
    pub async fn delete_user(
        &self,
        solicitor: &User,
        authorizer: &User,
        user_id: &str,
    ) -> EngineResult<()> {
        require_admin(authorizer)?;
        if user_id == solicitor.id || user_id == authorizer.id {
            return Err(EngineError::SelfDeletion);
        }

        let _guard = self.write_lock.lock().await;

        let target = self
            .db
            .users()
            .get(user_id)
            .await?
            .ok_or_else(|| EngineError::not_found("User", user_id))?;

        let mut tx = self.begin().await?;
        self.db.users().delete(&mut tx, user_id).await?;
        self.record_audit(
            &mut tx,
            solicitor,
            authorizer,
            AuditAction::ExcluirUsuario,
            format!("Excluiu o usuário \"{}\"", target.name),
            Some(target.name.clone()),
            None,
        )
        .await?;
        tx.commit().await.map_err(braseiro_db::DbError::from)?;

        info!(user_id, name = %target.name, "User deleted");
        Ok(())
    }
}

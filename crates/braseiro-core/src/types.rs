//! # Domain Types
//!
//! Core domain types used throughout Braseiro POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │  CashRegister   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  product_type   │   │  items (frozen) │   │  status         │       │
//! │  │  recipe         │   │  total_cents    │   │  sales_by_method│       │
//! │  │  price_cents    │   │  payment_method │   │  opening_time   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  InventoryItem  │   │    AuditLog     │   │InventoryMovement│       │
//! │  │  quantity ≥ 0   │   │  dual identity  │   │  signed delta   │       │
//! │  │  (ledgered)     │   │  (append-only)  │   │  (append-only)  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Sale items freeze the product name and unit price at sale time, so
//! later catalog edits never rewrite sale history. Movements and audit
//! logs likewise freeze the item/user display names they reference.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// User
// =============================================================================

/// Role held by an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    /// Administrator: may authorize sensitive mutations.
    Admin,
    /// Cashier: operates the POS, cannot self-authorize.
    Caixa,
}

impl UserRole {
    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::Caixa => "CAIXA",
        }
    }

    /// Parses the storage representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ADMIN" => Some(UserRole::Admin),
            "CAIXA" => Some(UserRole::Caixa),
            _ => None,
        }
    }
}

/// An operator of the system.
///
/// The password is an opaque credential compared verbatim; hashing
/// policy belongs to the deployment layer, not the ledger core.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct User {
    pub id: String,
    pub name: String,
    pub password: String,
    pub role: UserRole,
}

// =============================================================================
// Inventory
// =============================================================================

/// A base stock item.
///
/// `quantity` is the sole mutable field under normal operation and only
/// ever changes through the inventory mutator, which pairs every change
/// with one signed [`InventoryMovement`].
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    /// Current stock level. Never negative after a committed mutation.
    pub quantity: i64,
    /// Low-stock warning threshold (display concern, never enforced here).
    pub min_quantity: i64,
    /// Unit label, e.g. "un", "kg".
    pub unit: String,
}

/// Direction/category of a stock quantity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    /// Stock received (purchase, restock).
    Entrada,
    /// Stock removed outside a sale (loss, breakage).
    Saida,
    /// Manual stock-count correction.
    Ajuste,
    /// Deduction committed by a sale.
    Venda,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Entrada => "ENTRADA",
            MovementType::Saida => "SAIDA",
            MovementType::Ajuste => "AJUSTE",
            MovementType::Venda => "VENDA",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ENTRADA" => Some(MovementType::Entrada),
            "SAIDA" => Some(MovementType::Saida),
            "AJUSTE" => Some(MovementType::Ajuste),
            "VENDA" => Some(MovementType::Venda),
            _ => None,
        }
    }
}

/// One signed entry in the append-only stock ledger.
///
/// Summing `quantity` over an item's movements reproduces that item's
/// quantity history. Never updated, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryMovement {
    pub id: String,
    pub item_id: String,
    /// Item name frozen at movement time.
    pub item_name: String,
    pub movement_type: MovementType,
    /// Signed delta applied to the item's quantity.
    pub quantity: i64,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
    /// User name frozen at movement time.
    pub user_name: String,
    pub observation: Option<String>,
    /// For VENDA movements: how the sale was paid.
    pub payment_method: Option<PaymentMethod>,
}

// =============================================================================
// Product
// =============================================================================

/// How a product maps onto base inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    /// Sold and stocked as itself: owns exactly one auto-managed shadow
    /// inventory item, recipe forced to `[{shadow, 1}]`.
    Individual,
    /// Recipe references base inventory items directly.
    Composed,
    /// Recipe references other products (resolved recursively).
    Combo,
}

impl ProductType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Individual => "individual",
            ProductType::Composed => "composed",
            ProductType::Combo => "combo",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "individual" => Some(ProductType::Individual),
            "composed" => Some(ProductType::Composed),
            "combo" => Some(ProductType::Combo),
            _ => None,
        }
    }
}

/// One bill-of-materials line.
///
/// `component_id` is an inventory item id for individual/composed
/// products and a product id for combos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RecipeEntry {
    pub component_id: String,
    /// Per-unit quantity of the component.
    pub quantity: i64,
}

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    pub id: String,
    /// Display name shown to cashier and on receipt.
    pub name: String,
    /// Free-form menu category ("Carnes", "Bebidas", ...).
    pub category: String,
    /// Price in cents. Always positive.
    pub price_cents: i64,
    pub product_type: ProductType,
    /// Bill of materials; interpretation depends on `product_type`.
    pub recipe: Vec<RecipeEntry>,
    /// Soft-delete flag: products with sale history are deactivated,
    /// never removed.
    pub active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Deterministic id of the shadow inventory item owned by an
    /// individual product.
    ///
    /// The shadow item is created, renamed, and deleted exclusively by
    /// the catalog mutator; deriving the id from the product id keeps
    /// the ownership relation reconstructible without a join table.
    pub fn shadow_item_id(product_id: &str) -> String {
        format!("inv_{product_id}")
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash ("Dinheiro").
    Cash,
    /// Brazilian instant payment.
    Pix,
    /// Credit card on external terminal.
    Credit,
    /// Debit card on external terminal.
    Debit,
}

impl PaymentMethod {
    /// All methods, in reporting order.
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Cash,
        PaymentMethod::Pix,
        PaymentMethod::Credit,
        PaymentMethod::Debit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Pix => "pix",
            PaymentMethod::Credit => "credit",
            PaymentMethod::Debit => "debit",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cash" => Some(PaymentMethod::Cash),
            "pix" => Some(PaymentMethod::Pix),
            "credit" => Some(PaymentMethod::Credit),
            "debit" => Some(PaymentMethod::Debit),
            _ => None,
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A line item in a sale.
/// Uses the snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleItem {
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    /// Quantity sold. Always positive.
    pub quantity: i64,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
}

impl SaleItem {
    /// Line subtotal (unit price × quantity).
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.unit_price_cents) * self.quantity
    }
}

/// A committed sale transaction. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Sale {
    pub id: String,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
    pub items: Vec<SaleItem>,
    /// Always equals the sum of item subtotals.
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    /// References the register that was open at `timestamp`.
    pub cash_register_id: String,
    /// For cash: amount the customer handed over.
    pub amount_received_cents: Option<i64>,
    /// For cash: change returned to the customer.
    pub change_cents: Option<i64>,
}

impl Sale {
    /// Returns the total as a Money type.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Cash Register
// =============================================================================

/// The lifecycle state of a register session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum RegisterStatus {
    Open,
    Closed,
}

impl RegisterStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegisterStatus::Open => "open",
            RegisterStatus::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(RegisterStatus::Open),
            "closed" => Some(RegisterStatus::Closed),
            _ => None,
        }
    }
}

/// One cash drawer session, open-to-close.
///
/// A new instance is created on every open; at most one register is
/// `Open` at any time (enforced by the session manager with a store
/// query, so the invariant survives restarts). Aggregates are computed
/// by a full scan over the session's sales at close time — they are
/// never maintained incrementally, so they always agree with history.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CashRegister {
    pub id: String,
    #[ts(as = "String")]
    pub opening_time: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub closing_time: Option<DateTime<Utc>>,
    pub status: RegisterStatus,
    pub initial_balance_cents: i64,
    /// Sum of sale totals for this session (filled at close).
    pub total_sales_cents: i64,
    /// Number of sales in this session (filled at close).
    pub sales_count: i64,
    /// Per-method breakdown of `total_sales_cents` (filled at close).
    pub sales_by_method: HashMap<PaymentMethod, i64>,
}

impl CashRegister {
    /// Zeroed per-method breakdown covering every payment method.
    pub fn empty_breakdown() -> HashMap<PaymentMethod, i64> {
        PaymentMethod::ALL.into_iter().map(|m| (m, 0)).collect()
    }
}

// =============================================================================
// Audit Log
// =============================================================================

/// Actions recorded in the audit trail.
///
/// Serialized/stored as their Portuguese wire names (ABERTURA_CAIXA, ...)
/// to stay compatible with the reporting frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    AberturaCaixa,
    FechamentoCaixa,
    AjusteEstoque,
    AdicionarProduto,
    EditarProduto,
    InativarProduto,
    ExcluirProduto,
    CriarUsuario,
    EditarUsuario,
    ExcluirUsuario,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::AberturaCaixa => "ABERTURA_CAIXA",
            AuditAction::FechamentoCaixa => "FECHAMENTO_CAIXA",
            AuditAction::AjusteEstoque => "AJUSTE_ESTOQUE",
            AuditAction::AdicionarProduto => "ADICIONAR_PRODUTO",
            AuditAction::EditarProduto => "EDITAR_PRODUTO",
            AuditAction::InativarProduto => "INATIVAR_PRODUTO",
            AuditAction::ExcluirProduto => "EXCLUIR_PRODUTO",
            AuditAction::CriarUsuario => "CRIAR_USUARIO",
            AuditAction::EditarUsuario => "EDITAR_USUARIO",
            AuditAction::ExcluirUsuario => "EXCLUIR_USUARIO",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ABERTURA_CAIXA" => Some(AuditAction::AberturaCaixa),
            "FECHAMENTO_CAIXA" => Some(AuditAction::FechamentoCaixa),
            "AJUSTE_ESTOQUE" => Some(AuditAction::AjusteEstoque),
            "ADICIONAR_PRODUTO" => Some(AuditAction::AdicionarProduto),
            "EDITAR_PRODUTO" => Some(AuditAction::EditarProduto),
            "INATIVAR_PRODUTO" => Some(AuditAction::InativarProduto),
            "EXCLUIR_PRODUTO" => Some(AuditAction::ExcluirProduto),
            "CRIAR_USUARIO" => Some(AuditAction::CriarUsuario),
            "EDITAR_USUARIO" => Some(AuditAction::EditarUsuario),
            "EXCLUIR_USUARIO" => Some(AuditAction::ExcluirUsuario),
            _ => None,
        }
    }
}

/// One immutable entry in the dual-identity audit trail.
///
/// ## Solicitor vs Authorizer
/// Every sensitive mutation is stamped with **who asked** (the operator
/// triggering the action) and **who approved** (an administrator whose
/// credential was re-verified at the moment of the action). The two may
/// be the same physical person; the record still separates the roles.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AuditLog {
    pub id: String,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
    pub solicited_by_id: String,
    pub solicited_by_name: String,
    pub authorized_by_id: String,
    pub authorized_by_name: String,
    pub action: AuditAction,
    pub details: String,
    pub previous_value: Option<String>,
    pub new_value: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Ledger Snapshot
//!
//! One-shot read of the full ledger state, shipped to the frontend on
//! startup and after reconnects. Collections come back in their
//! natural display orders (catalog by name, histories newest first).

use serde::Serialize;
use ts_rs::TS;

use crate::error::EngineResult;
use crate::LedgerEngine;
use braseiro_core::{
    AuditLog, CashRegister, InventoryItem, InventoryMovement, Product, Sale, User,
};

/// Point-in-time view of every ledger collection.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct LedgerSnapshot {
    pub users: Vec<User>,
    pub inventory: Vec<InventoryItem>,
    pub products: Vec<Product>,
    pub sales: Vec<Sale>,
    pub cash_registers: Vec<CashRegister>,
    pub movements: Vec<InventoryMovement>,
    pub audit_logs: Vec<AuditLog>,
}

impl LedgerEngine {
    /// Loads a snapshot of the entire ledger.
    ///
    /// Reads run under the write lock so the snapshot never observes a
    /// half-committed operation.
    pub async fn load_snapshot(&self) -> EngineResult<LedgerSnapshot> {
        let _guard = self.write_lock.lock().await;

        Ok(LedgerSnapshot {
            users: self.db.users().get_all().await?,
            inventory: self.db.inventory().get_all().await?,
            products: self.db.products().get_all().await?,
            sales: self.db.sales().get_all().await?,
            cash_registers: self.db.registers().get_all().await?,
            movements: self.db.inventory().all_movements().await?,
            audit_logs: self.db.audit_logs().get_all().await?,
        })
    }
}

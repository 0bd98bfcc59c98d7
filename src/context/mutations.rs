// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Writes against the active account and book.
//!
//! Single-document writes are fire-and-forget: preconditions are checked up
//! front and reported as errors, the write itself is issued and any backend
//! failure ends up in [`AppContext::drain_notices`]. Multi-document changes go
//! through one [`WriteBatch`] and report their outcome directly.

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};
use tracing::{info, warn};

use super::{AppContext, fields};
use crate::docstore::path as paths;
use crate::docstore::{CollectionPath, DocumentStore, WriteBatch};
use crate::error::{Error, Result};
use crate::models::{
    AppUser, Category, CategoryIcon, ImportSummary, ImportedTransaction, NewTransaction,
    PreferencesPatch, Store, Transaction, TransactionPatch, TransactionType, check_amount,
};

fn clean_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::EmptyName);
    }
    Ok(name.to_string())
}

/// One past the highest position still held, so deleting the last item lets
/// the next insert take its slot.
fn next_position(positions: impl Iterator<Item = i64>) -> i64 {
    positions.max().map_or(0, |p| p + 1)
}

/// `ordered` must name every id of `current` exactly once.
fn check_permutation(current: &[&str], ordered: &[String]) -> Result<()> {
    let wanted: HashSet<&str> = ordered.iter().map(String::as_str).collect();
    let have: HashSet<&str> = current.iter().copied().collect();
    if ordered.len() != current.len() || wanted.len() != ordered.len() || wanted != have {
        return Err(Error::InvalidReorder);
    }
    Ok(())
}

impl AppContext {
    fn account(&self) -> Result<(DocumentStore, String)> {
        let session = self.session()?;
        Ok((session.docs.clone(), session.user.uid.clone()))
    }

    fn book(&self) -> Result<(DocumentStore, String, String)> {
        let (session, store_id) = self.require_store()?;
        Ok((session.docs.clone(), session.user.uid.clone(), store_id))
    }

    // -- transactions ------------------------------------------------------

    /// Record a transaction in the active book. Returns the new id right
    /// away; it shows up in [`AppContext::transactions`] after the next pump.
    pub fn add_transaction(&mut self, new: NewTransaction) -> Result<String> {
        let (docs, uid, store_id) = self.book()?;
        let id = paths::new_id();
        let tx = Transaction {
            id: id.clone(),
            user_name: new.user_name,
            amount: new.amount,
            r#type: new.r#type,
            category_id: new.category_id,
            date: new.date,
            user_id: uid.clone(),
            store_id: store_id.clone(),
        };
        let path = paths::transactions(&uid, &store_id)?.doc(&id)?;
        let result = docs.set(path, &tx);
        self.fire("add transaction", result);
        Ok(id)
    }

    /// Partial edit. Changing `type` rewrites the discriminant in place, so
    /// the transaction keeps its id; moving to income drops the category.
    pub fn update_transaction(&mut self, id: &str, patch: TransactionPatch) -> Result<()> {
        let (docs, uid, store_id) = self.book()?;
        let mut f = Map::new();
        if let Some(name) = patch.user_name {
            f.insert("userName".into(), Value::String(clean_name(&name)?));
        }
        if let Some(amount) = patch.amount {
            check_amount(amount)?;
            f.insert("amount".into(), serde_json::to_value(amount)?);
        }
        if let Some(date) = patch.date {
            f.insert("date".into(), serde_json::to_value(date)?);
        }
        let current = self
            .state
            .transactions
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.r#type);
        if let Some(kind) = patch.r#type {
            f.insert("type".into(), serde_json::to_value(kind)?);
        }
        match patch.r#type.or(current) {
            Some(TransactionType::Income) => {
                f.insert("categoryId".into(), Value::Null);
            }
            _ => {
                if let Some(category) = patch.category_id {
                    let v = category
                        .filter(|c| !c.is_empty())
                        .map_or(Value::Null, Value::String);
                    f.insert("categoryId".into(), v);
                }
            }
        }
        if f.is_empty() {
            return Ok(());
        }
        let path = paths::transactions(&uid, &store_id)?.doc(id)?;
        let result = docs.update(path, f);
        self.fire("update transaction", result);
        Ok(())
    }

    pub fn delete_transaction(&mut self, id: &str) -> Result<()> {
        let (docs, uid, store_id) = self.book()?;
        let path = paths::transactions(&uid, &store_id)?.doc(id)?;
        let result = docs.delete(path);
        self.fire("delete transaction", result);
        Ok(())
    }

    /// Delete every transaction of the active book in one batch.
    ///
    /// `confirmation` must repeat the book's name. Returns how many
    /// transactions were removed.
    pub fn clear_all_transactions(&mut self, confirmation: &str) -> Result<usize> {
        let (docs, uid, store_id) = self.book()?;
        let store = self.active_store().ok_or(Error::NoActiveStore)?;
        if confirmation.trim() != store.name {
            return Err(Error::ConfirmationMismatch);
        }
        let existing = docs.list(&paths::transactions(&uid, &store_id)?)?;
        let mut batch = WriteBatch::new();
        for doc in &existing {
            batch.delete(doc.path.clone());
        }
        docs.commit(batch)?;
        info!(store_id = %store_id, deleted = existing.len(), "cleared transactions");
        Ok(existing.len())
    }

    /// Move documents of the old `expenses`/`incomes` collections into
    /// `transactions`, all in one batch. Ids are kept, so an id already
    /// present in `transactions` (or in both legacy collections) fails the
    /// whole migration with [`Error::MigrationConflict`] and nothing moves.
    pub fn migrate_legacy_transactions(&mut self) -> Result<usize> {
        let (docs, uid, store_id) = self.book()?;
        let target = paths::transactions(&uid, &store_id)?;
        let mut taken: HashSet<String> =
            docs.list(&target)?.into_iter().map(|d| d.id).collect();
        let mut batch = WriteBatch::new();
        let mut moved = 0;
        for kind in [TransactionType::Expense, TransactionType::Income] {
            for doc in docs.list(&paths::legacy_transactions(&uid, &store_id, kind)?)? {
                if !taken.insert(doc.id.clone()) {
                    warn!(store_id = %store_id, id = %doc.id, "legacy id already in use");
                    return Err(Error::MigrationConflict(doc.id));
                }
                let mut legacy = doc.clone();
                legacy
                    .data
                    .insert("type".into(), serde_json::to_value(kind)?);
                let mut tx: Transaction = legacy.decode()?;
                if kind == TransactionType::Income {
                    tx.category_id = None;
                }
                tx.store_id = store_id.clone();
                tx.user_id = uid.clone();
                batch.set(target.doc(&doc.id)?, &tx)?;
                batch.delete(doc.path);
                moved += 1;
            }
        }
        docs.commit(batch)?;
        info!(store_id = %store_id, moved, "migrated legacy transactions");
        Ok(moved)
    }

    /// Write imported rows into the active book in one batch. Rows whose id
    /// is already known, or repeated in `records`, are skipped. Category
    /// names that match nothing leave the expense uncategorized.
    pub fn import_transactions(
        &mut self,
        records: Vec<ImportedTransaction>,
    ) -> Result<ImportSummary> {
        let (docs, uid, store_id) = self.book()?;
        let target = paths::transactions(&uid, &store_id)?;
        let mut known: HashSet<String> =
            self.state.transactions.iter().map(|t| t.id.clone()).collect();
        let by_name: HashMap<&str, &str> = self
            .state
            .categories
            .iter()
            .map(|c| (c.name.as_str(), c.id.as_str()))
            .collect();

        let mut batch = WriteBatch::new();
        let mut summary = ImportSummary::default();
        for r in records {
            if !known.insert(r.id.clone()) {
                summary.skipped += 1;
                continue;
            }
            let category_id = r
                .category
                .as_deref()
                .map(str::trim)
                .and_then(|name| by_name.get(name))
                .map(|id| id.to_string());
            let new = NewTransaction::new(&r.user_name, r.amount, r.r#type, category_id, r.date)?;
            let tx = Transaction {
                id: r.id,
                user_name: new.user_name,
                amount: new.amount,
                r#type: new.r#type,
                category_id: new.category_id,
                date: new.date,
                user_id: uid.clone(),
                store_id: store_id.clone(),
            };
            batch.set(target.doc(&tx.id)?, &tx)?;
            summary.imported += 1;
        }
        docs.commit(batch)?;
        info!(store_id = %store_id, imported = summary.imported, skipped = summary.skipped, "import done");
        Ok(summary)
    }

    // -- categories --------------------------------------------------------

    pub fn add_category(&mut self, name: &str, icon: CategoryIcon) -> Result<String> {
        let (docs, uid, store_id) = self.book()?;
        let id = paths::new_id();
        let category = Category {
            id: id.clone(),
            name: clean_name(name)?,
            icon,
            user_id: uid.clone(),
            store_id: store_id.clone(),
            position: next_position(self.state.categories.iter().map(|c| c.position)),
        };
        let path = paths::categories(&uid, &store_id)?.doc(&id)?;
        let result = docs.set(path, &category);
        self.fire("add category", result);
        Ok(id)
    }

    pub fn update_category(
        &mut self,
        id: &str,
        name: Option<&str>,
        icon: Option<CategoryIcon>,
    ) -> Result<()> {
        let (docs, uid, store_id) = self.book()?;
        let mut f = Map::new();
        if let Some(name) = name {
            f.insert("name".into(), Value::String(clean_name(name)?));
        }
        if let Some(icon) = icon {
            f.insert("icon".into(), serde_json::to_value(icon)?);
        }
        if f.is_empty() {
            return Ok(());
        }
        let path = paths::categories(&uid, &store_id)?.doc(id)?;
        let result = docs.update(path, f);
        self.fire("update category", result);
        Ok(())
    }

    /// Transactions pointing at the category keep the dangling id and show
    /// as uncategorized.
    pub fn delete_category(&mut self, id: &str) -> Result<()> {
        let (docs, uid, store_id) = self.book()?;
        let path = paths::categories(&uid, &store_id)?.doc(id)?;
        let result = docs.delete(path);
        self.fire("delete category", result);
        Ok(())
    }

    /// Rewrite every category position to its index in `ordered_ids`.
    pub fn update_category_order(&mut self, ordered_ids: &[String]) -> Result<()> {
        let (docs, uid, store_id) = self.book()?;
        let current: Vec<&str> = self.state.categories.iter().map(|c| c.id.as_str()).collect();
        check_permutation(&current, ordered_ids)?;
        rewrite_positions(&docs, &paths::categories(&uid, &store_id)?, ordered_ids)
    }

    // -- participants ------------------------------------------------------

    pub fn add_app_user(&mut self, name: &str) -> Result<String> {
        let (docs, uid, store_id) = self.book()?;
        let id = paths::new_id();
        let user = AppUser {
            id: id.clone(),
            name: clean_name(name)?,
            user_id: uid.clone(),
            store_id: store_id.clone(),
            position: next_position(self.state.app_users.iter().map(|u| u.position)),
        };
        let path = paths::app_users(&uid, &store_id)?.doc(&id)?;
        let result = docs.set(path, &user);
        self.fire("add participant", result);
        Ok(id)
    }

    /// Only the participant changes: transactions already recorded keep the
    /// name they were entered with.
    pub fn rename_app_user(&mut self, id: &str, name: &str) -> Result<()> {
        let (docs, uid, store_id) = self.book()?;
        let f = fields([("name", Value::String(clean_name(name)?))]);
        let path = paths::app_users(&uid, &store_id)?.doc(id)?;
        let result = docs.update(path, f);
        self.fire("rename participant", result);
        Ok(())
    }

    pub fn delete_app_user(&mut self, id: &str) -> Result<()> {
        let (docs, uid, store_id) = self.book()?;
        let path = paths::app_users(&uid, &store_id)?.doc(id)?;
        let result = docs.delete(path);
        self.fire("delete participant", result);
        Ok(())
    }

    pub fn update_app_user_order(&mut self, ordered_ids: &[String]) -> Result<()> {
        let (docs, uid, store_id) = self.book()?;
        let current: Vec<&str> = self.state.app_users.iter().map(|u| u.id.as_str()).collect();
        check_permutation(&current, ordered_ids)?;
        rewrite_positions(&docs, &paths::app_users(&uid, &store_id)?, ordered_ids)
    }

    // -- books -------------------------------------------------------------

    /// Create a book and make it the active one.
    pub fn add_store(&mut self, name: &str) -> Result<String> {
        let (docs, uid) = self.account()?;
        let id = paths::new_id();
        let store = Store {
            id: id.clone(),
            name: clean_name(name)?,
            user_id: uid.clone(),
        };
        let mut batch = WriteBatch::new();
        batch.set(paths::store(&uid, &id)?, &store)?;
        batch.merge(
            paths::preferences(&uid)?,
            fields([("activeStoreId", Value::String(id.clone()))]),
        );
        let result = docs.commit(batch);
        self.fire("add book", result);
        Ok(id)
    }

    pub fn rename_store(&mut self, id: &str, name: &str) -> Result<()> {
        let (docs, uid) = self.account()?;
        let f = fields([("name", Value::String(clean_name(name)?))]);
        let result = docs.update(paths::store(&uid, id)?, f);
        self.fire("rename book", result);
        Ok(())
    }

    pub fn switch_store(&mut self, id: &str) -> Result<()> {
        self.account()?;
        if !self.state.stores.iter().any(|s| s.id == id) {
            return Err(Error::NotFound(id.to_string()));
        }
        let result = self.write_active_store(Some(id));
        self.fire("switch book", result);
        Ok(())
    }

    /// Delete a book together with everything stored under it. The last
    /// remaining book cannot be deleted.
    pub fn delete_store(&mut self, id: &str) -> Result<()> {
        let (docs, uid) = self.account()?;
        if self.state.stores.len() < 2 {
            return Err(Error::LastStore);
        }
        if !self.state.stores.iter().any(|s| s.id == id) {
            return Err(Error::NotFound(id.to_string()));
        }
        let store_path = paths::store(&uid, id)?;
        let nested = docs.list_descendants(&store_path)?;
        let mut batch = WriteBatch::new();
        for path in &nested {
            batch.delete(path.clone());
        }
        batch.delete(store_path);
        let was_active = self.state.active_store_id.as_deref() == Some(id)
            || self.state.preferences.active_store_id.as_deref() == Some(id);
        if was_active {
            let next = self
                .state
                .stores
                .iter()
                .find(|s| s.id != id)
                .map(|s| Value::String(s.id.clone()))
                .unwrap_or(Value::Null);
            batch.merge(paths::preferences(&uid)?, fields([("activeStoreId", next)]));
        }
        docs.commit(batch)?;
        info!(store_id = %id, nested = nested.len(), "deleted book");
        Ok(())
    }

    // -- preferences -------------------------------------------------------

    pub fn update_preferences(&mut self, patch: PreferencesPatch) -> Result<()> {
        let (docs, uid) = self.account()?;
        let mut f = Map::new();
        if let Some(currency) = patch.currency {
            let currency = currency.trim().to_uppercase();
            if currency.is_empty() {
                return Err(Error::EmptyName);
            }
            f.insert("currency".into(), Value::String(currency));
        }
        if let Some(address) = patch.address {
            let address = address.trim();
            let v = if address.is_empty() {
                Value::Null
            } else {
                Value::String(address.to_string())
            };
            f.insert("address".into(), v);
        }
        if f.is_empty() {
            return Ok(());
        }
        let result = docs.set_merge(paths::preferences(&uid)?, f);
        self.fire("update preferences", result);
        Ok(())
    }
}

fn rewrite_positions(
    docs: &DocumentStore,
    collection: &CollectionPath,
    ordered_ids: &[String],
) -> Result<()> {
    let mut batch = WriteBatch::new();
    for (index, id) in ordered_ids.iter().enumerate() {
        batch.update(
            collection.doc(id)?,
            fields([("position", Value::from(index as i64))]),
        );
    }
    docs.commit(batch)
}

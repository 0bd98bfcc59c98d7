// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Live, locally mirrored view of one account's ledger.
//!
//! [`AppContext`] keeps the lists the UI renders in sync with the document
//! store. Lists only change when a snapshot is applied in [`AppContext::pump`];
//! writes issued through the mutation methods become visible once the
//! backend echoes them back through a live query.

pub mod mutations;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::aggregate::{FinancialSummary, aggregate};
use crate::docstore::path as paths;
use crate::docstore::{Backend, DocumentStore, ListenTarget, Snapshot, Subscription, WriteBatch};
use crate::error::{Error, Result};
use crate::models::{AppUser, AuthUser, Category, Store, Transaction, UserPreferences};

pub const DEFAULT_STORE_NAME: &str = "Personal";

/// Upper bound on snapshot rounds per [`AppContext::pump`] call.
const MAX_PUMP_ROUNDS: usize = 32;

/// User-facing message left behind by a write that failed after the call
/// returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub action: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct LedgerState {
    pub stores: Vec<Store>,
    pub preferences: UserPreferences,
    pub active_store_id: Option<String>,
    pub transactions: Vec<Transaction>,
    pub categories: Vec<Category>,
    pub app_users: Vec<AppUser>,
    pub summary: FinancialSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Feed {
    Stores,
    Preferences,
    Transactions,
    Categories,
    AppUsers,
}

const FEEDS: [Feed; 5] = [
    Feed::Stores,
    Feed::Preferences,
    Feed::Transactions,
    Feed::Categories,
    Feed::AppUsers,
];

#[derive(Debug, Default)]
struct Feeds {
    stores: Option<Subscription>,
    preferences: Option<Subscription>,
    stores_loaded: bool,
    preferences_loaded: bool,
    /// Store the store-scoped feeds below point at.
    store_id: Option<String>,
    transactions: Option<Subscription>,
    categories: Option<Subscription>,
    app_users: Option<Subscription>,
}

impl Feeds {
    fn get(&self, feed: Feed) -> Option<&Subscription> {
        match feed {
            Feed::Stores => self.stores.as_ref(),
            Feed::Preferences => self.preferences.as_ref(),
            Feed::Transactions => self.transactions.as_ref(),
            Feed::Categories => self.categories.as_ref(),
            Feed::AppUsers => self.app_users.as_ref(),
        }
    }

    fn drop_store_scoped(&mut self) {
        self.transactions = None;
        self.categories = None;
        self.app_users = None;
    }
}

struct Session {
    user: AuthUser,
    docs: DocumentStore,
}

pub struct AppContext {
    backend: Backend,
    session: Option<Session>,
    feeds: Feeds,
    state: LedgerState,
    notices: Vec<Notice>,
}

fn decode_all<T: DeserializeOwned>(snapshot: &Snapshot, what: &str) -> Vec<T> {
    snapshot
        .docs
        .iter()
        .filter_map(|doc| match doc.decode::<T>() {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(path = %doc.path, kind = what, error = %e, "skipping undecodable document");
                None
            }
        })
        .collect()
}

pub(crate) fn fields(pairs: impl IntoIterator<Item = (&'static str, Value)>) -> Map<String, Value> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

impl AppContext {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            session: None,
            feeds: Feeds::default(),
            state: LedgerState::default(),
            notices: Vec::new(),
        }
    }

    /// Start a session for `user`, replacing any previous one.
    pub fn init(&mut self, user: AuthUser) -> Result<()> {
        self.teardown();
        let docs = self.backend.session(&user.uid);
        self.feeds.stores = Some(docs.listen(ListenTarget::collection(paths::stores(&user.uid)?))?);
        self.feeds.preferences =
            Some(docs.listen(ListenTarget::Document(paths::preferences(&user.uid)?))?);
        info!(uid = %user.uid, "session started");
        self.session = Some(Session { user, docs });
        self.pump();
        Ok(())
    }

    /// Drop every live query and forget all local state.
    pub fn teardown(&mut self) {
        if let Some(session) = self.session.take() {
            info!(uid = %session.user.uid, "session ended");
        }
        self.feeds = Feeds::default();
        self.state = LedgerState::default();
        self.notices.clear();
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn user(&self) -> Option<&AuthUser> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn stores(&self) -> &[Store] {
        &self.state.stores
    }

    pub fn preferences(&self) -> &UserPreferences {
        &self.state.preferences
    }

    pub fn active_store_id(&self) -> Option<&str> {
        self.state.active_store_id.as_deref()
    }

    pub fn active_store(&self) -> Option<&Store> {
        let id = self.active_store_id()?;
        self.state.stores.iter().find(|s| s.id == id)
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.state.transactions
    }

    /// Newest first, the order lists are shown in.
    pub fn transactions_by_date(&self) -> Vec<&Transaction> {
        let mut out: Vec<&Transaction> = self.state.transactions.iter().collect();
        out.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
        out
    }

    pub fn categories(&self) -> &[Category] {
        &self.state.categories
    }

    pub fn app_users(&self) -> &[AppUser] {
        &self.state.app_users
    }

    pub fn summary(&self) -> &FinancialSummary {
        &self.state.summary
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Apply pending snapshots until every feed is quiet. Returns how many
    /// snapshots were applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        for _ in 0..MAX_PUMP_ROUNDS {
            let mut progressed = false;
            for feed in FEEDS {
                if let Some(snapshot) = self.feeds.get(feed).and_then(Subscription::latest) {
                    self.apply(feed, snapshot);
                    applied += 1;
                    progressed = true;
                }
            }
            progressed |= self.reconcile_active_store();
            if !progressed {
                return applied;
            }
        }
        warn!(applied, "snapshots did not settle");
        applied
    }

    fn apply(&mut self, feed: Feed, snapshot: Snapshot) {
        debug!(?feed, docs = snapshot.docs.len(), from_cache = snapshot.from_cache, "snapshot");
        match feed {
            Feed::Stores => {
                self.state.stores = decode_all(&snapshot, "store");
                self.feeds.stores_loaded = true;
                if self.state.stores.is_empty() && !snapshot.from_cache {
                    self.create_default_store();
                }
            }
            Feed::Preferences => {
                self.state.preferences = decode_all(&snapshot, "preferences")
                    .into_iter()
                    .next()
                    .unwrap_or_default();
                self.feeds.preferences_loaded = true;
            }
            Feed::Transactions => {
                self.state.transactions = decode_all(&snapshot, "transaction");
                self.refresh_summary();
            }
            Feed::Categories => {
                self.state.categories = decode_all(&snapshot, "category");
            }
            Feed::AppUsers => {
                self.state.app_users = decode_all(&snapshot, "app_user");
                self.refresh_summary();
                if self.state.app_users.is_empty() && !snapshot.from_cache {
                    self.seed_app_user();
                }
            }
        }
    }

    fn refresh_summary(&mut self) {
        self.state.summary = aggregate(&self.state.transactions, &self.state.app_users);
    }

    /// First server-confirmed look at an account with no books.
    fn create_default_store(&mut self) {
        let Some(session) = &self.session else {
            return;
        };
        let uid = session.user.uid.clone();
        let docs = session.docs.clone();
        let result = (|| -> Result<()> {
            let store_id = paths::new_id();
            let mut batch = WriteBatch::new();
            batch.set(
                paths::store(&uid, &store_id)?,
                &Store {
                    id: store_id.clone(),
                    name: DEFAULT_STORE_NAME.to_string(),
                    user_id: uid.clone(),
                },
            )?;
            batch.merge(
                paths::preferences(&uid)?,
                fields([("activeStoreId", Value::String(store_id.clone()))]),
            );
            docs.commit(batch)?;
            info!(uid = %uid, store_id = %store_id, "created default book");
            Ok(())
        })();
        self.fire("create default book", result);
    }

    /// Empty participant list on a fresh book: start it with the account's
    /// display name.
    fn seed_app_user(&mut self) {
        let (Some(session), Some(store_id)) = (&self.session, self.feeds.store_id.clone()) else {
            return;
        };
        // The feed may still point at a book that was just deleted.
        if !self.state.stores.iter().any(|s| s.id == store_id) {
            return;
        }
        let Some(name) = session
            .user
            .display_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
        else {
            return;
        };
        let uid = session.user.uid.clone();
        let docs = session.docs.clone();
        let result = (|| -> Result<()> {
            let id = paths::new_id();
            docs.set(
                paths::app_users(&uid, &store_id)?.doc(&id)?,
                &AppUser {
                    id: id.clone(),
                    name: name.clone(),
                    user_id: uid.clone(),
                    store_id: store_id.clone(),
                    position: 0,
                },
            )?;
            info!(store_id = %store_id, name = %name, "seeded participant");
            Ok(())
        })();
        self.fire("add participant", result);
    }

    /// Resolve which book is active and point the store-scoped feeds at it.
    /// Returns true when the feeds were replaced.
    fn reconcile_active_store(&mut self) -> bool {
        if self.session.is_none() || !(self.feeds.stores_loaded && self.feeds.preferences_loaded) {
            return false;
        }
        let preferred = self.state.preferences.active_store_id.clone();
        let resolved = preferred
            .as_deref()
            .filter(|id| self.state.stores.iter().any(|s| s.id == *id))
            .or_else(|| self.state.stores.first().map(|s| s.id.as_str()))
            .map(str::to_string);

        if resolved.is_some() && resolved != preferred {
            info!(from = ?preferred, to = ?resolved, "active book missing, falling back");
            let result = self.write_active_store(resolved.as_deref());
            self.fire("switch book", result);
        }
        self.state.active_store_id = resolved.clone();

        if resolved == self.feeds.store_id {
            return false;
        }
        self.resubscribe_store(resolved);
        true
    }

    fn write_active_store(&self, store_id: Option<&str>) -> Result<()> {
        let session = self.session()?;
        let value = store_id.map_or(Value::Null, |id| Value::String(id.to_string()));
        session.docs.set_merge(
            paths::preferences(&session.user.uid)?,
            fields([("activeStoreId", value)]),
        )
    }

    fn resubscribe_store(&mut self, store_id: Option<String>) {
        self.feeds.drop_store_scoped();
        self.state.transactions.clear();
        self.state.categories.clear();
        self.state.app_users.clear();
        self.state.summary = FinancialSummary::default();
        self.feeds.store_id = store_id.clone();

        let (Some(session), Some(store_id)) = (&self.session, store_id) else {
            return;
        };
        let uid = session.user.uid.clone();
        let docs = session.docs.clone();
        debug!(store_id = %store_id, "opening book feeds");
        let opened = (|| -> Result<(Subscription, Subscription, Subscription)> {
            Ok((
                docs.listen(ListenTarget::collection(paths::transactions(&uid, &store_id)?))?,
                docs.listen(ListenTarget::ordered(
                    paths::categories(&uid, &store_id)?,
                    "position",
                ))?,
                docs.listen(ListenTarget::ordered(
                    paths::app_users(&uid, &store_id)?,
                    "position",
                ))?,
            ))
        })();
        match opened {
            Ok((transactions, categories, app_users)) => {
                self.feeds.transactions = Some(transactions);
                self.feeds.categories = Some(categories);
                self.feeds.app_users = Some(app_users);
            }
            Err(e) => self.report("open book", &e),
        }
    }

    fn session(&self) -> Result<&Session> {
        self.session.as_ref().ok_or(Error::NotSignedIn)
    }

    fn require_store(&self) -> Result<(&Session, String)> {
        let session = self.session()?;
        let store_id = self
            .state
            .active_store_id
            .clone()
            .ok_or(Error::NoActiveStore)?;
        Ok((session, store_id))
    }

    fn report(&mut self, action: &'static str, err: &Error) {
        warn!(action, kind = err.kind(), error = %err, "write failed");
        self.notices.push(Notice {
            action,
            message: err.user_message(),
        });
    }

    /// Outcome of a write the caller does not wait on.
    fn fire(&mut self, action: &'static str, result: Result<()>) {
        if let Err(e) = result {
            self.report(action, &e);
        }
    }
}

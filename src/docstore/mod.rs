// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Hierarchical document store with live queries, kept in SQLite.
//!
//! A [`Backend`] owns the database and the listener registry. Callers talk to
//! it through a [`DocumentStore`] session bound to one account; the session
//! only reaches paths under `users/{uid}/`.

pub mod batch;
pub mod listen;
pub mod path;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{Error, Result};

pub use batch::{WriteBatch, WriteOp};
pub use listen::{ListenTarget, Snapshot, Subscription};
pub use path::{CollectionPath, DocPath};

use batch::merge_fields;
use listen::SharedRegistry;

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub path: DocPath,
    pub data: Map<String, Value>,
}

impl Document {
    /// Deserialize the body, with the document id available as field `id`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        let mut data = self.data.clone();
        data.insert("id".to_string(), Value::String(self.id.clone()));
        Ok(serde_json::from_value(Value::Object(data))?)
    }
}

pub(crate) struct Inner {
    conn: Mutex<Connection>,
    pub(crate) listeners: SharedRegistry,
    available: AtomicBool,
}

pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Inner {
    /// Push a fresh snapshot to every listener whose query saw a write.
    fn notify(&self, conn: &Connection, touched: &[DocPath]) {
        let registry = lock(&self.listeners);
        for listener in registry.iter() {
            if !touched.iter().any(|p| listener.target.is_touched_by(p)) {
                continue;
            }
            match run_query(conn, &listener.target) {
                Ok(docs) => {
                    let _ = listener.tx.send(Snapshot {
                        docs,
                        from_cache: false,
                    });
                }
                Err(e) => warn!(error = %e, target = ?listener.target, "snapshot query failed"),
            }
        }
    }
}

/// Shared handle on the database. Cheap to clone.
#[derive(Clone)]
pub struct Backend {
    inner: Arc<Inner>,
}

impl Backend {
    pub fn new(conn: Connection) -> Self {
        Self {
            inner: Arc::new(Inner {
                conn: Mutex::new(conn),
                listeners: Mutex::default(),
                available: AtomicBool::new(true),
            }),
        }
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(crate::db::open_in_memory()?))
    }

    /// Session restricted to the documents of account `uid`.
    pub fn session(&self, uid: &str) -> DocumentStore {
        DocumentStore {
            inner: Arc::clone(&self.inner),
            principal: uid.to_string(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.inner.available.load(Ordering::SeqCst)
    }

    /// Toggle reachability. Coming back online re-sends a server-confirmed
    /// snapshot to every listener.
    pub fn set_available(&self, available: bool) {
        let was = self.inner.available.swap(available, Ordering::SeqCst);
        if available && !was {
            let conn = lock(&self.inner.conn);
            let registry = lock(&self.inner.listeners);
            for listener in registry.iter() {
                if let Ok(docs) = run_query(&conn, &listener.target) {
                    let _ = listener.tx.send(Snapshot {
                        docs,
                        from_cache: false,
                    });
                }
            }
            debug!(listeners = registry.len(), "backend reconnected");
        }
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.inner.listeners).len()
    }

    pub(crate) fn with_conn<R>(&self, f: impl FnOnce(&mut Connection) -> Result<R>) -> Result<R> {
        let mut conn = lock(&self.inner.conn);
        f(&mut conn)
    }
}

/// Per-account view of the [`Backend`].
#[derive(Clone)]
pub struct DocumentStore {
    inner: Arc<Inner>,
    principal: String,
}

impl DocumentStore {
    pub fn uid(&self) -> &str {
        &self.principal
    }

    fn authorize(&self, owner: Option<&str>, what: &str) -> Result<()> {
        if owner == Some(self.principal.as_str()) {
            Ok(())
        } else {
            warn!(uid = %self.principal, path = what, "access outside own namespace refused");
            Err(Error::PermissionDenied(what.to_string()))
        }
    }

    fn ensure_available(&self) -> Result<()> {
        if self.inner.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::Unavailable)
        }
    }

    pub fn get(&self, path: &DocPath) -> Result<Option<Document>> {
        self.authorize(path.owner(), path.as_str())?;
        self.ensure_available()?;
        let conn = lock(&self.inner.conn);
        read_doc(&conn, path)
    }

    pub fn list(&self, path: &CollectionPath) -> Result<Vec<Document>> {
        self.authorize(path.owner(), path.as_str())?;
        self.ensure_available()?;
        let conn = lock(&self.inner.conn);
        query_collection(&conn, path, None)
    }

    /// Every document nested anywhere below `path`, not including it.
    pub fn list_descendants(&self, path: &DocPath) -> Result<Vec<DocPath>> {
        self.authorize(path.owner(), path.as_str())?;
        self.ensure_available()?;
        let prefix = path.descendant_prefix();
        let conn = lock(&self.inner.conn);
        let mut stmt = conn
            .prepare("SELECT path FROM documents WHERE substr(path, 1, ?2) = ?1 ORDER BY path")?;
        let rows = stmt.query_map(params![prefix, prefix.chars().count() as i64], |r| {
            r.get::<_, String>(0)
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(DocPath::parse(&row?)?);
        }
        Ok(out)
    }

    pub fn set<T: Serialize>(&self, path: DocPath, value: &T) -> Result<()> {
        let mut batch = WriteBatch::new();
        batch.set(path, value)?;
        self.commit(batch)
    }

    pub fn set_merge(&self, path: DocPath, data: Map<String, Value>) -> Result<()> {
        self.commit(WriteOp::Merge { path, data }.into())
    }

    pub fn update(&self, path: DocPath, fields: Map<String, Value>) -> Result<()> {
        self.commit(WriteOp::Update { path, fields }.into())
    }

    pub fn delete(&self, path: DocPath) -> Result<()> {
        self.commit(WriteOp::Delete { path }.into())
    }

    /// Apply every write of `batch` in one SQLite transaction.
    pub fn commit(&self, batch: WriteBatch) -> Result<()> {
        for op in batch.ops() {
            self.authorize(op.path().owner(), op.path().as_str())?;
        }
        self.ensure_available()?;
        if batch.is_empty() {
            return Ok(());
        }
        let ops = batch.into_ops();
        let touched: Vec<DocPath> = ops.iter().map(|op| op.path().clone()).collect();

        let mut conn = lock(&self.inner.conn);
        let tx = conn.transaction()?;
        for op in ops {
            apply_op(&tx, op)?;
        }
        tx.commit()?;
        debug!(writes = touched.len(), "batch committed");
        self.inner.notify(&conn, &touched);
        Ok(())
    }

    /// Start a live query. The current result is delivered right away,
    /// flagged `from_cache` when the backend is unreachable.
    pub fn listen(&self, target: ListenTarget) -> Result<Subscription> {
        let owner = target.owner().map(str::to_string);
        self.authorize(owner.as_deref(), &format!("{:?}", target))?;
        let conn = lock(&self.inner.conn);
        let docs = run_query(&conn, &target)?;
        let from_cache = !self.inner.available.load(Ordering::SeqCst);
        let (id, tx, rx) = lock(&self.inner.listeners).register(target.clone());
        let _ = tx.send(Snapshot { docs, from_cache });
        debug!(id, target = ?target, "listener registered");
        Ok(Subscription::new(id, target, rx, &self.inner))
    }
}

fn row_to_document(path: String, id: String, data: String) -> Result<Document> {
    let data = match serde_json::from_str::<Value>(&data)? {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    Ok(Document {
        id,
        path: DocPath::parse(&path)?,
        data,
    })
}

fn read_doc(conn: &Connection, path: &DocPath) -> Result<Option<Document>> {
    let row = conn
        .query_row(
            "SELECT path, id, data FROM documents WHERE path=?1",
            params![path.as_str()],
            doc_row,
        )
        .optional()?;
    row.map(|(p, id, data)| row_to_document(p, id, data))
        .transpose()
}

fn doc_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<(String, String, String)> {
    Ok((r.get(0)?, r.get(1)?, r.get(2)?))
}

fn query_collection(
    conn: &Connection,
    path: &CollectionPath,
    order_by: Option<&str>,
) -> Result<Vec<Document>> {
    let rows: Vec<(String, String, String)> = match order_by {
        Some(field) => {
            let mut stmt = conn.prepare(
                "SELECT path, id, data FROM documents WHERE parent=?1
                 ORDER BY json_extract(data, ?2), id",
            )?;
            let rows = stmt
                .query_map(params![path.as_str(), format!("$.{}", field)], doc_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        }
        None => {
            let mut stmt = conn
                .prepare("SELECT path, id, data FROM documents WHERE parent=?1 ORDER BY id")?;
            let rows = stmt
                .query_map(params![path.as_str()], doc_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        }
    };
    rows.into_iter()
        .map(|(p, id, data)| row_to_document(p, id, data))
        .collect()
}

fn run_query(conn: &Connection, target: &ListenTarget) -> Result<Vec<Document>> {
    match target {
        ListenTarget::Collection { path, order_by } => query_collection(conn, path, *order_by),
        ListenTarget::Document(path) => Ok(read_doc(conn, path)?.into_iter().collect()),
    }
}

fn write_doc(conn: &Connection, path: &DocPath, data: &Map<String, Value>) -> Result<()> {
    let body = serde_json::to_string(data)?;
    conn.execute(
        "INSERT INTO documents(path, parent, id, data, updated_at)
         VALUES (?1, ?2, ?3, ?4, datetime('now'))
         ON CONFLICT(path) DO UPDATE SET data=excluded.data, updated_at=excluded.updated_at",
        params![path.as_str(), path.parent().as_str(), path.id(), body],
    )?;
    Ok(())
}

fn apply_op(conn: &Connection, op: WriteOp) -> Result<()> {
    match op {
        WriteOp::Set { path, data } => write_doc(conn, &path, &data),
        WriteOp::Merge { path, data } => {
            let mut current = read_doc(conn, &path)?.map(|d| d.data).unwrap_or_default();
            merge_fields(&mut current, data, false);
            write_doc(conn, &path, &current)
        }
        WriteOp::Update { path, fields } => {
            let mut current = read_doc(conn, &path)?
                .ok_or_else(|| Error::NotFound(path.to_string()))?
                .data;
            merge_fields(&mut current, fields, true);
            write_doc(conn, &path, &current)
        }
        WriteOp::Delete { path } => {
            conn.execute("DELETE FROM documents WHERE path=?1", params![path.as_str()])?;
            Ok(())
        }
    }
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, Weak};

use super::Document;
use super::path::{CollectionPath, DocPath};
use super::{Inner, lock};

/// What a live query watches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenTarget {
    Collection {
        path: CollectionPath,
        /// Numeric field to sort ascending by; id order otherwise.
        order_by: Option<&'static str>,
    },
    Document(DocPath),
}

impl ListenTarget {
    pub fn collection(path: CollectionPath) -> Self {
        ListenTarget::Collection { path, order_by: None }
    }

    pub fn ordered(path: CollectionPath, field: &'static str) -> Self {
        ListenTarget::Collection {
            path,
            order_by: Some(field),
        }
    }

    pub(crate) fn owner(&self) -> Option<&str> {
        match self {
            ListenTarget::Collection { path, .. } => path.owner(),
            ListenTarget::Document(path) => path.owner(),
        }
    }

    pub(crate) fn is_touched_by(&self, written: &DocPath) -> bool {
        match self {
            ListenTarget::Collection { path, .. } => written.parent() == *path,
            ListenTarget::Document(path) => written == path,
        }
    }
}

/// Full result of a live query at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub docs: Vec<Document>,
    /// Served from local data while the backend was unreachable.
    pub from_cache: bool,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

pub(crate) struct Listener {
    pub(crate) target: ListenTarget,
    pub(crate) tx: Sender<Snapshot>,
}

#[derive(Default)]
pub(crate) struct Registry {
    next_id: u64,
    listeners: HashMap<u64, Listener>,
}

impl Registry {
    pub(crate) fn register(&mut self, target: ListenTarget) -> (u64, Sender<Snapshot>, Receiver<Snapshot>) {
        let (tx, rx) = mpsc::channel();
        self.next_id += 1;
        let id = self.next_id;
        self.listeners.insert(
            id,
            Listener {
                target,
                tx: tx.clone(),
            },
        );
        (id, tx, rx)
    }

    pub(crate) fn remove(&mut self, id: u64) {
        self.listeners.remove(&id);
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Listener> {
        self.listeners.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }
}

/// Handle on a live query. Dropping it stops the feed.
pub struct Subscription {
    id: u64,
    target: ListenTarget,
    rx: Receiver<Snapshot>,
    inner: Weak<Inner>,
}

impl Subscription {
    pub(crate) fn new(id: u64, target: ListenTarget, rx: Receiver<Snapshot>, inner: &Arc<Inner>) -> Self {
        Self {
            id,
            target,
            rx,
            inner: Arc::downgrade(inner),
        }
    }

    pub fn target(&self) -> &ListenTarget {
        &self.target
    }

    /// Newest pending snapshot, discarding the older ones.
    pub fn latest(&self) -> Option<Snapshot> {
        let mut last = None;
        while let Ok(snapshot) = self.rx.try_recv() {
            last = Some(snapshot);
        }
        last
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            lock(&inner.listeners).remove(self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("target", &self.target)
            .finish()
    }
}

pub(crate) type SharedRegistry = Mutex<Registry>;

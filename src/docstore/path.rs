// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Slash separated document and collection paths.
//!
//! Documents sit at an even number of segments (`users/u1`), collections at an
//! odd number (`users/u1/stores`).

use std::fmt;

use crate::error::{Error, Result};
use crate::models::TransactionType;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocPath(String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath(String);

fn check_segment(segment: &str) -> Result<()> {
    if segment.is_empty() || segment.contains('/') || segment == "." || segment == ".." {
        return Err(Error::InvalidPath(segment.to_string()));
    }
    Ok(())
}

fn segment_count(raw: &str) -> Result<usize> {
    let mut n = 0;
    for segment in raw.split('/') {
        check_segment(segment).map_err(|_| Error::InvalidPath(raw.to_string()))?;
        n += 1;
    }
    Ok(n)
}

impl DocPath {
    pub fn parse(raw: &str) -> Result<Self> {
        let n = segment_count(raw)?;
        if n % 2 != 0 {
            return Err(Error::InvalidPath(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn id(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }

    pub fn parent(&self) -> CollectionPath {
        let cut = self.0.rfind('/').unwrap_or(0);
        CollectionPath(self.0[..cut].to_string())
    }

    pub fn collection(&self, name: &str) -> Result<CollectionPath> {
        check_segment(name)?;
        Ok(CollectionPath(format!("{}/{}", self.0, name)))
    }

    /// Uid segment for paths under `users/{uid}`.
    pub fn owner(&self) -> Option<&str> {
        owner_of(&self.0)
    }

    /// Prefix matching every document nested below this one.
    pub fn descendant_prefix(&self) -> String {
        format!("{}/", self.0)
    }
}

impl CollectionPath {
    pub fn parse(raw: &str) -> Result<Self> {
        let n = segment_count(raw)?;
        if n % 2 != 1 {
            return Err(Error::InvalidPath(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn doc(&self, id: &str) -> Result<DocPath> {
        check_segment(id)?;
        Ok(DocPath(format!("{}/{}", self.0, id)))
    }

    pub fn owner(&self) -> Option<&str> {
        owner_of(&self.0)
    }
}

fn owner_of(raw: &str) -> Option<&str> {
    let mut parts = raw.split('/');
    match (parts.next(), parts.next()) {
        (Some("users"), Some(uid)) => Some(uid),
        _ => None,
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fresh document id.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

pub fn user(uid: &str) -> Result<DocPath> {
    CollectionPath("users".to_string()).doc(uid)
}

pub fn preferences(uid: &str) -> Result<DocPath> {
    user(uid)?.collection("preferences")?.doc("user")
}

pub fn stores(uid: &str) -> Result<CollectionPath> {
    user(uid)?.collection("stores")
}

pub fn store(uid: &str, store_id: &str) -> Result<DocPath> {
    stores(uid)?.doc(store_id)
}

pub fn transactions(uid: &str, store_id: &str) -> Result<CollectionPath> {
    store(uid, store_id)?.collection("transactions")
}

pub fn legacy_transactions(
    uid: &str,
    store_id: &str,
    kind: TransactionType,
) -> Result<CollectionPath> {
    store(uid, store_id)?.collection(kind.legacy_collection())
}

pub fn categories(uid: &str, store_id: &str) -> Result<CollectionPath> {
    store(uid, store_id)?.collection("categories")
}

pub fn app_users(uid: &str, store_id: &str) -> Result<CollectionPath> {
    store(uid, store_id)?.collection("app_users")
}

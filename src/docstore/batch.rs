// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use serde::Serialize;
use serde_json::{Map, Value};

use super::path::DocPath;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Replace the whole document.
    Set { path: DocPath, data: Map<String, Value> },
    /// Upsert top-level fields, keeping the others.
    Merge { path: DocPath, data: Map<String, Value> },
    /// Change fields of an existing document; `null` removes a field.
    Update { path: DocPath, fields: Map<String, Value> },
    Delete { path: DocPath },
}

impl WriteOp {
    pub fn path(&self) -> &DocPath {
        match self {
            WriteOp::Set { path, .. }
            | WriteOp::Merge { path, .. }
            | WriteOp::Update { path, .. }
            | WriteOp::Delete { path } => path,
        }
    }
}

/// Writes committed together: all of them land or none do.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

pub(crate) fn to_object<T: Serialize>(value: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::Json(<serde_json::Error as serde::ser::Error>::custom(
            format!("document body must be an object, got {}", other),
        ))),
    }
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<T: Serialize>(&mut self, path: DocPath, value: &T) -> Result<&mut Self> {
        let data = to_object(value)?;
        self.ops.push(WriteOp::Set { path, data });
        Ok(self)
    }

    pub fn merge(&mut self, path: DocPath, data: Map<String, Value>) -> &mut Self {
        self.ops.push(WriteOp::Merge { path, data });
        self
    }

    pub fn update(&mut self, path: DocPath, fields: Map<String, Value>) -> &mut Self {
        self.ops.push(WriteOp::Update { path, fields });
        self
    }

    pub fn delete(&mut self, path: DocPath) -> &mut Self {
        self.ops.push(WriteOp::Delete { path });
        self
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub(crate) fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

impl From<WriteOp> for WriteBatch {
    fn from(op: WriteOp) -> Self {
        Self { ops: vec![op] }
    }
}

/// Apply `incoming` onto `target` the way merge/update writes do.
pub(crate) fn merge_fields(
    target: &mut Map<String, Value>,
    incoming: Map<String, Value>,
    drop_nulls: bool,
) {
    for (key, value) in incoming {
        if drop_nulls && value.is_null() {
            target.remove(&key);
        } else {
            target.insert(key, value);
        }
    }
}

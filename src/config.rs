// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow};
use std::path::PathBuf;

use crate::db;

/// Runtime settings, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// SQLite file. Env var: `SUMBOOK_DB`.
    pub db_path: PathBuf,
    /// Insight endpoint; insights are disabled when unset. Env var: `SUMBOOK_INSIGHT_URL`.
    pub insight_url: Option<String>,
    /// Bearer key sent to the insight endpoint. Env var: `SUMBOOK_INSIGHT_KEY`.
    pub insight_api_key: Option<String>,
    /// Whether new accounts may be created. Env var: `SUMBOOK_ALLOW_SIGNUP`.
    pub allow_signup: bool,
    /// JSON log lines instead of text. Env var: `SUMBOOK_LOG_FORMAT=json`.
    pub log_json: bool,
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(anyhow!("Invalid value '{}' for {}", other, key)),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let db_path = match non_empty("SUMBOOK_DB") {
            Some(p) => PathBuf::from(p),
            None => db::default_db_path()?,
        };
        let allow_signup = match lookup("SUMBOOK_ALLOW_SIGNUP") {
            Some(v) => parse_bool("SUMBOOK_ALLOW_SIGNUP", &v)?,
            None => false,
        };
        let log_json = match non_empty("SUMBOOK_LOG_FORMAT").as_deref() {
            None | Some("text") => false,
            Some("json") => true,
            Some(other) => return Err(anyhow!("Unknown log format '{}' (use text|json)", other)),
        };
        Ok(Self {
            db_path,
            insight_url: non_empty("SUMBOOK_INSIGHT_URL"),
            insight_api_key: non_empty("SUMBOOK_INSIGHT_KEY"),
            allow_signup,
            log_json,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn reads_overrides() {
        let cfg = Config::from_lookup(lookup(&[
            ("SUMBOOK_DB", "/tmp/x.sqlite"),
            ("SUMBOOK_INSIGHT_URL", "http://localhost:9/insight"),
            ("SUMBOOK_ALLOW_SIGNUP", "yes"),
            ("SUMBOOK_LOG_FORMAT", "json"),
        ]))
        .unwrap();
        assert_eq!(cfg.db_path, PathBuf::from("/tmp/x.sqlite"));
        assert_eq!(cfg.insight_url.as_deref(), Some("http://localhost:9/insight"));
        assert_eq!(cfg.insight_api_key, None);
        assert!(cfg.allow_signup);
        assert!(cfg.log_json);
    }

    #[test]
    fn signup_closed_by_default() {
        let cfg = Config::from_lookup(lookup(&[("SUMBOOK_DB", "a.sqlite")])).unwrap();
        assert!(!cfg.allow_signup);
        assert!(!cfg.log_json);
    }

    #[test]
    fn rejects_garbage() {
        assert!(Config::from_lookup(lookup(&[
            ("SUMBOOK_DB", "a.sqlite"),
            ("SUMBOOK_ALLOW_SIGNUP", "maybe"),
        ]))
        .is_err());
        assert!(Config::from_lookup(lookup(&[
            ("SUMBOOK_DB", "a.sqlite"),
            ("SUMBOOK_LOG_FORMAT", "xml"),
        ]))
        .is_err());
    }
}

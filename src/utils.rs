// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, NaiveDate, Utc};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rust_decimal::Decimal;

use crate::context::AppContext;

const UA: &str = concat!("sumbook/", env!("CARGO_PKG_VERSION"));

pub fn http_client() -> Result<reqwest::blocking::Client> {
    let c = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .user_agent(UA)
        .build()?;
    Ok(c)
}

/// RFC 3339 instant, or a bare `YYYY-MM-DD` taken as midnight UTC.
pub fn parse_date(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    let day = NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| {
        format!("Invalid date '{}', expected YYYY-MM-DD or an RFC 3339 instant", s)
    })?;
    day.and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .ok_or_else(|| anyhow!("Invalid date '{}'", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

pub fn fmt_money(d: &Decimal, ccy: &str) -> String {
    format!("{} {:.2}", ccy, d.round_dp(2))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(json_flag: bool, v: &T) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    Ok(false)
}

pub fn id_for_store(ctx: &AppContext, name: &str) -> Result<String> {
    ctx.stores()
        .iter()
        .find(|s| s.name == name.trim())
        .map(|s| s.id.clone())
        .with_context(|| format!("Book '{}' not found", name))
}

pub fn id_for_category(ctx: &AppContext, name: &str) -> Result<String> {
    ctx.categories()
        .iter()
        .find(|c| c.name == name.trim())
        .map(|c| c.id.clone())
        .with_context(|| format!("Category '{}' not found", name))
}

pub fn id_for_app_user(ctx: &AppContext, name: &str) -> Result<String> {
    ctx.app_users()
        .iter()
        .find(|u| u.name == name.trim())
        .map(|u| u.id.clone())
        .with_context(|| format!("Participant '{}' not found", name))
}

pub fn category_name(ctx: &AppContext, id: Option<&str>) -> String {
    id.and_then(|id| ctx.categories().iter().find(|c| c.id == id))
        .map(|c| c.name.clone())
        .unwrap_or_default()
}

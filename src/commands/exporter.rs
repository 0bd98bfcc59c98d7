// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::context::AppContext;
use crate::utils::category_name;
use anyhow::{Context, Result, bail};
use serde::Serialize;
use std::io::Write;

pub fn handle(ctx: &AppContext, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => {
            let fmt = sub
                .get_one::<String>("format")
                .map(|s| s.to_lowercase())
                .unwrap_or_else(|| "csv".to_string());
            let out = sub.get_one::<String>("out").context("--out is required")?;
            let n = export_file(ctx, &fmt, out)?;
            println!("Exported {} transactions to {}", n, out);
            Ok(())
        }
        _ => Ok(()),
    }
}

/// One line of an export; the same columns the importer reads back.
#[derive(Debug, Serialize)]
pub struct ExportRow {
    pub id: String,
    pub date: String,
    pub user_name: String,
    pub r#type: String,
    pub amount: String,
    pub category: String,
}

/// Oldest first, so a file replays in the order things happened.
pub fn export_rows(ctx: &AppContext) -> Vec<ExportRow> {
    let mut txs = ctx.transactions_by_date();
    txs.reverse();
    txs.into_iter()
        .map(|t| ExportRow {
            id: t.id.clone(),
            date: t.date.to_rfc3339(),
            user_name: t.user_name.clone(),
            r#type: t.r#type.to_string(),
            amount: t.amount.to_string(),
            category: category_name(ctx, t.category_id.as_deref()),
        })
        .collect()
}

pub fn write_csv<W: Write>(rows: &[ExportRow], out: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    if rows.is_empty() {
        wtr.write_record(["id", "date", "user_name", "type", "amount", "category"])?;
    }
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<W: Write>(rows: &[ExportRow], mut out: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, rows)?;
    out.flush()?;
    Ok(())
}

/// Write the active book to `out`. Unknown formats fail before the file is
/// created.
pub fn export_file(ctx: &AppContext, fmt: &str, out: &str) -> Result<usize> {
    if !matches!(fmt, "csv" | "json") {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }
    let rows = export_rows(ctx);
    let file = std::fs::File::create(out).with_context(|| format!("Create {}", out))?;
    match fmt {
        "csv" => write_csv(&rows, file)?,
        _ => write_json(&rows, file)?,
    }
    Ok(rows.len())
}

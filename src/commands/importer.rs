// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::context::AppContext;
use crate::models::{ImportSummary, ImportedTransaction, TransactionType, check_amount};
use crate::utils::{parse_date, parse_decimal};
use anyhow::{Context, Result, anyhow};
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use std::io::Read;

pub fn handle(ctx: &mut AppContext, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => {
            let path = sub.get_one::<String>("path").context("--path is required")?.trim();
            let summary = import_file(ctx, path)?;
            println!(
                "Imported {} transactions from {} ({} already present)",
                summary.imported, path, summary.skipped
            );
            Ok(())
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    id: Option<String>,
    date: Option<String>,
    user_name: Option<String>,
    r#type: Option<String>,
    amount: Option<String>,
    category: Option<String>,
}

fn required(value: Option<String>, column: &str, row: usize) -> Result<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .with_context(|| format!("Row {}: {} missing", row, column))
}

/// Parse every row up front so a bad line rejects the whole file.
pub fn read_transactions<R: Read>(reader: R) -> Result<Vec<ImportedTransaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);
    let mut out = Vec::new();
    for (i, result) in rdr.deserialize::<CsvRow>().enumerate() {
        // header is line 1
        let row = i + 2;
        let rec = result.with_context(|| format!("Row {}: malformed", row))?;
        let id = required(rec.id, "id", row)?;
        let date_raw = required(rec.date, "date", row)?;
        let user_name = required(rec.user_name, "user_name", row)?;
        let type_raw = required(rec.r#type, "type", row)?;
        let amount_raw = required(rec.amount, "amount", row)?;

        let r#type: TransactionType = type_raw
            .parse()
            .map_err(|e: String| anyhow!("Row {}: {}", row, e))?;
        let amount = parse_decimal(&amount_raw).with_context(|| format!("Row {}", row))?;
        check_amount(amount).map_err(|e| anyhow!("Row {}: {}", row, e))?;
        let date = parse_date(&date_raw).with_context(|| format!("Row {}", row))?;
        let category = rec
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        out.push(ImportedTransaction {
            id,
            date,
            user_name,
            r#type,
            amount,
            category,
        });
    }
    Ok(out)
}

pub fn import_file(ctx: &mut AppContext, path: &str) -> Result<ImportSummary> {
    let file = std::fs::File::open(path).with_context(|| format!("Open CSV {}", path))?;
    let records = read_transactions(file)?;
    let summary = ctx.import_transactions(records)?;
    ctx.pump();
    Ok(summary)
}

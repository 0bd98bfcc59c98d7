// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::context::AppContext;
use crate::models::{NewTransaction, TransactionPatch, TransactionType};
use crate::utils::{
    category_name, fmt_money, id_for_app_user, id_for_category, maybe_print_json, parse_date,
    parse_decimal, pretty_table,
};
use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use serde::Serialize;

pub fn handle(ctx: &mut AppContext, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(ctx, sub)?,
        Some(("list", sub)) => list(ctx, sub)?,
        Some(("edit", sub)) => edit(ctx, sub)?,
        Some(("rm", sub)) => {
            let id = sub.get_one::<String>("id").context("id is required")?;
            ctx.delete_transaction(id)?;
            println!("Removed transaction {}", id);
        }
        Some(("clear", sub)) => {
            let confirm = sub
                .get_one::<String>("confirm")
                .context("--confirm <book name> is required")?;
            let n = ctx.clear_all_transactions(confirm)?;
            println!("Deleted {} transactions", n);
        }
        _ => {}
    }
    Ok(())
}

/// Participant named by `--user`, or the only participant when the book has
/// just one.
fn participant_name(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<String> {
    if let Some(name) = sub.get_one::<String>("user") {
        id_for_app_user(ctx, name)?;
        return Ok(name.trim().to_string());
    }
    match ctx.app_users() {
        [only] => Ok(only.name.clone()),
        [] => Err(anyhow!("No participants yet; add one with `user add`")),
        _ => Err(anyhow!("Several participants in this book; pass --user")),
    }
}

fn add(ctx: &mut AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let kind: TransactionType = sub
        .get_one::<String>("type")
        .map(String::as_str)
        .unwrap_or("expense")
        .parse()
        .map_err(|e: String| anyhow!(e))?;
    let amount = parse_decimal(sub.get_one::<String>("amount").context("--amount is required")?)?;
    let date = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => Utc::now(),
    };
    let user_name = participant_name(ctx, sub)?;
    let category_id = match sub.get_one::<String>("category") {
        Some(cat) if kind == TransactionType::Expense => Some(id_for_category(ctx, cat)?),
        _ => None,
    };

    let new = NewTransaction::new(&user_name, amount, kind, category_id, date)?;
    let id = ctx.add_transaction(new)?;
    println!(
        "Recorded {} {} for {} on {} (id: {})",
        kind,
        amount,
        user_name,
        date.format("%Y-%m-%d"),
        id
    );
    Ok(())
}

fn edit(ctx: &mut AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").context("id is required")?;
    if !ctx.transactions().iter().any(|t| &t.id == id) {
        return Err(anyhow!("Transaction '{}' not found", id));
    }
    let mut patch = TransactionPatch::default();
    if let Some(name) = sub.get_one::<String>("user") {
        id_for_app_user(ctx, name)?;
        patch.user_name = Some(name.trim().to_string());
    }
    if let Some(amount) = sub.get_one::<String>("amount") {
        patch.amount = Some(parse_decimal(amount)?);
    }
    if let Some(date) = sub.get_one::<String>("date") {
        patch.date = Some(parse_date(date)?);
    }
    if let Some(kind) = sub.get_one::<String>("type") {
        patch.r#type = Some(kind.parse().map_err(|e: String| anyhow!(e))?);
    }
    if sub.get_flag("no_category") {
        patch.category_id = Some(None);
    } else if let Some(cat) = sub.get_one::<String>("category") {
        patch.category_id = Some(Some(id_for_category(ctx, cat)?));
    }
    ctx.update_transaction(id, patch)?;
    println!("Updated transaction {}", id);
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct TransactionRow {
    pub id: String,
    pub date: String,
    pub user_name: String,
    pub r#type: String,
    pub amount: rust_decimal::Decimal,
    pub category: String,
}

/// Newest first, optionally filtered by type and capped at `limit`.
pub fn query_rows(
    ctx: &AppContext,
    kind: Option<TransactionType>,
    limit: Option<usize>,
) -> Vec<TransactionRow> {
    ctx.transactions_by_date()
        .into_iter()
        .filter(|t| kind.is_none_or(|k| t.r#type == k))
        .take(limit.unwrap_or(usize::MAX))
        .map(|t| TransactionRow {
            id: t.id.clone(),
            date: t.date.format("%Y-%m-%d").to_string(),
            user_name: t.user_name.clone(),
            r#type: t.r#type.to_string(),
            amount: t.amount,
            category: category_name(ctx, t.category_id.as_deref()),
        })
        .collect()
}

fn list(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let kind = match sub.get_one::<String>("type") {
        Some(k) => Some(k.parse::<TransactionType>().map_err(|e| anyhow!(e))?),
        None => None,
    };
    let limit = sub.get_one::<usize>("limit").copied();
    let data = query_rows(ctx, kind, limit);
    if !maybe_print_json(sub.get_flag("json"), &data)? {
        let ccy = &ctx.preferences().currency;
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.date.clone(),
                    r.user_name.clone(),
                    r.r#type.clone(),
                    fmt_money(&r.amount, ccy),
                    r.category.clone(),
                    r.id.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Date", "Name", "Type", "Amount", "Category", "Id"], rows)
        );
    }
    Ok(())
}

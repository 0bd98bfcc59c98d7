// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::context::AppContext;
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use anyhow::Result;

pub fn handle(ctx: &AppContext, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary(ctx, sub),
        _ => Ok(()),
    }
}

fn summary(ctx: &AppContext, sub: &clap::ArgMatches) -> Result<()> {
    let s = ctx.summary();
    if maybe_print_json(sub.get_flag("json"), s)? {
        return Ok(());
    }
    let ccy = &ctx.preferences().currency;
    let book = ctx.active_store().map(|b| b.name.as_str()).unwrap_or("-");
    println!("Book: {}", book);
    println!(
        "{}",
        pretty_table(
            &["Income", "Expense", "Balance"],
            vec![vec![
                fmt_money(&s.total_income, ccy),
                fmt_money(&s.total_expense, ccy),
                fmt_money(&s.total_balance, ccy),
            ]],
        )
    );
    let rows = s
        .user_balances
        .iter()
        .map(|u| {
            vec![
                u.name.clone(),
                fmt_money(&u.income, ccy),
                fmt_money(&u.expense, ccy),
                fmt_money(&u.balance, ccy),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Participant", "Income", "Expense", "Balance"], rows)
    );
    Ok(())
}

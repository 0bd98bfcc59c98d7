// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::context::AppContext;
use crate::utils::{id_for_store, maybe_print_json, pretty_table};
use anyhow::{Context, Result};
use serde::Serialize;

#[derive(Serialize)]
struct BookRow<'a> {
    id: &'a str,
    name: &'a str,
    active: bool,
}

pub fn handle(ctx: &mut AppContext, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").context("name is required")?;
            ctx.add_store(name)?;
            println!("Created book '{}' and switched to it", name.trim());
        }
        Some(("list", sub)) => {
            let active = ctx.active_store_id();
            let rows: Vec<BookRow<'_>> = ctx
                .stores()
                .iter()
                .map(|s| BookRow {
                    id: &s.id,
                    name: &s.name,
                    active: Some(s.id.as_str()) == active,
                })
                .collect();
            if !maybe_print_json(sub.get_flag("json"), &rows)? {
                let data = rows
                    .iter()
                    .map(|r| {
                        vec![
                            if r.active { "*".to_string() } else { String::new() },
                            r.name.to_string(),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["", "Book"], data));
            }
        }
        Some(("rename", sub)) => {
            let from = sub.get_one::<String>("name").context("name is required")?;
            let to = sub.get_one::<String>("to").context("--to is required")?;
            let id = id_for_store(ctx, from)?;
            ctx.rename_store(&id, to)?;
            println!("Renamed book '{}' to '{}'", from, to.trim());
        }
        Some(("switch", sub)) => {
            let name = sub.get_one::<String>("name").context("name is required")?;
            let id = id_for_store(ctx, name)?;
            ctx.switch_store(&id)?;
            println!("Switched to book '{}'", name);
        }
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("name").context("name is required")?;
            let id = id_for_store(ctx, name)?;
            ctx.delete_store(&id)?;
            println!("Deleted book '{}' and everything in it", name);
        }
        _ => {}
    }
    Ok(())
}

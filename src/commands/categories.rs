// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::context::AppContext;
use crate::models::CategoryIcon;
use crate::utils::{id_for_category, maybe_print_json, pretty_table};
use anyhow::{Context, Result, anyhow};

fn icon_arg(sub: &clap::ArgMatches) -> Result<Option<CategoryIcon>> {
    sub.get_one::<String>("icon")
        .map(|s| s.parse::<CategoryIcon>().map_err(|e| anyhow!(e)))
        .transpose()
}

pub fn handle(ctx: &mut AppContext, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").context("name is required")?;
            let icon = icon_arg(sub)?.unwrap_or_default();
            ctx.add_category(name, icon)?;
            println!("Added category '{}' ({})", name.trim(), icon);
        }
        Some(("list", sub)) => {
            if !maybe_print_json(sub.get_flag("json"), &ctx.categories())? {
                let data = ctx
                    .categories()
                    .iter()
                    .map(|c| vec![c.name.clone(), c.icon.to_string()])
                    .collect();
                println!("{}", pretty_table(&["Category", "Icon"], data));
            }
        }
        Some(("edit", sub)) => {
            let name = sub.get_one::<String>("name").context("name is required")?;
            let id = id_for_category(ctx, name)?;
            let rename = sub.get_one::<String>("rename").map(String::as_str);
            ctx.update_category(&id, rename, icon_arg(sub)?)?;
            println!("Updated category '{}'", name);
        }
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("name").context("name is required")?;
            let id = id_for_category(ctx, name)?;
            ctx.delete_category(&id)?;
            println!("Removed category '{}'", name);
        }
        Some(("order", sub)) => {
            let ids = sub
                .get_many::<String>("names")
                .context("names are required")?
                .map(|n| id_for_category(ctx, n))
                .collect::<Result<Vec<_>>>()?;
            ctx.update_category_order(&ids)?;
            println!("Reordered {} categories", ids.len());
        }
        Some(("icons", _)) => {
            for icon in CategoryIcon::ALL {
                println!("{}", icon);
            }
        }
        _ => {}
    }
    Ok(())
}

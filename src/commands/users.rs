// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Participants of the active book.

use crate::context::AppContext;
use crate::utils::{id_for_app_user, maybe_print_json, pretty_table};
use anyhow::{Context, Result};

pub fn handle(ctx: &mut AppContext, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").context("name is required")?;
            ctx.add_app_user(name)?;
            println!("Added participant '{}'", name.trim());
        }
        Some(("list", sub)) => {
            if !maybe_print_json(sub.get_flag("json"), &ctx.app_users())? {
                let data = ctx
                    .app_users()
                    .iter()
                    .map(|u| vec![u.name.clone()])
                    .collect();
                println!("{}", pretty_table(&["Participant"], data));
            }
        }
        Some(("rename", sub)) => {
            let from = sub.get_one::<String>("name").context("name is required")?;
            let to = sub.get_one::<String>("to").context("--to is required")?;
            let id = id_for_app_user(ctx, from)?;
            ctx.rename_app_user(&id, to)?;
            println!("Renamed participant '{}' to '{}'", from, to.trim());
        }
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("name").context("name is required")?;
            let id = id_for_app_user(ctx, name)?;
            ctx.delete_app_user(&id)?;
            println!("Removed participant '{}'", name);
        }
        Some(("order", sub)) => {
            let ids = sub
                .get_many::<String>("names")
                .context("names are required")?
                .map(|n| id_for_app_user(ctx, n))
                .collect::<Result<Vec<_>>>()?;
            ctx.update_app_user_order(&ids)?;
            println!("Reordered {} participants", ids.len());
        }
        _ => {}
    }
    Ok(())
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::context::AppContext;
use crate::models::PreferencesPatch;
use crate::utils::maybe_print_json;
use anyhow::Result;

pub fn handle(ctx: &mut AppContext, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => {
            let prefs = ctx.preferences();
            if !maybe_print_json(sub.get_flag("json"), prefs)? {
                println!("Currency: {}", prefs.currency);
                println!("Address:  {}", prefs.address.as_deref().unwrap_or("-"));
                if let Some(book) = ctx.active_store() {
                    println!("Book:     {}", book.name);
                }
            }
        }
        Some(("set", sub)) => {
            let patch = PreferencesPatch {
                currency: sub.get_one::<String>("currency").cloned(),
                address: sub.get_one::<String>("address").cloned(),
            };
            ctx.update_preferences(patch)?;
            println!("Preferences saved");
        }
        _ => {}
    }
    Ok(())
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};

use sumbook::config::Config;
use sumbook::context::AppContext;
use sumbook::docstore::Backend;
use sumbook::models::AuthUser;
use sumbook::{auth, cli, commands, db, logging};

fn credentials(m: &clap::ArgMatches) -> Result<(&str, &str)> {
    let email = m
        .get_one::<String>("email")
        .context("--email (or SUMBOOK_EMAIL) is required")?;
    let password = m
        .get_one::<String>("password")
        .context("--password (or SUMBOOK_PASSWORD) is required")?;
    Ok((email, password))
}

fn main() -> Result<()> {
    let cfg = Config::from_env()?;
    logging::init(cfg.log_json);

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let conn = db::open_or_init(&cfg.db_path)?;
    match matches.subcommand_name() {
        None => {
            cli::build_cli().print_help()?;
            println!();
            return Ok(());
        }
        Some("init") => {
            println!("Database initialized at {}", cfg.db_path.display());
            return Ok(());
        }
        _ => {}
    }

    let backend = Backend::new(conn);
    let (email, password) = credentials(&matches)?;
    let user: AuthUser = match matches.subcommand() {
        Some(("signup", sub)) => {
            let name = sub.get_one::<String>("name").map(String::as_str);
            auth::sign_up(&backend, cfg.allow_signup, email, password, name)
                .map_err(|e| anyhow::anyhow!(e.user_message()))?
        }
        _ => auth::sign_in(&backend, email, password)
            .map_err(|e| anyhow::anyhow!(e.user_message()))?,
    };

    let mut ctx = AppContext::new(backend);
    ctx.init(user)?;

    let outcome: Result<()> = match matches.subcommand() {
        Some(("signup", _)) => {
            let book = ctx.active_store().map(|s| s.name.clone()).unwrap_or_default();
            println!("Account created for {} (book: {})", email, book);
            Ok(())
        }
        Some(("book", sub)) => commands::books::handle(&mut ctx, sub),
        Some(("user", sub)) => commands::users::handle(&mut ctx, sub),
        Some(("category", sub)) => commands::categories::handle(&mut ctx, sub),
        Some(("tx", sub)) => commands::transactions::handle(&mut ctx, sub),
        Some(("report", sub)) => commands::reports::handle(&ctx, sub),
        Some(("import", sub)) => commands::importer::handle(&mut ctx, sub),
        Some(("export", sub)) => commands::exporter::handle(&ctx, sub),
        Some(("insight", _)) => commands::insight::handle(&ctx, &cfg),
        Some(("prefs", sub)) => commands::prefs::handle(&mut ctx, sub),
        Some(("migrate", _)) => ctx
            .migrate_legacy_transactions()
            .map(|n| println!("Moved {} legacy transactions", n))
            .map_err(Into::into),
        _ => Ok(()),
    };

    ctx.pump();
    for notice in ctx.drain_notices() {
        eprintln!("{}: {}", notice.action, notice.message);
    }
    ctx.teardown();
    outcome
}

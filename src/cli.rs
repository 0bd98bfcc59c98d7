// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version, value_parser};

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print JSON instead of a table")
}

fn name_arg(help: &'static str) -> Arg {
    Arg::new("name").required(true).help(help)
}

fn rename_to() -> Arg {
    Arg::new("to").long("to").required(true).help("New name")
}

fn order_arg(help: &'static str) -> Arg {
    Arg::new("names")
        .required(true)
        .num_args(1..)
        .help(help)
}

fn book_cmd() -> Command {
    Command::new("book")
        .about("Manage books (separate ledgers)")
        .subcommand_required(true)
        .subcommand(Command::new("add").about("Create a book and switch to it").arg(name_arg("Book name")))
        .subcommand(Command::new("list").about("List books").arg(json_flag()))
        .subcommand(
            Command::new("rename")
                .about("Rename a book")
                .arg(name_arg("Current name"))
                .arg(rename_to()),
        )
        .subcommand(Command::new("switch").about("Make a book active").arg(name_arg("Book name")))
        .subcommand(
            Command::new("rm")
                .about("Delete a book with all its transactions, categories and participants")
                .arg(name_arg("Book name")),
        )
}

fn user_cmd() -> Command {
    Command::new("user")
        .about("Manage participants of the active book")
        .subcommand_required(true)
        .subcommand(Command::new("add").about("Add a participant").arg(name_arg("Participant name")))
        .subcommand(Command::new("list").about("List participants").arg(json_flag()))
        .subcommand(
            Command::new("rename")
                .about("Rename a participant")
                .arg(name_arg("Current name"))
                .arg(rename_to()),
        )
        .subcommand(Command::new("rm").about("Remove a participant").arg(name_arg("Participant name")))
        .subcommand(
            Command::new("order")
                .about("Reorder participants")
                .arg(order_arg("Every participant name, in the new order")),
        )
}

fn category_cmd() -> Command {
    let icon = || Arg::new("icon").long("icon").help("Icon name (see `category icons`)");
    Command::new("category")
        .about("Manage expense categories of the active book")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Add a category")
                .arg(name_arg("Category name"))
                .arg(icon()),
        )
        .subcommand(Command::new("list").about("List categories").arg(json_flag()))
        .subcommand(
            Command::new("edit")
                .about("Rename a category or change its icon")
                .arg(name_arg("Category name"))
                .arg(Arg::new("rename").long("rename").help("New name"))
                .arg(icon()),
        )
        .subcommand(Command::new("rm").about("Delete a category").arg(name_arg("Category name")))
        .subcommand(
            Command::new("order")
                .about("Reorder categories")
                .arg(order_arg("Every category name, in the new order")),
        )
        .subcommand(Command::new("icons").about("List available icons"))
}

fn tx_cmd() -> Command {
    let kind = || {
        Arg::new("type")
            .long("type")
            .value_parser(["income", "expense"])
            .help("income or expense")
    };
    Command::new("tx")
        .about("Record and review transactions")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Record a transaction")
                .arg(Arg::new("amount").long("amount").required(true).help("Positive amount"))
                .arg(kind().default_value("expense"))
                .arg(Arg::new("user").long("user").help("Participant name"))
                .arg(Arg::new("category").long("category").help("Category name (expenses only)"))
                .arg(Arg::new("date").long("date").help("YYYY-MM-DD; defaults to now")),
        )
        .subcommand(
            Command::new("list")
                .about("List transactions, newest first")
                .arg(kind())
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_parser(value_parser!(usize)),
                )
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("edit")
                .about("Change fields of a transaction")
                .arg(Arg::new("id").required(true))
                .arg(Arg::new("amount").long("amount"))
                .arg(kind())
                .arg(Arg::new("user").long("user"))
                .arg(Arg::new("category").long("category"))
                .arg(
                    Arg::new("no_category")
                        .long("no-category")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("category"),
                )
                .arg(Arg::new("date").long("date")),
        )
        .subcommand(Command::new("rm").about("Delete a transaction").arg(Arg::new("id").required(true)))
        .subcommand(
            Command::new("clear")
                .about("Delete every transaction in the active book")
                .arg(
                    Arg::new("confirm")
                        .long("confirm")
                        .required(true)
                        .help("Repeat the book name to confirm"),
                ),
        )
}

pub fn build_cli() -> Command {
    Command::new("sumbook")
        .about("Shared income and expense books")
        .version(crate_version!())
        .arg(
            Arg::new("email")
                .long("email")
                .env("SUMBOOK_EMAIL")
                .global(true)
                .help("Account email"),
        )
        .arg(
            Arg::new("password")
                .long("password")
                .env("SUMBOOK_PASSWORD")
                .hide_env_values(true)
                .global(true)
                .help("Account password"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("signup")
                .about("Create an account")
                .arg(Arg::new("name").long("name").help("Display name")),
        )
        .subcommand(book_cmd())
        .subcommand(user_cmd())
        .subcommand(category_cmd())
        .subcommand(tx_cmd())
        .subcommand(
            Command::new("report")
                .about("Reports")
                .subcommand_required(true)
                .subcommand(
                    Command::new("summary")
                        .about("Totals and per-participant balances")
                        .arg(json_flag()),
                ),
        )
        .subcommand(
            Command::new("import")
                .about("Import data")
                .subcommand_required(true)
                .subcommand(
                    Command::new("transactions")
                        .about("Import transactions from CSV")
                        .arg(Arg::new("path").long("path").required(true)),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand_required(true)
                .subcommand(
                    Command::new("transactions")
                        .about("Export transactions of the active book")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .default_value("csv")
                                .help("csv or json"),
                        )
                        .arg(Arg::new("out").long("out").required(true)),
                ),
        )
        .subcommand(Command::new("insight").about("Describe recent spending"))
        .subcommand(
            Command::new("prefs")
                .about("Account preferences")
                .subcommand_required(true)
                .subcommand(Command::new("show").arg(json_flag()))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("currency").long("currency"))
                        .arg(Arg::new("address").long("address")),
                ),
        )
        .subcommand(
            Command::new("migrate")
                .about("Move transactions from the old expenses/incomes collections"),
        )
}

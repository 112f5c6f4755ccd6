// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{crate_version, value_parser, Arg, ArgAction, Command};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .help("Print as pretty JSON")
            .action(ArgAction::SetTrue),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .help("Print as JSON lines")
            .action(ArgAction::SetTrue),
    )
}

fn scope_args(cmd: Command) -> Command {
    json_flags(cmd)
        .arg(
            Arg::new("book")
                .long("book")
                .help("Restrict to a single book"),
        )
        .arg(
            Arg::new("currency")
                .long("currency")
                .help("Report in this currency instead of the default"),
        )
}

pub fn build_cli() -> Command {
    Command::new("billfold")
        .version(crate_version!())
        .about("Multi-currency expense books, financial insights, and export")
        .subcommand(Command::new("init").about("Initialize the local database"))
        .subcommand(
            Command::new("book")
                .about("Manage expense books")
                .subcommand(
                    Command::new("add")
                        .about("Add a book")
                        .arg(Arg::new("name").required(true))
                        .arg(
                            Arg::new("currency")
                                .long("currency")
                                .default_value("USD")
                                .help("Home currency for entries of this book"),
                        ),
                )
                .subcommand(json_flags(Command::new("list").about("List books")))
                .subcommand(
                    Command::new("lock-rate")
                        .about("Pin the conversion rate used for every entry of a book")
                        .arg(Arg::new("name").required(true))
                        .arg(Arg::new("rate").long("rate").required(true))
                        .arg(
                            Arg::new("currency")
                                .long("currency")
                                .required(true)
                                .help("Currency the locked rate converts into"),
                        ),
                )
                .subcommand(
                    Command::new("unlock-rate")
                        .about("Clear a book's pinned conversion rate")
                        .arg(Arg::new("name").required(true)),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Remove a book and its entries")
                        .arg(Arg::new("name").required(true)),
                ),
        )
        .subcommand(
            Command::new("category")
                .about("Manage categories")
                .subcommand(
                    Command::new("add")
                        .about("Add a category")
                        .arg(Arg::new("name").required(true))
                        .arg(Arg::new("icon").long("icon")),
                )
                .subcommand(Command::new("list").about("List categories"))
                .subcommand(
                    Command::new("rm")
                        .about("Remove a category")
                        .arg(Arg::new("name").required(true)),
                ),
        )
        .subcommand(
            Command::new("entry")
                .about("Record and list entries")
                .subcommand(
                    Command::new("add")
                        .about("Record an entry")
                        .arg(Arg::new("book").long("book").required(true))
                        .arg(
                            Arg::new("kind")
                                .long("kind")
                                .required(true)
                                .value_parser(["income", "expense"]),
                        )
                        .arg(Arg::new("date").long("date").required(true))
                        .arg(
                            Arg::new("amount")
                                .long("amount")
                                .required(true)
                                .help("Positive magnitude; direction comes from --kind"),
                        )
                        .arg(
                            Arg::new("currency")
                                .long("currency")
                                .help("Defaults to the book's currency"),
                        )
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("payee").long("payee"))
                        .arg(Arg::new("note").long("note")),
                )
                .subcommand(
                    json_flags(Command::new("list").about("List entries"))
                        .arg(Arg::new("book").long("book"))
                        .arg(Arg::new("month").long("month").help("YYYY-MM"))
                        .arg(
                            Arg::new("kind")
                                .long("kind")
                                .value_parser(["income", "expense"]),
                        )
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                ),
        )
        .subcommand(
            Command::new("insights")
                .about("Financial insights over normalized entries")
                .subcommand(scope_args(
                    Command::new("summary").about("Totals, savings rate, and top category"),
                ))
                .subcommand(
                    scope_args(Command::new("trend").about("Income/expense trend buckets"))
                        .arg(
                            Arg::new("by")
                                .long("by")
                                .value_parser(["week", "month"])
                                .default_value("month"),
                        )
                        .arg(
                            Arg::new("buckets")
                                .long("buckets")
                                .value_parser(value_parser!(usize))
                                .help("How many buckets (default 8 weekly, 6 monthly)"),
                        ),
                )
                .subcommand(
                    scope_args(Command::new("categories").about("Expense breakdown per category"))
                        .arg(
                            Arg::new("top")
                                .long("top")
                                .value_parser(value_parser!(usize))
                                .help("Keep only the n largest groups"),
                        ),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export data as CSV or JSON")
                .subcommand(
                    Command::new("entries")
                        .about("Export entries")
                        .arg(Arg::new("format").long("format").required(true))
                        .arg(Arg::new("out").long("out").required(true))
                        .arg(Arg::new("book").long("book"))
                        .arg(Arg::new("from").long("from").help("YYYY-MM-DD"))
                        .arg(Arg::new("to").long("to").help("YYYY-MM-DD")),
                )
                .subcommand(
                    Command::new("books")
                        .about("Export books")
                        .arg(Arg::new("format").long("format").required(true))
                        .arg(Arg::new("out").long("out").required(true)),
                )
                .subcommand(
                    Command::new("categories")
                        .about("Export categories")
                        .arg(Arg::new("format").long("format").required(true))
                        .arg(Arg::new("out").long("out").required(true)),
                ),
        )
        .subcommand(
            Command::new("import").about("Import data").subcommand(
                Command::new("entries")
                    .about("Import entries from CSV")
                    .arg(Arg::new("path").long("path").required(true)),
            ),
        )
        .subcommand(
            Command::new("fx")
                .about("Reporting currency and exchange rates")
                .subcommand(
                    Command::new("set-default")
                        .about("Set the default reporting currency")
                        .arg(Arg::new("currency").required(true)),
                )
                .subcommand(
                    Command::new("fetch")
                        .about("Fetch daily rates from Frankfurter (ECB)")
                        .arg(
                            Arg::new("days")
                                .long("days")
                                .value_parser(value_parser!(usize)),
                        ),
                )
                .subcommand(Command::new("list").about("Show recently stored rates"))
                .subcommand(
                    Command::new("convert")
                        .about("Convert an amount using stored rates")
                        .arg(Arg::new("date").long("date").required(true))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("from").long("from").required(true))
                        .arg(Arg::new("to").long("to").required(true)),
                ),
        )
        .subcommand(Command::new("doctor").about("Inspect the store for inconsistencies"))
        .subcommand(
            Command::new("ping")
                .about("Check connectivity to the rate service")
                .arg(
                    Arg::new("attempts")
                        .long("attempts")
                        .value_parser(value_parser!(usize)),
                ),
        )
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn flag(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).action(ArgAction::SetTrue).help(help)
}

fn opt(name: &'static str, long: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(long).num_args(1).help(help)
}

fn req(name: &'static str, long: &'static str, help: &'static str) -> Arg {
    opt(name, long, help).required(true)
}

fn output_flags() -> [Arg; 2] {
    [
        flag("json", "Print pretty JSON"),
        flag("jsonl", "Print one JSON object per line").conflicts_with("json"),
    ]
}

fn profile_args() -> Vec<Arg> {
    vec![
        req("age", "age", "Current age in years"),
        req("savings", "savings", "Current invested savings"),
        req("monthly_contribution", "monthly-contribution", "Amount saved per month"),
        req("monthly_expenses", "monthly-expenses", "Spending per month"),
        opt("return_rate", "return-rate", "Expected annual return, e.g. 0.07").default_value("0.07"),
        opt("inflation", "inflation", "Annual inflation, e.g. 0.025").default_value("0.025"),
        opt("swr", "swr", "Safe withdrawal rate, e.g. 0.04").default_value("0.04"),
        opt("target_age", "target-age", "Target retirement age (informational)"),
        opt(
            "contribution_growth",
            "contribution-growth",
            "Annual increase of contributions, e.g. 0.03",
        ),
    ]
}

fn projection_output_args() -> Vec<Arg> {
    let mut args = vec![
        opt("start_year", "start-year", "Calendar year of the first point")
            .value_parser(value_parser!(i32)),
        opt("csv", "csv", "Also write the yearly points to this CSV file"),
    ];
    args.extend(output_flags());
    args
}

fn transaction_fields() -> Vec<Arg> {
    vec![
        req("amount", "amount", "Amount (positive)"),
        req("description", "description", "Description"),
        req("category", "category", "Category name"),
        opt("kind", "kind", "INCOME or EXPENSE").default_value("EXPENSE"),
        opt("owner", "owner", "Owner id")
            .value_parser(value_parser!(i64))
            .default_value("1"),
    ]
}

pub fn build_cli() -> Command {
    Command::new("firetrack")
        .about("FIRE projections and a recurring-transaction ledger")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .num_args(1)
                .help("Path to the SQLite database (defaults to the platform data dir)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count)
                .help("Increase log verbosity (-v info, -vv debug)"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("fire")
                .about("Financial-independence projections")
                .subcommand_required(true)
                .subcommand(
                    Command::new("project")
                        .about("Project a profile given on the command line")
                        .args(profile_args())
                        .args(projection_output_args()),
                )
                .subcommand(
                    Command::new("save")
                        .about("Save a named profile")
                        .arg(req("name", "name", "Profile name"))
                        .args(profile_args()),
                )
                .subcommand(
                    Command::new("list")
                        .about("List saved profiles")
                        .args(output_flags()),
                )
                .subcommand(
                    Command::new("show")
                        .about("Project a saved profile")
                        .arg(req("name", "name", "Profile name"))
                        .args(projection_output_args()),
                ),
        )
        .subcommand(
            Command::new("tx")
                .about("Realized transactions")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .about("Record a transaction")
                        .arg(req("date", "date", "Date YYYY-MM-DD"))
                        .args(transaction_fields()),
                )
                .subcommand(
                    Command::new("list")
                        .about("List transactions, newest first")
                        .arg(opt("from", "from", "First date YYYY-MM-DD"))
                        .arg(opt("to", "to", "Last date YYYY-MM-DD"))
                        .arg(
                            opt("limit", "limit", "Maximum rows")
                                .value_parser(value_parser!(usize)),
                        )
                        .args(output_flags()),
                )
                .subcommand(
                    Command::new("cashflow")
                        .about("Income minus expenses over a date range")
                        .arg(opt("from", "from", "First date (default: first of this month)"))
                        .arg(opt("to", "to", "Last date (default: today)")),
                ),
        )
        .subcommand(
            Command::new("recurring")
                .about("Recurring obligations")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .about("Register a recurring obligation")
                        .args(transaction_fields())
                        .arg(req("frequency", "frequency", "DAILY|WEEKLY|MONTHLY|YEARLY"))
                        .arg(req("next_due", "next-due", "First due date YYYY-MM-DD")),
                )
                .subcommand(
                    Command::new("list")
                        .about("List obligations")
                        .args(output_flags()),
                )
                .subcommand(
                    Command::new("pause")
                        .about("Stop an obligation from firing")
                        .arg(req("id", "id", "Obligation id")),
                )
                .subcommand(
                    Command::new("resume")
                        .about("Let a paused obligation fire again")
                        .arg(req("id", "id", "Obligation id")),
                )
                .subcommand(
                    Command::new("run")
                        .about("Materialize obligations due on or before a date")
                        .arg(opt("as_of", "as-of", "As-of date (default: today)"))
                        .args(output_flags()),
                )
                .subcommand(
                    Command::new("watch")
                        .about("Run due obligations on a fixed cadence")
                        .arg(
                            opt(
                                "interval_minutes",
                                "interval-minutes",
                                "Minutes between runs (default: recurring.interval_minutes)",
                            )
                            .value_parser(value_parser!(u64).range(1..)),
                        )
                        .arg(
                            opt("max_runs", "max-runs", "Stop after this many runs")
                                .value_parser(value_parser!(u64)),
                        ),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand_required(true)
                .subcommand(
                    Command::new("transactions")
                        .about("Export all transactions")
                        .arg(req("format", "format", "csv|json"))
                        .arg(req("out", "out", "Output path")),
                ),
        )
        .subcommand(
            Command::new("doctor")
                .about("Check obligations for backlog and bad data")
                .arg(opt("as_of", "as-of", "As-of date (default: today)")),
        )
        .subcommand(
            Command::new("config")
                .about("Read and change settings")
                .subcommand_required(true)
                .subcommand(
                    Command::new("get")
                        .about("Print a setting")
                        .arg(req("key", "key", "Setting name")),
                )
                .subcommand(
                    Command::new("set")
                        .about("Change a setting")
                        .arg(req("key", "key", "Setting name"))
                        .arg(req("value", "value", "New value")),
                )
                .subcommand(Command::new("list").about("Print all settings")),
        )
}

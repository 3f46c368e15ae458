// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print as JSON lines"),
    )
}

pub fn build_cli() -> Command {
    Command::new("weekflow")
        .about("Weekly cash-flow periods with balance, stock, and forward-payment tracking")
        .version(clap::crate_version!())
        .subcommand(Command::new("init").about("Initialize the database"))
        .subcommand(
            Command::new("user")
                .about("Manage the active user")
                .subcommand(
                    Command::new("set")
                        .about("Set the active user")
                        .arg(Arg::new("name").required(true)),
                )
                .subcommand(Command::new("show").about("Show the active user"))
                .subcommand(
                    Command::new("currency")
                        .about("Set the display currency label")
                        .arg(Arg::new("code").required(true)),
                ),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and edit transactions")
                .subcommand(
                    Command::new("add")
                        .about("Record a transaction")
                        .arg(Arg::new("date").long("date").help("YYYY-MM-DD, default today"))
                        .arg(Arg::new("kind").long("kind").help("e.g. payment/fixed"))
                        .arg(Arg::new("title").long("title"))
                        .arg(Arg::new("amount").long("amount"))
                        .arg(
                            Arg::new("template")
                                .long("template")
                                .help("Prefill title/kind/amount from a template"),
                        ),
                )
                .subcommand(
                    Command::new("duplicate")
                        .about("Clone a transaction into the same period")
                        .arg(Arg::new("id").required(true)),
                )
                .subcommand(
                    Command::new("edit")
                        .about("Edit title, amount, kind, or date")
                        .arg(Arg::new("id").required(true))
                        .arg(Arg::new("title").long("title"))
                        .arg(Arg::new("amount").long("amount"))
                        .arg(Arg::new("kind").long("kind"))
                        .arg(Arg::new("date").long("date")),
                )
                .subcommand(
                    Command::new("delete")
                        .about("Delete one or more transactions")
                        .arg(Arg::new("ids").num_args(1..).required(true)),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List transactions")
                        .arg(Arg::new("month").long("month").help("Filter by YYYY-MM"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(clap::value_parser!(usize)),
                        ),
                )),
        )
        .subcommand(
            Command::new("periods")
                .about("Inspect and maintain weekly periods")
                .subcommand(json_flags(Command::new("list").about("List periods")))
                .subcommand(
                    Command::new("rebuild")
                        .about("Re-derive all periods from the transaction history"),
                )
                .subcommand(
                    Command::new("set-start")
                        .about("Shift the whole timeline to a new opening balance")
                        .arg(Arg::new("balance").long("balance"))
                        .arg(Arg::new("stock").long("stock"))
                        .arg(Arg::new("forward").long("forward")),
                ),
        )
        .subcommand(
            Command::new("template")
                .about("One-shot prefill templates for tx add")
                .subcommand(
                    Command::new("add")
                        .about("Create or replace a template")
                        .arg(Arg::new("name").required(true))
                        .arg(Arg::new("title").long("title").required(true))
                        .arg(Arg::new("kind").long("kind").required(true))
                        .arg(Arg::new("amount").long("amount").required(true)),
                )
                .subcommand(json_flags(Command::new("list").about("List templates")))
                .subcommand(
                    Command::new("remove")
                        .about("Delete a template")
                        .arg(Arg::new("name").required(true)),
                ),
        )
        .subcommand(Command::new("doctor").about("Audit period invariants"))
}

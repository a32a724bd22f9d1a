// Copyright (c) 2026 Pocketledger Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{value_parser, Arg, ArgAction, Command};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print JSON Lines"),
    )
}

fn account_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_name("ACCOUNT")
        .required(true)
        .help(help)
}

fn amount_arg() -> Arg {
    Arg::new("amount")
        .long("amount")
        .value_name("AMOUNT")
        .required(true)
}

pub fn build_cli() -> Command {
    Command::new("pocketledger")
        .about("Personal accounts, debts, split expenses, and credit-card bill tracking")
        .version(clap::crate_version!())
        .subcommand(Command::new("init").about("Create the database and print its location"))
        .subcommand(
            Command::new("user")
                .about("Manage user profiles")
                .subcommand(
                    Command::new("add")
                        .about("Create a profile")
                        .arg(Arg::new("name").long("name").value_name("NAME").required(true))
                        .arg(
                            Arg::new("currency")
                                .long("currency")
                                .value_name("CCY")
                                .default_value("USD"),
                        ),
                )
                .subcommand(json_flags(Command::new("list").about("List profiles")))
                .subcommand(
                    Command::new("use")
                        .about("Select the active profile")
                        .arg(Arg::new("name").long("name").value_name("NAME").required(true)),
                )
                .subcommand(
                    Command::new("currency")
                        .about("Set the active profile's display currency")
                        .arg(Arg::new("code").long("code").value_name("CCY").required(true)),
                ),
        )
        .subcommand(
            Command::new("account")
                .about("Manage accounts")
                .subcommand(
                    Command::new("add")
                        .about("Create an account")
                        .arg(Arg::new("name").long("name").value_name("NAME").required(true))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .value_name("TYPE")
                                .required(true)
                                .help("bank | cash | credit-card"),
                        )
                        .arg(
                            Arg::new("balance")
                                .long("balance")
                                .value_name("AMOUNT")
                                .default_value("0")
                                .help("Opening balance (credit cards store outstanding debt)"),
                        )
                        .arg(
                            Arg::new("credit-limit")
                                .long("credit-limit")
                                .value_name("AMOUNT"),
                        )
                        .arg(
                            Arg::new("billing-day")
                                .long("billing-day")
                                .value_name("DAY")
                                .value_parser(value_parser!(u8).range(1..=31)),
                        ),
                )
                .subcommand(json_flags(Command::new("list").about("List accounts")))
                .subcommand(
                    Command::new("update")
                        .about("Update an account")
                        .arg(Arg::new("name").long("name").value_name("NAME").required(true))
                        .arg(Arg::new("balance").long("balance").value_name("AMOUNT"))
                        .arg(
                            Arg::new("credit-limit")
                                .long("credit-limit")
                                .value_name("AMOUNT"),
                        )
                        .arg(
                            Arg::new("billing-day")
                                .long("billing-day")
                                .value_name("DAY")
                                .value_parser(value_parser!(u8).range(1..=31)),
                        )
                        .arg(Arg::new("rename").long("rename").value_name("NEW_NAME")),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete an account (its transaction history is kept)")
                        .arg(Arg::new("name").long("name").value_name("NAME").required(true)),
                ),
        )
        .subcommand(
            Command::new("tx")
                .about("Raw ledger entries")
                .subcommand(
                    Command::new("add")
                        .about("Record a signed ledger entry")
                        .arg(account_arg("account", "Account to post against"))
                        .arg(
                            Arg::new("amount")
                                .long("amount")
                                .value_name("AMOUNT")
                                .required(true)
                                .allow_hyphen_values(true)
                                .help("Signed: negative = outflow, positive = inflow"),
                        )
                        .arg(
                            Arg::new("category")
                                .long("category")
                                .value_name("CATEGORY")
                                .required(true),
                        )
                        .arg(
                            Arg::new("description")
                                .long("description")
                                .value_name("TEXT")
                                .required(true),
                        ),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List ledger entries")
                        .arg(Arg::new("account").long("account").value_name("ACCOUNT"))
                        .arg(Arg::new("category").long("category").value_name("CATEGORY"))
                        .arg(
                            Arg::new("month")
                                .long("month")
                                .value_name("YYYY-MM"),
                        )
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_name("N")
                                .value_parser(value_parser!(usize)),
                        ),
                )),
        )
        .subcommand(
            Command::new("expense")
                .about("Record an expense, optionally split with others")
                .arg(account_arg("account", "Account the expense is paid from"))
                .arg(amount_arg())
                .arg(
                    Arg::new("category")
                        .long("category")
                        .value_name("CATEGORY")
                        .required(true),
                )
                .arg(
                    Arg::new("description")
                        .long("description")
                        .value_name("TEXT")
                        .required(true),
                )
                .arg(
                    Arg::new("with")
                        .long("with")
                        .value_name("NAME")
                        .action(ArgAction::Append)
                        .help("Split the expense with this person (repeatable)"),
                ),
        )
        .subcommand(
            Command::new("income")
                .about("Record income, or money borrowed from a lender")
                .arg(account_arg("account", "Account the inflow lands on"))
                .arg(amount_arg())
                .arg(
                    Arg::new("description")
                        .long("description")
                        .value_name("TEXT")
                        .required(true),
                )
                .arg(
                    Arg::new("lender")
                        .long("lender")
                        .value_name("NAME")
                        .help("Treat the inflow as borrowed from this lender"),
                ),
        )
        .subcommand(
            Command::new("lend")
                .about("Money lent to others")
                .subcommand(
                    Command::new("add")
                        .about("Lend money directly from an account")
                        .arg(Arg::new("to").long("to").value_name("NAME").required(true))
                        .arg(amount_arg())
                        .arg(account_arg("from", "Source account")),
                )
                .subcommand(json_flags(
                    Command::new("list").about("List lent records").arg(
                        Arg::new("outstanding")
                            .long("outstanding")
                            .action(ArgAction::SetTrue)
                            .help("Only records that are not settled yet"),
                    ),
                ))
                .subcommand(
                    Command::new("settle")
                        .about("Record a payment received from a borrower")
                        .arg(
                            Arg::new("id")
                                .long("id")
                                .value_name("ID")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(account_arg("to", "Account the payment lands on"))
                        .arg(
                            Arg::new("amount")
                                .long("amount")
                                .value_name("AMOUNT")
                                .help("Defaults to the full remaining amount"),
                        ),
                ),
        )
        .subcommand(
            Command::new("borrow")
                .about("Money borrowed from others")
                .subcommand(json_flags(
                    Command::new("list").about("List borrow records").arg(
                        Arg::new("outstanding")
                            .long("outstanding")
                            .action(ArgAction::SetTrue)
                            .help("Only records that are not settled yet"),
                    ),
                ))
                .subcommand(
                    Command::new("settle")
                        .about("Pay a lender back from an account")
                        .arg(
                            Arg::new("id")
                                .long("id")
                                .value_name("ID")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(account_arg("from", "Source account"))
                        .arg(
                            Arg::new("amount")
                                .long("amount")
                                .value_name("AMOUNT")
                                .help("Defaults to the full remaining amount"),
                        ),
                ),
        )
        .subcommand(
            Command::new("transfer")
                .about("Move money between two accounts")
                .arg(account_arg("from", "Source account"))
                .arg(account_arg("to", "Destination account"))
                .arg(amount_arg())
                .arg(Arg::new("description").long("description").value_name("TEXT")),
        )
        .subcommand(
            Command::new("bill").about("Credit-card bills").subcommand(
                Command::new("pay")
                    .about("Pay a credit-card bill from a source account")
                    .arg(account_arg("card", "Credit-card account"))
                    .arg(account_arg("from", "Source account"))
                    .arg(amount_arg()),
            ),
        )
        .subcommand(
            Command::new("investment")
                .about("Investment holdings at cost basis")
                .subcommand(
                    Command::new("add")
                        .about("Record a holding")
                        .arg(
                            Arg::new("symbol")
                                .long("symbol")
                                .value_name("SYMBOL")
                                .required(true),
                        )
                        .arg(
                            Arg::new("quantity")
                                .long("quantity")
                                .value_name("QTY")
                                .required(true),
                        )
                        .arg(
                            Arg::new("price")
                                .long("price")
                                .value_name("PRICE")
                                .required(true)
                                .help("Purchase price per unit"),
                        )
                        .arg(
                            Arg::new("date")
                                .long("date")
                                .value_name("YYYY-MM-DD")
                                .required(true),
                        )
                        .arg(Arg::new("name").long("name").value_name("NAME")),
                )
                .subcommand(json_flags(Command::new("list").about("List holdings")))
                .subcommand(
                    Command::new("rm").about("Remove a holding").arg(
                        Arg::new("id")
                            .long("id")
                            .value_name("ID")
                            .required(true)
                            .value_parser(value_parser!(i64)),
                    ),
                )
                .subcommand(json_flags(
                    Command::new("summary").about("Cost basis per symbol"),
                )),
        )
        .subcommand(
            Command::new("report")
                .about("Read-only summaries")
                .subcommand(json_flags(
                    Command::new("balances").about("Account balances and net worth"),
                ))
                .subcommand(json_flags(
                    Command::new("cashflow")
                        .about("Monthly inflow/outflow")
                        .arg(
                            Arg::new("months")
                                .long("months")
                                .value_name("N")
                                .value_parser(value_parser!(usize))
                                .default_value("12"),
                        ),
                ))
                .subcommand(json_flags(
                    Command::new("spend-by-category")
                        .about("Spending per category for one month")
                        .arg(
                            Arg::new("month")
                                .long("month")
                                .value_name("YYYY-MM")
                                .required(true),
                        ),
                ))
                .subcommand(json_flags(
                    Command::new("debts").about("Outstanding borrow/lent records"),
                )),
        )
        .subcommand(
            Command::new("export")
                .about("Export data to files")
                .subcommand(
                    Command::new("transactions")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .value_name("csv|json")
                                .required(true),
                        )
                        .arg(Arg::new("out").long("out").value_name("PATH").required(true)),
                )
                .subcommand(
                    Command::new("debts")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .value_name("csv|json")
                                .required(true),
                        )
                        .arg(Arg::new("out").long("out").value_name("PATH").required(true)),
                ),
        )
        .subcommand(Command::new("doctor").about("Check ledger invariants"))
}

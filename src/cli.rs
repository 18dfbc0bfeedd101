// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, arg, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(arg!(--json "Print JSON").action(ArgAction::SetTrue))
        .arg(arg!(--jsonl "Print one JSON object per line").action(ArgAction::SetTrue))
}

fn month_window(cmd: Command) -> Command {
    cmd.arg(arg!(--start <MONTH> "First month (YYYY-MM)").required(false))
        .arg(arg!(--end <MONTH> "Last month (YYYY-MM)").required(false))
}

fn obligation_id() -> Arg {
    arg!(--obligation <ID> "Obligation id")
        .required(true)
        .value_parser(value_parser!(i64))
}

pub fn build_cli() -> Command {
    Command::new("cashplan")
        .about("Project recurring obligations, reconcile timelines and roll up cash flow")
        .version(clap::crate_version!())
        .arg(
            arg!(--db <PATH> "SQLite database file (defaults to the platform data dir)")
                .required(false)
                .global(true),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("obligation")
                .about("Leasing contracts, subscriptions and recurring expenses")
                .subcommand(
                    Command::new("add")
                        .arg(arg!(--kind <KIND> "leasing|subscription|expense").required(true))
                        .arg(arg!(--name <NAME>).required(true))
                        .arg(arg!(--category <CATEGORY>).required(false))
                        .arg(arg!(--amount <AMOUNT> "Amount per occurrence").required(true))
                        .arg(
                            arg!(--frequency <FREQ> "one_time|monthly|quarterly|yearly|custom")
                                .required(false),
                        )
                        .arg(arg!(--start <DATE> "Start date (YYYY-MM-DD)").required(true))
                        .arg(arg!(--end <DATE> "End date (YYYY-MM-DD)").required(false))
                        .arg(arg!(--"off-months" <MONTHS> "Comma-separated YYYY-MM to skip").required(false))
                        .arg(arg!(--dates <DATES> "Comma-separated payment dates").required(false))
                        .arg(arg!(--"first-amount" <AMOUNT> "Amount of the first payment").required(false))
                        .arg(arg!(--total <AMOUNT> "Total amount cap").required(false))
                        .arg(arg!(--inactive "Store as inactive").action(ArgAction::SetTrue)),
                )
                .subcommand(json_flags(
                    Command::new("list").arg(arg!(--active "Only active").action(ArgAction::SetTrue)),
                ))
                .subcommand(
                    Command::new("show").arg(arg!(<id> "Obligation id").value_parser(value_parser!(i64))),
                ),
        )
        .subcommand(
            Command::new("timeline")
                .about("Generate and reconcile payment timelines")
                .subcommand(
                    month_window(Command::new("generate").arg(obligation_id()))
                        .arg(
                            arg!(--"changed-entry" <ID> "Entry whose amount was edited")
                                .required(false)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(
                            arg!(--"changed-month" <MONTH> "Month whose entry was edited")
                                .required(false)
                                .conflicts_with("changed-entry"),
                        )
                        .arg(arg!(--json "Print JSON").action(ArgAction::SetTrue)),
                )
                .subcommand(
                    Command::new("recalc")
                        .arg(obligation_id())
                        .arg(
                            arg!(--entry <ID> "Edited entry")
                                .required(false)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(
                            arg!(--revision <REV> "Expected timeline revision")
                                .required(false)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(arg!(--json "Print JSON").action(ArgAction::SetTrue)),
                )
                .subcommand(
                    Command::new("set")
                        .about("Edit one entry")
                        .arg(obligation_id())
                        .arg(
                            arg!(--entry <ID>)
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(arg!(--amount <AMOUNT>).required(false))
                        .arg(
                            arg!(--fixed <BOOL> "Lock the amount against redistribution")
                                .required(false)
                                .value_parser(value_parser!(bool)),
                        )
                        .arg(arg!(--date <DATE> "Payment date").required(false))
                        .arg(arg!(--notes <TEXT>).required(false))
                        .arg(arg!(--"no-recalc" "Skip redistribution").action(ArgAction::SetTrue)),
                )
                .subcommand(json_flags(month_window(
                    Command::new("list").arg(obligation_id()),
                ))),
        )
        .subcommand(
            Command::new("payment")
                .about("Actual payments")
                .subcommand(
                    Command::new("record")
                        .arg(arg!(--"type" <TYPE> "sale|expense|subscription|leasing|loan").required(true))
                        .arg(arg!(--direction <DIR> "input|output").required(false))
                        .arg(
                            arg!(--reference <ID> "Obligation or loan id")
                                .required(false)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(
                            arg!(--entry <ID> "Timeline entry or loan installment id")
                                .required(false)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(arg!(--date <DATE>).required(true))
                        .arg(arg!(--amount <AMOUNT>).required(true))
                        .arg(arg!(--notes <TEXT>).required(false))
                        .arg(arg!(--json "Print JSON").action(ArgAction::SetTrue)),
                )
                .subcommand(json_flags(month_window(
                    Command::new("list")
                        .arg(arg!(--"type" <TYPE>).required(false))
                        .arg(arg!(--direction <DIR>).required(false))
                        .arg(
                            arg!(--reference <ID>)
                                .required(false)
                                .value_parser(value_parser!(i64)),
                        ),
                ))),
        )
        .subcommand(
            Command::new("sale").about("Declared sales").subcommand(
                Command::new("add")
                    .arg(arg!(--date <DATE>).required(true))
                    .arg(arg!(--amount <AMOUNT>).required(true))
                    .arg(arg!(--kind <KIND>).required(false))
                    .arg(arg!(--description <TEXT>).required(false)),
            )
            .subcommand(json_flags(Command::new("list"))),
        )
        .subcommand(
            Command::new("personnel")
                .about("Payroll")
                .subcommand(
                    Command::new("add")
                        .arg(arg!(--name <NAME>).required(true))
                        .arg(arg!(--salary <AMOUNT> "Monthly base salary").required(true))
                        .arg(arg!(--charges <AMOUNT> "Employer charges").required(false))
                        .arg(arg!(--"charges-type" <TYPE> "percentage|flat").required(false))
                        .arg(arg!(--start <DATE>).required(true))
                        .arg(arg!(--end <DATE>).required(false)),
                )
                .subcommand(json_flags(Command::new("list"))),
        )
        .subcommand(
            Command::new("loan")
                .about("Loans and amortization schedules")
                .subcommand(
                    Command::new("add")
                        .arg(arg!(--name <NAME>).required(true))
                        .arg(arg!(--principal <AMOUNT>).required(true))
                        .arg(arg!(--rate <PCT> "Annual interest rate in percent").required(true))
                        .arg(
                            arg!(--months <N> "Duration in months")
                                .required(true)
                                .value_parser(value_parser!(u32)),
                        )
                        .arg(arg!(--start <DATE> "First installment date").required(true))
                        .arg(arg!(--off <LIST> "Comma-separated interest-only installments").required(false)),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(json_flags(
                    Command::new("schedule").arg(arg!(<id> "Loan id").value_parser(value_parser!(i64))),
                )),
        )
        .subcommand(
            Command::new("cashflow").about("Monthly cash-flow projection").subcommand(json_flags(
                month_window(Command::new("project"))
                    .arg(arg!(--opening <AMOUNT> "Opening balance").required(false)),
            )),
        )
        .subcommand(
            Command::new("export").subcommand(
                month_window(
                    Command::new("timeline")
                        .arg(arg!(--format <FMT> "csv|json").required(true))
                        .arg(arg!(--out <PATH>).required(true))
                        .arg(
                            arg!(--obligation <ID>)
                                .required(false)
                                .value_parser(value_parser!(i64)),
                        ),
                ),
            ),
        )
        .subcommand(
            Command::new("config")
                .about("Settings: opening_balance, base_currency")
                .subcommand(
                    Command::new("set")
                        .arg(arg!(<key>))
                        .arg(arg!(<value>)),
                )
                .subcommand(Command::new("get").arg(arg!([key]))),
        )
        .subcommand(Command::new("doctor").about("Audit stored timelines"))
}

// Copyright (c) 2026 Pocketledger Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::Ledger;
use crate::models::Session;
use crate::utils::{fmt_money, id_for_account, parse_positive_amount};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("pay", sub)) => pay(conn, session, sub)?,
        _ => {}
    }
    Ok(())
}

fn pay(conn: &mut Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let card = sub.get_one::<String>("card").unwrap().trim().to_string();
    let from = sub.get_one::<String>("from").unwrap().trim().to_string();
    let amount = parse_positive_amount(sub.get_one::<String>("amount").unwrap().trim())?;

    let card_id = id_for_account(conn, session.user_id, &card)?;
    let from_id = id_for_account(conn, session.user_id, &from)?;
    let outcome = {
        let mut ledger = Ledger::new(conn, session.clone());
        ledger.pay_bill(card_id, from_id, amount)?
    };
    println!(
        "Paid {} to '{}' from '{}'",
        fmt_money(&amount, &session.currency),
        card,
        from
    );
    if let Some(adjustment) = outcome.adjustment {
        println!(
            "Recorded Fees adjustment of {} to reconcile the payment",
            fmt_money(&adjustment, &session.currency)
        );
    }
    println!(
        "'{}' balance is now {}",
        card,
        fmt_money(&outcome.card_balance, &session.currency)
    );
    Ok(())
}

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
    let account = m.get_one::<String>("account").unwrap().trim().to_string();
    let amount = parse_positive_amount(m.get_one::<String>("amount").unwrap().trim())?;
    let description = m.get_one::<String>("description").unwrap().to_string();
    let lender = m.get_one::<String>("lender").map(|s| s.trim().to_string());

    let account_id = id_for_account(conn, session.user_id, &account)?;
    {
        let mut ledger = Ledger::new(conn, session.clone());
        ledger.add_income(&description, amount, account_id, lender.as_deref())?;
    }
    match lender {
        Some(lender) => println!(
            "Recorded {} borrowed from {} into '{}'",
            fmt_money(&amount, &session.currency),
            lender,
            account
        ),
        None => println!(
            "Recorded income {} into '{}'",
            fmt_money(&amount, &session.currency),
            account
        ),
    }
    Ok(())
}

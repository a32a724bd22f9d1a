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
    let from = m.get_one::<String>("from").unwrap().trim().to_string();
    let to = m.get_one::<String>("to").unwrap().trim().to_string();
    let amount = parse_positive_amount(m.get_one::<String>("amount").unwrap().trim())?;
    let description = m.get_one::<String>("description").map(|s| s.to_string());

    let from_id = id_for_account(conn, session.user_id, &from)?;
    let to_id = id_for_account(conn, session.user_id, &to)?;
    {
        let mut ledger = Ledger::new(conn, session.clone());
        ledger.add_transfer(from_id, to_id, amount, description.as_deref())?;
    }
    println!(
        "Transferred {} from '{}' to '{}'",
        fmt_money(&amount, &session.currency),
        from,
        to
    );
    Ok(())
}

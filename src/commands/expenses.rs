// Copyright (c) 2026 Pocketledger Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::Ledger;
use crate::models::{Category, Session};
use crate::utils::{fmt_money, id_for_account, parse_positive_amount};
use anyhow::{bail, Result};
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn handle(conn: &mut Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    let account = m.get_one::<String>("account").unwrap().trim().to_string();
    let amount = parse_positive_amount(m.get_one::<String>("amount").unwrap().trim())?;
    let category = Category::parse(m.get_one::<String>("category").unwrap().trim());
    let description = m.get_one::<String>("description").unwrap().to_string();
    let split_with: Vec<String> = m
        .get_many::<String>("with")
        .map(|v| v.map(|s| s.trim().to_string()).collect())
        .unwrap_or_default();
    // The engine expects a validated split list.
    if split_with.iter().any(|s| s.is_empty()) {
        bail!("Split names must not be empty");
    }

    let account_id = id_for_account(conn, session.user_id, &account)?;
    if split_with.is_empty() {
        let mut ledger = Ledger::new(conn, session.clone());
        ledger.add_transaction(account_id, -amount, category, &description)?;
        println!(
            "Recorded expense {} on '{}'",
            fmt_money(&amount, &session.currency),
            account
        );
    } else {
        let share = amount / Decimal::from(split_with.len() as i64 + 1);
        {
            let mut ledger = Ledger::new(conn, session.clone());
            ledger.add_split_expense(&description, amount, account_id, category, &split_with)?;
        }
        println!(
            "Recorded split expense {} on '{}' ({} owe {} each)",
            fmt_money(&amount, &session.currency),
            account,
            split_with.len(),
            fmt_money(&share, &session.currency)
        );
    }
    Ok(())
}

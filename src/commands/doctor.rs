// Copyright (c) 2026 Pocketledger Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::settle_tolerance;
use crate::models::Session;
use crate::utils::pretty_table;
use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, session: &Session) -> Result<()> {
    let rows = collect_issues(conn, session.user_id)?;
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

pub fn collect_issues(conn: &Connection, user_id: i64) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();

    // 1) Debt arithmetic: original must equal remaining + settled payments.
    check_debts(conn, user_id, "borrows", "borrow_settlements", "borrow_id", "lender", &mut rows)?;
    check_debts(conn, user_id, "lent", "lent_settlements", "lent_id", "borrower", &mut rows)?;

    // 2) Credit cards store debt as a negative balance.
    let mut stmt = conn.prepare(
        "SELECT name, balance FROM accounts WHERE user_id=?1 AND type='Credit Card'",
    )?;
    let mut cur = stmt.query(params![user_id])?;
    while let Some(r) = cur.next()? {
        let name: String = r.get(0)?;
        let balance_s: String = r.get(1)?;
        let balance = Decimal::from_str_exact(&balance_s)
            .with_context(|| format!("Invalid balance '{}' on '{}'", balance_s, name))?;
        if balance > Decimal::ZERO {
            rows.push(vec![
                "credit_card_positive_balance".into(),
                format!("{} {}", name, balance),
            ]);
        }
    }

    // 3) Entries pointing at deleted accounts. Accepted policy, reported
    //    for information only.
    let mut stmt2 = conn.prepare(
        "SELECT account_id, COUNT(*) FROM transactions t
         WHERE t.user_id=?1
           AND NOT EXISTS (SELECT 1 FROM accounts a WHERE a.id=t.account_id)
         GROUP BY account_id",
    )?;
    let mut cur2 = stmt2.query(params![user_id])?;
    while let Some(r) = cur2.next()? {
        let account_id: i64 = r.get(0)?;
        let count: i64 = r.get(1)?;
        rows.push(vec![
            "dangling_account_ref (info)".into(),
            format!("account {}: {} entries", account_id, count),
        ]);
    }

    Ok(rows)
}

fn check_debts(
    conn: &Connection,
    user_id: i64,
    table: &str,
    settlements_table: &str,
    parent_col: &str,
    counterparty_col: &str,
    rows: &mut Vec<Vec<String>>,
) -> Result<()> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, {}, original_amount, remaining_amount, status, settled_date FROM {} WHERE user_id=?1",
        counterparty_col, table
    ))?;
    let mut paid_stmt = conn.prepare(&format!(
        "SELECT amount FROM {} WHERE {}=?1",
        settlements_table, parent_col
    ))?;

    let mut cur = stmt.query(params![user_id])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let counterparty: String = r.get(1)?;
        let original_s: String = r.get(2)?;
        let remaining_s: String = r.get(3)?;
        let status: String = r.get(4)?;
        let settled_date: Option<String> = r.get(5)?;

        let original = Decimal::from_str_exact(&original_s)
            .with_context(|| format!("Invalid original amount '{}' for {}", original_s, counterparty))?;
        let remaining = Decimal::from_str_exact(&remaining_s)
            .with_context(|| format!("Invalid remaining amount '{}' for {}", remaining_s, counterparty))?;

        let mut paid = Decimal::ZERO;
        let mut paid_cur = paid_stmt.query(params![id])?;
        while let Some(p) = paid_cur.next()? {
            let amount_s: String = p.get(0)?;
            paid += Decimal::from_str_exact(&amount_s)
                .with_context(|| format!("Invalid settlement amount '{}'", amount_s))?;
        }

        let drift = original - (remaining + paid);
        if drift.abs() > settle_tolerance() {
            rows.push(vec![
                "debt_sum_mismatch".into(),
                format!("{} {} ({}): drift {}", table, id, counterparty, drift),
            ]);
        }
        match (status.as_str(), settled_date.is_some()) {
            ("settled", false) => rows.push(vec![
                "settled_date_missing".into(),
                format!("{} {} ({})", table, id, counterparty),
            ]),
            ("outstanding", true) => rows.push(vec![
                "settled_date_unexpected".into(),
                format!("{} {} ({})", table, id, counterparty),
            ]),
            _ => {}
        }
        if status == "settled" && remaining != Decimal::ZERO {
            rows.push(vec![
                "settled_nonzero_remaining".into(),
                format!("{} {} ({}): remaining {}", table, id, counterparty, remaining),
            ]);
        }
    }
    Ok(())
}

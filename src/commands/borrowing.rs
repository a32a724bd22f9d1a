// Copyright (c) 2026 Pocketledger Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::lending::load_settlements;
use crate::ledger::Ledger;
use crate::models::{Borrow, DebtStatus, Session};
use crate::utils::{fmt_money, id_for_account, maybe_print_json, parse_positive_amount, pretty_table};
use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;

pub fn handle(conn: &mut Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(conn, session, sub)?,
        Some(("settle", sub)) => settle(conn, session, sub)?,
        _ => {}
    }
    Ok(())
}

pub fn load(conn: &Connection, user_id: i64, outstanding_only: bool) -> Result<Vec<Borrow>> {
    let mut sql = String::from(
        "SELECT id, lender, original_amount, remaining_amount, status, created_at, settled_date
         FROM borrows WHERE user_id=?1",
    );
    if outstanding_only {
        sql.push_str(" AND status='outstanding'");
    }
    sql.push_str(" ORDER BY created_at DESC, id DESC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![user_id], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, String>(4)?,
            r.get::<_, String>(5)?,
            r.get::<_, Option<String>>(6)?,
        ))
    })?;

    let mut settlement_stmt = conn.prepare(
        "SELECT id, amount, created_at FROM borrow_settlements WHERE borrow_id=?1 ORDER BY created_at DESC, id DESC",
    )?;
    let mut records = Vec::new();
    for row in rows {
        let (id, lender, original_s, remaining_s, status_s, created_at, settled_date) = row?;
        let settlements = load_settlements(&mut settlement_stmt, id)?;
        records.push(Borrow {
            id,
            original_amount: Decimal::from_str_exact(&original_s)
                .with_context(|| format!("Invalid original amount '{}' for {}", original_s, lender))?,
            remaining_amount: Decimal::from_str_exact(&remaining_s)
                .with_context(|| format!("Invalid remaining amount '{}' for {}", remaining_s, lender))?,
            status: DebtStatus::from_db(&status_s)
                .with_context(|| format!("Invalid status '{}' for {}", status_s, lender))?,
            lender,
            created_at,
            settled_date,
            settlements,
        });
    }
    Ok(records)
}

fn list(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let records = load(conn, session.user_id, sub.get_flag("outstanding"))?;
    if !maybe_print_json(json_flag, jsonl_flag, &records)? {
        let rows = records
            .into_iter()
            .map(|b| {
                vec![
                    b.id.to_string(),
                    b.lender,
                    fmt_money(&b.original_amount, &session.currency),
                    fmt_money(&b.remaining_amount, &session.currency),
                    b.status.as_str().to_string(),
                    b.created_at.chars().take(10).collect(),
                    b.settled_date
                        .map(|d| d.chars().take(10).collect())
                        .unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Lender", "Original", "Remaining", "Status", "Since", "Settled"],
                rows
            )
        );
    }
    Ok(())
}

fn settle(conn: &mut Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let from = sub.get_one::<String>("from").unwrap().trim().to_string();
    let payment = match sub.get_one::<String>("amount") {
        Some(raw) => Some(parse_positive_amount(raw.trim())?),
        None => None,
    };

    let from_id = id_for_account(conn, session.user_id, &from)?;
    let outcome = {
        let mut ledger = Ledger::new(conn, session.clone());
        ledger.settle_borrow(id, from_id, payment)?
    };
    if outcome.settled {
        println!(
            "Paid {} from '{}'; record {} fully settled",
            fmt_money(&outcome.paid, &session.currency),
            from,
            id
        );
    } else {
        println!(
            "Paid {} from '{}'; {} remaining on record {}",
            fmt_money(&outcome.paid, &session.currency),
            from,
            fmt_money(&outcome.remaining, &session.currency),
            id
        );
    }
    Ok(())
}

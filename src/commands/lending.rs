// Copyright (c) 2026 Pocketledger Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::Ledger;
use crate::models::{DebtStatus, Lent, Session, Settlement};
use crate::utils::{fmt_money, id_for_account, maybe_print_json, parse_positive_amount, pretty_table};
use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;

pub fn handle(conn: &mut Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, session, sub)?,
        Some(("list", sub)) => list(conn, session, sub)?,
        Some(("settle", sub)) => settle(conn, session, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &mut Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let borrower = sub.get_one::<String>("to").unwrap().trim().to_string();
    let amount = parse_positive_amount(sub.get_one::<String>("amount").unwrap().trim())?;
    let from = sub.get_one::<String>("from").unwrap().trim().to_string();

    let from_id = id_for_account(conn, session.user_id, &from)?;
    let id = {
        let mut ledger = Ledger::new(conn, session.clone());
        ledger.add_lent_money(&borrower, amount, from_id)?
    };
    println!(
        "Lent {} to {} from '{}' (record {})",
        fmt_money(&amount, &session.currency),
        borrower,
        from,
        id
    );
    Ok(())
}

pub fn load(conn: &Connection, user_id: i64, outstanding_only: bool) -> Result<Vec<Lent>> {
    let mut sql = String::from(
        "SELECT id, borrower, description, original_amount, remaining_amount, status, created_at, settled_date
         FROM lent WHERE user_id=?1",
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
            r.get::<_, String>(6)?,
            r.get::<_, Option<String>>(7)?,
        ))
    })?;

    let mut settlement_stmt = conn.prepare(
        "SELECT id, amount, created_at FROM lent_settlements WHERE lent_id=?1 ORDER BY created_at DESC, id DESC",
    )?;
    let mut records = Vec::new();
    for row in rows {
        let (id, borrower, description, original_s, remaining_s, status_s, created_at, settled_date) = row?;
        let settlements = load_settlements(&mut settlement_stmt, id)?;
        records.push(Lent {
            id,
            original_amount: Decimal::from_str_exact(&original_s)
                .with_context(|| format!("Invalid original amount '{}' for {}", original_s, borrower))?,
            remaining_amount: Decimal::from_str_exact(&remaining_s)
                .with_context(|| format!("Invalid remaining amount '{}' for {}", remaining_s, borrower))?,
            status: DebtStatus::from_db(&status_s)
                .with_context(|| format!("Invalid status '{}' for {}", status_s, borrower))?,
            borrower,
            description,
            created_at,
            settled_date,
            settlements,
        });
    }
    Ok(records)
}

pub(crate) fn load_settlements(
    stmt: &mut rusqlite::Statement<'_>,
    parent_id: i64,
) -> Result<Vec<Settlement>> {
    let rows = stmt.query_map(params![parent_id], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
        ))
    })?;
    let mut settlements = Vec::new();
    for row in rows {
        let (id, amount_s, created_at) = row?;
        settlements.push(Settlement {
            id,
            amount: Decimal::from_str_exact(&amount_s)
                .with_context(|| format!("Invalid settlement amount '{}'", amount_s))?,
            created_at,
        });
    }
    Ok(settlements)
}

fn list(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let records = load(conn, session.user_id, sub.get_flag("outstanding"))?;
    if !maybe_print_json(json_flag, jsonl_flag, &records)? {
        let rows = records
            .into_iter()
            .map(|l| {
                vec![
                    l.id.to_string(),
                    l.borrower,
                    l.description,
                    fmt_money(&l.original_amount, &session.currency),
                    fmt_money(&l.remaining_amount, &session.currency),
                    l.status.as_str().to_string(),
                    l.created_at.chars().take(10).collect(),
                    l.settled_date
                        .map(|d| d.chars().take(10).collect())
                        .unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Borrower", "Description", "Original", "Remaining", "Status", "Since", "Settled"],
                rows
            )
        );
    }
    Ok(())
}

fn settle(conn: &mut Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let to = sub.get_one::<String>("to").unwrap().trim().to_string();
    let payment = match sub.get_one::<String>("amount") {
        Some(raw) => Some(parse_positive_amount(raw.trim())?),
        None => None,
    };

    let to_id = id_for_account(conn, session.user_id, &to)?;
    let outcome = {
        let mut ledger = Ledger::new(conn, session.clone());
        ledger.settle_lent(id, to_id, payment)?
    };
    if outcome.settled {
        println!(
            "Received {} into '{}'; record {} fully settled",
            fmt_money(&outcome.paid, &session.currency),
            to,
            id
        );
    } else {
        println!(
            "Received {} into '{}'; {} remaining on record {}",
            fmt_money(&outcome.paid, &session.currency),
            to,
            fmt_money(&outcome.remaining, &session.currency),
            id
        );
    }
    Ok(())
}

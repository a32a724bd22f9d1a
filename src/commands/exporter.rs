// Copyright (c) 2026 Pocketledger Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::{borrowing, lending};
use crate::models::Session;
use anyhow::{bail, Result};
use rusqlite::{params, Connection};
use serde_json::json;

pub fn handle(conn: &Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(conn, session, sub),
        Some(("debts", sub)) => export_debts(conn, session, sub),
        _ => Ok(()),
    }
}

fn export_transactions(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();

    let mut stmt = conn.prepare(
        "SELECT t.created_at, a.name as account, t.category, t.description, t.amount
         FROM transactions t
         LEFT JOIN accounts a ON t.account_id=a.id
         WHERE t.user_id=?1
         ORDER BY t.created_at, t.id",
    )?;
    let rows = stmt.query_map(params![session.user_id], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, Option<String>>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, String>(4)?,
        ))
    })?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record(["date", "account", "category", "description", "amount"])?;
            for row in rows {
                let (date, account, category, description, amount) = row?;
                wtr.write_record([
                    date,
                    account.unwrap_or_default(),
                    category,
                    description,
                    amount,
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let mut items = Vec::new();
            for row in rows {
                let (date, account, category, description, amount) = row?;
                items.push(json!({
                    "date": date, "account": account, "category": category,
                    "description": description, "amount": amount
                }));
            }
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        _ => {
            bail!("Unknown format: {} (use csv|json)", fmt);
        }
    }
    println!("Exported transactions to {}", out);
    Ok(())
}

fn export_debts(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();

    struct Line {
        kind: &'static str,
        counterparty: String,
        description: String,
        original: String,
        remaining: String,
        status: String,
        created_at: String,
        settled_date: String,
    }

    let mut lines = Vec::new();
    for b in borrowing::load(conn, session.user_id, false)? {
        lines.push(Line {
            kind: "borrow",
            counterparty: b.lender,
            description: String::new(),
            original: b.original_amount.to_string(),
            remaining: b.remaining_amount.to_string(),
            status: b.status.as_str().to_string(),
            created_at: b.created_at,
            settled_date: b.settled_date.unwrap_or_default(),
        });
    }
    for l in lending::load(conn, session.user_id, false)? {
        lines.push(Line {
            kind: "lent",
            counterparty: l.borrower,
            description: l.description,
            original: l.original_amount.to_string(),
            remaining: l.remaining_amount.to_string(),
            status: l.status.as_str().to_string(),
            created_at: l.created_at,
            settled_date: l.settled_date.unwrap_or_default(),
        });
    }

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "kind",
                "counterparty",
                "description",
                "original",
                "remaining",
                "status",
                "created",
                "settled",
            ])?;
            for line in lines {
                wtr.write_record([
                    line.kind.to_string(),
                    line.counterparty,
                    line.description,
                    line.original,
                    line.remaining,
                    line.status,
                    line.created_at,
                    line.settled_date,
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let items: Vec<_> = lines
                .into_iter()
                .map(|line| {
                    json!({
                        "kind": line.kind,
                        "counterparty": line.counterparty,
                        "description": line.description,
                        "original": line.original,
                        "remaining": line.remaining,
                        "status": line.status,
                        "created": line.created_at,
                        "settled": line.settled_date,
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        _ => {
            bail!("Unknown format: {} (use csv|json)", fmt);
        }
    }
    println!("Exported debts to {}", out);
    Ok(())
}

// Copyright (c) 2026 Pocketledger Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Holding, Session};
use crate::utils::{fmt_money, maybe_print_json, parse_date, parse_decimal, pretty_table};
use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

pub fn handle(conn: &Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, session, sub)?,
        Some(("list", sub)) => list(conn, session, sub)?,
        Some(("rm", sub)) => rm(conn, session, sub)?,
        Some(("summary", sub)) => summary(conn, session, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let symbol = sub
        .get_one::<String>("symbol")
        .unwrap()
        .trim()
        .to_uppercase();
    let quantity = parse_decimal(sub.get_one::<String>("quantity").unwrap().trim())?.abs();
    let price = parse_decimal(sub.get_one::<String>("price").unwrap().trim())?;
    let date = parse_date(sub.get_one::<String>("date").unwrap().trim())?;
    let name = sub.get_one::<String>("name").map(|s| s.trim().to_string());

    conn.execute(
        "INSERT INTO holdings(user_id, symbol, name, quantity, purchase_price, purchase_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            session.user_id,
            symbol,
            name,
            quantity.to_string(),
            price.to_string(),
            date.to_string()
        ],
    )?;
    println!("Added holding {} x {} @ {}", quantity, symbol, price);
    Ok(())
}

pub fn load(conn: &Connection, user_id: i64) -> Result<Vec<Holding>> {
    let mut stmt = conn.prepare(
        "SELECT id, symbol, name, quantity, purchase_price, purchase_date
         FROM holdings WHERE user_id=?1 ORDER BY purchase_date DESC, id DESC",
    )?;
    let rows = stmt.query_map(params![user_id], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, Option<String>>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, String>(4)?,
            r.get::<_, String>(5)?,
        ))
    })?;
    let mut holdings = Vec::new();
    for row in rows {
        let (id, symbol, name, qty_s, price_s, purchase_date) = row?;
        holdings.push(Holding {
            id,
            quantity: Decimal::from_str_exact(&qty_s)
                .with_context(|| format!("Invalid quantity '{}' for {}", qty_s, symbol))?,
            purchase_price: Decimal::from_str_exact(&price_s)
                .with_context(|| format!("Invalid price '{}' for {}", price_s, symbol))?,
            symbol,
            name,
            purchase_date,
        });
    }
    Ok(holdings)
}

fn list(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let holdings = load(conn, session.user_id)?;
    if !maybe_print_json(json_flag, jsonl_flag, &holdings)? {
        let rows = holdings
            .into_iter()
            .map(|h| {
                let cost = h.quantity * h.purchase_price;
                vec![
                    h.id.to_string(),
                    h.symbol,
                    h.name.unwrap_or_default(),
                    h.quantity.to_string(),
                    h.purchase_price.to_string(),
                    h.purchase_date,
                    fmt_money(&cost, &session.currency),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Symbol", "Name", "Qty", "Price", "Purchased", "Cost"],
                rows
            )
        );
    }
    Ok(())
}

fn rm(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let deleted = conn.execute(
        "DELETE FROM holdings WHERE id=?1 AND user_id=?2",
        params![id, session.user_id],
    )?;
    if deleted == 0 {
        bail!("Holding {} not found", id);
    }
    println!("Removed holding {}", id);
    Ok(())
}

#[derive(Serialize)]
struct SymbolSummary {
    symbol: String,
    quantity: String,
    cost: String,
}

fn summary(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let holdings = load(conn, session.user_id)?;

    let mut agg: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
    for h in holdings {
        let entry = agg
            .entry(h.symbol)
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        entry.0 += h.quantity;
        entry.1 += h.quantity * h.purchase_price;
    }

    let data: Vec<SymbolSummary> = agg
        .into_iter()
        .map(|(symbol, (quantity, cost))| SymbolSummary {
            symbol,
            quantity: quantity.to_string(),
            cost: fmt_money(&cost, &session.currency),
        })
        .collect();
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows = data
            .into_iter()
            .map(|s| vec![s.symbol, s.quantity, s.cost])
            .collect();
        println!("{}", pretty_table(&["Symbol", "Qty", "Cost"], rows));
    }
    Ok(())
}

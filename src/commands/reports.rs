// Copyright (c) 2026 Pocketledger Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::{accounts, borrowing, investments, lending};
use crate::models::Session;
use crate::utils::{fmt_money, maybe_print_json, parse_month, pretty_table};
use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

pub fn handle(conn: &Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("balances", sub)) => balances(conn, session, sub)?,
        Some(("cashflow", sub)) => cashflow(conn, session, sub)?,
        Some(("spend-by-category", sub)) => spend_by_category(conn, session, sub)?,
        Some(("debts", sub)) => debts(conn, session, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Serialize)]
struct BalancesReport {
    accounts: Vec<AccountBalance>,
    lent_outstanding: String,
    borrowed_outstanding: String,
    holdings_cost: String,
    net_worth: String,
}

#[derive(Serialize)]
struct AccountBalance {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    balance: String,
}

fn balances(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");

    let accounts = accounts::load(conn, session.user_id)?;
    let account_total: Decimal = accounts.iter().map(|a| a.balance).sum();

    let lent_outstanding: Decimal = lending::load(conn, session.user_id, true)?
        .iter()
        .map(|l| l.remaining_amount)
        .sum();
    let borrowed_outstanding: Decimal = borrowing::load(conn, session.user_id, true)?
        .iter()
        .map(|b| b.remaining_amount)
        .sum();
    let holdings_cost: Decimal = investments::load(conn, session.user_id)?
        .iter()
        .map(|h| h.quantity * h.purchase_price)
        .sum();

    // Credit-card balances are already negative, so the plain sum nets
    // card debt out of the account total.
    let net_worth = account_total + lent_outstanding - borrowed_outstanding + holdings_cost;

    let report = BalancesReport {
        accounts: accounts
            .iter()
            .map(|a| AccountBalance {
                name: a.name.clone(),
                kind: a.kind.as_str().to_string(),
                balance: a.balance.round_dp(2).to_string(),
            })
            .collect(),
        lent_outstanding: lent_outstanding.round_dp(2).to_string(),
        borrowed_outstanding: borrowed_outstanding.round_dp(2).to_string(),
        holdings_cost: holdings_cost.round_dp(2).to_string(),
        net_worth: net_worth.round_dp(2).to_string(),
    };
    if !maybe_print_json(json_flag, jsonl_flag, &report)? {
        let rows = accounts
            .iter()
            .map(|a| {
                vec![
                    a.name.clone(),
                    a.kind.as_str().to_string(),
                    fmt_money(&a.balance, &session.currency),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Account", "Type", "Balance"], rows));
        println!("Owed to you (outstanding): {}", fmt_money(&lent_outstanding, &session.currency));
        println!("You owe (outstanding):     {}", fmt_money(&borrowed_outstanding, &session.currency));
        println!("Holdings at cost:          {}", fmt_money(&holdings_cost, &session.currency));
        println!("Net worth:                 {}", fmt_money(&net_worth, &session.currency));
    }
    Ok(())
}

fn cashflow(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let months: usize = *sub.get_one::<usize>("months").unwrap_or(&12);

    let mut stmt = conn.prepare(
        "SELECT substr(created_at,1,7) AS month, amount FROM transactions WHERE user_id=?1",
    )?;
    let rows = stmt.query_map(params![session.user_id], |r| {
        Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?))
    })?;

    let mut map: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
    for row in rows {
        let (month, amount_s) = row?;
        let amount = Decimal::from_str_exact(&amount_s)
            .with_context(|| format!("Invalid amount '{}' in {}", amount_s, month))?;
        let entry = map.entry(month).or_insert((Decimal::ZERO, Decimal::ZERO));
        if amount > Decimal::ZERO {
            entry.0 += amount;
        } else {
            entry.1 += -amount;
        }
    }
    let mut data = Vec::new();
    for (month, (inflow, outflow)) in map.iter().rev().take(months) {
        data.push(vec![
            month.clone(),
            format!("{:.2}", inflow),
            format!("{:.2}", outflow),
        ]);
    }
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        println!("{}", pretty_table(&["Month", "Inflow", "Outflow"], data));
    }
    Ok(())
}

fn spend_by_category(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let month = parse_month(sub.get_one::<String>("month").unwrap().trim())?;

    let mut stmt = conn.prepare(
        "SELECT category, amount FROM transactions
         WHERE user_id=?1 AND amount < 0 AND substr(created_at,1,7)=?2",
    )?;
    let rows = stmt.query_map(params![session.user_id, &month], |r| {
        Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?))
    })?;

    let mut agg: HashMap<String, Decimal> = HashMap::new();
    for row in rows {
        let (category, amount_s) = row?;
        let spent = Decimal::from_str_exact(&amount_s)
            .with_context(|| format!("Invalid amount '{}' for {}", amount_s, category))?
            .abs();
        *agg.entry(category).or_insert(Decimal::ZERO) += spent;
    }
    let mut items: Vec<_> = agg.into_iter().collect();
    items.sort_by(|a, b| b.1.cmp(&a.1));
    let data: Vec<Vec<String>> = items
        .into_iter()
        .map(|(category, spent)| vec![category, format!("{:.2}", spent)])
        .collect();
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        println!("{}", pretty_table(&["Category", "Spent"], data));
    }
    Ok(())
}

#[derive(Serialize)]
struct DebtsReport {
    borrows: Vec<DebtLine>,
    lent: Vec<DebtLine>,
    borrowed_total: String,
    lent_total: String,
}

#[derive(Serialize)]
struct DebtLine {
    id: i64,
    counterparty: String,
    remaining: String,
}

fn debts(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");

    let borrows = borrowing::load(conn, session.user_id, true)?;
    let lent = lending::load(conn, session.user_id, true)?;
    let borrowed_total: Decimal = borrows.iter().map(|b| b.remaining_amount).sum();
    let lent_total: Decimal = lent.iter().map(|l| l.remaining_amount).sum();

    let report = DebtsReport {
        borrows: borrows
            .iter()
            .map(|b| DebtLine {
                id: b.id,
                counterparty: b.lender.clone(),
                remaining: b.remaining_amount.round_dp(2).to_string(),
            })
            .collect(),
        lent: lent
            .iter()
            .map(|l| DebtLine {
                id: l.id,
                counterparty: l.borrower.clone(),
                remaining: l.remaining_amount.round_dp(2).to_string(),
            })
            .collect(),
        borrowed_total: borrowed_total.round_dp(2).to_string(),
        lent_total: lent_total.round_dp(2).to_string(),
    };
    if !maybe_print_json(json_flag, jsonl_flag, &report)? {
        let rows = report
            .borrows
            .iter()
            .map(|d| vec![d.id.to_string(), d.counterparty.clone(), d.remaining.clone()])
            .chain(
                report
                    .lent
                    .iter()
                    .map(|d| vec![d.id.to_string(), format!("{} (owes you)", d.counterparty), d.remaining.clone()]),
            )
            .collect();
        println!("{}", pretty_table(&["ID", "Counterparty", "Remaining"], rows));
        println!("You owe:     {}", fmt_money(&borrowed_total, &session.currency));
        println!("Owed to you: {}", fmt_money(&lent_total, &session.currency));
    }
    Ok(())
}

// Copyright (c) 2026 Pocketledger Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Account, AccountType, Session};
use crate::utils::{fmt_money, maybe_print_json, parse_decimal, pretty_table};
use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, session, sub),
        Some(("list", sub)) => list(conn, session, sub),
        Some(("update", sub)) => update(conn, session, sub),
        Some(("rm", sub)) => rm(conn, session, sub),
        _ => Ok(()),
    }
}

/// Credit-card balances are stored negative: the magnitude is what is owed.
fn normalize_balance(kind: AccountType, balance: Decimal) -> Decimal {
    if kind == AccountType::CreditCard {
        -balance.abs()
    } else {
        balance
    }
}

fn add(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap().trim().to_string();
    let kind: AccountType = sub.get_one::<String>("type").unwrap().parse()?;
    let balance = normalize_balance(kind, parse_decimal(sub.get_one::<String>("balance").unwrap())?);

    let (credit_limit, billing_day) = if kind == AccountType::CreditCard {
        let limit = match sub.get_one::<String>("credit-limit") {
            Some(raw) => parse_decimal(raw.trim())?,
            None => Decimal::ZERO,
        };
        let day = sub.get_one::<u8>("billing-day").copied().unwrap_or(1);
        (Some(limit.to_string()), Some(day))
    } else {
        (None, None)
    };

    conn.execute(
        "INSERT INTO accounts(user_id, name, type, balance, credit_limit, billing_cycle_day)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            session.user_id,
            name,
            kind.as_str(),
            balance.to_string(),
            credit_limit,
            billing_day
        ],
    )
    .with_context(|| format!("Create account '{}'", name))?;
    println!(
        "Added account '{}' ({}, {})",
        name,
        kind,
        fmt_money(&balance, &session.currency)
    );
    Ok(())
}

pub fn load(conn: &Connection, user_id: i64) -> Result<Vec<Account>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, type, balance, credit_limit, billing_cycle_day
         FROM accounts WHERE user_id=?1 ORDER BY name",
    )?;
    let rows = stmt.query_map(params![user_id], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, Option<String>>(4)?,
            r.get::<_, Option<u8>>(5)?,
        ))
    })?;
    let mut accounts = Vec::new();
    for row in rows {
        let (id, name, kind_s, balance_s, limit_s, billing_cycle_day) = row?;
        let kind = AccountType::from_db(&kind_s)
            .with_context(|| format!("Invalid account type '{}' on '{}'", kind_s, name))?;
        let balance = Decimal::from_str_exact(&balance_s)
            .with_context(|| format!("Invalid balance '{}' on '{}'", balance_s, name))?;
        let credit_limit = match limit_s {
            Some(s) => Some(
                Decimal::from_str_exact(&s)
                    .with_context(|| format!("Invalid credit limit '{}' on '{}'", s, name))?,
            ),
            None => None,
        };
        accounts.push(Account {
            id,
            name,
            kind,
            balance,
            credit_limit,
            billing_cycle_day,
        });
    }
    Ok(accounts)
}

fn list(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let accounts = load(conn, session.user_id)?;
    if !maybe_print_json(json_flag, jsonl_flag, &accounts)? {
        let rows = accounts
            .into_iter()
            .map(|a| {
                vec![
                    a.id.to_string(),
                    a.name,
                    a.kind.as_str().to_string(),
                    fmt_money(&a.balance, &session.currency),
                    a.credit_limit
                        .map(|l| fmt_money(&l, &session.currency))
                        .unwrap_or_default(),
                    a.billing_cycle_day
                        .map(|d| d.to_string())
                        .unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Name", "Type", "Balance", "Credit Limit", "Billing Day"],
                rows
            )
        );
    }
    Ok(())
}

fn update(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap().trim().to_string();
    let row = conn
        .query_row(
            "SELECT id, type FROM accounts WHERE user_id=?1 AND name=?2",
            params![session.user_id, &name],
            |r| Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?)),
        )
        .optional()?;
    let Some((id, kind_s)) = row else {
        bail!("Account '{}' not found", name);
    };
    let kind = AccountType::from_db(&kind_s)
        .with_context(|| format!("Invalid account type '{}' on '{}'", kind_s, name))?;

    if let Some(raw) = sub.get_one::<String>("balance") {
        let balance = normalize_balance(kind, parse_decimal(raw.trim())?);
        conn.execute(
            "UPDATE accounts SET balance=?1 WHERE id=?2",
            params![balance.to_string(), id],
        )?;
    }
    if let Some(raw) = sub.get_one::<String>("credit-limit") {
        if kind != AccountType::CreditCard {
            bail!("Only credit cards carry a credit limit");
        }
        let limit = parse_decimal(raw.trim())?;
        conn.execute(
            "UPDATE accounts SET credit_limit=?1 WHERE id=?2",
            params![limit.to_string(), id],
        )?;
    }
    if let Some(day) = sub.get_one::<u8>("billing-day") {
        if kind != AccountType::CreditCard {
            bail!("Only credit cards carry a billing cycle day");
        }
        conn.execute(
            "UPDATE accounts SET billing_cycle_day=?1 WHERE id=?2",
            params![day, id],
        )?;
    }
    if let Some(new_name) = sub.get_one::<String>("rename") {
        conn.execute(
            "UPDATE accounts SET name=?1 WHERE id=?2",
            params![new_name.trim(), id],
        )?;
    }
    println!("Updated account '{}'", name);
    Ok(())
}

fn rm(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap().trim().to_string();
    // No cascade: the account row goes away, its entries stay.
    let deleted = conn.execute(
        "DELETE FROM accounts WHERE user_id=?1 AND name=?2",
        params![session.user_id, &name],
    )?;
    if deleted == 0 {
        bail!("Account '{}' not found", name);
    }
    println!("Removed account '{}' (transaction history kept)", name);
    Ok(())
}

// Copyright (c) 2026 Pocketledger Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{current_session, get_active_user, maybe_print_json, pretty_table, set_active_user};
use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub),
        Some(("list", sub)) => list(conn, sub),
        Some(("use", sub)) => use_profile(conn, sub),
        Some(("currency", sub)) => set_currency(conn, sub),
        _ => Ok(()),
    }
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap().trim().to_string();
    let currency = sub
        .get_one::<String>("currency")
        .unwrap()
        .trim()
        .to_uppercase();
    conn.execute(
        "INSERT INTO users(name, currency) VALUES (?1, ?2)",
        params![name, currency],
    )
    .with_context(|| format!("Create user '{}'", name))?;
    // First profile becomes the active one.
    if get_active_user(conn)?.is_none() {
        set_active_user(conn, &name)?;
    }
    println!("Added user '{}' ({})", name, currency);
    Ok(())
}

#[derive(Serialize)]
struct UserRow {
    name: String,
    currency: String,
    created_at: String,
    active: bool,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let active = get_active_user(conn)?;

    let mut stmt = conn.prepare("SELECT name, currency, created_at FROM users ORDER BY name")?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
        ))
    })?;
    let mut data = Vec::new();
    for row in rows {
        let (name, currency, created_at) = row?;
        let is_active = active.as_deref() == Some(name.as_str());
        data.push(UserRow {
            name,
            currency,
            created_at,
            active: is_active,
        });
    }
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows = data
            .into_iter()
            .map(|u| {
                vec![
                    u.name,
                    u.currency,
                    u.created_at,
                    if u.active { "yes".into() } else { String::new() },
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Name", "Currency", "Created", "Active"], rows)
        );
    }
    Ok(())
}

fn use_profile(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap().trim().to_string();
    let _id: i64 = conn
        .query_row("SELECT id FROM users WHERE name=?1", params![&name], |r| {
            r.get(0)
        })
        .with_context(|| format!("User '{}' not found", name))?;
    set_active_user(conn, &name)?;
    println!("Switched to user '{}'", name);
    Ok(())
}

fn set_currency(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let code = sub.get_one::<String>("code").unwrap().trim().to_uppercase();
    let session = current_session(conn)?;
    conn.execute(
        "UPDATE users SET currency=?1 WHERE id=?2",
        params![&code, session.user_id],
    )?;
    println!("Display currency for '{}' set to {}", session.user, code);
    Ok(())
}

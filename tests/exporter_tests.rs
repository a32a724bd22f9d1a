// Copyright (c) 2026 Pocketledger Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pocketledger::models::Session;
use pocketledger::{cli, commands::exporter, db};
use rusqlite::Connection;
use serde_json::json;
use tempfile::tempdir;

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn.execute(
        "INSERT INTO users(id, name, currency) VALUES (1, 'ada', 'USD')",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO accounts(id, user_id, name, type, balance) VALUES (1, 1, 'Checking', 'Bank Account', '1000')",
        [],
    )
    .unwrap();
    conn
}

fn session() -> Session {
    Session {
        user_id: 1,
        user: "ada".into(),
        currency: "USD".into(),
    }
}

#[test]
fn export_transactions_streams_pretty_json() {
    let conn = setup();
    conn.execute(
        "INSERT INTO transactions(user_id, account_id, amount, category, description, created_at)
         VALUES (1, 1, '-12.34', 'Groceries', 'Weekly run', '2026-01-02T10:00:00.000Z')",
        [],
    )
    .unwrap();

    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.json");
    let out_str = out_path.to_string_lossy().to_string();

    let cli = cli::build_cli();
    let matches = cli.get_matches_from([
        "pocketledger",
        "export",
        "transactions",
        "--format",
        "json",
        "--out",
        &out_str,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(&conn, &session(), export_m).unwrap();
    } else {
        panic!("no export subcommand");
    }

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(
        parsed,
        json!([
            {
                "date": "2026-01-02T10:00:00.000Z",
                "account": "Checking",
                "category": "Groceries",
                "description": "Weekly run",
                "amount": "-12.34"
            }
        ])
    );
}

#[test]
fn export_transactions_rejects_unknown_format() {
    let conn = setup();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.unknown");
    let out_str = out_path.to_string_lossy().to_string();

    let cli = cli::build_cli();
    let matches = cli.get_matches_from([
        "pocketledger",
        "export",
        "transactions",
        "--format",
        "xml",
        "--out",
        &out_str,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        assert!(exporter::handle(&conn, &session(), export_m).is_err());
    } else {
        panic!("no export subcommand");
    }
    assert!(!out_path.exists());
}

#[test]
fn export_debts_covers_both_kinds() {
    let conn = setup();
    conn.execute(
        "INSERT INTO borrows(user_id, lender, original_amount, remaining_amount, status, created_at)
         VALUES (1, 'Marge', '300', '200', 'outstanding', '2026-01-01T08:00:00.000Z')",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO lent(user_id, borrower, description, original_amount, remaining_amount, status, created_at, settled_date)
         VALUES (1, 'Ned', 'Direct loan', '150', '0', 'settled', '2026-01-01T09:00:00.000Z', '2026-02-01T09:00:00.000Z')",
        [],
    )
    .unwrap();

    let dir = tempdir().unwrap();
    let out_path = dir.path().join("debts.json");
    let out_str = out_path.to_string_lossy().to_string();

    let cli = cli::build_cli();
    let matches = cli.get_matches_from([
        "pocketledger",
        "export",
        "debts",
        "--format",
        "json",
        "--out",
        &out_str,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(&conn, &session(), export_m).unwrap();
    } else {
        panic!("no export subcommand");
    }

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    let items = parsed.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["kind"], "borrow");
    assert_eq!(items[0]["remaining"], "200");
    assert_eq!(items[1]["kind"], "lent");
    assert_eq!(items[1]["status"], "settled");
}

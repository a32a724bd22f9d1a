// Copyright (c) 2026 Pocketledger Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pocketledger::{commands::doctor, db};
use rusqlite::Connection;

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn.execute(
        "INSERT INTO users(id, name, currency) VALUES (1, 'ada', 'USD')",
        [],
    )
    .unwrap();
    conn
}

#[test]
fn clean_ledger_has_no_issues() {
    let conn = setup();
    conn.execute(
        "INSERT INTO accounts(id, user_id, name, type, balance) VALUES (1, 1, 'Checking', 'Bank Account', '100')",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO borrows(user_id, lender, original_amount, remaining_amount, status, created_at)
         VALUES (1, 'Marge', '300', '300', 'outstanding', '2026-01-01T08:00:00.000Z')",
        [],
    )
    .unwrap();
    assert!(doctor::collect_issues(&conn, 1).unwrap().is_empty());
}

#[test]
fn settlement_sum_drift_is_flagged() {
    let conn = setup();
    conn.execute(
        "INSERT INTO borrows(id, user_id, lender, original_amount, remaining_amount, status, created_at)
         VALUES (7, 1, 'Marge', '100', '80', 'outstanding', '2026-01-01T08:00:00.000Z')",
        [],
    )
    .unwrap();
    // Only 10 of the 20 paid is on record.
    conn.execute(
        "INSERT INTO borrow_settlements(borrow_id, amount, created_at)
         VALUES (7, '10', '2026-01-05T08:00:00.000Z')",
        [],
    )
    .unwrap();
    let issues = doctor::collect_issues(&conn, 1).unwrap();
    assert!(issues.iter().any(|i| i[0] == "debt_sum_mismatch"));
}

#[test]
fn settled_without_date_is_flagged() {
    let conn = setup();
    conn.execute(
        "INSERT INTO lent(user_id, borrower, description, original_amount, remaining_amount, status, created_at)
         VALUES (1, 'Ned', 'Direct loan', '50', '0', 'settled', '2026-01-01T09:00:00.000Z')",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO lent_settlements(lent_id, amount, created_at)
         VALUES (1, '50', '2026-01-02T09:00:00.000Z')",
        [],
    )
    .unwrap();
    let issues = doctor::collect_issues(&conn, 1).unwrap();
    assert!(issues.iter().any(|i| i[0] == "settled_date_missing"));
}

#[test]
fn positive_credit_card_balance_is_flagged() {
    let conn = setup();
    conn.execute(
        "INSERT INTO accounts(user_id, name, type, balance) VALUES (1, 'Visa', 'Credit Card', '25')",
        [],
    )
    .unwrap();
    let issues = doctor::collect_issues(&conn, 1).unwrap();
    assert!(issues.iter().any(|i| i[0] == "credit_card_positive_balance"));
}

#[test]
fn dangling_entries_reported_as_info() {
    let conn = setup();
    conn.execute(
        "INSERT INTO accounts(id, user_id, name, type, balance) VALUES (1, 1, 'Checking', 'Bank Account', '100')",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO transactions(user_id, account_id, amount, category, description, created_at)
         VALUES (1, 1, '-10', 'Groceries', 'Run', '2026-01-02T10:00:00.000Z')",
        [],
    )
    .unwrap();
    conn.execute("DELETE FROM accounts WHERE id=1", []).unwrap();
    let issues = doctor::collect_issues(&conn, 1).unwrap();
    assert!(issues.iter().any(|i| i[0].starts_with("dangling_account_ref")));
}

// Copyright (c) 2026 Pocketledger Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Atomic ledger mutations.
//!
//! Every operation here touches an account balance together with one or
//! more transaction/debt rows, so each runs inside a single
//! `BEGIN IMMEDIATE` SQLite transaction: all rows the operation will
//! mutate are read first, business invariants are checked, then balances
//! and ledger rows are written together. A failed check aborts the whole
//! transaction; readers never observe a half-applied mutation.
//!
//! All timestamps written by one operation come from a single clock read,
//! so correlated rows (e.g. the two sides of a transfer) share an
//! identical timestamp.

use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use rust_decimal::Decimal;

use crate::errors::{LedgerError, LedgerResult};
use crate::models::{AccountType, Category, DebtStatus, Session};

/// Slack used when comparing a payment against a debt's remaining amount,
/// and when deciding that a near-zero remainder counts as fully settled.
pub fn settle_tolerance() -> Decimal {
    Decimal::new(1, 3) // 0.001
}

/// Threshold above which a bill payment's over/underpayment gets its own
/// Fees adjustment entry.
pub fn reconcile_tolerance() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

fn now_utc() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// What is left on a debt after a settlement.
#[derive(Debug, Clone, PartialEq)]
pub struct SettleOutcome {
    pub paid: Decimal,
    pub remaining: Decimal,
    pub settled: bool,
}

/// Result of a credit-card bill payment. `adjustment` carries the signed
/// amount of the Fees entry when the payment did not match the card's
/// outstanding balance.
#[derive(Debug, Clone, PartialEq)]
pub struct BillOutcome {
    pub card_balance: Decimal,
    pub adjustment: Option<Decimal>,
}

pub struct Ledger<'a> {
    conn: &'a mut Connection,
    session: Session,
}

struct AccountRow {
    id: i64,
    name: String,
    kind: AccountType,
    balance: Decimal,
}

struct DebtRow {
    id: i64,
    counterparty: String,
    remaining: Decimal,
    status: DebtStatus,
}

impl<'a> Ledger<'a> {
    pub fn new(conn: &'a mut Connection, session: Session) -> Self {
        Ledger { conn, session }
    }

    /// Record a signed ledger entry and move the account balance by the
    /// same amount (negative = outflow, positive = inflow). Returns the
    /// new transaction id.
    pub fn add_transaction(
        &mut self,
        account_id: i64,
        amount: Decimal,
        category: Category,
        description: &str,
    ) -> LedgerResult<i64> {
        let user_id = self.session.user_id;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let now = now_utc();
        let account = get_account(&tx, user_id, account_id)?;
        set_balance(&tx, account.id, account.balance + amount)?;
        let id = insert_transaction(&tx, user_id, account_id, amount, &category, description, &now)?;
        tx.commit()?;
        Ok(id)
    }

    /// Pay an expense in full and track each co-payer's share as an
    /// outstanding Lent record. The payer's own share is implicit: with N
    /// names in `split_with`, each share is `amount / (N + 1)`.
    pub fn add_split_expense(
        &mut self,
        description: &str,
        amount: Decimal,
        account_id: i64,
        category: Category,
        split_with: &[String],
    ) -> LedgerResult<()> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(format!(
                "expense amount must be positive, got {}",
                amount
            )));
        }
        let user_id = self.session.user_id;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let now = now_utc();
        let account = get_account(&tx, user_id, account_id)?;
        set_balance(&tx, account.id, account.balance - amount)?;
        insert_transaction(
            &tx,
            user_id,
            account_id,
            -amount,
            &category,
            &format!("{} (Split)", description),
            &now,
        )?;
        let share = amount / Decimal::from(split_with.len() as i64 + 1);
        for name in split_with {
            insert_lent(&tx, user_id, name, description, share, &now)?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Credit the account. With a lender, the inflow is borrowed money: the
    /// entry is categorized `Borrowed` and an outstanding Borrow record is
    /// created alongside it.
    pub fn add_income(
        &mut self,
        description: &str,
        amount: Decimal,
        account_id: i64,
        lender: Option<&str>,
    ) -> LedgerResult<()> {
        let user_id = self.session.user_id;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let now = now_utc();
        let account = get_account(&tx, user_id, account_id)?;
        set_balance(&tx, account.id, account.balance + amount)?;
        let category = if lender.is_some() {
            Category::Borrowed
        } else {
            Category::Income
        };
        insert_transaction(&tx, user_id, account_id, amount, &category, description, &now)?;
        if let Some(lender) = lender {
            tx.execute(
                "INSERT INTO borrows(user_id, lender, original_amount, remaining_amount, status, created_at)
                 VALUES (?1, ?2, ?3, ?3, 'outstanding', ?4)",
                params![user_id, lender, amount.to_string(), now],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Lend money directly from an account. Returns the new Lent id.
    pub fn add_lent_money(
        &mut self,
        borrower: &str,
        amount: Decimal,
        from_account_id: i64,
    ) -> LedgerResult<i64> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(format!(
                "loan amount must be positive, got {}",
                amount
            )));
        }
        let user_id = self.session.user_id;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let now = now_utc();
        let account = get_account(&tx, user_id, from_account_id)?;
        if amount > account.balance {
            return Err(LedgerError::InsufficientFunds {
                account: account.name,
                balance: account.balance,
                required: amount,
            });
        }
        set_balance(&tx, account.id, account.balance - amount)?;
        insert_transaction(
            &tx,
            user_id,
            from_account_id,
            -amount,
            &Category::Lent,
            &format!("Loan to {}", borrower),
            &now,
        )?;
        let id = insert_lent(&tx, user_id, borrower, "Direct loan", amount, &now)?;
        tx.commit()?;
        Ok(id)
    }

    /// Pay down a Borrow. `payment` defaults to the full remaining amount.
    /// When the remainder drops within tolerance of zero it is clamped to
    /// zero and the record transitions to settled, stamping the settled
    /// date; the transition is one-way and a settled record rejects any
    /// further payment.
    pub fn settle_borrow(
        &mut self,
        borrow_id: i64,
        from_account_id: i64,
        payment: Option<Decimal>,
    ) -> LedgerResult<SettleOutcome> {
        let user_id = self.session.user_id;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let now = now_utc();
        let borrow = get_borrow(&tx, user_id, borrow_id)?;
        let account = get_account(&tx, user_id, from_account_id)?;
        let payment = payment.unwrap_or(borrow.remaining);
        check_payable(&borrow, payment)?;
        if payment > account.balance {
            return Err(LedgerError::InsufficientFunds {
                account: account.name,
                balance: account.balance,
                required: payment,
            });
        }
        check_within_remaining(&borrow, payment)?;
        set_balance(&tx, account.id, account.balance - payment)?;
        insert_transaction(
            &tx,
            user_id,
            from_account_id,
            -payment,
            &Category::Settlement,
            &format!("Debt payment to {}", borrow.counterparty),
            &now,
        )?;
        tx.execute(
            "INSERT INTO borrow_settlements(borrow_id, amount, created_at) VALUES (?1, ?2, ?3)",
            params![borrow.id, payment.to_string(), now],
        )?;
        let outcome = apply_remaining(&tx, "borrows", borrow.id, borrow.remaining, payment, &now)?;
        tx.commit()?;
        Ok(outcome)
    }

    /// Receive a payment against a Lent record. Mirror of
    /// [`Ledger::settle_borrow`] with inflow semantics; there is no
    /// balance check because the funds come from the counterparty, not a
    /// tracked account.
    pub fn settle_lent(
        &mut self,
        lent_id: i64,
        to_account_id: i64,
        payment: Option<Decimal>,
    ) -> LedgerResult<SettleOutcome> {
        let user_id = self.session.user_id;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let now = now_utc();
        let lent = get_lent(&tx, user_id, lent_id)?;
        let account = get_account(&tx, user_id, to_account_id)?;
        let payment = payment.unwrap_or(lent.remaining);
        check_payable(&lent, payment)?;
        check_within_remaining(&lent, payment)?;
        set_balance(&tx, account.id, account.balance + payment)?;
        insert_transaction(
            &tx,
            user_id,
            to_account_id,
            payment,
            &Category::Reimbursement,
            &format!("Payment from {}", lent.counterparty),
            &now,
        )?;
        tx.execute(
            "INSERT INTO lent_settlements(lent_id, amount, created_at) VALUES (?1, ?2, ?3)",
            params![lent.id, payment.to_string(), now],
        )?;
        let outcome = apply_remaining(&tx, "lent", lent.id, lent.remaining, payment, &now)?;
        tx.commit()?;
        Ok(outcome)
    }

    /// Move money between two accounts. Writes one outflow and one inflow
    /// entry with equal magnitude and identical timestamp. Sufficiency is
    /// deliberately not checked here (transfers may overdraw).
    pub fn add_transfer(
        &mut self,
        from_account_id: i64,
        to_account_id: i64,
        amount: Decimal,
        description: Option<&str>,
    ) -> LedgerResult<()> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(format!(
                "transfer amount must be positive, got {}",
                amount
            )));
        }
        if from_account_id == to_account_id {
            return Err(LedgerError::InvalidAmount(
                "cannot transfer to the same account".into(),
            ));
        }
        let user_id = self.session.user_id;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let now = now_utc();
        let from = get_account(&tx, user_id, from_account_id)?;
        let to = get_account(&tx, user_id, to_account_id)?;
        set_balance(&tx, from.id, from.balance - amount)?;
        set_balance(&tx, to.id, to.balance + amount)?;
        let out_desc = description
            .map(str::to_string)
            .unwrap_or_else(|| format!("Transfer to {}", to.name));
        let in_desc = description
            .map(str::to_string)
            .unwrap_or_else(|| format!("Transfer from {}", from.name));
        insert_transaction(&tx, user_id, from.id, -amount, &Category::Transfer, &out_desc, &now)?;
        insert_transaction(&tx, user_id, to.id, amount, &Category::Transfer, &in_desc, &now)?;
        tx.commit()?;
        Ok(())
    }

    /// Pay a credit-card bill from a source account. When the payment does
    /// not match the card's outstanding balance (beyond the reconcile
    /// tolerance), a Fees adjustment entry is written on the card side and
    /// folded into the final card balance, so the balance column and the
    /// card's transaction sum stay in agreement.
    pub fn pay_bill(
        &mut self,
        credit_card_id: i64,
        source_account_id: i64,
        amount: Decimal,
    ) -> LedgerResult<BillOutcome> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(format!(
                "payment amount must be positive, got {}",
                amount
            )));
        }
        let user_id = self.session.user_id;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let now = now_utc();
        let card = get_account(&tx, user_id, credit_card_id)?;
        let source = get_account(&tx, user_id, source_account_id)?;
        if card.kind != AccountType::CreditCard {
            return Err(LedgerError::InvalidAccountType {
                account: card.name,
                expected: AccountType::CreditCard.as_str(),
                actual: card.kind.as_str().to_string(),
            });
        }

        let outstanding = card.balance.abs();
        let discrepancy = amount - outstanding;
        let mut card_balance = card.balance + amount;
        let mut adjustment = None;
        if discrepancy.abs() > reconcile_tolerance() {
            insert_transaction(
                &tx,
                user_id,
                card.id,
                -discrepancy,
                &Category::Fees,
                "Card Payment Misc.",
                &now,
            )?;
            card_balance -= discrepancy;
            adjustment = Some(-discrepancy);
        }

        insert_transaction(
            &tx,
            user_id,
            source.id,
            -amount,
            &Category::Transfer,
            &format!("Payment to {}", card.name),
            &now,
        )?;
        insert_transaction(
            &tx,
            user_id,
            card.id,
            amount,
            &Category::Transfer,
            &format!("Payment from {}", source.name),
            &now,
        )?;
        set_balance(&tx, source.id, source.balance - amount)?;
        set_balance(&tx, card.id, card_balance)?;
        tx.commit()?;
        Ok(BillOutcome {
            card_balance,
            adjustment,
        })
    }
}

fn parse_stored_decimal(s: &str, field: &str, owner: &str) -> LedgerResult<Decimal> {
    Decimal::from_str_exact(s)
        .map_err(|_| LedgerError::Storage(format!("invalid {} '{}' on '{}'", field, s, owner)))
}

fn get_account(tx: &Connection, user_id: i64, account_id: i64) -> LedgerResult<AccountRow> {
    let row = tx
        .query_row(
            "SELECT id, name, type, balance FROM accounts WHERE id=?1 AND user_id=?2",
            params![account_id, user_id],
            |r| {
                Ok((
                    r.get::<_, i64>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                    r.get::<_, String>(3)?,
                ))
            },
        )
        .optional()?;
    let (id, name, kind_s, balance_s) =
        row.ok_or_else(|| LedgerError::NotFound(format!("account {}", account_id)))?;
    let kind = AccountType::from_db(&kind_s)
        .ok_or_else(|| LedgerError::Storage(format!("invalid account type '{}' on '{}'", kind_s, name)))?;
    let balance = parse_stored_decimal(&balance_s, "balance", &name)?;
    Ok(AccountRow {
        id,
        name,
        kind,
        balance,
    })
}

fn get_borrow(tx: &Connection, user_id: i64, borrow_id: i64) -> LedgerResult<DebtRow> {
    let row = tx
        .query_row(
            "SELECT id, lender, remaining_amount, status FROM borrows WHERE id=?1 AND user_id=?2",
            params![borrow_id, user_id],
            |r| {
                Ok((
                    r.get::<_, i64>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                    r.get::<_, String>(3)?,
                ))
            },
        )
        .optional()?;
    let (id, counterparty, remaining_s, status_s) =
        row.ok_or_else(|| LedgerError::NotFound(format!("borrow record {}", borrow_id)))?;
    debt_row(id, counterparty, &remaining_s, &status_s)
}

fn get_lent(tx: &Connection, user_id: i64, lent_id: i64) -> LedgerResult<DebtRow> {
    let row = tx
        .query_row(
            "SELECT id, borrower, remaining_amount, status FROM lent WHERE id=?1 AND user_id=?2",
            params![lent_id, user_id],
            |r| {
                Ok((
                    r.get::<_, i64>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                    r.get::<_, String>(3)?,
                ))
            },
        )
        .optional()?;
    let (id, counterparty, remaining_s, status_s) =
        row.ok_or_else(|| LedgerError::NotFound(format!("lent record {}", lent_id)))?;
    debt_row(id, counterparty, &remaining_s, &status_s)
}

fn debt_row(id: i64, counterparty: String, remaining_s: &str, status_s: &str) -> LedgerResult<DebtRow> {
    let status = DebtStatus::from_db(status_s)
        .ok_or_else(|| LedgerError::Storage(format!("invalid debt status '{}'", status_s)))?;
    let remaining = parse_stored_decimal(remaining_s, "remaining amount", &counterparty)?;
    Ok(DebtRow {
        id,
        counterparty,
        remaining,
        status,
    })
}

fn check_payable(debt: &DebtRow, payment: Decimal) -> LedgerResult<()> {
    if debt.status == DebtStatus::Settled {
        return Err(LedgerError::InvalidAmount(format!(
            "debt record {} is already settled",
            debt.id
        )));
    }
    if payment <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount(format!(
            "payment must be positive, got {}",
            payment
        )));
    }
    Ok(())
}

fn check_within_remaining(debt: &DebtRow, payment: Decimal) -> LedgerResult<()> {
    if payment > debt.remaining + settle_tolerance() {
        return Err(LedgerError::InvalidAmount(format!(
            "payment {} exceeds remaining amount {}",
            payment, debt.remaining
        )));
    }
    Ok(())
}

fn apply_remaining(
    tx: &Connection,
    table: &str,
    id: i64,
    remaining: Decimal,
    payment: Decimal,
    now: &str,
) -> LedgerResult<SettleOutcome> {
    let left = remaining - payment;
    if left <= settle_tolerance() {
        tx.execute(
            &format!(
                "UPDATE {} SET remaining_amount='0', status='settled', settled_date=?1 WHERE id=?2",
                table
            ),
            params![now, id],
        )?;
        Ok(SettleOutcome {
            paid: payment,
            remaining: Decimal::ZERO,
            settled: true,
        })
    } else {
        tx.execute(
            &format!("UPDATE {} SET remaining_amount=?1 WHERE id=?2", table),
            params![left.to_string(), id],
        )?;
        Ok(SettleOutcome {
            paid: payment,
            remaining: left,
            settled: false,
        })
    }
}

fn set_balance(tx: &Connection, account_id: i64, balance: Decimal) -> LedgerResult<()> {
    tx.execute(
        "UPDATE accounts SET balance=?1 WHERE id=?2",
        params![balance.to_string(), account_id],
    )?;
    Ok(())
}

fn insert_transaction(
    tx: &Connection,
    user_id: i64,
    account_id: i64,
    amount: Decimal,
    category: &Category,
    description: &str,
    now: &str,
) -> LedgerResult<i64> {
    tx.execute(
        "INSERT INTO transactions(user_id, account_id, amount, category, description, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            user_id,
            account_id,
            amount.to_string(),
            category.as_str(),
            description,
            now
        ],
    )?;
    Ok(tx.last_insert_rowid())
}

fn insert_lent(
    tx: &Connection,
    user_id: i64,
    borrower: &str,
    description: &str,
    amount: Decimal,
    now: &str,
) -> LedgerResult<i64> {
    tx.execute(
        "INSERT INTO lent(user_id, borrower, description, original_amount, remaining_amount, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?4, 'outstanding', ?5)",
        params![user_id, borrower, description, amount.to_string(), now],
    )?;
    Ok(tx.last_insert_rowid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use rusqlite::Connection;

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
        conn.execute(
            "INSERT INTO accounts(id, user_id, name, type, balance) VALUES (2, 1, 'Savings', 'Bank Account', '250')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO accounts(id, user_id, name, type, balance) VALUES (3, 1, 'Visa', 'Credit Card', '-500')",
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

    fn dec(s: &str) -> Decimal {
        Decimal::from_str_exact(s).unwrap()
    }

    fn balance(conn: &Connection, id: i64) -> Decimal {
        let s: String = conn
            .query_row("SELECT balance FROM accounts WHERE id=?1", [id], |r| r.get(0))
            .unwrap();
        dec(&s)
    }

    fn tx_count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn add_transaction_moves_balance_and_appends_row() {
        let mut conn = setup();
        {
            let mut ledger = Ledger::new(&mut conn, session());
            ledger
                .add_transaction(1, dec("-42.50"), Category::Expense("Groceries".into()), "Corner shop")
                .unwrap();
        }
        assert_eq!(balance(&conn, 1), dec("957.50"));
        let (amount, category): (String, String) = conn
            .query_row(
                "SELECT amount, category FROM transactions WHERE account_id=1",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(amount, "-42.50");
        assert_eq!(category, "Groceries");
    }

    #[test]
    fn add_transaction_unknown_account_is_not_found() {
        let mut conn = setup();
        let err = {
            let mut ledger = Ledger::new(&mut conn, session());
            ledger
                .add_transaction(99, dec("10"), Category::Income, "ghost")
                .unwrap_err()
        };
        assert!(matches!(err, LedgerError::NotFound(_)));
        assert_eq!(tx_count(&conn), 0);
    }

    #[test]
    fn accounts_are_scoped_to_the_session_user() {
        let mut conn = setup();
        conn.execute("INSERT INTO users(id, name) VALUES (2, 'bob')", [])
            .unwrap();
        conn.execute(
            "INSERT INTO accounts(id, user_id, name, type, balance) VALUES (10, 2, 'Bob Checking', 'Bank Account', '100')",
            [],
        )
        .unwrap();
        let err = {
            let mut ledger = Ledger::new(&mut conn, session());
            ledger
                .add_transaction(10, dec("10"), Category::Income, "cross-tenant")
                .unwrap_err()
        };
        assert!(matches!(err, LedgerError::NotFound(_)));
        assert_eq!(balance(&conn, 10), dec("100"));
    }

    #[test]
    fn split_expense_creates_equal_shares() {
        let mut conn = setup();
        {
            let mut ledger = Ledger::new(&mut conn, session());
            ledger
                .add_split_expense(
                    "Dinner",
                    dec("90"),
                    1,
                    Category::Expense("Food".into()),
                    &["X".to_string(), "Y".to_string()],
                )
                .unwrap();
        }
        assert_eq!(balance(&conn, 1), dec("910"));
        let (desc, amount): (String, String) = conn
            .query_row(
                "SELECT description, amount FROM transactions WHERE account_id=1",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(desc, "Dinner (Split)");
        assert_eq!(dec(&amount), dec("-90"));

        let mut stmt = conn
            .prepare("SELECT borrower, original_amount, remaining_amount, status FROM lent ORDER BY borrower")
            .unwrap();
        let rows: Vec<(String, String, String, String)> = stmt
            .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)))
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(rows.len(), 2);
        for (i, borrower) in ["X", "Y"].iter().enumerate() {
            assert_eq!(rows[i].0, *borrower);
            assert_eq!(dec(&rows[i].1), dec("30"));
            assert_eq!(dec(&rows[i].2), dec("30"));
            assert_eq!(rows[i].3, "outstanding");
        }
    }

    #[test]
    fn income_with_lender_records_borrow() {
        let mut conn = setup();
        {
            let mut ledger = Ledger::new(&mut conn, session());
            ledger
                .add_income("Bridge loan", dec("300"), 1, Some("Marge"))
                .unwrap();
        }
        assert_eq!(balance(&conn, 1), dec("1300"));
        let category: String = conn
            .query_row("SELECT category FROM transactions WHERE account_id=1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(category, "Borrowed");
        let (lender, original, remaining, status): (String, String, String, String) = conn
            .query_row(
                "SELECT lender, original_amount, remaining_amount, status FROM borrows",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
            )
            .unwrap();
        assert_eq!(lender, "Marge");
        assert_eq!(dec(&original), dec("300"));
        assert_eq!(dec(&remaining), dec("300"));
        assert_eq!(status, "outstanding");
    }

    #[test]
    fn plain_income_keeps_income_category() {
        let mut conn = setup();
        {
            let mut ledger = Ledger::new(&mut conn, session());
            ledger.add_income("Salary", dec("2000"), 1, None).unwrap();
        }
        let category: String = conn
            .query_row("SELECT category FROM transactions", [], |r| r.get(0))
            .unwrap();
        assert_eq!(category, "Income");
        let borrows: i64 = conn
            .query_row("SELECT COUNT(*) FROM borrows", [], |r| r.get(0))
            .unwrap();
        assert_eq!(borrows, 0);
    }

    #[test]
    fn lend_money_requires_sufficient_balance() {
        let mut conn = setup();
        let err = {
            let mut ledger = Ledger::new(&mut conn, session());
            ledger.add_lent_money("Ned", dec("5000"), 1).unwrap_err()
        };
        assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
        assert_eq!(balance(&conn, 1), dec("1000"));
        assert_eq!(tx_count(&conn), 0);
        let lent: i64 = conn
            .query_row("SELECT COUNT(*) FROM lent", [], |r| r.get(0))
            .unwrap();
        assert_eq!(lent, 0);
    }

    #[test]
    fn lend_money_debits_and_tracks() {
        let mut conn = setup();
        let id = {
            let mut ledger = Ledger::new(&mut conn, session());
            ledger.add_lent_money("Ned", dec("150"), 1).unwrap()
        };
        assert_eq!(balance(&conn, 1), dec("850"));
        let (desc, category): (String, String) = conn
            .query_row(
                "SELECT description, category FROM transactions",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(desc, "Loan to Ned");
        assert_eq!(category, "Lent");
        let description: String = conn
            .query_row("SELECT description FROM lent WHERE id=?1", [id], |r| r.get(0))
            .unwrap();
        assert_eq!(description, "Direct loan");
    }

    fn seed_borrow(conn: &mut Connection, amount: &str) -> i64 {
        {
            let mut ledger = Ledger::new(conn, session());
            ledger
                .add_income("Loan", dec(amount), 1, Some("Marge"))
                .unwrap();
        }
        conn.query_row("SELECT id FROM borrows ORDER BY id DESC LIMIT 1", [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn settle_borrow_partial_keeps_outstanding() {
        let mut conn = setup();
        let borrow_id = seed_borrow(&mut conn, "100");
        let outcome = {
            let mut ledger = Ledger::new(&mut conn, session());
            ledger.settle_borrow(borrow_id, 1, Some(dec("40"))).unwrap()
        };
        assert_eq!(outcome.remaining, dec("60"));
        assert!(!outcome.settled);
        // 1000 + 100 borrowed - 40 paid back
        assert_eq!(balance(&conn, 1), dec("1060"));
        let (remaining, status, settled_date): (String, String, Option<String>) = conn
            .query_row(
                "SELECT remaining_amount, status, settled_date FROM borrows WHERE id=?1",
                [borrow_id],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .unwrap();
        assert_eq!(dec(&remaining), dec("60"));
        assert_eq!(status, "outstanding");
        assert!(settled_date.is_none());
        let settlements: Vec<String> = conn
            .prepare("SELECT amount FROM borrow_settlements WHERE borrow_id=?1")
            .unwrap()
            .query_map([borrow_id], |r| r.get(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(settlements, vec!["40".to_string()]);
    }

    #[test]
    fn settle_borrow_default_payment_settles_in_full() {
        let mut conn = setup();
        let borrow_id = seed_borrow(&mut conn, "100");
        let outcome = {
            let mut ledger = Ledger::new(&mut conn, session());
            ledger.settle_borrow(borrow_id, 1, None).unwrap()
        };
        assert_eq!(outcome.remaining, Decimal::ZERO);
        assert!(outcome.settled);
        let (remaining, status, settled_date): (String, String, Option<String>) = conn
            .query_row(
                "SELECT remaining_amount, status, settled_date FROM borrows WHERE id=?1",
                [borrow_id],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .unwrap();
        assert_eq!(dec(&remaining), Decimal::ZERO);
        assert_eq!(status, "settled");
        assert!(settled_date.is_some());
    }

    #[test]
    fn settle_borrow_rejects_overpayment_beyond_tolerance() {
        let mut conn = setup();
        let borrow_id = seed_borrow(&mut conn, "100");
        let err = {
            let mut ledger = Ledger::new(&mut conn, session());
            ledger
                .settle_borrow(borrow_id, 1, Some(dec("100.5")))
                .unwrap_err()
        };
        assert!(matches!(err, LedgerError::InvalidAmount(_)));
        // Nothing applied
        assert_eq!(balance(&conn, 1), dec("1100"));
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM borrow_settlements", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn settle_borrow_within_tolerance_settles() {
        let mut conn = setup();
        let borrow_id = seed_borrow(&mut conn, "100");
        let outcome = {
            let mut ledger = Ledger::new(&mut conn, session());
            ledger
                .settle_borrow(borrow_id, 1, Some(dec("100.0005")))
                .unwrap()
        };
        assert!(outcome.settled);
        assert_eq!(outcome.remaining, Decimal::ZERO);
    }

    #[test]
    fn settle_borrow_requires_sufficient_balance() {
        let mut conn = setup();
        let borrow_id = seed_borrow(&mut conn, "400");
        // Drain the account below the remaining amount first.
        {
            let mut ledger = Ledger::new(&mut conn, session());
            ledger
                .add_transaction(1, dec("-1300"), Category::Expense("Rent".into()), "Rent")
                .unwrap();
        }
        let err = {
            let mut ledger = Ledger::new(&mut conn, session());
            ledger.settle_borrow(borrow_id, 1, None).unwrap_err()
        };
        assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
        assert_eq!(balance(&conn, 1), dec("100"));
    }

    #[test]
    fn settled_borrow_rejects_further_payments() {
        let mut conn = setup();
        let borrow_id = seed_borrow(&mut conn, "100");
        {
            let mut ledger = Ledger::new(&mut conn, session());
            ledger.settle_borrow(borrow_id, 1, None).unwrap();
        }
        let first_settled: Option<String> = conn
            .query_row("SELECT settled_date FROM borrows WHERE id=?1", [borrow_id], |r| r.get(0))
            .unwrap();
        let err = {
            let mut ledger = Ledger::new(&mut conn, session());
            ledger
                .settle_borrow(borrow_id, 1, Some(dec("0.0005")))
                .unwrap_err()
        };
        assert!(matches!(err, LedgerError::InvalidAmount(_)));
        let after: Option<String> = conn
            .query_row("SELECT settled_date FROM borrows WHERE id=?1", [borrow_id], |r| r.get(0))
            .unwrap();
        assert_eq!(first_settled, after);
    }

    #[test]
    fn settlement_sum_matches_original_amount() {
        let mut conn = setup();
        let borrow_id = seed_borrow(&mut conn, "100");
        for payment in ["12.50", "37.50", "50"] {
            let mut ledger = Ledger::new(&mut conn, session());
            ledger
                .settle_borrow(borrow_id, 1, Some(dec(payment)))
                .unwrap();
        }
        let (original, remaining): (String, String) = conn
            .query_row(
                "SELECT original_amount, remaining_amount FROM borrows WHERE id=?1",
                [borrow_id],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        let paid: Decimal = conn
            .prepare("SELECT amount FROM borrow_settlements WHERE borrow_id=?1")
            .unwrap()
            .query_map([borrow_id], |r| r.get::<_, String>(0))
            .unwrap()
            .map(|r| dec(&r.unwrap()))
            .sum();
        let drift = dec(&original) - (dec(&remaining) + paid);
        assert!(drift.abs() <= settle_tolerance());
    }

    #[test]
    fn settle_lent_credits_destination_without_funds_check() {
        let mut conn = setup();
        conn.execute(
            "INSERT INTO accounts(id, user_id, name, type, balance) VALUES (4, 1, 'Empty', 'Cash', '0')",
            [],
        )
        .unwrap();
        let lent_id = {
            let mut ledger = Ledger::new(&mut conn, session());
            ledger.add_lent_money("Ned", dec("150"), 1).unwrap()
        };
        let outcome = {
            let mut ledger = Ledger::new(&mut conn, session());
            ledger.settle_lent(lent_id, 4, Some(dec("70"))).unwrap()
        };
        assert_eq!(outcome.remaining, dec("80"));
        assert!(!outcome.settled);
        assert_eq!(balance(&conn, 4), dec("70"));
        let (category, amount): (String, String) = conn
            .query_row(
                "SELECT category, amount FROM transactions WHERE account_id=4",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(category, "Reimbursement");
        assert_eq!(dec(&amount), dec("70"));
    }

    #[test]
    fn transfer_preserves_total_and_pairs_rows() {
        let mut conn = setup();
        let before = balance(&conn, 1) + balance(&conn, 2);
        {
            let mut ledger = Ledger::new(&mut conn, session());
            ledger.add_transfer(1, 2, dec("200"), None).unwrap();
        }
        assert_eq!(balance(&conn, 1) + balance(&conn, 2), before);
        assert_eq!(balance(&conn, 1), dec("800"));
        assert_eq!(balance(&conn, 2), dec("450"));

        let mut stmt = conn
            .prepare("SELECT account_id, amount, created_at FROM transactions ORDER BY account_id")
            .unwrap();
        let rows: Vec<(i64, String, String)> = stmt
            .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(dec(&rows[0].1), dec("-200"));
        assert_eq!(dec(&rows[1].1), dec("200"));
        assert_eq!(rows[0].2, rows[1].2);
    }

    #[test]
    fn transfer_rejects_same_account() {
        let mut conn = setup();
        let err = {
            let mut ledger = Ledger::new(&mut conn, session());
            ledger.add_transfer(1, 1, dec("10"), None).unwrap_err()
        };
        assert!(matches!(err, LedgerError::InvalidAmount(_)));
        assert_eq!(balance(&conn, 1), dec("1000"));
    }

    #[test]
    fn transfer_missing_account_is_not_found() {
        let mut conn = setup();
        let err = {
            let mut ledger = Ledger::new(&mut conn, session());
            ledger.add_transfer(1, 99, dec("10"), None).unwrap_err()
        };
        assert!(matches!(err, LedgerError::NotFound(_)));
        assert_eq!(balance(&conn, 1), dec("1000"));
        assert_eq!(tx_count(&conn), 0);
    }

    #[test]
    fn pay_bill_exact_clears_card_without_adjustment() {
        let mut conn = setup();
        let outcome = {
            let mut ledger = Ledger::new(&mut conn, session());
            ledger.pay_bill(3, 1, dec("500")).unwrap()
        };
        assert_eq!(outcome.card_balance, Decimal::ZERO);
        assert!(outcome.adjustment.is_none());
        assert_eq!(balance(&conn, 3), Decimal::ZERO);
        assert_eq!(balance(&conn, 1), dec("500"));
        let fees: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM transactions WHERE category='Fees'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(fees, 0);
        assert_eq!(tx_count(&conn), 2);
    }

    #[test]
    fn pay_bill_overpayment_writes_fees_adjustment() {
        let mut conn = setup();
        let outcome = {
            let mut ledger = Ledger::new(&mut conn, session());
            ledger.pay_bill(3, 1, dec("520")).unwrap()
        };
        assert_eq!(outcome.card_balance, Decimal::ZERO);
        assert_eq!(outcome.adjustment, Some(dec("-20")));
        assert_eq!(balance(&conn, 3), Decimal::ZERO);
        assert_eq!(balance(&conn, 1), dec("480"));
        let (amount, desc): (String, String) = conn
            .query_row(
                "SELECT amount, description FROM transactions WHERE category='Fees'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(dec(&amount), dec("-20"));
        assert_eq!(desc, "Card Payment Misc.");
        // The card's entries sum to the real balance change: +520 - 20
        let card_sum: Decimal = conn
            .prepare("SELECT amount FROM transactions WHERE account_id=3")
            .unwrap()
            .query_map([], |r| r.get::<_, String>(0))
            .unwrap()
            .map(|r| dec(&r.unwrap()))
            .sum();
        assert_eq!(card_sum, dec("500"));
    }

    #[test]
    fn pay_bill_rejects_non_card_target() {
        let mut conn = setup();
        let err = {
            let mut ledger = Ledger::new(&mut conn, session());
            ledger.pay_bill(2, 1, dec("100")).unwrap_err()
        };
        assert!(matches!(err, LedgerError::InvalidAccountType { .. }));
        assert_eq!(balance(&conn, 1), dec("1000"));
        assert_eq!(balance(&conn, 2), dec("250"));
    }

    #[test]
    fn pay_bill_rejects_non_positive_amount() {
        let mut conn = setup();
        let err = {
            let mut ledger = Ledger::new(&mut conn, session());
            ledger.pay_bill(3, 1, dec("0")).unwrap_err()
        };
        assert!(matches!(err, LedgerError::InvalidAmount(_)));
        assert_eq!(tx_count(&conn), 0);
    }
}

// Copyright (c) 2026 Pocketledger Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The resolved profile a command runs under. Passed explicitly into the
/// ledger engine; there is no ambient user state.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub user_id: i64,
    pub user: String,
    pub currency: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    #[serde(rename = "Bank Account")]
    Bank,
    Cash,
    #[serde(rename = "Credit Card")]
    CreditCard,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Bank => "Bank Account",
            AccountType::Cash => "Cash",
            AccountType::CreditCard => "Credit Card",
        }
    }

    /// Parse the canonical string stored in the accounts table.
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "Bank Account" => Some(AccountType::Bank),
            "Cash" => Some(AccountType::Cash),
            "Credit Card" => Some(AccountType::CreditCard),
            _ => None,
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_'], " ").as_str() {
            "bank" | "bank account" => Ok(AccountType::Bank),
            "cash" => Ok(AccountType::Cash),
            "cc" | "card" | "credit" | "credit card" => Ok(AccountType::CreditCard),
            other => Err(anyhow::anyhow!(
                "Unknown account type '{}', expected bank|cash|credit-card",
                other
            )),
        }
    }
}

/// Transaction category. The closed set below is written by the ledger
/// engine itself; anything else is a free-form expense category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Category {
    Income,
    Borrowed,
    Lent,
    Settlement,
    Reimbursement,
    Transfer,
    Fees,
    Expense(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Category::Income => "Income",
            Category::Borrowed => "Borrowed",
            Category::Lent => "Lent",
            Category::Settlement => "Settlement",
            Category::Reimbursement => "Reimbursement",
            Category::Transfer => "Transfer",
            Category::Fees => "Fees",
            Category::Expense(name) => name,
        }
    }

    pub fn parse(s: &str) -> Category {
        match s {
            "Income" => Category::Income,
            "Borrowed" => Category::Borrowed,
            "Lent" => Category::Lent,
            "Settlement" => Category::Settlement,
            "Reimbursement" => Category::Reimbursement,
            "Transfer" => Category::Transfer,
            "Fees" => Category::Fees,
            other => Category::Expense(other.to_string()),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebtStatus {
    Outstanding,
    Settled,
}

impl DebtStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DebtStatus::Outstanding => "outstanding",
            DebtStatus::Settled => "settled",
        }
    }

    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "outstanding" => Some(DebtStatus::Outstanding),
            "settled" => Some(DebtStatus::Settled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AccountType,
    pub balance: Decimal,
    pub credit_limit: Option<Decimal>,
    pub billing_cycle_day: Option<u8>,
}

/// A partial or full payment against a Borrow or Lent record.
#[derive(Debug, Clone, Serialize)]
pub struct Settlement {
    pub id: i64,
    pub amount: Decimal,
    pub created_at: String,
}

/// Money the user owes a lender.
#[derive(Debug, Clone, Serialize)]
pub struct Borrow {
    pub id: i64,
    pub lender: String,
    pub original_amount: Decimal,
    pub remaining_amount: Decimal,
    pub status: DebtStatus,
    pub created_at: String,
    pub settled_date: Option<String>,
    pub settlements: Vec<Settlement>,
}

/// Money a counterparty owes the user.
#[derive(Debug, Clone, Serialize)]
pub struct Lent {
    pub id: i64,
    pub borrower: String,
    pub description: String,
    pub original_amount: Decimal,
    pub remaining_amount: Decimal,
    pub status: DebtStatus,
    pub created_at: String,
    pub settled_date: Option<String>,
    pub settlements: Vec<Settlement>,
}

/// An investment holding tracked at cost basis.
#[derive(Debug, Clone, Serialize)]
pub struct Holding {
    pub id: i64,
    pub symbol: String,
    pub name: Option<String>,
    pub quantity: Decimal,
    pub purchase_price: Decimal,
    pub purchase_date: String,
}

// Copyright (c) 2026 Pocketledger Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use thiserror::Error;

/// Typed failures surfaced by the ledger engine.
///
/// Every engine operation either commits in full or returns one of these
/// with no partial state left behind.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("insufficient funds in '{account}': balance {balance}, required {required}")]
    InsufficientFunds {
        account: String,
        balance: Decimal,
        required: Decimal,
    },

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("'{account}' is a {actual} account, expected {expected}")]
    InvalidAccountType {
        account: String,
        expected: &'static str,
        actual: String,
    },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<rusqlite::Error> for LedgerError {
    fn from(err: rusqlite::Error) -> Self {
        LedgerError::Storage(err.to_string())
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;

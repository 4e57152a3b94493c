//! Loan model and related types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Loan lifecycle states. A loan only ever moves `Active` -> `Returned`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Active,
    Returned,
}

/// Loan record: links one user to one book copy for a bounded period.
///
/// `return_date` and `fine_cents` are set exactly once, when the loan is
/// closed, and never change afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Loan {
    pub loan_id: i64,
    pub user_id: i64,
    pub book_id: i64,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: LoanStatus,
    /// Fine in currency cents; `None` until the loan is returned.
    pub fine_cents: Option<i64>,
}

impl Loan {
    /// Fine as a decimal amount, if the loan has been closed.
    pub fn fine(&self) -> Option<Decimal> {
        self.fine_cents.map(|cents| Decimal::new(cents, 2))
    }

    pub fn is_overdue(&self, as_of: DateTime<Utc>) -> bool {
        self.status == LoanStatus::Active && self.due_date < as_of
    }
}

/// Loan joined with its book, for history display
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LoanDetails {
    pub loan_id: i64,
    pub user_id: i64,
    pub book_id: i64,
    pub title: String,
    pub author: String,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: LoanStatus,
    pub fine_cents: Option<i64>,
}

/// Outcome of a successful borrow
#[derive(Debug, Clone, Serialize)]
pub struct BorrowReceipt {
    pub loan_id: i64,
    pub due_date: DateTime<Utc>,
}

/// Outcome of a successful return
#[derive(Debug, Clone, Serialize)]
pub struct ReturnReceipt {
    pub loan_id: i64,
    pub return_date: DateTime<Utc>,
    pub days_overdue: i64,
    pub fine: Decimal,
}

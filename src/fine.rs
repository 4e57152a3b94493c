//! Fine policy: maps overdue duration to a monetary penalty
//!
//! Lateness is measured in whole calendar days at UTC midnight boundaries
//! (floor): a book returned any time before the midnight following its due
//! date owes nothing for that day. Amounts are rounded to two decimal places.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Whole days between the due date and the return date, never negative.
pub fn days_overdue(due_date: DateTime<Utc>, return_date: DateTime<Utc>) -> i64 {
    (return_date.date_naive() - due_date.date_naive())
        .num_days()
        .max(0)
}

/// Compute the fine owed for a loan returned on `return_date`.
///
/// Pure: no I/O, no side effects. Returns zero for any return on or before
/// the due date.
pub fn compute_fine(
    due_date: DateTime<Utc>,
    return_date: DateTime<Utc>,
    rate_per_day: Decimal,
) -> Decimal {
    (Decimal::from(days_overdue(due_date, return_date)) * rate_per_day).round_dp(2)
}

//! Borrowing ledger: the only component that creates or closes loans
//!
//! Both `borrow` and `return_book` run their check-then-write sequence inside
//! a single transaction scope, so the availability counter can never be read
//! stale relative to the write that follows it: two racing borrows of a last
//! copy resolve to one success and one `NoCopiesAvailable`.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::{
    clock::Clock,
    config::LoansConfig,
    error::{AppError, AppResult},
    fine,
    models::loan::{BorrowReceipt, Loan, LoanDetails, ReturnReceipt},
    repository::Repository,
};

#[derive(Clone)]
pub struct LedgerService {
    repository: Repository,
    clock: Arc<dyn Clock>,
    config: LoansConfig,
}

impl LedgerService {
    pub fn new(repository: Repository, clock: Arc<dyn Clock>, config: LoansConfig) -> Self {
        Self {
            repository,
            clock,
            config,
        }
    }

    /// Borrow a book for a user.
    ///
    /// Checks that the user and book exist, that the user does not already
    /// hold this book, and that a copy is available; then creates the loan
    /// and decrements the availability counter. All of it commits together
    /// or not at all. `period_days` defaults to the configured loan period.
    pub async fn borrow(
        &self,
        user_id: i64,
        book_id: i64,
        period_days: Option<i64>,
    ) -> AppResult<BorrowReceipt> {
        let period = period_days.unwrap_or(self.config.period_days);
        if period <= 0 {
            return Err(AppError::Validation(format!(
                "Loan period must be positive, got {}",
                period
            )));
        }

        let op = async {
            let mut tx = self.repository.begin().await?;

            self.repository.users.require(&mut tx, user_id).await?;
            let book = self.repository.books.get_in_tx(&mut tx, book_id).await?;

            if self
                .repository
                .loans
                .active_exists(&mut tx, user_id, book_id)
                .await?
            {
                return Err(AppError::DuplicateLoan { user_id, book_id });
            }
            if book.available_copies <= 0 {
                return Err(AppError::NoCopiesAvailable(book_id));
            }

            let now = self.clock.now();
            let due_date = now + Duration::days(period);

            let loan_id = self
                .repository
                .loans
                .insert(&mut tx, user_id, book_id, now, due_date)
                .await?;

            let adjusted = self
                .repository
                .books
                .adjust_availability(&mut tx, book_id, -1)
                .await?;
            if adjusted == 0 {
                // Counter hit zero between our read and write.
                return Err(AppError::NoCopiesAvailable(book_id));
            }

            tx.commit().await?;
            Ok(BorrowReceipt { loan_id, due_date })
        };

        let receipt = self.bounded(op).await?;

        tracing::info!(
            user_id,
            book_id,
            loan_id = receipt.loan_id,
            due_date = %receipt.due_date,
            "book borrowed"
        );

        Ok(receipt)
    }

    /// Return a borrowed book.
    ///
    /// Closes the user's active loan for this book, computing the fine from
    /// the overdue duration, and increments the availability counter in the
    /// same transaction. `rate_per_day` defaults to the configured fine rate.
    pub async fn return_book(
        &self,
        user_id: i64,
        book_id: i64,
        rate_per_day: Option<Decimal>,
    ) -> AppResult<ReturnReceipt> {
        let rate = rate_per_day.unwrap_or(self.config.fine_rate_per_day);

        let op = async {
            let mut tx = self.repository.begin().await?;

            let loan = self
                .repository
                .loans
                .find_active(&mut tx, user_id, book_id)
                .await?
                .ok_or(AppError::NoActiveLoan { user_id, book_id })?;

            let now = self.clock.now();
            let days_overdue = fine::days_overdue(loan.due_date, now);
            let amount = fine::compute_fine(loan.due_date, now, rate);
            let fine_cents = to_cents(amount)?;

            let closed = self
                .repository
                .loans
                .close(&mut tx, loan.loan_id, now, fine_cents)
                .await?;
            if closed == 0 {
                return Err(AppError::NoActiveLoan { user_id, book_id });
            }

            let adjusted = self
                .repository
                .books
                .adjust_availability(&mut tx, book_id, 1)
                .await?;
            if adjusted == 0 {
                return Err(AppError::Storage(sqlx::Error::RowNotFound));
            }

            tx.commit().await?;
            Ok(ReturnReceipt {
                loan_id: loan.loan_id,
                return_date: now,
                days_overdue,
                fine: amount,
            })
        };

        let receipt = self.bounded(op).await?;

        tracing::info!(
            user_id,
            book_id,
            loan_id = receipt.loan_id,
            days_overdue = receipt.days_overdue,
            fine = %receipt.fine,
            "book returned"
        );

        Ok(receipt)
    }

    /// Active loans for a user, soonest due first
    pub async fn active_loans_for_user(&self, user_id: i64) -> AppResult<Vec<Loan>> {
        self.repository.users.get_by_id(user_id).await?;
        self.repository.loans.active_for_user(user_id).await
    }

    /// Active loans past their due date as of the given instant.
    ///
    /// Read-only; fines stay uncomputed until the loan is actually returned.
    pub async fn overdue_loans(&self, as_of: DateTime<Utc>) -> AppResult<Vec<Loan>> {
        self.repository.loans.overdue(as_of).await
    }

    /// Full borrowing history for a user, newest first
    pub async fn loan_history_for_user(&self, user_id: i64) -> AppResult<Vec<LoanDetails>> {
        self.repository.users.get_by_id(user_id).await?;
        self.repository.loans.history_for_user(user_id).await
    }

    /// Run a transactional operation under the configured time budget.
    /// Timing out drops the in-flight transaction, which rolls it back.
    async fn bounded<T>(
        &self,
        op: impl std::future::Future<Output = AppResult<T>>,
    ) -> AppResult<T> {
        tokio::time::timeout(self.config.transaction_timeout(), op)
            .await
            .map_err(|_| AppError::Timeout)?
    }
}

fn to_cents(amount: Decimal) -> AppResult<i64> {
    (amount * Decimal::ONE_HUNDRED)
        .to_i64()
        .ok_or_else(|| AppError::Validation(format!("Fine amount {} out of range", amount)))
}

//! Loans repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite, SqliteConnection};

use crate::{
    error::{AppError, AppResult},
    models::loan::{Loan, LoanDetails},
};

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Sqlite>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE loan_id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Whether the user already holds this book. Transaction-scoped.
    pub async fn active_exists(
        &self,
        conn: &mut SqliteConnection,
        user_id: i64,
        book_id: i64,
    ) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM loans
                WHERE user_id = ? AND book_id = ? AND status = 'active'
            )
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_one(conn)
        .await?;

        Ok(exists)
    }

    /// The user's active loan for this book, if any. Transaction-scoped.
    pub async fn find_active(
        &self,
        conn: &mut SqliteConnection,
        user_id: i64,
        book_id: i64,
    ) -> AppResult<Option<Loan>> {
        let loan = sqlx::query_as::<_, Loan>(
            r#"
            SELECT * FROM loans
            WHERE user_id = ? AND book_id = ? AND status = 'active'
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_optional(conn)
        .await?;

        Ok(loan)
    }

    /// Insert a new active loan. Transaction-scoped.
    pub async fn insert(
        &self,
        conn: &mut SqliteConnection,
        user_id: i64,
        book_id: i64,
        borrow_date: DateTime<Utc>,
        due_date: DateTime<Utc>,
    ) -> AppResult<i64> {
        let loan_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO loans (user_id, book_id, borrow_date, due_date, status)
            VALUES (?, ?, ?, ?, 'active')
            RETURNING loan_id
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(borrow_date)
        .bind(due_date)
        .fetch_one(conn)
        .await
        .map_err(|e| match &e {
            // The partial unique index on (user_id, book_id) backs up the
            // duplicate-loan precondition check.
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::DuplicateLoan { user_id, book_id }
            }
            _ => AppError::Storage(e),
        })?;

        Ok(loan_id)
    }

    /// Close an active loan: set return date, fine and status in one write.
    /// Transaction-scoped. Returns the number of rows updated; 0 means the
    /// loan was not active.
    pub async fn close(
        &self,
        conn: &mut SqliteConnection,
        loan_id: i64,
        return_date: DateTime<Utc>,
        fine_cents: i64,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE loans
            SET return_date = ?, status = 'returned', fine_cents = ?
            WHERE loan_id = ? AND status = 'active'
            "#,
        )
        .bind(return_date)
        .bind(fine_cents)
        .bind(loan_id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Active loans for a user, soonest due first
    pub async fn active_for_user(&self, user_id: i64) -> AppResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>(
            r#"
            SELECT * FROM loans
            WHERE user_id = ? AND status = 'active'
            ORDER BY due_date
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(loans)
    }

    /// Active loans past their due date as of the given instant
    pub async fn overdue(&self, as_of: DateTime<Utc>) -> AppResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>(
            r#"
            SELECT * FROM loans
            WHERE status = 'active' AND due_date < ?
            ORDER BY due_date
            "#,
        )
        .bind(as_of)
        .fetch_all(&self.pool)
        .await?;

        Ok(loans)
    }

    /// All loans for a user with their book, newest first
    pub async fn history_for_user(&self, user_id: i64) -> AppResult<Vec<LoanDetails>> {
        let loans = sqlx::query_as::<_, LoanDetails>(
            r#"
            SELECT l.loan_id, l.user_id, l.book_id, b.title, b.author,
                   l.borrow_date, l.due_date, l.return_date, l.status, l.fine_cents
            FROM loans l
            JOIN books b ON b.book_id = l.book_id
            WHERE l.user_id = ?
            ORDER BY l.borrow_date DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(loans)
    }

    /// Count active loans
    pub async fn count_active(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE status = 'active'")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Count overdue loans as of the given instant
    pub async fn count_overdue(&self, as_of: DateTime<Utc>) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE status = 'active' AND due_date < ?")
                .bind(as_of)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Distinct users with at least one active loan
    pub async fn count_active_borrowers(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(DISTINCT user_id) FROM loans WHERE status = 'active'")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Accumulated fines across all returned loans, in cents
    pub async fn total_fine_cents(&self) -> AppResult<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(fine_cents), 0) FROM loans")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }
}

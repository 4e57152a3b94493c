//! Books repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite, SqliteConnection};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, PopularBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Sqlite>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE book_id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Get book by ID inside an open transaction scope.
    ///
    /// The ledger re-reads `available_copies` through here so the value it
    /// checks is the one its own transaction will decrement.
    pub async fn get_in_tx(&self, conn: &mut SqliteConnection, id: i64) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE book_id = ?")
            .bind(id)
            .fetch_optional(conn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Add a book to the catalog
    pub async fn create(&self, book: &CreateBook, now: DateTime<Utc>) -> AppResult<Book> {
        let book_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO books (isbn, title, author, publisher, category,
                               total_copies, available_copies, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING book_id
            "#,
        )
        .bind(&book.isbn)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.publisher)
        .bind(&book.category)
        .bind(book.copies)
        .bind(book.copies)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict(format!("ISBN {} already exists", book.isbn))
            }
            _ => AppError::Storage(e),
        })?;

        self.get_by_id(book_id).await
    }

    /// Adjust the available-copy counter by `delta` (negative to borrow,
    /// positive to return). Only callable inside an open transaction scope;
    /// this is the single write path for `available_copies`.
    ///
    /// Returns the number of rows updated: 0 means the book is missing or
    /// the adjustment would push the counter below zero. The schema's upper
    /// bound check (`available <= total`) rejects over-returns as a storage
    /// error.
    pub async fn adjust_availability(
        &self,
        conn: &mut SqliteConnection,
        book_id: i64,
        delta: i64,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE books SET available_copies = available_copies + ?
            WHERE book_id = ? AND available_copies + ? >= 0
            "#,
        )
        .bind(delta)
        .bind(book_id)
        .bind(delta)
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Search books by title, author or ISBN
    pub async fn search(&self, keyword: &str) -> AppResult<Vec<Book>> {
        let pattern = format!("%{}%", keyword);
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT * FROM books
            WHERE title LIKE ? OR author LIKE ? OR isbn LIKE ?
            ORDER BY title
            "#,
        )
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    /// Most borrowed titles, all time
    pub async fn popular(&self, limit: i64) -> AppResult<Vec<PopularBook>> {
        let books = sqlx::query_as::<_, PopularBook>(
            r#"
            SELECT b.book_id, b.isbn, b.title, b.author,
                   b.total_copies, b.available_copies,
                   COUNT(l.loan_id) AS borrow_count
            FROM books b
            LEFT JOIN loans l ON l.book_id = b.book_id
            GROUP BY b.book_id
            ORDER BY borrow_count DESC, b.title
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    /// Title count plus summed copy counters, for the statistics report
    pub async fn inventory_totals(&self) -> AppResult<(i64, i64, i64)> {
        let totals = sqlx::query_as::<_, (i64, i64, i64)>(
            r#"
            SELECT COUNT(*),
                   COALESCE(SUM(total_copies), 0),
                   COALESCE(SUM(available_copies), 0)
            FROM books
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(totals)
    }
}

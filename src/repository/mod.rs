//! Repository layer for database operations
//!
//! The shared mutable state (the loans table and the book availability
//! counters) is only ever written inside a transaction scope obtained from
//! [`Repository::begin`]. The scope commits explicitly and rolls back on
//! every other exit path, including drop, so no call site can leave a
//! half-applied borrow or return behind.
//!
//! SQLite permits one writer at a time. Every write transaction is funneled
//! through a dedicated single-connection pool, so concurrent write scopes
//! queue for the connection and each one starts on the state its
//! predecessor committed. Without this, two scopes from a wider pool both
//! begin as read transactions and the second upgrade fails on a stale
//! snapshot with a busy error instead of a precondition check. Reads run on
//! the wider pool.

pub mod books;
pub mod loans;
pub mod users;

use std::str::FromStr;

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite, Transaction,
};

use crate::{
    config::DatabaseConfig,
    error::{AppError, AppResult},
};

/// Main repository struct holding the reader pool and the writer connection
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Sqlite>,
    writer: Pool<Sqlite>,
    pub users: users::UsersRepository,
    pub books: books::BooksRepository,
    pub loans: loans::LoansRepository,
}

impl Repository {
    /// Create a repository over an existing reader pool and writer pool.
    /// The writer pool must hold a single connection.
    pub fn new(pool: Pool<Sqlite>, writer: Pool<Sqlite>) -> Self {
        Self {
            users: users::UsersRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            loans: loans::LoansRepository::new(pool.clone()),
            writer,
            pool,
        }
    }

    /// Open reader and writer pools from configuration and run pending
    /// migrations.
    ///
    /// The URL must name a file-backed database: with an in-memory database
    /// each pool would get its own private copy.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(AppError::Storage)?
            .create_if_missing(true)
            .foreign_keys(true);

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options.clone())
            .await?;

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&writer).await?;

        tracing::info!(url = %config.url, "connected to database");

        Ok(Self::new(pool, writer))
    }

    /// Begin a write-transaction scope on the writer connection.
    ///
    /// The returned transaction rolls back when dropped; only an explicit
    /// `commit` makes its writes visible. Concurrent readers never observe
    /// uncommitted state, and concurrent write scopes wait here for the
    /// writer connection rather than interleave.
    pub async fn begin(&self) -> AppResult<Transaction<'static, Sqlite>> {
        Ok(self.writer.begin().await?)
    }
}

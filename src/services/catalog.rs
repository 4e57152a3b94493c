//! Book catalog service

use std::sync::Arc;

use validator::Validate;

use crate::{
    clock::Clock,
    error::AppResult,
    models::book::{Book, CreateBook, PopularBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    clock: Arc<dyn Clock>,
}

impl CatalogService {
    pub fn new(repository: Repository, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Add a book to the catalog; all copies start available.
    pub async fn add_book(&self, request: CreateBook) -> AppResult<Book> {
        request.validate()?;

        let book = self
            .repository
            .books
            .create(&request, self.clock.now())
            .await?;

        tracing::info!(book_id = book.book_id, title = %book.title, "book added to catalog");

        Ok(book)
    }

    /// Get a book by ID
    pub async fn get_book(&self, book_id: i64) -> AppResult<Book> {
        self.repository.books.get_by_id(book_id).await
    }

    /// Search books by title, author or ISBN
    pub async fn search(&self, keyword: &str) -> AppResult<Vec<Book>> {
        self.repository.books.search(keyword).await
    }

    /// Most borrowed titles, all time
    pub async fn popular_books(&self, limit: i64) -> AppResult<Vec<PopularBook>> {
        self.repository.books.popular(limit).await
    }
}

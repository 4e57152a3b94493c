//! Library statistics service

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::{clock::Clock, error::AppResult, repository::Repository};

/// Snapshot of the library's inventory and lending activity
#[derive(Debug, Clone, Serialize)]
pub struct LibraryStats {
    pub total_titles: i64,
    pub total_copies: i64,
    pub available_copies: i64,
    pub member_count: i64,
    pub active_loans: i64,
    pub active_borrowers: i64,
    pub overdue_loans: i64,
    pub total_fines: Decimal,
}

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
    clock: Arc<dyn Clock>,
}

impl StatsService {
    pub fn new(repository: Repository, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Build the statistics report the admin screens render
    pub async fn library_stats(&self) -> AppResult<LibraryStats> {
        let (total_titles, total_copies, available_copies) =
            self.repository.books.inventory_totals().await?;

        let now = self.clock.now();

        Ok(LibraryStats {
            total_titles,
            total_copies,
            available_copies,
            member_count: self.repository.users.count_members().await?,
            active_loans: self.repository.loans.count_active().await?,
            active_borrowers: self.repository.loans.count_active_borrowers().await?,
            overdue_loans: self.repository.loans.count_overdue(now).await?,
            total_fines: Decimal::new(self.repository.loans.total_fine_cents().await?, 2),
        })
    }
}

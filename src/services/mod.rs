//! Business logic services

pub mod catalog;
pub mod ledger;
pub mod stats;
pub mod users;

use std::sync::Arc;

use crate::{clock::Clock, config::LoansConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub catalog: catalog::CatalogService,
    pub ledger: ledger::LedgerService,
    pub stats: stats::StatsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, clock: Arc<dyn Clock>, loans_config: LoansConfig) -> Self {
        Self {
            users: users::UsersService::new(repository.clone(), clock.clone()),
            catalog: catalog::CatalogService::new(repository.clone(), clock.clone()),
            ledger: ledger::LedgerService::new(repository.clone(), clock.clone(), loans_config),
            stats: stats::StatsService::new(repository, clock),
        }
    }
}

//! Shelfmark Library Lending Ledger
//!
//! The authoritative core for tracking books, users and borrowing
//! transactions: availability conservation, one active loan per user per
//! book, and overdue-fine computation, all enforced inside transactional
//! scopes. Interactive frontends (menu, HTTP) and authentication live
//! outside this crate and call in through the service operations.

pub mod clock;
pub mod config;
pub mod error;
pub mod fine;
pub mod models;
pub mod repository;
pub mod services;

pub use clock::{Clock, SystemClock};
pub use config::AppConfig;
pub use error::{AppError, AppResult};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing for an embedding application.
///
/// `RUST_LOG` wins when set; otherwise the configured level applies to this
/// crate. Safe to call more than once; later calls are no-ops.
pub fn init_tracing(config: &config::LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("shelfmark={}", config.level).into());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

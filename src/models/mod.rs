//! Data models for Shelfmark

pub mod book;
pub mod loan;
pub mod user;

// Re-export commonly used types
pub use book::{Book, CreateBook, PopularBook};
pub use loan::{BorrowReceipt, Loan, LoanDetails, LoanStatus, ReturnReceipt};
pub use user::{RegisterUser, Role, User};

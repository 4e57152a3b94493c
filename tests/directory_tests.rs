//! Catalog, directory and statistics integration tests

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::SqlitePoolOptions;

use shelfmark::{
    clock::ManualClock,
    config::LoansConfig,
    error::AppError,
    models::{CreateBook, LoanStatus, RegisterUser, Role},
    repository::Repository,
    services::Services,
};

async fn setup() -> (Services, Arc<ManualClock>) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("failed to open in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("failed to run migrations");

    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
    ));
    let repository = Repository::new(pool.clone(), pool);
    let services = Services::new(repository, clock.clone(), LoansConfig::default());

    (services, clock)
}

fn member(username: &str) -> RegisterUser {
    RegisterUser {
        username: username.to_string(),
        password_hash: "$argon2$opaque".to_string(),
        email: None,
        role: Role::Member,
    }
}

fn book(isbn: &str, title: &str, author: &str, copies: i64) -> CreateBook {
    CreateBook {
        isbn: isbn.to_string(),
        title: title.to_string(),
        author: author.to_string(),
        publisher: None,
        category: None,
        copies,
    }
}

#[tokio::test]
async fn duplicate_username_is_a_conflict() {
    let (services, _clock) = setup().await;

    services.users.register(member("alice")).await.unwrap();
    let err = services.users.register(member("alice")).await.unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn duplicate_isbn_is_a_conflict() {
    let (services, _clock) = setup().await;

    services
        .catalog
        .add_book(book("978-0-1", "The Hobbit", "Tolkien", 1))
        .await
        .unwrap();
    let err = services
        .catalog
        .add_book(book("978-0-1", "Another Title", "Someone", 1))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn register_validates_payload() {
    let (services, _clock) = setup().await;

    let err = services.users.register(member("")).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let mut bad_email = member("alice");
    bad_email.email = Some("not-an-email".to_string());
    let err = services.users.register(bad_email).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn add_book_requires_at_least_one_copy() {
    let (services, _clock) = setup().await;

    let err = services
        .catalog
        .add_book(book("978-0-1", "The Hobbit", "Tolkien", 0))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn search_matches_title_author_and_isbn() {
    let (services, _clock) = setup().await;

    services
        .catalog
        .add_book(book("978-0-1", "The Rust Programming Language", "Klabnik", 2))
        .await
        .unwrap();
    services
        .catalog
        .add_book(book("978-0-2", "Programming Rust", "Blandy", 1))
        .await
        .unwrap();
    services
        .catalog
        .add_book(book("978-0-3", "The Hobbit", "Tolkien", 1))
        .await
        .unwrap();

    let hits = services.catalog.search("Rust").await.unwrap();
    assert_eq!(hits.len(), 2);
    // Ordered by title.
    assert_eq!(hits[0].title, "Programming Rust");

    let by_isbn = services.catalog.search("978-0-3").await.unwrap();
    assert_eq!(by_isbn.len(), 1);
    assert_eq!(by_isbn[0].author, "Tolkien");
}

#[tokio::test]
async fn popular_books_rank_by_borrow_count() {
    let (services, _clock) = setup().await;

    let alice = services.users.register(member("alice")).await.unwrap().user_id;
    let bob = services.users.register(member("bob")).await.unwrap().user_id;
    let hot = services
        .catalog
        .add_book(book("978-0-1", "Hot Title", "A", 5))
        .await
        .unwrap()
        .book_id;
    let cold = services
        .catalog
        .add_book(book("978-0-2", "Cold Title", "B", 5))
        .await
        .unwrap()
        .book_id;

    services.ledger.borrow(alice, hot, None).await.unwrap();
    services.ledger.borrow(bob, hot, None).await.unwrap();
    services.ledger.borrow(alice, cold, None).await.unwrap();

    let ranking = services.catalog.popular_books(10).await.unwrap();
    assert_eq!(ranking[0].book_id, hot);
    assert_eq!(ranking[0].borrow_count, 2);
    assert_eq!(ranking[1].book_id, cold);
    assert_eq!(ranking[1].borrow_count, 1);
}

#[tokio::test]
async fn loan_history_is_newest_first_and_keeps_returned_loans() {
    let (services, clock) = setup().await;

    let alice = services.users.register(member("alice")).await.unwrap().user_id;
    let book_id = services
        .catalog
        .add_book(book("978-0-1", "The Hobbit", "Tolkien", 1))
        .await
        .unwrap()
        .book_id;

    services.ledger.borrow(alice, book_id, Some(10)).await.unwrap();
    clock.advance_days(3);
    services.ledger.return_book(alice, book_id, None).await.unwrap();
    clock.advance_days(1);
    services.ledger.borrow(alice, book_id, Some(10)).await.unwrap();

    let history = services.ledger.loan_history_for_user(alice).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].status, LoanStatus::Active);
    assert_eq!(history[1].status, LoanStatus::Returned);
    assert_eq!(history[0].title, "The Hobbit");
}

#[tokio::test]
async fn library_stats_reflect_lending_activity() {
    let (services, clock) = setup().await;

    let alice = services.users.register(member("alice")).await.unwrap().user_id;
    let bob = services.users.register(member("bob")).await.unwrap().user_id;
    let b1 = services
        .catalog
        .add_book(book("978-0-1", "One", "A", 2))
        .await
        .unwrap()
        .book_id;
    let b2 = services
        .catalog
        .add_book(book("978-0-2", "Two", "B", 1))
        .await
        .unwrap()
        .book_id;

    services.ledger.borrow(alice, b1, Some(5)).await.unwrap();
    services.ledger.borrow(alice, b2, Some(30)).await.unwrap();
    services.ledger.borrow(bob, b1, Some(30)).await.unwrap();

    // alice's first loan goes overdue, then comes back with a fine.
    clock.advance_days(7);
    services
        .ledger
        .return_book(alice, b1, Some(Decimal::new(50, 2)))
        .await
        .unwrap();

    let stats = services.stats.library_stats().await.unwrap();
    assert_eq!(stats.total_titles, 2);
    assert_eq!(stats.total_copies, 3);
    assert_eq!(stats.available_copies, 1);
    assert_eq!(stats.member_count, 2);
    assert_eq!(stats.active_loans, 2);
    assert_eq!(stats.active_borrowers, 2);
    assert_eq!(stats.overdue_loans, 0);
    assert_eq!(stats.total_fines, Decimal::new(100, 2));
}

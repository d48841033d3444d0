pub mod book_repository;
mod errors;
pub mod loan_repository;
pub mod patron_repository;

// パブリックに型を再エクスポート
pub use book_repository::BookRepository as PostgresBookRepository;
pub use loan_repository::LoanRepository as PostgresLoanRepository;
pub use patron_repository::PatronRepository as PostgresPatronRepository;

use crate::application::ServiceDependencies;
use sqlx::PgPool;
use std::sync::Arc;

/// コネクションプールを共有する依存関係を構築する
pub fn service_dependencies(pool: PgPool) -> ServiceDependencies {
    ServiceDependencies {
        book_repository: Arc::new(PostgresBookRepository::new(pool.clone())),
        patron_repository: Arc::new(PostgresPatronRepository::new(pool.clone())),
        loan_repository: Arc::new(PostgresLoanRepository::new(pool)),
    }
}

pub mod book_repository;
pub mod loan_repository;
pub mod patron_repository;
pub mod store_error;

pub use book_repository::*;
pub use loan_repository::*;
pub use patron_repository::*;
pub use store_error::StoreError;

mod book_service;
mod errors;
mod patron_service;

pub use book_service::{create_book, delete_book, get_book, list_books, update_book};
pub use errors::{CatalogApplicationError, Result};
pub use patron_service::{
    create_patron, delete_patron, get_patron, list_patrons, update_patron,
};

use axum::{
    Router,
    routing::{get, put},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, create_book, create_loan, create_patron, delete_book, delete_patron, get_book,
    get_loan_details, get_patron, health_check, list_books, list_loans, list_patrons,
    return_loan, update_book, update_patron, welcome,
};

/// Creates the API router with all library endpoints
///
/// Books / Patrons (CRUD):
/// - POST /books, GET /books?skip&limit, GET|PUT|DELETE /books/:id
/// - POST /patrons, GET /patrons?skip&limit, GET|PUT|DELETE /patrons/:id
///
/// Loans:
/// - POST /loans - Open a loan
/// - GET /loans?skip&limit - List loans
/// - GET /loans/:id - Loan with nested book and patron
/// - PUT /loans/:id/return - Return a loan
///
/// Collection routes answer with and without the trailing slash.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(welcome))
        // Health check endpoint
        .route("/health", get(health_check))
        // Books
        .route("/books", get(list_books).post(create_book))
        .route("/books/", get(list_books).post(create_book))
        .route(
            "/books/:id",
            get(get_book).put(update_book).delete(delete_book),
        )
        // Patrons
        .route("/patrons", get(list_patrons).post(create_patron))
        .route("/patrons/", get(list_patrons).post(create_patron))
        .route(
            "/patrons/:id",
            get(get_patron).put(update_patron).delete(delete_patron),
        )
        // Loans
        .route("/loans", get(list_loans).post(create_loan))
        .route("/loans/", get(list_loans).post(create_loan))
        .route("/loans/:id", get(get_loan_details))
        .route("/loans/:id/return", put(return_loan))
        // Add tracing middleware
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        // Add application state
        .with_state(state)
}

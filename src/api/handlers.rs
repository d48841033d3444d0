use crate::application::{ServiceDependencies, catalog, loan};
use crate::domain::{BookId, LoanId, PatronId, commands::ReturnLoan};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use chrono::NaiveDate;
use std::sync::Arc;

use super::{
    error::ApiError,
    extract::{Pagination, ValidatedJson, ValidatedPath},
    types::{
        BookRequest, BookResponse, LoanDetailsResponse, LoanResponse, OpenLoanRequest,
        PatronRequest, PatronResponse, ReturnLoanRequest, WelcomeResponse,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

/// 貸出日・登録日の既定値
fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

/// GET /
pub async fn welcome() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "📚 Welcome to the Library Management API!".to_string(),
    })
}

/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}

// ============================================================================
// Books
// ============================================================================

/// POST /books - 書籍を登録
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<BookRequest>,
) -> Result<Json<BookResponse>, ApiError> {
    let book = catalog::create_book(&state.service_deps, req.into_draft()).await?;
    Ok(Json(book.into()))
}

/// GET /books?skip&limit - 書籍一覧（登録順）
pub async fn list_books(
    State(state): State<Arc<AppState>>,
    Pagination(page): Pagination,
) -> Result<Json<Vec<BookResponse>>, ApiError> {
    let books = catalog::list_books(&state.service_deps, page).await?;
    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

/// GET /books/:id
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    ValidatedPath(book_id): ValidatedPath<i64>,
) -> Result<Json<BookResponse>, ApiError> {
    let book = catalog::get_book(&state.service_deps, BookId::new(book_id)).await?;
    Ok(Json(book.into()))
}

/// PUT /books/:id - 書籍の項目を上書き（availableは変更しない）
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    ValidatedPath(book_id): ValidatedPath<i64>,
    ValidatedJson(req): ValidatedJson<BookRequest>,
) -> Result<Json<BookResponse>, ApiError> {
    let book =
        catalog::update_book(&state.service_deps, BookId::new(book_id), req.into_draft()).await?;
    Ok(Json(book.into()))
}

/// DELETE /books/:id
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    ValidatedPath(book_id): ValidatedPath<i64>,
) -> Result<StatusCode, ApiError> {
    catalog::delete_book(&state.service_deps, BookId::new(book_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Patrons
// ============================================================================

/// POST /patrons - 利用者を登録（登録日は当日）
pub async fn create_patron(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<PatronRequest>,
) -> Result<Json<PatronResponse>, ApiError> {
    let patron = catalog::create_patron(&state.service_deps, req.into_draft(), today()).await?;
    Ok(Json(patron.into()))
}

/// GET /patrons?skip&limit
pub async fn list_patrons(
    State(state): State<Arc<AppState>>,
    Pagination(page): Pagination,
) -> Result<Json<Vec<PatronResponse>>, ApiError> {
    let patrons = catalog::list_patrons(&state.service_deps, page).await?;
    Ok(Json(patrons.into_iter().map(PatronResponse::from).collect()))
}

/// GET /patrons/:id
pub async fn get_patron(
    State(state): State<Arc<AppState>>,
    ValidatedPath(patron_id): ValidatedPath<i64>,
) -> Result<Json<PatronResponse>, ApiError> {
    let patron = catalog::get_patron(&state.service_deps, PatronId::new(patron_id)).await?;
    Ok(Json(patron.into()))
}

/// PUT /patrons/:id
pub async fn update_patron(
    State(state): State<Arc<AppState>>,
    ValidatedPath(patron_id): ValidatedPath<i64>,
    ValidatedJson(req): ValidatedJson<PatronRequest>,
) -> Result<Json<PatronResponse>, ApiError> {
    let patron = catalog::update_patron(
        &state.service_deps,
        PatronId::new(patron_id),
        req.into_draft(),
    )
    .await?;
    Ok(Json(patron.into()))
}

/// DELETE /patrons/:id
pub async fn delete_patron(
    State(state): State<Arc<AppState>>,
    ValidatedPath(patron_id): ValidatedPath<i64>,
) -> Result<StatusCode, ApiError> {
    catalog::delete_patron(&state.service_deps, PatronId::new(patron_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Loans
// ============================================================================

/// POST /loans - 新しい貸出を作成
///
/// 強制されるビジネスルール:
/// - 書籍が存在し、貸出中でないこと（400 NOT_AVAILABLE）
/// - 利用者が存在すること（404）
///
/// 貸出日は当日。
pub async fn create_loan(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<OpenLoanRequest>,
) -> Result<Json<LoanResponse>, ApiError> {
    let loan = loan::open_loan(&state.service_deps, req.to_command(today())).await?;
    Ok(Json(loan.into()))
}

/// GET /loans?skip&limit
pub async fn list_loans(
    State(state): State<Arc<AppState>>,
    Pagination(page): Pagination,
) -> Result<Json<Vec<LoanResponse>>, ApiError> {
    let loans = loan::list_loans(&state.service_deps, page).await?;
    Ok(Json(loans.into_iter().map(LoanResponse::from).collect()))
}

/// GET /loans/:id - 書籍・利用者を含む貸出詳細
pub async fn get_loan_details(
    State(state): State<Arc<AppState>>,
    ValidatedPath(loan_id): ValidatedPath<i64>,
) -> Result<Json<LoanDetailsResponse>, ApiError> {
    let details = loan::get_loan_details(&state.service_deps, LoanId::new(loan_id)).await?;
    Ok(Json(details.into()))
}

/// PUT /loans/:id/return - 書籍を返却
///
/// 強制されるビジネスルール:
/// - 貸出が存在すること（404）
/// - 既に返却済みでないこと（400 ALREADY_RETURNED）
pub async fn return_loan(
    State(state): State<Arc<AppState>>,
    ValidatedPath(loan_id): ValidatedPath<i64>,
    ValidatedJson(req): ValidatedJson<ReturnLoanRequest>,
) -> Result<Json<LoanResponse>, ApiError> {
    let cmd = ReturnLoan {
        loan_id: LoanId::new(loan_id),
        return_date: req.return_date,
    };

    let loan = loan::return_loan(&state.service_deps, cmd).await?;
    Ok(Json(loan.into()))
}

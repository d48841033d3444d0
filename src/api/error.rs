use crate::application::{catalog::CatalogApplicationError, loan::LoanApplicationError};
use crate::validation::ValidationErrors;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層・検証層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub enum ApiError {
    Catalog(CatalogApplicationError),
    Loan(LoanApplicationError),
    Validation(ValidationErrors),
}

impl From<CatalogApplicationError> for ApiError {
    fn from(err: CatalogApplicationError) -> Self {
        ApiError::Catalog(err)
    }
}

impl From<LoanApplicationError> for ApiError {
    fn from(err: LoanApplicationError) -> Self {
        ApiError::Loan(err)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(err: ValidationErrors) -> Self {
        ApiError::Validation(err)
    }
}

/// 500 Internal Server Error
///
/// 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
fn internal_error(err: &dyn std::error::Error) -> (StatusCode, &'static str, String) {
    match err.source() {
        Some(source) => tracing::error!("Internal error: {}: {}", err, source),
        None => tracing::error!("Internal error: {}", err),
    }
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An unexpected error occurred".to_string(),
    )
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            // 422 Unprocessable Entity - ペイロードの形式不正
            ApiError::Validation(errors) => {
                let body = ErrorResponse::new("VALIDATION_ERROR", "Request validation failed")
                    .with_details(errors.errors().to_vec());
                return (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response();
            }

            // 404 Not Found - リクエストされたリソースが存在しない
            ApiError::Catalog(CatalogApplicationError::BookNotFound) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", "Book not found".to_string())
            }
            ApiError::Catalog(CatalogApplicationError::PatronNotFound)
            | ApiError::Loan(LoanApplicationError::PatronNotFound) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "Patron not found".to_string(),
            ),
            ApiError::Loan(LoanApplicationError::LoanNotFound) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", "Loan not found".to_string())
            }

            // 409 Conflict - 一意制約違反・履歴のあるレコードの削除
            ApiError::Catalog(CatalogApplicationError::Conflict(msg)) => {
                (StatusCode::CONFLICT, "CONFLICT", msg)
            }

            // 400 Bad Request - 貸出ライフサイクルのルール違反
            ApiError::Loan(LoanApplicationError::BookNotAvailable) => (
                StatusCode::BAD_REQUEST,
                "NOT_AVAILABLE",
                "Book not available".to_string(),
            ),
            ApiError::Loan(LoanApplicationError::AlreadyReturned) => (
                StatusCode::BAD_REQUEST,
                "ALREADY_RETURNED",
                "Loan has already been returned".to_string(),
            ),

            // 500 Internal Server Error - システム障害
            ApiError::Catalog(ref e @ CatalogApplicationError::StoreError(_)) => internal_error(e),
            ApiError::Loan(ref e @ LoanApplicationError::StoreError(_))
            | ApiError::Loan(ref e @ LoanApplicationError::InconsistentLoan(_)) => {
                internal_error(e)
            }
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}

use axum::{
    Json, async_trait,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::domain::Page;
use crate::validation::{Validate, ValidationErrors};

use super::{error::ApiError, types::PaginationQuery};

/// 検証済みのJSONボディ
///
/// デシリアライズの失敗（欠落フィールド・型不一致・日付形式）と
/// [`Validate`]の失敗をどちらもValidationErrorとして返す。
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ValidationErrors::single("body", rejection.body_text()))?;

        payload.validate()?;
        Ok(Self(payload))
    }
}

/// `?skip=&limit=` から構築した検証済みのPage
pub struct Pagination(pub Page);

#[async_trait]
impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<PaginationQuery>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ValidationErrors::single("query", rejection.body_text()))?;

        Ok(Self(query.to_page()?))
    }
}

/// パスパラメータ（`/books/:id` など）
///
/// 数値として解釈できないIDや範囲外のIDはValidationErrorとして返す。
pub struct ValidatedPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidatedPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ValidationErrors::single("path", rejection.body_text()))?;

        Ok(Self(value))
    }
}

use crate::application::ServiceDependencies;
use crate::domain::{Page, Patron, PatronDraft, PatronId};
use crate::ports::StoreError;
use chrono::NaiveDate;

use super::errors::{CatalogApplicationError, Result};

fn map_write_error(err: StoreError, email: &str) -> CatalogApplicationError {
    match err {
        StoreError::UniqueViolation(_) => CatalogApplicationError::Conflict(format!(
            "A patron with email {} already exists",
            email
        )),
        other => CatalogApplicationError::StoreError(other),
    }
}

/// 利用者を登録する
///
/// 登録日は呼び出し側が決定する（通常は当日）。
pub async fn create_patron(
    deps: &ServiceDependencies,
    draft: PatronDraft,
    registered_date: NaiveDate,
) -> Result<Patron> {
    let email = draft.email.clone();
    let patron = deps
        .patron_repository
        .create(draft, registered_date)
        .await
        .map_err(|e| map_write_error(e, &email))?;

    tracing::info!(patron_id = %patron.id, "Patron created");
    Ok(patron)
}

pub async fn get_patron(deps: &ServiceDependencies, patron_id: PatronId) -> Result<Patron> {
    deps.patron_repository
        .get(patron_id)
        .await
        .map_err(CatalogApplicationError::StoreError)?
        .ok_or(CatalogApplicationError::PatronNotFound)
}

pub async fn list_patrons(deps: &ServiceDependencies, page: Page) -> Result<Vec<Patron>> {
    deps.patron_repository
        .list(page)
        .await
        .map_err(CatalogApplicationError::StoreError)
}

pub async fn update_patron(
    deps: &ServiceDependencies,
    patron_id: PatronId,
    draft: PatronDraft,
) -> Result<Patron> {
    let email = draft.email.clone();
    let patron = deps
        .patron_repository
        .update(patron_id, draft)
        .await
        .map_err(|e| map_write_error(e, &email))?
        .ok_or(CatalogApplicationError::PatronNotFound)?;

    tracing::info!(patron_id = %patron.id, "Patron updated");
    Ok(patron)
}

/// 利用者を削除する
///
/// 貸出履歴のある利用者は削除できない。
pub async fn delete_patron(deps: &ServiceDependencies, patron_id: PatronId) -> Result<()> {
    let deleted = deps
        .patron_repository
        .delete(patron_id)
        .await
        .map_err(|e| match e {
            StoreError::ForeignKeyViolation(_) => CatalogApplicationError::Conflict(format!(
                "Patron {} has loan history and cannot be deleted",
                patron_id
            )),
            other => CatalogApplicationError::StoreError(other),
        })?;

    if !deleted {
        return Err(CatalogApplicationError::PatronNotFound);
    }

    tracing::info!(patron_id = %patron_id, "Patron deleted");
    Ok(())
}

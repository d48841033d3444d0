use crate::application::ServiceDependencies;
use crate::domain::{Book, BookDraft, BookId, Page};
use crate::ports::StoreError;

use super::errors::{CatalogApplicationError, Result};

fn map_write_error(err: StoreError, isbn: &str) -> CatalogApplicationError {
    match err {
        StoreError::UniqueViolation(_) => CatalogApplicationError::Conflict(format!(
            "A book with ISBN {} already exists",
            isbn
        )),
        other => CatalogApplicationError::StoreError(other),
    }
}

/// 書籍を登録する
///
/// ISBNが重複する場合はConflict（挿入は行われない）。
pub async fn create_book(deps: &ServiceDependencies, draft: BookDraft) -> Result<Book> {
    let isbn = draft.isbn.clone();
    let book = deps
        .book_repository
        .create(draft)
        .await
        .map_err(|e| map_write_error(e, &isbn))?;

    tracing::info!(book_id = %book.id, isbn = %book.isbn, "Book created");
    Ok(book)
}

pub async fn get_book(deps: &ServiceDependencies, book_id: BookId) -> Result<Book> {
    deps.book_repository
        .get(book_id)
        .await
        .map_err(CatalogApplicationError::StoreError)?
        .ok_or(CatalogApplicationError::BookNotFound)
}

pub async fn list_books(deps: &ServiceDependencies, page: Page) -> Result<Vec<Book>> {
    deps.book_repository
        .list(page)
        .await
        .map_err(CatalogApplicationError::StoreError)
}

/// 書籍の項目を上書きする
///
/// 貸出可否（available）は貸出ライフサイクルの管理下にあるため変更しない。
pub async fn update_book(
    deps: &ServiceDependencies,
    book_id: BookId,
    draft: BookDraft,
) -> Result<Book> {
    let isbn = draft.isbn.clone();
    let book = deps
        .book_repository
        .update(book_id, draft)
        .await
        .map_err(|e| map_write_error(e, &isbn))?
        .ok_or(CatalogApplicationError::BookNotFound)?;

    tracing::info!(book_id = %book.id, "Book updated");
    Ok(book)
}

/// 書籍を削除する
///
/// 貸出履歴のある書籍は削除できない（履歴を孤立させないため）。
pub async fn delete_book(deps: &ServiceDependencies, book_id: BookId) -> Result<()> {
    let deleted = deps
        .book_repository
        .delete(book_id)
        .await
        .map_err(|e| match e {
            StoreError::ForeignKeyViolation(_) => CatalogApplicationError::Conflict(format!(
                "Book {} has loan history and cannot be deleted",
                book_id
            )),
            other => CatalogApplicationError::StoreError(other),
        })?;

    if !deleted {
        return Err(CatalogApplicationError::BookNotFound);
    }

    tracing::info!(book_id = %book_id, "Book deleted");
    Ok(())
}

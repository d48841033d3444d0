use crate::domain::{Book, BookDraft, BookId, Page};
use async_trait::async_trait;

use super::store_error::Result;

/// 書籍リポジトリポート
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// 書籍を登録する（available = true）
    ///
    /// ISBNが重複する場合は`StoreError::UniqueViolation`を返し、何も挿入しない。
    async fn create(&self, draft: BookDraft) -> Result<Book>;

    /// IDで書籍を取得する
    async fn get(&self, book_id: BookId) -> Result<Option<Book>>;

    /// 登録順（ID昇順）に一覧を取得する
    async fn list(&self, page: Page) -> Result<Vec<Book>>;

    /// 書籍の項目を上書きする（availableは変更しない）
    ///
    /// 存在しない場合はNone。
    async fn update(&self, book_id: BookId, draft: BookDraft) -> Result<Option<Book>>;

    /// 書籍を削除する
    ///
    /// 削除した場合はtrue、存在しない場合はfalse。
    /// 貸出履歴がある場合は`StoreError::ForeignKeyViolation`。
    async fn delete(&self, book_id: BookId) -> Result<bool>;
}

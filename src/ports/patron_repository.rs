use crate::domain::{Page, Patron, PatronDraft, PatronId};
use async_trait::async_trait;
use chrono::NaiveDate;

use super::store_error::Result;

/// 利用者リポジトリポート
#[async_trait]
pub trait PatronRepository: Send + Sync {
    /// 利用者を登録する
    ///
    /// メールアドレスが重複する場合は`StoreError::UniqueViolation`。
    async fn create(&self, draft: PatronDraft, registered_date: NaiveDate) -> Result<Patron>;

    async fn get(&self, patron_id: PatronId) -> Result<Option<Patron>>;

    /// 登録順（ID昇順）に一覧を取得する
    async fn list(&self, page: Page) -> Result<Vec<Patron>>;

    /// 利用者の項目を上書きする（登録日は変更しない）
    async fn update(&self, patron_id: PatronId, draft: PatronDraft) -> Result<Option<Patron>>;

    /// 利用者を削除する
    ///
    /// 貸出履歴がある場合は`StoreError::ForeignKeyViolation`。
    async fn delete(&self, patron_id: PatronId) -> Result<bool>;
}

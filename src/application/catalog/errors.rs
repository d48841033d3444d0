use crate::ports::StoreError;
use thiserror::Error;

/// 蔵書・利用者管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum CatalogApplicationError {
    /// 書籍が見つからない
    #[error("Book not found")]
    BookNotFound,

    /// 利用者が見つからない
    #[error("Patron not found")]
    PatronNotFound,

    /// 一意制約違反、または貸出履歴のあるレコードの削除
    #[error("Conflict: {0}")]
    Conflict(String),

    /// ストアのエラー
    #[error("Store error")]
    StoreError(#[source] StoreError),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, CatalogApplicationError>;

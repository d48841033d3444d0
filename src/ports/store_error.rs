use thiserror::Error;

/// ストア（永続化層）のエラー
///
/// 制約違反はアプリケーション層でドメインのエラーに変換できるよう区別する。
/// それ以外のドライバ・接続エラーはBackendにまとめる。
#[derive(Debug, Error)]
pub enum StoreError {
    /// 一意制約違反（ISBN, メールアドレス, 未返却の貸出）
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// 外部キー制約違反（貸出履歴のある書籍・利用者の削除など）
    #[error("Foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    /// 接続障害などのバックエンドエラー
    #[error("Storage backend error")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, StoreError>;

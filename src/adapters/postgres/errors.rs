use crate::ports::StoreError;

/// sqlxのエラーをストアのエラーに変換する
///
/// 一意制約違反（23505）と外部キー制約違反（23503）は制約名付きで区別し、
/// それ以外はBackendとして扱う。
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or_default().to_string();
            if db_err.is_unique_violation() {
                return StoreError::UniqueViolation(constraint);
            }
            if db_err.is_foreign_key_violation() {
                return StoreError::ForeignKeyViolation(constraint);
            }
        }
        StoreError::Backend(Box::new(err))
    }
}

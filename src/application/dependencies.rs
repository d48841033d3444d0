use crate::ports::*;
use std::sync::Arc;

/// サービスの依存関係
///
/// 関数型DDDの原則に従い、データ構造として定義。
/// 振る舞い（メソッド）は持たず、各サービス関数に明示的に渡す。
/// グローバルなエンジン・セッションは持たない。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub book_repository: Arc<dyn BookRepository>,
    pub patron_repository: Arc<dyn PatronRepository>,
    pub loan_repository: Arc<dyn LoanRepository>,
}

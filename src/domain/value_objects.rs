use serde::{Deserialize, Serialize};

/// 書籍ID - booksテーブルの主キー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BookId(i64);

impl BookId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 利用者ID - patronsテーブルの主キー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PatronId(i64);

impl PatronId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for PatronId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 貸出ID - loansテーブルの主キー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LoanId(i64);

impl LoanId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for LoanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ページネーションのエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    /// skipが負数
    NegativeSkip,
    /// limitが0以下
    NonPositiveLimit,
}

/// 一覧取得の範囲（offset-limit）
///
/// 不変条件：skip >= 0 かつ limit > 0
/// コンストラクタで検証するため、不正な範囲は作成できない。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    skip: i64,
    limit: i64,
}

impl Page {
    /// limit省略時のデフォルト件数
    pub const DEFAULT_LIMIT: i64 = 10;

    pub fn new(skip: i64, limit: i64) -> Result<Self, PageError> {
        if skip < 0 {
            return Err(PageError::NegativeSkip);
        }
        if limit <= 0 {
            return Err(PageError::NonPositiveLimit);
        }
        Ok(Self { skip, limit })
    }

    pub fn skip(&self) -> i64 {
        self.skip
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// 順序付きのイテレータに適用する（インメモリストア用）
    pub fn apply<I: IntoIterator>(&self, items: I) -> Vec<I::Item> {
        items
            .into_iter()
            .skip(usize::try_from(self.skip).unwrap_or(usize::MAX))
            .take(usize::try_from(self.limit).unwrap_or(usize::MAX))
            .collect()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

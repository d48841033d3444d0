/// 貸出開始のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenLoanError {
    /// 書籍が貸出中
    BookNotAvailable,
}

/// 返却のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnLoanError {
    /// 既に返却済み
    AlreadyReturned,
}

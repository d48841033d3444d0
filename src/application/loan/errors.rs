use crate::domain::{LoanId, OpenLoanError, ReturnLoanError};
use crate::ports::StoreError;
use thiserror::Error;

/// 貸出管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum LoanApplicationError {
    /// 書籍が存在しない、または貸出中
    #[error("Book not available")]
    BookNotAvailable,

    /// 利用者が存在しない
    #[error("Patron not found")]
    PatronNotFound,

    /// 貸出が見つからない
    #[error("Loan not found")]
    LoanNotFound,

    /// 既に返却済みの貸出を返却しようとした
    #[error("Loan has already been returned")]
    AlreadyReturned,

    /// 貸出が参照する書籍・利用者が存在しない
    #[error("Loan {0} references a missing book or patron")]
    InconsistentLoan(LoanId),

    /// ストアのエラー
    #[error("Store error")]
    StoreError(#[source] StoreError),
}

impl From<OpenLoanError> for LoanApplicationError {
    fn from(err: OpenLoanError) -> Self {
        match err {
            OpenLoanError::BookNotAvailable => LoanApplicationError::BookNotAvailable,
        }
    }
}

impl From<ReturnLoanError> for LoanApplicationError {
    fn from(err: ReturnLoanError) -> Self {
        match err {
            ReturnLoanError::AlreadyReturned => LoanApplicationError::AlreadyReturned,
        }
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, LoanApplicationError>;

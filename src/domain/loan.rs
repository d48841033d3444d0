use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Book, BookId, BookState, LoanId, OpenLoanError, Patron, PatronId, ReturnLoanError};

/// 貸出ステータス（return_dateから導出）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanStatus {
    /// 未返却
    Outstanding,
    /// 返却済み
    Returned,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Outstanding => "outstanding",
            LoanStatus::Returned => "returned",
        }
    }
}

/// 貸出 - 1冊の書籍の1回の貸出
///
/// 状態遷移は「未返却 → 返却済み」の1回のみ。
/// 他の集約（Book, Patron）はIDでのみ参照する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub book_id: BookId,
    pub patron_id: PatronId,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
}

impl Loan {
    pub fn status(&self) -> LoanStatus {
        match self.return_date {
            None => LoanStatus::Outstanding,
            Some(_) => LoanStatus::Returned,
        }
    }

    pub fn is_outstanding(&self) -> bool {
        self.status() == LoanStatus::Outstanding
    }
}

/// 永続化前の貸出（IDはストアが採番する）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLoan {
    pub book_id: BookId,
    pub patron_id: PatronId,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
}

impl NewLoan {
    pub fn into_loan(self, id: LoanId) -> Loan {
        Loan {
            id,
            book_id: self.book_id,
            patron_id: self.patron_id,
            loan_date: self.loan_date,
            due_date: self.due_date,
            return_date: None,
        }
    }
}

/// 書籍・利用者を解決済みの貸出詳細
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanDetails {
    pub loan: Loan,
    pub book: Book,
    pub patron: Patron,
}

/// 純粋関数：書籍を貸し出す
///
/// ビジネスルール：
/// - 貸出中の書籍は貸し出せない
/// - 利用者が存在すること（`&Patron`を受け取ることで保証）
/// - 返却日は未設定（未返却状態で開始）
///
/// 副作用なし。永続化すべき新しい貸出を返す。
pub fn open_loan(
    book: &Book,
    patron: &Patron,
    loan_date: NaiveDate,
    due_date: NaiveDate,
) -> Result<NewLoan, OpenLoanError> {
    if book.state() == BookState::CheckedOut {
        return Err(OpenLoanError::BookNotAvailable);
    }

    Ok(NewLoan {
        book_id: book.id,
        patron_id: patron.id,
        loan_date,
        due_date,
    })
}

/// 純粋関数：書籍を返却する
///
/// ビジネスルール：
/// - 返却済みの貸出は再度返却できない
/// - 返却日の前後関係は検証しない
///
/// 副作用なし。返却済みの貸出を返す。
pub fn return_loan(loan: &Loan, return_date: NaiveDate) -> Result<Loan, ReturnLoanError> {
    if !loan.is_outstanding() {
        return Err(ReturnLoanError::AlreadyReturned);
    }

    Ok(Loan {
        return_date: Some(return_date),
        ..loan.clone()
    })
}

/// 書籍の貸出可否フラグが貸出履歴と一致しているか
///
/// available == false ⇔ この書籍を参照する未返却の貸出が存在する
pub fn is_availability_consistent(book: &Book, loans: &[Loan]) -> bool {
    let outstanding = loans
        .iter()
        .filter(|loan| loan.book_id == book.id && loan.is_outstanding())
        .count();

    match outstanding {
        0 => book.available,
        1 => !book.available,
        _ => false,
    }
}

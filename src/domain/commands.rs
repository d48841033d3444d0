use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{BookId, LoanId, PatronId};

/// コマンド：書籍を貸し出す
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenLoan {
    pub book_id: BookId,
    pub patron_id: PatronId,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
}

/// コマンド：書籍を返却する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnLoan {
    pub loan_id: LoanId,
    pub return_date: NaiveDate,
}

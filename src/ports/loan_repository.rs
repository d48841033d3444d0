use crate::domain::{Loan, LoanId, NewLoan, Page};
use async_trait::async_trait;
use chrono::NaiveDate;

use super::store_error::Result;

/// 貸出リポジトリポート
///
/// 貸出の開始・返却は書籍の貸出可否フラグと対で更新する必要があるため、
/// 2つの更新を1トランザクションで行う操作として公開する。
/// 単純な貸出行の挿入・更新は公開しない。
#[async_trait]
pub trait LoanRepository: Send + Sync {
    /// 貸出を開始する（アトミック）
    ///
    /// 1. `UPDATE books SET available = false WHERE id = ? AND available = true`
    /// 2. 更新行が0件なら何もせずNoneを返す（他のリクエストが先に貸し出した）
    /// 3. return_date = NULL の貸出行を挿入する
    async fn open(&self, new_loan: NewLoan) -> Result<Option<Loan>>;

    /// 貸出を返却する（アトミック）
    ///
    /// 1. `UPDATE loans SET return_date = ? WHERE id = ? AND return_date IS NULL`
    /// 2. 更新行が0件なら何もせずNoneを返す（存在しないか返却済み）
    /// 3. 対象書籍の available = true
    async fn close(&self, loan_id: LoanId, return_date: NaiveDate) -> Result<Option<Loan>>;

    /// IDで貸出を取得する
    async fn get(&self, loan_id: LoanId) -> Result<Option<Loan>>;

    /// 登録順（ID昇順）に一覧を取得する
    async fn list(&self, page: Page) -> Result<Vec<Loan>>;
}

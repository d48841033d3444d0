use crate::application::ServiceDependencies;
use crate::domain::{self, Loan, LoanDetails, LoanId, Page, commands::*};
use crate::ports::StoreError;

use super::errors::{LoanApplicationError, Result};

/// 書籍を貸し出す
///
/// ビジネスルール：
/// - 書籍が存在し、貸出可能であること（そうでなければBookNotAvailable）
/// - 利用者が存在すること（そうでなければPatronNotFound）
/// - 書籍のavailable = false と貸出行の挿入は1トランザクションで行う
///
/// # 一貫性保証
///
/// 1〜3の読み取りはトランザクション外で行うが、ストアの`open`は
/// `available = true`を条件とした更新で書籍を確保する。
/// 読み取り後に別のリクエストが先に貸し出した場合はNoneが返り、
/// BookNotAvailableとなる。部分的な変更は残らない。
///
/// # 引数
/// * `deps` - サービスの依存関係
/// * `cmd` - 貸出コマンド
///
/// # 戻り値
/// 成功時は作成された貸出（return_date = None）
pub async fn open_loan(deps: &ServiceDependencies, cmd: OpenLoan) -> Result<Loan> {
    // 1. 書籍の存在確認
    let book = deps
        .book_repository
        .get(cmd.book_id)
        .await
        .map_err(LoanApplicationError::StoreError)?
        .ok_or(LoanApplicationError::BookNotAvailable)?;

    // 2. 利用者の存在確認
    let patron = deps
        .patron_repository
        .get(cmd.patron_id)
        .await
        .map_err(LoanApplicationError::StoreError)?
        .ok_or(LoanApplicationError::PatronNotFound)?;

    // 3. ドメイン層の純粋関数を呼び出し
    let new_loan = domain::loan::open_loan(&book, &patron, cmd.loan_date, cmd.due_date)?;

    // 4. 書籍の確保と貸出の挿入（アトミック）
    let loan = deps
        .loan_repository
        .open(new_loan)
        .await
        .map_err(|e| match e {
            StoreError::UniqueViolation(_) => LoanApplicationError::BookNotAvailable,
            StoreError::ForeignKeyViolation(_) => LoanApplicationError::PatronNotFound,
            other => LoanApplicationError::StoreError(other),
        })?;

    let Some(loan) = loan else {
        tracing::warn!(book_id = %cmd.book_id, "Book was checked out by a concurrent request");
        return Err(LoanApplicationError::BookNotAvailable);
    };

    tracing::info!(
        loan_id = %loan.id,
        book_id = %loan.book_id,
        patron_id = %loan.patron_id,
        due_date = %loan.due_date,
        status = loan.status().as_str(),
        "Loan opened"
    );
    Ok(loan)
}

/// 書籍を返却する
///
/// ビジネスルール：
/// - 貸出が存在すること
/// - 未返却であること（返却済みはAlreadyReturned）
/// - 返却日の設定と書籍のavailable = true は1トランザクションで行う
pub async fn return_loan(deps: &ServiceDependencies, cmd: ReturnLoan) -> Result<Loan> {
    // 1. 貸出を取得
    let loan = deps
        .loan_repository
        .get(cmd.loan_id)
        .await
        .map_err(LoanApplicationError::StoreError)?
        .ok_or(LoanApplicationError::LoanNotFound)?;

    // 2. ドメイン層の純粋関数を呼び出し
    let returned = domain::loan::return_loan(&loan, cmd.return_date)?;

    // 3. 返却日の設定と書籍の解放（アトミック）
    let closed = deps
        .loan_repository
        .close(cmd.loan_id, cmd.return_date)
        .await
        .map_err(LoanApplicationError::StoreError)?;

    let Some(closed) = closed else {
        tracing::warn!(loan_id = %cmd.loan_id, "Loan was returned by a concurrent request");
        return Err(LoanApplicationError::AlreadyReturned);
    };
    if closed != returned {
        tracing::warn!(
            loan_id = %closed.id,
            "Stored loan differs from the loan read before returning"
        );
    }

    tracing::info!(
        loan_id = %closed.id,
        book_id = %closed.book_id,
        return_date = %cmd.return_date,
        status = closed.status().as_str(),
        "Loan returned"
    );
    Ok(closed)
}

pub async fn get_loan(deps: &ServiceDependencies, loan_id: LoanId) -> Result<Loan> {
    deps.loan_repository
        .get(loan_id)
        .await
        .map_err(LoanApplicationError::StoreError)?
        .ok_or(LoanApplicationError::LoanNotFound)
}

pub async fn list_loans(deps: &ServiceDependencies, page: Page) -> Result<Vec<Loan>> {
    deps.loan_repository
        .list(page)
        .await
        .map_err(LoanApplicationError::StoreError)
}

/// 貸出詳細を取得する
///
/// 貸出が参照する書籍・利用者をIDで明示的に解決する。
/// 貸出履歴のある書籍・利用者は削除できないため、
/// 参照先が見つからない場合はデータ不整合として扱う。
pub async fn get_loan_details(deps: &ServiceDependencies, loan_id: LoanId) -> Result<LoanDetails> {
    let loan = get_loan(deps, loan_id).await?;

    let book = deps
        .book_repository
        .get(loan.book_id)
        .await
        .map_err(LoanApplicationError::StoreError)?
        .ok_or(LoanApplicationError::InconsistentLoan(loan_id))?;

    let patron = deps
        .patron_repository
        .get(loan.patron_id)
        .await
        .map_err(LoanApplicationError::StoreError)?
        .ok_or(LoanApplicationError::InconsistentLoan(loan_id))?;

    Ok(LoanDetails { loan, book, patron })
}

use crate::domain::{BookId, Loan, LoanId, NewLoan, Page, PatronId};
use crate::ports::loan_repository::LoanRepository as LoanRepositoryTrait;
use crate::ports::store_error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Row, postgres::PgRow};

fn map_row_to_loan(row: &PgRow) -> Loan {
    Loan {
        id: LoanId::new(row.get("id")),
        book_id: BookId::new(row.get("book_id")),
        patron_id: PatronId::new(row.get("patron_id")),
        loan_date: row.get("loan_date"),
        due_date: row.get("due_date"),
        return_date: row.get("return_date"),
    }
}

/// LoanRepositoryのPostgreSQL実装
///
/// 貸出の開始・返却は書籍行と貸出行を1トランザクションで更新する。
/// 書籍の貸出可否は条件付きUPDATEの更新行数で判定するため、
/// 同時に2つの貸出開始が成功することはない。
/// 加えてloans_one_outstanding_per_book部分一意インデックスが最終防衛線となる。
pub struct LoanRepository {
    pool: PgPool,
}

impl LoanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoanRepositoryTrait for LoanRepository {
    async fn open(&self, new_loan: NewLoan) -> Result<Option<Loan>> {
        let mut tx = self.pool.begin().await?;

        let claimed = sqlx::query(
            r#"
            UPDATE books
            SET available = FALSE
            WHERE id = $1 AND available = TRUE
            "#,
        )
        .bind(new_loan.book_id.value())
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let row = sqlx::query(
            r#"
            INSERT INTO loans (book_id, patron_id, loan_date, due_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id, book_id, patron_id, loan_date, due_date, return_date
            "#,
        )
        .bind(new_loan.book_id.value())
        .bind(new_loan.patron_id.value())
        .bind(new_loan.loan_date)
        .bind(new_loan.due_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(map_row_to_loan(&row)))
    }

    async fn close(&self, loan_id: LoanId, return_date: NaiveDate) -> Result<Option<Loan>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            UPDATE loans
            SET return_date = $2
            WHERE id = $1 AND return_date IS NULL
            RETURNING id, book_id, patron_id, loan_date, due_date, return_date
            "#,
        )
        .bind(loan_id.value())
        .bind(return_date)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };
        let loan = map_row_to_loan(&row);

        sqlx::query("UPDATE books SET available = TRUE WHERE id = $1")
            .bind(loan.book_id.value())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(loan))
    }

    async fn get(&self, loan_id: LoanId) -> Result<Option<Loan>> {
        let row = sqlx::query(
            r#"
            SELECT id, book_id, patron_id, loan_date, due_date, return_date
            FROM loans
            WHERE id = $1
            "#,
        )
        .bind(loan_id.value())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_loan))
    }

    async fn list(&self, page: Page) -> Result<Vec<Loan>> {
        let rows = sqlx::query(
            r#"
            SELECT id, book_id, patron_id, loan_date, due_date, return_date
            FROM loans
            ORDER BY id ASC
            OFFSET $1
            LIMIT $2
            "#,
        )
        .bind(page.skip())
        .bind(page.limit())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_row_to_loan).collect())
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{
    Book, BookDraft, BookId, Loan, LoanDetails, Page, PageError, Patron, PatronDraft, PatronId,
    commands::OpenLoan,
};
use crate::validation::{Validate, ValidationError, ValidationErrors, ValidationResult, rules};

// ============================================================================
// Books
// ============================================================================

/// 書籍の登録・更新リクエスト（POST /books, PUT /books/:id）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookRequest {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publication_year: i32,
    pub genre: String,
}

impl Validate for BookRequest {
    fn validate(&self) -> ValidationResult<()> {
        let mut errors = ValidationErrors::new();
        rules::text(&mut errors, "title", &self.title, 255);
        rules::text(&mut errors, "author", &self.author, 255);
        rules::text(&mut errors, "isbn", &self.isbn, 13);
        rules::range(&mut errors, "publication_year", self.publication_year, 0, 9999);
        rules::text(&mut errors, "genre", &self.genre, 100);
        errors.into_result()
    }
}

impl BookRequest {
    pub fn into_draft(self) -> BookDraft {
        BookDraft {
            title: self.title,
            author: self.author,
            isbn: self.isbn,
            publication_year: self.publication_year,
            genre: self.genre,
        }
    }
}

/// 書籍レスポンス
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookResponse {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publication_year: i32,
    pub genre: String,
    pub available: bool,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id.value(),
            title: book.title,
            author: book.author,
            isbn: book.isbn,
            publication_year: book.publication_year,
            genre: book.genre,
            available: book.available,
        }
    }
}

// ============================================================================
// Patrons
// ============================================================================

/// 利用者の登録・更新リクエスト（POST /patrons, PUT /patrons/:id）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatronRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl Validate for PatronRequest {
    fn validate(&self) -> ValidationResult<()> {
        let mut errors = ValidationErrors::new();
        rules::text(&mut errors, "name", &self.name, 255);
        rules::text(&mut errors, "email", &self.email, 255);
        if !errors.has_field("email") {
            rules::email(&mut errors, "email", &self.email);
        }
        rules::text(&mut errors, "phone", &self.phone, 20);
        rules::text(&mut errors, "address", &self.address, 255);
        errors.into_result()
    }
}

impl PatronRequest {
    pub fn into_draft(self) -> PatronDraft {
        PatronDraft {
            name: self.name,
            email: self.email,
            phone: self.phone,
            address: self.address,
        }
    }
}

/// 利用者レスポンス
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatronResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub registered_date: NaiveDate,
}

impl From<Patron> for PatronResponse {
    fn from(patron: Patron) -> Self {
        Self {
            id: patron.id.value(),
            name: patron.name,
            email: patron.email,
            phone: patron.phone,
            address: patron.address,
            registered_date: patron.registered_date,
        }
    }
}

// ============================================================================
// Loans
// ============================================================================

/// 貸出リクエスト（POST /loans）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenLoanRequest {
    pub book_id: i64,
    pub patron_id: i64,
    pub due_date: NaiveDate,
}

impl Validate for OpenLoanRequest {
    fn validate(&self) -> ValidationResult<()> {
        let mut errors = ValidationErrors::new();
        rules::positive(&mut errors, "book_id", self.book_id);
        rules::positive(&mut errors, "patron_id", self.patron_id);
        errors.into_result()
    }
}

impl OpenLoanRequest {
    /// 貸出日（通常は当日）を指定してコマンドに変換
    pub fn to_command(&self, loan_date: NaiveDate) -> OpenLoan {
        OpenLoan {
            book_id: BookId::new(self.book_id),
            patron_id: PatronId::new(self.patron_id),
            loan_date,
            due_date: self.due_date,
        }
    }
}

/// 返却リクエスト（PUT /loans/:id/return）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnLoanRequest {
    pub return_date: NaiveDate,
}

impl Validate for ReturnLoanRequest {
    /// 日付の形式はデシリアライズ時に検証済み
    fn validate(&self) -> ValidationResult<()> {
        Ok(())
    }
}

/// 貸出レスポンス（GET /loans, POST /loans, PUT /loans/:id/return）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanResponse {
    pub id: i64,
    pub book_id: i64,
    pub patron_id: i64,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
}

impl From<Loan> for LoanResponse {
    fn from(loan: Loan) -> Self {
        Self {
            id: loan.id.value(),
            book_id: loan.book_id.value(),
            patron_id: loan.patron_id.value(),
            loan_date: loan.loan_date,
            due_date: loan.due_date,
            return_date: loan.return_date,
        }
    }
}

/// 貸出詳細レスポンス（GET /loans/:id）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanDetailsResponse {
    #[serde(flatten)]
    pub loan: LoanResponse,
    pub book: BookResponse,
    pub patron: PatronResponse,
}

impl From<LoanDetails> for LoanDetailsResponse {
    fn from(details: LoanDetails) -> Self {
        Self {
            loan: details.loan.into(),
            book: details.book.into(),
            patron: details.patron.into(),
        }
    }
}

// ============================================================================
// Common
// ============================================================================

/// 一覧取得のクエリパラメータ
#[derive(Debug, Default, Deserialize)]
pub struct PaginationQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl PaginationQuery {
    /// 既定値（skip = 0, limit = 10）を補ってPageに変換
    pub fn to_page(&self) -> ValidationResult<Page> {
        let skip = self.skip.unwrap_or(0);
        let limit = self.limit.unwrap_or(Page::DEFAULT_LIMIT);

        Page::new(skip, limit).map_err(|e| match e {
            PageError::NegativeSkip => {
                ValidationErrors::single("skip", "must be greater than or equal to 0")
            }
            PageError::NonPositiveLimit => {
                ValidationErrors::single("limit", "must be greater than 0")
            }
        })
    }
}

/// GET / のレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct WelcomeResponse {
    pub message: String,
}

/// エラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationError>>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Vec<ValidationError>) -> Self {
        self.details = Some(details);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book_request() -> BookRequest {
        BookRequest {
            title: "Neuromancer".to_string(),
            author: "William Gibson".to_string(),
            isbn: "9780441569595".to_string(),
            publication_year: 1984,
            genre: "Cyberpunk".to_string(),
        }
    }

    fn patron_request() -> PatronRequest {
        PatronRequest {
            name: "Case".to_string(),
            email: "case@sprawl.example".to_string(),
            phone: "555-0142".to_string(),
            address: "Chiba City".to_string(),
        }
    }

    #[test]
    fn test_valid_book_request() {
        assert!(book_request().validate().is_ok());
    }

    #[test]
    fn test_book_request_reports_every_failing_field() {
        let request = BookRequest {
            title: " ".to_string(),
            isbn: "97804415695951".to_string(),
            publication_year: -1,
            ..book_request()
        };

        let errors = request.validate().unwrap_err();

        assert_eq!(errors.errors().len(), 3);
        assert!(errors.has_field("title"));
        assert!(errors.has_field("isbn"));
        assert!(errors.has_field("publication_year"));
    }

    #[test]
    fn test_patron_request_rejects_malformed_email() {
        let request = PatronRequest {
            email: "not-an-email".to_string(),
            ..patron_request()
        };

        let errors = request.validate().unwrap_err();
        assert_eq!(errors.errors().len(), 1);
        assert_eq!(errors.errors()[0].field, "email");
        assert_eq!(errors.errors()[0].code, "email");
    }

    #[test]
    fn test_patron_request_blank_email_reported_once() {
        let request = PatronRequest {
            email: "".to_string(),
            ..patron_request()
        };

        let errors = request.validate().unwrap_err();
        assert_eq!(errors.errors().len(), 1);
        assert_eq!(errors.errors()[0].code, "required");
    }

    #[test]
    fn test_open_loan_request_rejects_non_positive_ids() {
        let request = OpenLoanRequest {
            book_id: 0,
            patron_id: -2,
            due_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        };

        let errors = request.validate().unwrap_err();
        assert!(errors.has_field("book_id"));
        assert!(errors.has_field("patron_id"));
    }

    #[test]
    fn test_open_loan_request_deserializes_iso_date() {
        let request: OpenLoanRequest =
            serde_json::from_str(r#"{"book_id": 1, "patron_id": 2, "due_date": "2024-02-01"}"#)
                .unwrap();

        let cmd = request.to_command(NaiveDate::from_ymd_opt(2024, 1, 18).unwrap());
        assert_eq!(cmd.book_id, BookId::new(1));
        assert_eq!(cmd.patron_id, PatronId::new(2));
        assert_eq!(cmd.due_date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    }

    #[test]
    fn test_pagination_defaults() {
        let page = PaginationQuery::default().to_page().unwrap();
        assert_eq!(page.skip(), 0);
        assert_eq!(page.limit(), 10);
    }

    #[test]
    fn test_pagination_bounds() {
        let negative_skip = PaginationQuery {
            skip: Some(-1),
            limit: None,
        };
        assert!(negative_skip.to_page().unwrap_err().has_field("skip"));

        let zero_limit = PaginationQuery {
            skip: None,
            limit: Some(0),
        };
        assert!(zero_limit.to_page().unwrap_err().has_field("limit"));
    }

    #[test]
    fn test_loan_details_response_flattens_loan_fields() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let details = LoanDetails {
            loan: Loan {
                id: crate::domain::LoanId::new(3),
                book_id: BookId::new(1),
                patron_id: PatronId::new(2),
                loan_date: date,
                due_date: date,
                return_date: None,
            },
            book: book_request().into_draft().into_book(BookId::new(1)),
            patron: patron_request().into_draft().into_patron(PatronId::new(2), date),
        };

        let json = serde_json::to_value(LoanDetailsResponse::from(details)).unwrap();

        assert_eq!(json["id"], 3);
        assert_eq!(json["return_date"], serde_json::Value::Null);
        assert_eq!(json["book"]["isbn"], "9780441569595");
        assert_eq!(json["patron"]["email"], "case@sprawl.example");
    }
}

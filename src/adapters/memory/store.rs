use crate::domain::{
    Book, BookDraft, BookId, Loan, LoanId, NewLoan, Page, Patron, PatronDraft, PatronId,
};
use crate::ports::{
    BookRepository, LoanRepository, PatronRepository, StoreError, store_error::Result,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct State {
    books: BTreeMap<BookId, Book>,
    patrons: BTreeMap<PatronId, Patron>,
    loans: BTreeMap<LoanId, Loan>,
    last_book_id: i64,
    last_patron_id: i64,
    last_loan_id: i64,
}

impl State {
    fn isbn_taken(&self, isbn: &str, except: Option<BookId>) -> bool {
        self.books
            .values()
            .any(|b| b.isbn == isbn && Some(b.id) != except)
    }

    fn email_taken(&self, email: &str, except: Option<PatronId>) -> bool {
        self.patrons
            .values()
            .any(|p| p.email == email && Some(p.id) != except)
    }

    fn has_outstanding_loan(&self, book_id: BookId) -> bool {
        self.loans
            .values()
            .any(|l| l.book_id == book_id && l.is_outstanding())
    }
}

/// 書籍・利用者・貸出のインメモリ実装
///
/// 3つのリポジトリポートを1つのMutexで実装する。
/// すべての変更がロック内で完結するため、貸出の開始・返却における
/// 書籍と貸出の対更新はアトミックになる。
/// ID（1始まりの連番）とエラー（制約違反）はPostgreSQL実装と同じ振る舞いをする。
pub struct LibraryStore {
    state: Mutex<State>,
}

impl LibraryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|e| StoreError::Backend(format!("memory store poisoned: {}", e).into()))
    }
}

impl Default for LibraryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookRepository for LibraryStore {
    async fn create(&self, draft: BookDraft) -> Result<Book> {
        let mut state = self.lock()?;
        if state.isbn_taken(&draft.isbn, None) {
            return Err(StoreError::UniqueViolation("books_isbn_key".to_string()));
        }

        state.last_book_id += 1;
        let book = draft.into_book(BookId::new(state.last_book_id));
        state.books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn get(&self, book_id: BookId) -> Result<Option<Book>> {
        Ok(self.lock()?.books.get(&book_id).cloned())
    }

    async fn list(&self, page: Page) -> Result<Vec<Book>> {
        Ok(page.apply(self.lock()?.books.values().cloned()))
    }

    async fn update(&self, book_id: BookId, draft: BookDraft) -> Result<Option<Book>> {
        let mut state = self.lock()?;
        let Some(current) = state.books.get(&book_id) else {
            return Ok(None);
        };
        let updated = draft.apply_to(current);

        if state.isbn_taken(&updated.isbn, Some(book_id)) {
            return Err(StoreError::UniqueViolation("books_isbn_key".to_string()));
        }

        state.books.insert(book_id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete(&self, book_id: BookId) -> Result<bool> {
        let mut state = self.lock()?;
        if !state.books.contains_key(&book_id) {
            return Ok(false);
        }
        if state.loans.values().any(|l| l.book_id == book_id) {
            return Err(StoreError::ForeignKeyViolation("loans_book_id_fkey".to_string()));
        }

        state.books.remove(&book_id);
        Ok(true)
    }
}

#[async_trait]
impl PatronRepository for LibraryStore {
    async fn create(&self, draft: PatronDraft, registered_date: NaiveDate) -> Result<Patron> {
        let mut state = self.lock()?;
        if state.email_taken(&draft.email, None) {
            return Err(StoreError::UniqueViolation("patrons_email_key".to_string()));
        }

        state.last_patron_id += 1;
        let patron = draft.into_patron(PatronId::new(state.last_patron_id), registered_date);
        state.patrons.insert(patron.id, patron.clone());
        Ok(patron)
    }

    async fn get(&self, patron_id: PatronId) -> Result<Option<Patron>> {
        Ok(self.lock()?.patrons.get(&patron_id).cloned())
    }

    async fn list(&self, page: Page) -> Result<Vec<Patron>> {
        Ok(page.apply(self.lock()?.patrons.values().cloned()))
    }

    async fn update(&self, patron_id: PatronId, draft: PatronDraft) -> Result<Option<Patron>> {
        let mut state = self.lock()?;
        let Some(current) = state.patrons.get(&patron_id) else {
            return Ok(None);
        };
        let updated = draft.apply_to(current);

        if state.email_taken(&updated.email, Some(patron_id)) {
            return Err(StoreError::UniqueViolation("patrons_email_key".to_string()));
        }

        state.patrons.insert(patron_id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete(&self, patron_id: PatronId) -> Result<bool> {
        let mut state = self.lock()?;
        if !state.patrons.contains_key(&patron_id) {
            return Ok(false);
        }
        if state.loans.values().any(|l| l.patron_id == patron_id) {
            return Err(StoreError::ForeignKeyViolation("loans_patron_id_fkey".to_string()));
        }

        state.patrons.remove(&patron_id);
        Ok(true)
    }
}

#[async_trait]
impl LoanRepository for LibraryStore {
    async fn open(&self, new_loan: NewLoan) -> Result<Option<Loan>> {
        let mut state = self.lock()?;

        // 条件付き更新: available = true の場合のみ
        match state.books.get(&new_loan.book_id) {
            Some(book) if book.available => {}
            _ => return Ok(None),
        }
        if !state.patrons.contains_key(&new_loan.patron_id) {
            return Err(StoreError::ForeignKeyViolation("loans_patron_id_fkey".to_string()));
        }
        if state.has_outstanding_loan(new_loan.book_id) {
            return Err(StoreError::UniqueViolation(
                "loans_one_outstanding_per_book".to_string(),
            ));
        }

        if let Some(book) = state.books.get_mut(&new_loan.book_id) {
            book.available = false;
        }
        state.last_loan_id += 1;
        let loan = new_loan.into_loan(LoanId::new(state.last_loan_id));
        state.loans.insert(loan.id, loan.clone());
        Ok(Some(loan))
    }

    async fn close(&self, loan_id: LoanId, return_date: NaiveDate) -> Result<Option<Loan>> {
        let mut state = self.lock()?;

        let Some(loan) = state.loans.get_mut(&loan_id) else {
            return Ok(None);
        };
        if !loan.is_outstanding() {
            return Ok(None);
        }
        loan.return_date = Some(return_date);
        let closed = loan.clone();

        if let Some(book) = state.books.get_mut(&closed.book_id) {
            book.available = true;
        }
        Ok(Some(closed))
    }

    async fn get(&self, loan_id: LoanId) -> Result<Option<Loan>> {
        Ok(self.lock()?.loans.get(&loan_id).cloned())
    }

    async fn list(&self, page: Page) -> Result<Vec<Loan>> {
        Ok(page.apply(self.lock()?.loans.values().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn book_draft(isbn: &str) -> BookDraft {
        BookDraft {
            title: "Snow Crash".to_string(),
            author: "Neal Stephenson".to_string(),
            isbn: isbn.to_string(),
            publication_year: 1992,
            genre: "Cyberpunk".to_string(),
        }
    }

    fn patron_draft(email: &str) -> PatronDraft {
        PatronDraft {
            name: "Hiro Protagonist".to_string(),
            email: email.to_string(),
            phone: "555-0199".to_string(),
            address: "Storage unit 14".to_string(),
        }
    }

    async fn register(store: &LibraryStore, email: &str) -> Patron {
        PatronRepository::create(store, patron_draft(email), date(2024, 1, 1))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_ids_are_sequential_from_one() {
        let store = LibraryStore::new();
        let first = BookRepository::create(&store, book_draft("1")).await.unwrap();
        let second = BookRepository::create(&store, book_draft("2")).await.unwrap();

        assert_eq!(first.id.value(), 1);
        assert_eq!(second.id.value(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_isbn_is_unique_violation() {
        let store = LibraryStore::new();
        BookRepository::create(&store, book_draft("9780553380958"))
            .await
            .unwrap();

        let result = BookRepository::create(&store, book_draft("9780553380958")).await;
        assert!(matches!(result, Err(StoreError::UniqueViolation(_))));

        let books = BookRepository::list(&store, Page::default()).await.unwrap();
        assert_eq!(books.len(), 1);
    }

    #[tokio::test]
    async fn test_update_to_own_email_is_allowed() {
        let store = LibraryStore::new();
        let patron = register(&store, "hiro@example.com").await;

        let updated = PatronRepository::update(
            &store,
            patron.id,
            PatronDraft {
                phone: "555-0200".to_string(),
                ..patron_draft("hiro@example.com")
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(updated.phone, "555-0200");
        assert_eq!(updated.registered_date, date(2024, 1, 1));
    }

    #[tokio::test]
    async fn test_open_on_missing_book_returns_none() {
        let store = LibraryStore::new();
        let patron = register(&store, "y.t@example.com").await;

        let result = store
            .open(NewLoan {
                book_id: BookId::new(404),
                patron_id: patron.id,
                loan_date: date(2024, 1, 2),
                due_date: date(2024, 1, 16),
            })
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_open_and_close_flip_availability() {
        let store = LibraryStore::new();
        let book = BookRepository::create(&store, book_draft("1")).await.unwrap();
        let patron = register(&store, "a@example.com").await;

        let loan = store
            .open(NewLoan {
                book_id: book.id,
                patron_id: patron.id,
                loan_date: date(2024, 1, 2),
                due_date: date(2024, 1, 16),
            })
            .await
            .unwrap()
            .unwrap();
        let stored = BookRepository::get(&store, book.id).await.unwrap().unwrap();
        assert!(!stored.available);

        let closed = store.close(loan.id, date(2024, 1, 10)).await.unwrap().unwrap();
        assert_eq!(closed.return_date, Some(date(2024, 1, 10)));
        let stored = BookRepository::get(&store, book.id).await.unwrap().unwrap();
        assert!(stored.available);

        // 2回目の返却は何も変更しない
        assert!(store.close(loan.id, date(2024, 1, 11)).await.unwrap().is_none());
        let reloaded = LoanRepository::get(&store, loan.id).await.unwrap().unwrap();
        assert_eq!(reloaded.return_date, Some(date(2024, 1, 10)));
    }

    #[tokio::test]
    async fn test_delete_book_with_history_is_rejected() {
        let store = LibraryStore::new();
        let book = BookRepository::create(&store, book_draft("1")).await.unwrap();
        let patron = register(&store, "a@example.com").await;
        store
            .open(NewLoan {
                book_id: book.id,
                patron_id: patron.id,
                loan_date: date(2024, 1, 2),
                due_date: date(2024, 1, 16),
            })
            .await
            .unwrap();

        let result = BookRepository::delete(&store, book.id).await;
        assert!(matches!(result, Err(StoreError::ForeignKeyViolation(_))));

        let result = PatronRepository::delete(&store, patron.id).await;
        assert!(matches!(result, Err(StoreError::ForeignKeyViolation(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_returns_false() {
        let store = LibraryStore::new();
        assert!(!BookRepository::delete(&store, BookId::new(1)).await.unwrap());
        assert!(!PatronRepository::delete(&store, PatronId::new(1)).await.unwrap());
    }
}

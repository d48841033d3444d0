use async_trait::async_trait;
use chrono::NaiveDate;
use common::{book_draft, date, patron_draft};
use rusty_library_records::adapters::memory;
use rusty_library_records::application::{
    ServiceDependencies,
    catalog::{self, CatalogApplicationError},
    loan::{self, LoanApplicationError},
};
use rusty_library_records::domain::{commands::*, loan::is_availability_consistent, *};
use rusty_library_records::ports::{LoanRepository, StoreError, store_error};
use std::sync::Arc;

mod common;

// ============================================================================
// ヘルパー
// ============================================================================

fn all() -> Page {
    Page::new(0, 1_000).unwrap()
}

/// すべての書籍について available == false ⇔ 未返却の貸出あり を確認する
async fn assert_availability_invariant(deps: &ServiceDependencies) {
    let books = catalog::list_books(deps, all()).await.unwrap();
    let loans = loan::list_loans(deps, all()).await.unwrap();

    for book in &books {
        assert!(
            is_availability_consistent(book, &loans),
            "book {} availability disagrees with its loans",
            book.id
        );
    }
}

async fn setup() -> (ServiceDependencies, Book, Patron) {
    let deps = memory::service_dependencies();
    let book = catalog::create_book(&deps, book_draft("9780547773742"))
        .await
        .unwrap();
    let patron = catalog::create_patron(&deps, patron_draft("ged@roke.example"), date(2024, 1, 1))
        .await
        .unwrap();
    (deps, book, patron)
}

fn open_cmd(book: &Book, patron: &Patron) -> OpenLoan {
    OpenLoan {
        book_id: book.id,
        patron_id: patron.id,
        loan_date: date(2024, 1, 2),
        due_date: date(2024, 1, 16),
    }
}

// ============================================================================
// 貸出ライフサイクル
// ============================================================================

#[tokio::test]
async fn test_full_lifecycle_keeps_availability_consistent() {
    let (deps, book, patron) = setup().await;
    assert!(book.available);

    // 貸出
    let first = loan::open_loan(&deps, open_cmd(&book, &patron)).await.unwrap();
    assert_eq!(first.return_date, None);
    assert_eq!(first.loan_date, date(2024, 1, 2));
    assert!(!catalog::get_book(&deps, book.id).await.unwrap().available);
    assert_availability_invariant(&deps).await;

    // 貸出中の書籍は貸し出せない
    let result = loan::open_loan(&deps, open_cmd(&book, &patron)).await;
    assert!(matches!(result, Err(LoanApplicationError::BookNotAvailable)));
    assert_eq!(loan::list_loans(&deps, all()).await.unwrap().len(), 1);
    assert_availability_invariant(&deps).await;

    // 返却
    let returned = loan::return_loan(
        &deps,
        ReturnLoan {
            loan_id: first.id,
            return_date: date(2024, 1, 10),
        },
    )
    .await
    .unwrap();
    assert_eq!(returned.return_date, Some(date(2024, 1, 10)));
    assert!(catalog::get_book(&deps, book.id).await.unwrap().available);
    assert_availability_invariant(&deps).await;

    // 再び貸出可能
    let second = loan::open_loan(&deps, open_cmd(&book, &patron)).await.unwrap();
    assert_ne!(second.id, first.id);
    assert_availability_invariant(&deps).await;
}

#[tokio::test]
async fn test_open_loan_on_missing_book_is_not_available() {
    let (deps, _, patron) = setup().await;

    let result = loan::open_loan(
        &deps,
        OpenLoan {
            book_id: BookId::new(999),
            patron_id: patron.id,
            loan_date: date(2024, 1, 2),
            due_date: date(2024, 1, 16),
        },
    )
    .await;

    assert!(matches!(result, Err(LoanApplicationError::BookNotAvailable)));
}

#[tokio::test]
async fn test_open_loan_for_missing_patron_mutates_nothing() {
    let (deps, book, _) = setup().await;

    let result = loan::open_loan(
        &deps,
        OpenLoan {
            book_id: book.id,
            patron_id: PatronId::new(999),
            loan_date: date(2024, 1, 2),
            due_date: date(2024, 1, 16),
        },
    )
    .await;

    assert!(matches!(result, Err(LoanApplicationError::PatronNotFound)));
    assert!(catalog::get_book(&deps, book.id).await.unwrap().available);
    assert!(loan::list_loans(&deps, all()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_return_twice_fails_with_already_returned() {
    let (deps, book, patron) = setup().await;
    let opened = loan::open_loan(&deps, open_cmd(&book, &patron)).await.unwrap();

    let cmd = ReturnLoan {
        loan_id: opened.id,
        return_date: date(2024, 1, 10),
    };
    loan::return_loan(&deps, cmd.clone()).await.unwrap();

    // 新しい貸出で再び貸出中になった書籍が、古い貸出の2回目の返却で解放されないこと
    let reopened = loan::open_loan(&deps, open_cmd(&book, &patron)).await.unwrap();

    let result = loan::return_loan(
        &deps,
        ReturnLoan {
            return_date: date(2024, 1, 12),
            ..cmd
        },
    )
    .await;

    assert!(matches!(result, Err(LoanApplicationError::AlreadyReturned)));
    assert!(!catalog::get_book(&deps, book.id).await.unwrap().available);

    let first = loan::get_loan(&deps, opened.id).await.unwrap();
    assert_eq!(first.return_date, Some(date(2024, 1, 10)));
    assert!(loan::get_loan(&deps, reopened.id).await.unwrap().is_outstanding());
    assert_availability_invariant(&deps).await;
}

#[tokio::test]
async fn test_return_unknown_loan_is_not_found() {
    let (deps, _, _) = setup().await;

    let result = loan::return_loan(
        &deps,
        ReturnLoan {
            loan_id: LoanId::new(42),
            return_date: date(2024, 1, 10),
        },
    )
    .await;

    assert!(matches!(result, Err(LoanApplicationError::LoanNotFound)));
}

#[tokio::test]
async fn test_concurrent_opens_on_same_book_succeed_once() {
    let (deps, book, patron) = setup().await;

    let mut handles = Vec::new();
    for _ in 0..16 {
        let deps = deps.clone();
        let cmd = open_cmd(&book, &patron);
        handles.push(tokio::spawn(async move {
            loan::open_loan(&deps, cmd).await
        }));
    }

    let mut succeeded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(LoanApplicationError::BookNotAvailable) => {}
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(succeeded, 1);
    assert_eq!(loan::list_loans(&deps, all()).await.unwrap().len(), 1);
    assert_availability_invariant(&deps).await;
}

#[tokio::test]
async fn test_loan_details_resolves_book_and_patron() {
    let (deps, book, patron) = setup().await;
    let opened = loan::open_loan(&deps, open_cmd(&book, &patron)).await.unwrap();

    let details = loan::get_loan_details(&deps, opened.id).await.unwrap();

    assert_eq!(details.loan, opened);
    assert_eq!(details.book.id, book.id);
    assert!(!details.book.available);
    assert_eq!(details.patron, patron);
}

// ============================================================================
// 蔵書・利用者
// ============================================================================

#[tokio::test]
async fn test_list_respects_skip_and_limit() {
    let deps = memory::service_dependencies();
    for i in 0..15 {
        catalog::create_book(&deps, book_draft(&format!("isbn-{:02}", i)))
            .await
            .unwrap();
    }

    let page = catalog::list_books(&deps, Page::new(10, 10).unwrap())
        .await
        .unwrap();

    assert_eq!(page.len(), 5);
    assert_eq!(page[0].isbn, "isbn-10");
    assert_eq!(page[4].isbn, "isbn-14");
}

#[tokio::test]
async fn test_duplicate_isbn_conflicts_without_insert() {
    let (deps, _, _) = setup().await;

    let result = catalog::create_book(&deps, book_draft("9780547773742")).await;

    assert!(matches!(result, Err(CatalogApplicationError::Conflict(_))));
    assert_eq!(catalog::list_books(&deps, all()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_duplicate_email_conflicts_on_update() {
    let (deps, _, patron) = setup().await;
    let other = catalog::create_patron(&deps, patron_draft("tenar@atuan.example"), date(2024, 1, 3))
        .await
        .unwrap();

    let result = catalog::update_patron(&deps, other.id, patron_draft(&patron.email)).await;

    assert!(matches!(result, Err(CatalogApplicationError::Conflict(_))));
}

#[tokio::test]
async fn test_update_book_does_not_touch_availability() {
    let (deps, book, patron) = setup().await;
    loan::open_loan(&deps, open_cmd(&book, &patron)).await.unwrap();

    let updated = catalog::update_book(
        &deps,
        book.id,
        BookDraft {
            title: "The Tombs of Atuan".to_string(),
            ..book_draft("9780547773742")
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.title, "The Tombs of Atuan");
    assert!(!updated.available);
    assert_availability_invariant(&deps).await;
}

#[tokio::test]
async fn test_delete_with_loan_history_conflicts() {
    let (deps, book, patron) = setup().await;
    let opened = loan::open_loan(&deps, open_cmd(&book, &patron)).await.unwrap();
    loan::return_loan(
        &deps,
        ReturnLoan {
            loan_id: opened.id,
            return_date: date(2024, 1, 5),
        },
    )
    .await
    .unwrap();

    let result = catalog::delete_book(&deps, book.id).await;
    assert!(matches!(result, Err(CatalogApplicationError::Conflict(_))));

    let result = catalog::delete_patron(&deps, patron.id).await;
    assert!(matches!(result, Err(CatalogApplicationError::Conflict(_))));

    // 履歴は残っている
    assert!(loan::get_loan_details(&deps, opened.id).await.is_ok());
}

#[tokio::test]
async fn test_delete_then_get_is_not_found() {
    let (deps, book, patron) = setup().await;

    catalog::delete_book(&deps, book.id).await.unwrap();
    catalog::delete_patron(&deps, patron.id).await.unwrap();

    assert!(matches!(
        catalog::get_book(&deps, book.id).await,
        Err(CatalogApplicationError::BookNotFound)
    ));
    assert!(matches!(
        catalog::delete_patron(&deps, patron.id).await,
        Err(CatalogApplicationError::PatronNotFound)
    ));
}

// ============================================================================
// ストア障害
// ============================================================================

/// 常に接続エラーを返すLoanRepository
struct UnreachableLoanRepository;

fn unreachable_error() -> StoreError {
    StoreError::Backend("connection refused".into())
}

#[async_trait]
impl LoanRepository for UnreachableLoanRepository {
    async fn open(&self, _new_loan: NewLoan) -> store_error::Result<Option<Loan>> {
        Err(unreachable_error())
    }

    async fn close(
        &self,
        _loan_id: LoanId,
        _return_date: NaiveDate,
    ) -> store_error::Result<Option<Loan>> {
        Err(unreachable_error())
    }

    async fn get(&self, _loan_id: LoanId) -> store_error::Result<Option<Loan>> {
        Err(unreachable_error())
    }

    async fn list(&self, _page: Page) -> store_error::Result<Vec<Loan>> {
        Err(unreachable_error())
    }
}

#[tokio::test]
async fn test_store_failures_propagate_as_store_error() {
    let (deps, book, patron) = setup().await;
    let deps = ServiceDependencies {
        loan_repository: Arc::new(UnreachableLoanRepository),
        ..deps
    };

    let result = loan::open_loan(&deps, open_cmd(&book, &patron)).await;
    assert!(matches!(result, Err(LoanApplicationError::StoreError(_))));

    let result = loan::return_loan(
        &deps,
        ReturnLoan {
            loan_id: LoanId::new(1),
            return_date: date(2024, 1, 10),
        },
    )
    .await;
    assert!(matches!(result, Err(LoanApplicationError::StoreError(_))));
}

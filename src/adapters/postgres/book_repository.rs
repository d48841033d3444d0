use crate::domain::{Book, BookDraft, BookId, Page};
use crate::ports::book_repository::BookRepository as BookRepositoryTrait;
use crate::ports::store_error::Result;
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

/// PostgreSQLの行データをBookに変換する
fn map_row_to_book(row: &PgRow) -> Book {
    Book {
        id: BookId::new(row.get("id")),
        title: row.get("title"),
        author: row.get("author"),
        isbn: row.get("isbn"),
        publication_year: row.get("publication_year"),
        genre: row.get("genre"),
        available: row.get("available"),
    }
}

/// BookRepositoryのPostgreSQL実装
pub struct BookRepository {
    pool: PgPool,
}

impl BookRepository {
    /// PostgreSQLコネクションプールから新しいBookRepositoryを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepositoryTrait for BookRepository {
    async fn create(&self, draft: BookDraft) -> Result<Book> {
        let row = sqlx::query(
            r#"
            INSERT INTO books (title, author, isbn, publication_year, genre)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, author, isbn, publication_year, genre, available
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.author)
        .bind(&draft.isbn)
        .bind(draft.publication_year)
        .bind(&draft.genre)
        .fetch_one(&self.pool)
        .await?;

        Ok(map_row_to_book(&row))
    }

    async fn get(&self, book_id: BookId) -> Result<Option<Book>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, author, isbn, publication_year, genre, available
            FROM books
            WHERE id = $1
            "#,
        )
        .bind(book_id.value())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_book))
    }

    /// ID昇順（登録順）でOFFSET/LIMITを適用する
    async fn list(&self, page: Page) -> Result<Vec<Book>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, author, isbn, publication_year, genre, available
            FROM books
            ORDER BY id ASC
            OFFSET $1
            LIMIT $2
            "#,
        )
        .bind(page.skip())
        .bind(page.limit())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_row_to_book).collect())
    }

    async fn update(&self, book_id: BookId, draft: BookDraft) -> Result<Option<Book>> {
        let row = sqlx::query(
            r#"
            UPDATE books
            SET title = $2,
                author = $3,
                isbn = $4,
                publication_year = $5,
                genre = $6
            WHERE id = $1
            RETURNING id, title, author, isbn, publication_year, genre, available
            "#,
        )
        .bind(book_id.value())
        .bind(&draft.title)
        .bind(&draft.author)
        .bind(&draft.isbn)
        .bind(draft.publication_year)
        .bind(&draft.genre)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_book))
    }

    /// 貸出履歴がある場合はloans.book_idの外部キー（ON DELETE RESTRICT）で失敗する
    async fn delete(&self, book_id: BookId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(book_id.value())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

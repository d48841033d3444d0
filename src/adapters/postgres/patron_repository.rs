use crate::domain::{Page, Patron, PatronDraft, PatronId};
use crate::ports::patron_repository::PatronRepository as PatronRepositoryTrait;
use crate::ports::store_error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Row, postgres::PgRow};

fn map_row_to_patron(row: &PgRow) -> Patron {
    Patron {
        id: PatronId::new(row.get("id")),
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        address: row.get("address"),
        registered_date: row.get("registered_date"),
    }
}

/// PatronRepositoryのPostgreSQL実装
pub struct PatronRepository {
    pool: PgPool,
}

impl PatronRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PatronRepositoryTrait for PatronRepository {
    async fn create(&self, draft: PatronDraft, registered_date: NaiveDate) -> Result<Patron> {
        let row = sqlx::query(
            r#"
            INSERT INTO patrons (name, email, phone, address, registered_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, phone, address, registered_date
            "#,
        )
        .bind(&draft.name)
        .bind(&draft.email)
        .bind(&draft.phone)
        .bind(&draft.address)
        .bind(registered_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(map_row_to_patron(&row))
    }

    async fn get(&self, patron_id: PatronId) -> Result<Option<Patron>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, phone, address, registered_date
            FROM patrons
            WHERE id = $1
            "#,
        )
        .bind(patron_id.value())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_patron))
    }

    async fn list(&self, page: Page) -> Result<Vec<Patron>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, email, phone, address, registered_date
            FROM patrons
            ORDER BY id ASC
            OFFSET $1
            LIMIT $2
            "#,
        )
        .bind(page.skip())
        .bind(page.limit())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_row_to_patron).collect())
    }

    async fn update(&self, patron_id: PatronId, draft: PatronDraft) -> Result<Option<Patron>> {
        let row = sqlx::query(
            r#"
            UPDATE patrons
            SET name = $2,
                email = $3,
                phone = $4,
                address = $5
            WHERE id = $1
            RETURNING id, name, email, phone, address, registered_date
            "#,
        )
        .bind(patron_id.value())
        .bind(&draft.name)
        .bind(&draft.email)
        .bind(&draft.phone)
        .bind(&draft.address)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_patron))
    }

    async fn delete(&self, patron_id: PatronId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM patrons WHERE id = $1")
            .bind(patron_id.value())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

use async_trait::async_trait;
use book_search_shared::{BookRecord, NewBook};
use sqlx::postgres::PgPoolOptions;
use tracing::{debug, info};

use super::BookStore;
use crate::errors::StoreError;

/// Postgres error code for a unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(sqlx::FromRow)]
struct BookRow {
    id: i64,
    title: String,
    author: String,
    description: String,
    isbn: String,
    price: f64,
}

impl From<BookRow> for BookRecord {
    fn from(row: BookRow) -> Self {
        BookRecord {
            id: row.id,
            title: row.title,
            author: row.author,
            description: row.description,
            isbn: row.isbn,
            price: row.price,
        }
    }
}

/// `BookStore` backed by a Postgres `books` table.
pub struct PostgresBookStore {
    pool: sqlx::PgPool,
}

impl PostgresBookStore {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self::new(pool))
    }

    /// Apply the schema in `migrations/`.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Book store schema is up to date");
        Ok(())
    }
}

#[async_trait]
impl BookStore for PostgresBookStore {
    async fn insert_book(&self, book: &NewBook) -> Result<BookRecord, StoreError> {
        let row: BookRow = sqlx::query_as(
            "INSERT INTO books (title, author, description, isbn, price) \
             VALUES ($1, $2, $3, $4, CAST($5 AS DOUBLE PRECISION)) \
             RETURNING id, title, author, description, isbn, price::DOUBLE PRECISION AS price",
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.description)
        .bind(&book.isbn)
        .bind(book.price)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let duplicate = matches!(
                &e,
                sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION)
            );
            if duplicate {
                StoreError::DuplicateIsbn(book.isbn.clone())
            } else {
                StoreError::DatabaseError(e)
            }
        })?;

        debug!(book_id = row.id, "Inserted book");
        Ok(row.into())
    }

    async fn books_after(
        &self,
        after_id: Option<i64>,
        limit: usize,
    ) -> Result<Vec<BookRecord>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<BookRow> = sqlx::query_as(
            "SELECT id, title, author, description, isbn, price::DOUBLE PRECISION AS price \
             FROM books \
             WHERE id > $1 \
             ORDER BY id \
             LIMIT $2",
        )
        .bind(after_id.unwrap_or(0))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(BookRecord::from).collect())
    }
}

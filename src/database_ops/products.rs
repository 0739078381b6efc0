//! Product table access and the batch upsert.
//!
//! Each `upsert` call runs inside one transaction: look up every incoming id,
//! update the mutable columns of rows that exist, insert the rest, commit once.
//! A failure anywhere rolls the whole batch back.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, SqlitePool};
use tracing::debug;

use crate::models::Product;

#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Create the `Product` table when absent. Existing schemas are left untouched.
    async fn ensure_schema(&self) -> Result<()>;

    /// Insert-or-update keyed by id; returns the number of entities touched.
    async fn upsert(&self, batch: &[Product]) -> Result<usize>;

    async fn get(&self, id: &str) -> Result<Option<Product>>;

    async fn count(&self) -> Result<i64>;

    /// Row counts per category, sorted by category.
    async fn category_counts(&self) -> Result<Vec<(String, i64)>>;
}

/// Statements for one backend. Only the DDL and placeholder style differ;
/// bind order is identical so both backends share `upsert_batch!`.
struct ProductSql {
    create: &'static str,
    select_id: &'static str,
    update: &'static str,
    insert: &'static str,
    get: &'static str,
}

const COUNT_SQL: &str = r#"SELECT COUNT(*) FROM "Product""#;
const CATEGORY_COUNTS_SQL: &str =
    r#"SELECT category, COUNT(*) FROM "Product" GROUP BY category ORDER BY category"#;

const PG_SQL: ProductSql = ProductSql {
    create: r#"CREATE TABLE IF NOT EXISTS "Product" (
    id VARCHAR(191) PRIMARY KEY,
    title VARCHAR(255) NOT NULL,
    description TEXT,
    price BIGINT NOT NULL DEFAULT 0,
    "originalPrice" BIGINT,
    image VARCHAR(512),
    category VARCHAR(100) NOT NULL,
    rating DOUBLE PRECISION NOT NULL DEFAULT 0,
    "isNew" BOOLEAN NOT NULL DEFAULT FALSE,
    "createdAt" TIMESTAMPTZ NOT NULL DEFAULT now(),
    "updatedAt" TIMESTAMPTZ NOT NULL DEFAULT now()
)"#,
    select_id: r#"SELECT id FROM "Product" WHERE id = $1"#,
    update: r#"UPDATE "Product" SET title = $1, description = $2, price = $3,
       "originalPrice" = $4, image = $5, category = $6, rating = $7,
       "isNew" = $8, "updatedAt" = $9
     WHERE id = $10"#,
    insert: r#"INSERT INTO "Product" (id, title, description, price, "originalPrice",
       image, category, rating, "isNew", "createdAt", "updatedAt")
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"#,
    get: r#"SELECT id, title, description, price, "originalPrice", image, category, rating,
       "isNew", "createdAt", "updatedAt" FROM "Product" WHERE id = $1"#,
};

const SQLITE_SQL: ProductSql = ProductSql {
    create: r#"CREATE TABLE IF NOT EXISTS "Product" (
    id TEXT PRIMARY KEY NOT NULL,
    title TEXT NOT NULL,
    description TEXT,
    price INTEGER NOT NULL DEFAULT 0,
    "originalPrice" INTEGER,
    image TEXT,
    category TEXT NOT NULL,
    rating REAL NOT NULL DEFAULT 0,
    "isNew" BOOLEAN NOT NULL DEFAULT 0,
    "createdAt" TEXT NOT NULL,
    "updatedAt" TEXT NOT NULL
)"#,
    select_id: r#"SELECT id FROM "Product" WHERE id = ?"#,
    update: r#"UPDATE "Product" SET title = ?, description = ?, price = ?,
       "originalPrice" = ?, image = ?, category = ?, rating = ?,
       "isNew" = ?, "updatedAt" = ?
     WHERE id = ?"#,
    insert: r#"INSERT INTO "Product" (id, title, description, price, "originalPrice",
       image, category, rating, "isNew", "createdAt", "updatedAt")
     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
    get: r#"SELECT id, title, description, price, "originalPrice", image, category, rating,
       "isNew", "createdAt", "updatedAt" FROM "Product" WHERE id = ?"#,
};

/// Read-then-write upsert of `$batch` inside one transaction on `$pool`.
/// Expands per backend because sqlx executors are typed by database.
macro_rules! upsert_batch {
    ($pool:expr, $sql:expr, $batch:expr) => {{
        let mut tx = $pool.begin().await?;
        let mut touched = 0usize;
        for incoming in $batch {
            let existing: Option<String> = sqlx::query_scalar($sql.select_id)
                .persistent(false)
                .bind(&incoming.id)
                .fetch_optional(&mut *tx)
                .await?;
            if existing.is_some() {
                sqlx::query($sql.update)
                    .persistent(false)
                    .bind(&incoming.title)
                    .bind(&incoming.description)
                    .bind(incoming.price)
                    .bind(incoming.original_price)
                    .bind(&incoming.image)
                    .bind(&incoming.category)
                    .bind(incoming.rating)
                    .bind(incoming.is_new)
                    .bind(Utc::now())
                    .bind(&incoming.id)
                    .execute(&mut *tx)
                    .await?;
                debug!(product_id = %incoming.id, "product updated");
            } else {
                sqlx::query($sql.insert)
                    .persistent(false)
                    .bind(&incoming.id)
                    .bind(&incoming.title)
                    .bind(&incoming.description)
                    .bind(incoming.price)
                    .bind(incoming.original_price)
                    .bind(&incoming.image)
                    .bind(&incoming.category)
                    .bind(incoming.rating)
                    .bind(incoming.is_new)
                    .bind(incoming.created_at)
                    .bind(incoming.updated_at)
                    .execute(&mut *tx)
                    .await?;
                debug!(product_id = %incoming.id, "product inserted");
            }
            touched += 1;
        }
        tx.commit().await?;
        Ok(touched)
    }};
}

/// Implements `ProductRepository` for a pool-backed repository type.
macro_rules! impl_product_repository {
    ($ty:ty, $sql:expr) => {
        #[async_trait]
        impl ProductRepository for $ty {
            async fn ensure_schema(&self) -> Result<()> {
                sqlx::raw_sql($sql.create).execute(&self.pool).await?;
                Ok(())
            }

            async fn upsert(&self, batch: &[Product]) -> Result<usize> {
                upsert_batch!(self.pool, $sql, batch)
            }

            async fn get(&self, id: &str) -> Result<Option<Product>> {
                let row = sqlx::query_as::<_, Product>($sql.get)
                    .persistent(false)
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?;
                Ok(row)
            }

            async fn count(&self) -> Result<i64> {
                let n: i64 = sqlx::query_scalar(COUNT_SQL)
                    .persistent(false)
                    .fetch_one(&self.pool)
                    .await?;
                Ok(n)
            }

            async fn category_counts(&self) -> Result<Vec<(String, i64)>> {
                let rows = sqlx::query_as::<_, (String, i64)>(CATEGORY_COUNTS_SQL)
                    .persistent(false)
                    .fetch_all(&self.pool)
                    .await?;
                Ok(rows)
            }
        }
    };
}

pub struct PgProducts {
    pool: PgPool,
}

impl PgProducts {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl_product_repository!(PgProducts, PG_SQL);

pub struct SqliteProducts {
    pool: SqlitePool,
}

impl SqliteProducts {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl_product_repository!(SqliteProducts, SQLITE_SQL);

/// Fresh in-memory SQLite repository with the schema in place.
#[cfg(test)]
pub(crate) async fn memory_products() -> SqliteProducts {
    // A single connection keeps every query on the same in-memory database.
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    let repo = SqliteProducts::new(pool);
    repo.ensure_schema().await.expect("schema");
    repo
}

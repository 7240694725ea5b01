use crate::error::{AppError, AppResult};
use crate::models::{UrlRecord, ValidSlug, ValidUrl};
use crate::pool::PoolManager;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::debug;

/// Sample rows inserted in the `dev` environment
pub const DEV_SEED_RECORDS: &[(&str, &str)] = &[
    ("aY2Pv8", "https://www.google.com/"),
    ("Lt1fov", "https://www.youtube.com/"),
];

/// Persistence operations behind the slug lifecycle.
///
/// Every method is a single atomic unit of work. Lookups only ever return
/// live records; [`UrlStore::exists`] is the one query that also sees expired
/// rows, so a slug is never handed out twice.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlStore: Send + Sync {
    /// Live record for `slug`, if any
    async fn find_by_slug(&self, slug: &ValidSlug) -> AppResult<Option<UrlRecord>>;

    /// Live record already pointing at `url`, if any
    async fn find_by_original_url(&self, url: &ValidUrl) -> AppResult<Option<UrlRecord>>;

    /// Whether `slug` was ever issued, expired or not
    async fn exists(&self, slug: &str) -> AppResult<bool>;

    /// Add one click; a missing row is not an error
    async fn increment_click_count(&self, slug: &ValidSlug) -> AppResult<()>;

    /// Insert a fresh record expiring one TTL from now.
    ///
    /// # Errors
    ///
    /// Returns `AppError::DuplicateSlug` if the slug is already taken.
    async fn create(&self, url: &ValidUrl, slug: &str) -> AppResult<UrlRecord>;
}

/// PostgreSQL-backed [`UrlStore`]
#[derive(Clone)]
pub struct PgUrlStore {
    pool: Arc<PoolManager>,
    ttl: Duration,
}

impl PgUrlStore {
    pub fn new(pool: Arc<PoolManager>, ttl: Duration) -> Self {
        Self { pool, ttl }
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> AppResult<()> {
        let pool = self.pool.pool().await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(())
    }

    /// Insert fixed slug/URL pairs, skipping slugs that already exist.
    ///
    /// Returns the number of rows actually inserted.
    pub async fn seed(&self, records: &[(&str, &str)]) -> AppResult<u64> {
        let rows: Vec<(String, String)> = records
            .iter()
            .map(|(slug, url)| (slug.to_string(), url.to_string()))
            .collect();
        let now = Utc::now();
        let expires_at = now + self.ttl;

        self.pool
            .with_transaction(move |conn| {
                Box::pin(async move {
                    let mut inserted = 0;
                    for (slug, url) in rows {
                        let result = sqlx::query(
                            r#"
                            INSERT INTO urls (slug, original_url, created_at, expires_at, click_count)
                            VALUES ($1, $2, $3, $4, 0)
                            ON CONFLICT (slug) DO NOTHING
                            "#,
                        )
                        .bind(slug)
                        .bind(url)
                        .bind(now)
                        .bind(expires_at)
                        .execute(&mut *conn)
                        .await?;
                        inserted += result.rows_affected();
                    }
                    Ok(inserted)
                })
            })
            .await
    }

    /// Delete every expired row.
    ///
    /// Lookups already ignore these rows; deleting them makes their slugs
    /// available to the generator again.
    pub async fn purge_expired(&self) -> AppResult<u64> {
        let now = Utc::now();

        self.pool
            .with_transaction(move |conn| {
                Box::pin(async move {
                    let result = sqlx::query(
                        r#"
                        DELETE FROM urls WHERE expires_at <= $1
                        "#,
                    )
                    .bind(now)
                    .execute(&mut *conn)
                    .await?;
                    Ok(result.rows_affected())
                })
            })
            .await
    }
}

#[async_trait]
impl UrlStore for PgUrlStore {
    async fn find_by_slug(&self, slug: &ValidSlug) -> AppResult<Option<UrlRecord>> {
        let slug = slug.as_str().to_owned();
        let now = Utc::now();

        self.pool
            .with_transaction(move |conn| {
                Box::pin(async move {
                    let record = sqlx::query_as::<_, UrlRecord>(
                        r#"
                        SELECT slug, original_url, created_at, expires_at, click_count
                        FROM urls
                        WHERE slug = $1 AND expires_at > $2
                        "#,
                    )
                    .bind(slug)
                    .bind(now)
                    .fetch_optional(&mut *conn)
                    .await?;
                    Ok(record)
                })
            })
            .await
    }

    async fn find_by_original_url(&self, url: &ValidUrl) -> AppResult<Option<UrlRecord>> {
        let url = url.as_str().to_owned();
        let now = Utc::now();

        self.pool
            .with_transaction(move |conn| {
                Box::pin(async move {
                    let record = sqlx::query_as::<_, UrlRecord>(
                        r#"
                        SELECT slug, original_url, created_at, expires_at, click_count
                        FROM urls
                        WHERE original_url = $1 AND expires_at > $2
                        ORDER BY created_at, slug
                        LIMIT 1
                        "#,
                    )
                    .bind(url)
                    .bind(now)
                    .fetch_optional(&mut *conn)
                    .await?;
                    Ok(record)
                })
            })
            .await
    }

    async fn exists(&self, slug: &str) -> AppResult<bool> {
        let slug = slug.to_owned();

        self.pool
            .with_transaction(move |conn| {
                Box::pin(async move {
                    let found = sqlx::query_scalar::<_, bool>(
                        r#"
                        SELECT EXISTS(SELECT 1 FROM urls WHERE slug = $1)
                        "#,
                    )
                    .bind(slug)
                    .fetch_one(&mut *conn)
                    .await?;
                    Ok(found)
                })
            })
            .await
    }

    async fn increment_click_count(&self, slug: &ValidSlug) -> AppResult<()> {
        let slug = slug.as_str().to_owned();

        self.pool
            .with_transaction(move |conn| {
                Box::pin(async move {
                    let result = sqlx::query(
                        r#"
                        UPDATE urls
                        SET click_count = click_count + 1
                        WHERE slug = $1
                        "#,
                    )
                    .bind(&slug)
                    .execute(&mut *conn)
                    .await?;

                    if result.rows_affected() == 0 {
                        debug!(slug = %slug, "Click for a slug that no longer exists");
                    }
                    Ok(())
                })
            })
            .await
    }

    async fn create(&self, url: &ValidUrl, slug: &str) -> AppResult<UrlRecord> {
        let url = url.as_str().to_owned();
        let slug = slug.to_owned();
        let now = Utc::now();
        let expires_at = now + self.ttl;

        self.pool
            .with_transaction(move |conn| {
                Box::pin(async move {
                    sqlx::query_as::<_, UrlRecord>(
                        r#"
                        INSERT INTO urls (slug, original_url, created_at, expires_at, click_count)
                        VALUES ($1, $2, $3, $4, 0)
                        RETURNING slug, original_url, created_at, expires_at, click_count
                        "#,
                    )
                    .bind(&slug)
                    .bind(url)
                    .bind(now)
                    .bind(expires_at)
                    .fetch_one(&mut *conn)
                    .await
                    .map_err(|e| {
                        let duplicate = e
                            .as_database_error()
                            .is_some_and(|db| db.is_unique_violation());
                        if duplicate {
                            AppError::DuplicateSlug(slug.clone())
                        } else {
                            AppError::from(e)
                        }
                    })
                })
            })
            .await
    }
}

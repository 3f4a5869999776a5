//! PostgreSQL review store.
//!
//! Every operation is a single parameterized statement. sqlx prepares each
//! statement once per connection and keeps it in the connection's statement
//! cache, so the constants below are parsed and planned only once.

use super::{bounded, Created, ReviewStore, StoreError};
use crate::config::DatabaseConfig;
use crate::model::{Review, ReviewId};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::{info, warn};

const INSERT_REVIEW: &str = r#"
    INSERT INTO public.reviews (title, director, releaseDate, rating, reviewNotes, dateCreated)
    VALUES ($1, $2, $3, $4, $5, $6)
    RETURNING id
"#;

const UPDATE_REVIEW: &str = r#"
    UPDATE public.reviews
    SET title = $1, director = $2, releaseDate = $3, rating = $4, reviewNotes = $5
    WHERE id = $6
    RETURNING id, title, director, releaseDate AS release_date, rating,
              reviewNotes AS review_notes, dateCreated AS date_created
"#;

const DELETE_REVIEW: &str = "DELETE FROM public.reviews WHERE id = $1";

const SELECT_REVIEW: &str = r#"
    SELECT id, title, director, releaseDate AS release_date, rating,
           reviewNotes AS review_notes, dateCreated AS date_created
    FROM public.reviews
    WHERE id = $1
"#;

const COUNT_REVIEWS: &str = "SELECT COUNT(*) FROM public.reviews";

/// Review store backed by a bounded sqlx connection pool.
pub struct PgReviewStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgReviewStore {
    /// Open the pool and establish the first connection.
    ///
    /// Fails fast on unreachable hosts or bad credentials. The schema is not
    /// checked here; a missing table shows up on the first query.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let timeout = config.operation_timeout();
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .acquire_timeout(timeout)
            .connect_with(config.connect_options())
            .await?;

        info!(
            host = %config.host,
            port = config.port,
            database = %config.name,
            max_connections = config.max_connections,
            "Connected to PostgreSQL"
        );

        Ok(Self::from_pool(pool, timeout))
    }

    pub fn from_pool(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[async_trait]
impl ReviewStore for PgReviewStore {
    async fn create(&self, review: &Review) -> Result<Created, StoreError> {
        let id: ReviewId = bounded(
            "create",
            self.timeout,
            sqlx::query_scalar::<_, ReviewId>(INSERT_REVIEW)
                .bind(&review.title)
                .bind(&review.director)
                .bind(&review.release_date)
                .bind(&review.rating)
                .bind(&review.review_notes)
                .bind(&review.date_created)
                .fetch_one(&self.pool),
        )
        .await?;

        Ok(Created::new(Review {
            id,
            ..review.clone()
        }))
    }

    async fn update(&self, review: &Review) -> Result<Review, StoreError> {
        bounded(
            "update",
            self.timeout,
            sqlx::query_as::<_, Review>(UPDATE_REVIEW)
                .bind(&review.title)
                .bind(&review.director)
                .bind(&review.release_date)
                .bind(&review.rating)
                .bind(&review.review_notes)
                .bind(review.id)
                .fetch_optional(&self.pool),
        )
        .await?
        .ok_or(StoreError::NotFound { id: review.id })
    }

    async fn delete(&self, id: ReviewId) -> Result<(), StoreError> {
        let result = bounded(
            "delete",
            self.timeout,
            sqlx::query(DELETE_REVIEW).bind(id).execute(&self.pool),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { id });
        }

        info!(id, "Deleted review");
        Ok(())
    }

    async fn get_by_id(&self, id: ReviewId) -> Result<Review, StoreError> {
        bounded(
            "read",
            self.timeout,
            sqlx::query_as::<_, Review>(SELECT_REVIEW)
                .bind(id)
                .fetch_optional(&self.pool),
        )
        .await?
        .ok_or(StoreError::NotFound { id })
    }

    async fn count(&self) -> Result<i64, StoreError> {
        bounded(
            "count",
            self.timeout,
            sqlx::query_scalar::<_, i64>(COUNT_REVIEWS).fetch_one(&self.pool),
        )
        .await
    }

    async fn close(&self) {
        if self.pool.is_closed() {
            warn!("PostgreSQL pool already closed");
            return;
        }
        self.pool.close().await;
        info!("PostgreSQL pool closed");
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

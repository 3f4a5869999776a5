pub mod memory;
pub mod postgres;

pub use memory::InMemoryReviewStore;
pub use postgres::PgReviewStore;

use crate::model::{Review, ReviewId};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Failures surfaced by a [`ReviewStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("review with id {id} not found")]
    NotFound { id: ReviewId },

    /// The source is kept for logs only; it never reaches a client.
    #[error("failed to {op} review")]
    Persistence {
        op: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("failed to {op} review: timed out after {limit:?}")]
    Timeout { op: &'static str, limit: Duration },
}

/// Result of a successful insert.
#[derive(Debug, Clone)]
pub struct Created {
    pub review: Review,
    pub confirmation: String,
}

impl Created {
    pub fn new(review: Review) -> Self {
        debug_assert!(review.is_persisted(), "created review must carry its id");
        let confirmation = format!(
            "review {} created, recorded at {}",
            review.id, review.date_created
        );
        Self { review, confirmation }
    }
}

/// Persistence capability for reviews.
///
/// Implementations must be safe to share across request tasks.
#[async_trait]
pub trait ReviewStore: Send + Sync + 'static {
    /// Insert a review. The input `id` is ignored; the stored copy with its
    /// assigned id is returned.
    async fn create(&self, review: &Review) -> Result<Created, StoreError>;

    /// Overwrite the client-editable fields of the row matching `review.id`.
    /// `date_created` on the input is ignored.
    async fn update(&self, review: &Review) -> Result<Review, StoreError>;

    async fn delete(&self, id: ReviewId) -> Result<(), StoreError>;

    async fn get_by_id(&self, id: ReviewId) -> Result<Review, StoreError>;

    /// Number of stored reviews; doubles as a connectivity check.
    async fn count(&self) -> Result<i64, StoreError>;

    async fn close(&self) {}

    /// Short backend name reported by the health endpoint.
    fn backend(&self) -> &'static str;
}

/// Run one database call under `limit`.
///
/// Pool acquire timeouts are reported the same way as the operation itself
/// running too long.
pub(crate) async fn bounded<T, F>(op: &'static str, limit: Duration, fut: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(sqlx::Error::PoolTimedOut)) | Err(_) => Err(StoreError::Timeout { op, limit }),
        Ok(Err(source)) => Err(StoreError::Persistence { op, source }),
    }
}

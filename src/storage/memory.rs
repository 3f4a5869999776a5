use super::{Created, ReviewStore, StoreError};
use crate::model::{Review, ReviewId};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::info;

/// Review store kept in process memory. Ids start at 1.
#[derive(Default)]
pub struct InMemoryReviewStore {
    inner: RwLock<Rows>,
}

#[derive(Default)]
struct Rows {
    last_id: ReviewId,
    reviews: BTreeMap<ReviewId, Review>,
}

impl InMemoryReviewStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReviewStore for InMemoryReviewStore {
    async fn create(&self, review: &Review) -> Result<Created, StoreError> {
        let mut rows = self.inner.write().await;
        rows.last_id += 1;

        let stored = Review {
            id: rows.last_id,
            ..review.clone()
        };
        rows.reviews.insert(stored.id, stored.clone());

        Ok(Created::new(stored))
    }

    async fn update(&self, review: &Review) -> Result<Review, StoreError> {
        let mut rows = self.inner.write().await;
        let stored = rows
            .reviews
            .get_mut(&review.id)
            .ok_or(StoreError::NotFound { id: review.id })?;

        stored.title = review.title.clone();
        stored.director = review.director.clone();
        stored.release_date = review.release_date.clone();
        stored.rating = review.rating.clone();
        stored.review_notes = review.review_notes.clone();

        Ok(stored.clone())
    }

    async fn delete(&self, id: ReviewId) -> Result<(), StoreError> {
        let mut rows = self.inner.write().await;
        rows.reviews
            .remove(&id)
            .ok_or(StoreError::NotFound { id })?;

        info!(id, "Deleted review");
        Ok(())
    }

    async fn get_by_id(&self, id: ReviewId) -> Result<Review, StoreError> {
        self.inner
            .read()
            .await
            .reviews
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound { id })
    }

    async fn count(&self) -> Result<i64, StoreError> {
        Ok(self.inner.read().await.reviews.len() as i64)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inception() -> Review {
        Review::new(
            "Inception".into(),
            "Christopher Nolan".into(),
            "16 Jul 10 00:00 UTC",
            "9/10".into(),
            "Great".into(),
        )
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let store = InMemoryReviewStore::new();

        let first = store.create(&inception()).await.unwrap();
        let second = store.create(&inception()).await.unwrap();

        assert_eq!(first.review.id, 1);
        assert_eq!(second.review.id, 2);
        assert!(first.review.is_persisted());
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn create_ignores_input_id() {
        let store = InMemoryReviewStore::new();
        let mut review = inception();
        review.id = 99;

        let created = store.create(&review).await.unwrap();
        assert_eq!(created.review.id, 1);
        assert!(store.get_by_id(99).await.is_err());
    }

    #[tokio::test]
    async fn round_trip_by_id() {
        let store = InMemoryReviewStore::new();
        let created = store.create(&inception()).await.unwrap();

        let fetched = store.get_by_id(created.review.id).await.unwrap();
        assert_eq!(fetched, created.review);
    }

    #[tokio::test]
    async fn missing_id_is_not_found_everywhere() {
        let store = InMemoryReviewStore::new();
        let mut review = inception();
        review.id = 999_999;

        assert!(matches!(
            store.get_by_id(999_999).await,
            Err(StoreError::NotFound { id: 999_999 })
        ));
        assert!(matches!(
            store.update(&review).await,
            Err(StoreError::NotFound { id: 999_999 })
        ));
        assert!(matches!(
            store.delete(999_999).await,
            Err(StoreError::NotFound { id: 999_999 })
        ));
    }

    #[tokio::test]
    async fn update_keeps_date_created_and_is_idempotent() {
        let store = InMemoryReviewStore::new();
        let created = store.create(&inception()).await.unwrap().review;

        let change = Review {
            rating: "10/10".into(),
            review_notes: "Even better on rewatch".into(),
            date_created: "01 Jan 70 00:00".into(),
            ..created.clone()
        };

        let once = store.update(&change).await.unwrap();
        let twice = store.update(&change).await.unwrap();

        assert_eq!(once, twice);
        assert_eq!(once.rating, "10/10");
        assert_eq!(once.date_created, created.date_created);
        assert_eq!(store.get_by_id(created.id).await.unwrap(), once);
    }

    #[tokio::test]
    async fn delete_is_not_idempotent() {
        let store = InMemoryReviewStore::new();
        let id = store.create(&inception()).await.unwrap().review.id;

        store.delete(id).await.unwrap();
        assert!(matches!(store.delete(id).await, Err(StoreError::NotFound { .. })));
        assert!(matches!(store.get_by_id(id).await, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = InMemoryReviewStore::new();
        let id = store.create(&inception()).await.unwrap().review.id;
        store.delete(id).await.unwrap();

        let next = store.create(&inception()).await.unwrap().review.id;
        assert_ne!(next, id);
    }
}

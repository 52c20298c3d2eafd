use serde_json::json;
use std::sync::Arc;

use crate::{
    clock::Clock,
    db::{
        document::{merge_top_level, object_without_nulls},
        Collection, Document, DocumentStore, Filter, OrderBy,
    },
    error::{AppError, AppResult},
    models::{
        merge_reviews, MediaId, MediaType, MergedReview, NewReview, Review, ReviewPatch,
        MAX_RATING, MIN_RATING,
    },
    services::catalog::CatalogProvider,
};

/// Rejects ratings outside the 1..=10 star scale
pub fn validate_rating(rating: u8) -> AppResult<()> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(AppError::InvalidInput(format!(
            "rating must be between {} and {}, got {}",
            MIN_RATING, MAX_RATING, rating
        )));
    }
    Ok(())
}

fn decode_review(doc: &Document) -> AppResult<Review> {
    let mut review: Review = doc.decode()?;
    review.id = doc.id.clone();
    Ok(review)
}

/// User-authored reviews, plus the merged view with the catalog's own reviews
#[derive(Clone)]
pub struct ReviewStore {
    store: Arc<dyn DocumentStore>,
    catalog: Arc<dyn CatalogProvider>,
    clock: Arc<dyn Clock>,
}

impl ReviewStore {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        catalog: Arc<dyn CatalogProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            catalog,
            clock,
        }
    }

    /// Stores a new review and returns its generated id
    pub async fn add_review(&self, review: NewReview) -> AppResult<String> {
        validate_rating(review.rating)?;

        let now = self.clock.now();
        let mut body = serde_json::to_value(&review)?;
        merge_top_level(&mut body, json!({ "createdAt": now, "updatedAt": now }));

        let id = self
            .store
            .insert(Collection::Reviews, body)
            .await
            .map_err(|e| {
                tracing::error!(
                    user_id = %review.user_id,
                    media_id = review.media_id,
                    error = %e,
                    "Error adding review"
                );
                e
            })?;

        tracing::info!(
            review_id = %id,
            user_id = %review.user_id,
            media_id = review.media_id,
            "Review added"
        );
        Ok(id)
    }

    /// Local reviews of a title, newest first
    pub async fn get_media_reviews(
        &self,
        media_id: MediaId,
        media_type: MediaType,
    ) -> AppResult<Vec<Review>> {
        let docs = self
            .store
            .query(
                Collection::Reviews,
                &[
                    Filter::eq("mediaId", media_id),
                    Filter::eq("mediaType", media_type.as_str()),
                ],
                Some(OrderBy::desc("createdAt")),
            )
            .await
            .map_err(|e| {
                tracing::error!(media_id, error = %e, "Error getting media reviews");
                e
            })?;

        docs.iter().map(decode_review).collect()
    }

    pub async fn get_user_reviews(&self, user_id: &str) -> AppResult<Vec<Review>> {
        let docs = self
            .store
            .query(
                Collection::Reviews,
                &[Filter::eq("userId", user_id)],
                Some(OrderBy::desc("createdAt")),
            )
            .await
            .map_err(|e| {
                tracing::error!(user_id, error = %e, "Error getting user reviews");
                e
            })?;

        docs.iter().map(decode_review).collect()
    }

    pub async fn get_user_review_count(&self, user_id: &str) -> u64 {
        self.store
            .count(Collection::Reviews, &[Filter::eq("userId", user_id)])
            .await
            .unwrap_or_else(|e| {
                tracing::error!(user_id, error = %e, "Error getting review count");
                0
            })
    }

    /// Edits rating and/or comment. Author and title never change.
    pub async fn update_review(&self, review_id: &str, patch: ReviewPatch) -> AppResult<()> {
        if let Some(rating) = patch.rating {
            validate_rating(rating)?;
        }

        let body = object_without_nulls(vec![
            ("rating", patch.rating.map(|r| json!(r))),
            ("comment", patch.comment.map(|c| json!(c))),
            ("updatedAt", Some(json!(self.clock.now()))),
        ]);

        self.store
            .update(Collection::Reviews, review_id, body)
            .await
            .map_err(|e| {
                tracing::error!(review_id, error = %e, "Error updating review");
                e
            })
    }

    pub async fn delete_review(&self, review_id: &str) -> AppResult<()> {
        if self.store.get(Collection::Reviews, review_id).await?.is_none() {
            return Err(AppError::NotFound(format!("review {}", review_id)));
        }

        self.store
            .delete(Collection::Reviews, review_id)
            .await
            .map_err(|e| {
                tracing::error!(review_id, error = %e, "Error deleting review");
                e
            })?;

        tracing::info!(review_id, "Review deleted");
        Ok(())
    }

    /// Local and catalog reviews of a title, newest first.
    ///
    /// Both sources are fetched concurrently. A source that fails is logged
    /// and contributes nothing.
    pub async fn get_merged_reviews(
        &self,
        media_id: MediaId,
        media_type: MediaType,
    ) -> Vec<MergedReview> {
        let (local, external) = futures::join!(
            self.get_media_reviews(media_id, media_type),
            self.catalog.reviews(media_id, media_type)
        );

        let local = local.unwrap_or_else(|e| {
            tracing::warn!(media_id, error = %e, "Local reviews unavailable for merge");
            Vec::new()
        });
        let external = external.unwrap_or_else(|e| {
            tracing::warn!(
                media_id,
                provider = self.catalog.name(),
                error = %e,
                "Catalog reviews unavailable for merge"
            );
            Vec::new()
        });

        merge_reviews(local, external)
    }
}

use std::sync::Arc;

use crate::database::models::{NewReview, Review, User};
use crate::database::Store;

use super::ServiceError;

pub const DUPLICATE_REVIEW: &str = "You have already reviewed this title";

/// Review creation with the one-review-per-title rule
pub struct ReviewService {
    store: Arc<dyn Store>,
}

impl ReviewService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Reject a second review of `title_id` by `author_id`
    pub async fn ensure_first_review(&self, title_id: i64, author_id: i64) -> Result<(), ServiceError> {
        if self.store.review_by_author(title_id, author_id).await?.is_some() {
            return Err(ServiceError::validation("non_field_errors", DUPLICATE_REVIEW));
        }
        Ok(())
    }

    /// Create a review. 404 if the title is missing, validation error if the
    /// author already reviewed it. Score range is checked by the caller.
    pub async fn create(&self, title_id: i64, author: &User, text: String, score: i32) -> Result<Review, ServiceError> {
        if self.store.title_by_id(title_id).await?.is_none() {
            return Err(ServiceError::NotFound(format!("Title {} not found", title_id)));
        }

        self.ensure_first_review(title_id, author.id).await?;

        // A concurrent insert that slipped past the check hits the unique constraint
        let review = self
            .store
            .create_review(NewReview { title_id, author_id: author.id, text, score })
            .await?;

        tracing::debug!("User {} reviewed title {} with score {}", author.username, title_id, score);
        Ok(review)
    }
}

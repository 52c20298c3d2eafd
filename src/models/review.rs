use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ExternalReview, MediaId, MediaType};

/// Lowest accepted star rating
pub const MIN_RATING: u8 = 1;
/// Highest accepted star rating
pub const MAX_RATING: u8 = 10;

/// A user-authored review as stored in the `reviews` collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Document id, filled in from the store on read
    #[serde(default)]
    pub id: String,
    pub user_id: String,
    pub user_email: String,
    pub media_id: MediaId,
    pub media_type: MediaType,
    pub media_title: String,
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when a user writes a review
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub user_id: String,
    pub user_email: String,
    pub media_id: MediaId,
    pub media_type: MediaType,
    pub media_title: String,
    pub rating: u8,
    pub comment: String,
}

/// Editable part of an existing review
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Provenance of a review in the merged display list
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReviewSource {
    Local,
    External,
}

/// A review ready for display, from either source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MergedReview {
    pub id: String,
    pub author: String,
    pub content: String,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
    pub source: ReviewSource,
}

impl From<Review> for MergedReview {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            author: review.user_email,
            content: review.comment,
            rating: f64::from(review.rating),
            created_at: review.created_at,
            source: ReviewSource::Local,
        }
    }
}

impl From<ExternalReview> for MergedReview {
    fn from(review: ExternalReview) -> Self {
        Self {
            id: review.id,
            author: review.author,
            content: review.content,
            rating: review.author_details.rating.unwrap_or(0.0),
            created_at: review.created_at,
            source: ReviewSource::External,
        }
    }
}

/// Combines both sources, newest first. Duplicates are kept.
pub fn merge_reviews(local: Vec<Review>, external: Vec<ExternalReview>) -> Vec<MergedReview> {
    let mut merged: Vec<MergedReview> = local
        .into_iter()
        .map(MergedReview::from)
        .chain(external.into_iter().map(MergedReview::from))
        .collect();
    merged.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AuthorDetails;
    use chrono::TimeZone;

    fn local_review(id: &str, created_at: DateTime<Utc>) -> Review {
        Review {
            id: id.to_string(),
            user_id: "u1".to_string(),
            user_email: "viewer@example.com".to_string(),
            media_id: 27205,
            media_type: MediaType::Movie,
            media_title: "Inception".to_string(),
            rating: 9,
            comment: "Dreams within dreams".to_string(),
            created_at,
            updated_at: created_at,
        }
    }

    fn external_review(id: &str, created_at: DateTime<Utc>, rating: Option<f64>) -> ExternalReview {
        ExternalReview {
            id: id.to_string(),
            author: "critic".to_string(),
            content: "Solid heist film".to_string(),
            created_at,
            author_details: AuthorDetails { rating },
        }
    }

    #[test]
    fn test_local_review_newer_than_external_comes_first() {
        let t1 = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let merged = merge_reviews(
            vec![local_review("local-1", t2)],
            vec![external_review("ext-1", t1, Some(7.0))],
        );

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].id, "local-1");
        assert_eq!(merged[0].source, ReviewSource::Local);
        assert_eq!(merged[1].id, "ext-1");
        assert_eq!(merged[1].source, ReviewSource::External);
    }

    #[test]
    fn test_external_review_without_rating_defaults_to_zero() {
        let t = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap();
        let merged = merge_reviews(vec![], vec![external_review("ext-1", t, None)]);
        assert_eq!(merged[0].rating, 0.0);
    }

    #[test]
    fn test_identical_text_is_not_deduplicated() {
        let t = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap();
        let mut local = local_review("local-1", t);
        local.comment = "Solid heist film".to_string();

        let merged = merge_reviews(vec![local], vec![external_review("ext-1", t, Some(8.0))]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_review_patch_skips_absent_fields() {
        let patch = ReviewPatch {
            rating: Some(8),
            comment: None,
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({ "rating": 8 }));
    }
}

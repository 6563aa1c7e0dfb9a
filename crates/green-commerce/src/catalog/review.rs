//! Product reviews.

use crate::error::CommerceError;
use crate::ids::{ProductId, ReviewId};
use serde::{Deserialize, Serialize};

/// Longest comment accepted with a review.
pub const MAX_REVIEW_COMMENT_CHARS: usize = 1000;

/// A customer review of a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub author_name: String,
    /// Star rating, 1 to 5.
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: Option<i64>,
}

impl Review {
    /// Check a rating and comment before submission.
    ///
    /// Returns the trimmed comment (`None` when blank).
    pub fn validate_input(rating: u8, comment: &str) -> Result<Option<String>, CommerceError> {
        if !(1..=5).contains(&rating) {
            return Err(CommerceError::Validation(format!(
                "rating must be between 1 and 5, got {}",
                rating
            )));
        }
        let comment = comment.trim();
        if comment.chars().count() > MAX_REVIEW_COMMENT_CHARS {
            return Err(CommerceError::Validation(format!(
                "comment is longer than {} characters",
                MAX_REVIEW_COMMENT_CHARS
            )));
        }
        Ok((!comment.is_empty()).then(|| comment.to_string()))
    }
}

/// Aggregate rating for a product page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct RatingSummary {
    pub average: f64,
    pub count: u32,
    /// Number of reviews per star, index 0 is one star.
    pub distribution: [u32; 5],
}

impl RatingSummary {
    /// Summarize a list of reviews. Out-of-range ratings are ignored.
    pub fn from_reviews(reviews: &[Review]) -> Self {
        let mut summary = RatingSummary::default();
        let mut total: u32 = 0;
        for review in reviews {
            let Some(slot) = (review.rating as usize)
                .checked_sub(1)
                .and_then(|i| summary.distribution.get_mut(i))
            else {
                continue;
            };
            *slot += 1;
            summary.count += 1;
            total += u32::from(review.rating);
        }
        if summary.count > 0 {
            summary.average = f64::from(total) / f64::from(summary.count);
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(rating: u8) -> Review {
        Review {
            id: ReviewId::generate(),
            product_id: ProductId::new("p1"),
            author_name: "Sari".into(),
            rating,
            comment: None,
            created_at: None,
        }
    }

    #[test]
    fn test_validate_input() {
        assert_eq!(Review::validate_input(5, "  Very fresh!  ").unwrap(), Some("Very fresh!".into()));
        assert_eq!(Review::validate_input(3, "   ").unwrap(), None);
        assert!(Review::validate_input(0, "").is_err());
        assert!(Review::validate_input(6, "").is_err());
        assert!(Review::validate_input(4, &"x".repeat(1001)).is_err());
    }

    #[test]
    fn test_rating_summary() {
        let summary = RatingSummary::from_reviews(&[review(5), review(4), review(4), review(0)]);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.distribution, [0, 0, 0, 2, 1]);
        assert!((summary.average - 13.0 / 3.0).abs() < 1e-9);

        assert_eq!(RatingSummary::from_reviews(&[]).average, 0.0);
    }
}

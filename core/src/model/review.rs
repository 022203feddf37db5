use super::restaurant::RestaurantId;
use serde::{Deserialize, Serialize};

pub const MIN_COMMENT_CHARS: usize = 5;
pub const MAX_COMMENT_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub review_id: u64,
    pub reviewer: String,
    pub score: u8,
    pub comment: String,
    pub created_at: String,
}

/// Review as listed on the profile page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MyReview {
    pub review_id: u64,
    pub restaurant_id: RestaurantId,
    pub reviewer: String,
    pub score: u8,
    pub comment: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MyReviewsResponse {
    #[serde(default)]
    pub total_count: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub items_per_page: u32,
    pub reviews: Vec<MyReview>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("로그인이 필요합니다.")]
    LoginRequired,
    #[error("별점을 선택해주세요.")]
    ScoreMissing,
    #[error("리뷰는 최소 5자 이상 작성해주세요.")]
    CommentTooShort,
    #[error("리뷰는 500자 이하로 작성해주세요.")]
    CommentTooLong,
    #[error("상황을 입력해주세요.")]
    SituationMissing,
}

/// Review form contents. `score == 0` means no score picked yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewDraft {
    pub score: u8,
    pub comment: String,
}

impl ReviewDraft {
    pub fn validate(&self, logged_in: bool) -> Result<(), ValidationError> {
        if !logged_in {
            return Err(ValidationError::LoginRequired);
        }
        if !(1..=5).contains(&self.score) {
            return Err(ValidationError::ScoreMissing);
        }
        let length = self.comment.trim().chars().count();
        if length < MIN_COMMENT_CHARS {
            return Err(ValidationError::CommentTooShort);
        }
        if length > MAX_COMMENT_CHARS {
            return Err(ValidationError::CommentTooLong);
        }
        Ok(())
    }

    /// Whether the submit button should be enabled.
    pub fn is_submittable(&self) -> bool {
        self.score != 0 && self.comment.trim().chars().count() >= MIN_COMMENT_CHARS
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_checks_in_form_order() {
        let draft = ReviewDraft::default();
        assert_eq!(draft.validate(false), Err(ValidationError::LoginRequired));
        assert_eq!(draft.validate(true), Err(ValidationError::ScoreMissing));

        let draft = ReviewDraft {
            score: 4,
            comment: "  맛있음  ".into(),
        };
        assert_eq!(draft.validate(true), Err(ValidationError::CommentTooShort));

        let draft = ReviewDraft {
            score: 4,
            comment: "국물이 진해요".into(),
        };
        assert_eq!(draft.validate(true), Ok(()));
        assert!(draft.is_submittable());
    }

    #[test]
    fn comment_length_counts_characters_not_bytes() {
        let draft = ReviewDraft {
            score: 5,
            comment: "가".repeat(MAX_COMMENT_CHARS),
        };
        assert_eq!(draft.validate(true), Ok(()));

        let draft = ReviewDraft {
            score: 5,
            comment: "가".repeat(MAX_COMMENT_CHARS + 1),
        };
        assert_eq!(draft.validate(true), Err(ValidationError::CommentTooLong));
    }
}

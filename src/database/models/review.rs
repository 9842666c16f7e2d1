use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{check_text, BootcampSummary, ValidationErrors};
use crate::filter::{FieldKind, FieldSpec};

pub static REVIEW_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("id", "id", FieldKind::Uuid),
    FieldSpec::new("title", "title", FieldKind::Text),
    FieldSpec::new("rating", "rating", FieldKind::Integer),
    FieldSpec::new("bootcamp", "bootcamp_id", FieldKind::Uuid),
    FieldSpec::new("user", "user_id", FieldKind::Uuid),
    FieldSpec::new("createdAt", "created_at", FieldKind::Timestamp),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub rating: i32,
    pub bootcamp: Uuid,
    pub user: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewInput {
    pub title: Option<String>,
    pub text: Option<String>,
    pub rating: Option<i32>,
}

/// A review with its bootcamp embedded
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDetail {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub rating: i32,
    pub bootcamp: Option<BootcampSummary>,
    pub user: Uuid,
    pub created_at: DateTime<Utc>,
}

impl ReviewDetail {
    pub fn new(review: Review, bootcamp: Option<BootcampSummary>) -> Self {
        Self {
            id: review.id,
            title: review.title,
            text: review.text,
            rating: review.rating,
            bootcamp,
            user: review.user,
            created_at: review.created_at,
        }
    }
}

impl Review {
    /// Unvalidated review of `bootcamp` authored by `user`
    pub fn new(bootcamp: Uuid, user: Uuid, input: ReviewInput) -> Self {
        let mut review = Self {
            id: Uuid::new_v4(),
            title: String::new(),
            text: String::new(),
            rating: 0,
            bootcamp,
            user,
            created_at: Utc::now(),
        };
        review.merge(input);
        review
    }

    pub fn merge(&mut self, input: ReviewInput) {
        if let Some(title) = input.title {
            self.title = title.trim().to_string();
        }
        if let Some(text) = input.text {
            self.text = text;
        }
        if let Some(rating) = input.rating {
            self.rating = rating;
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_text(
            &mut errors,
            "title",
            &self.title,
            "Please add a title for the review",
            Some((100, "Title can not be more than 100 characters")),
        );
        check_text(&mut errors, "text", &self.text, "Please add some text", None);
        if !(1..=10).contains(&self.rating) {
            errors.add("rating", "Please add a rating between 1 and 10");
        }
        errors.into_result()
    }
}

/// Mean rating, or `None` for a bootcamp without reviews
pub fn average_rating(reviews: &[Review]) -> Option<f64> {
    if reviews.is_empty() {
        return None;
    }
    let sum: i64 = reviews.iter().map(|r| r.rating as i64).sum();
    Some(sum as f64 / reviews.len() as f64)
}

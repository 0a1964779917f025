use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Review;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductReviews {
    pub items: Vec<Review>,
    pub count: i64,
    /// Mean rating rounded to one decimal, absent when there are no reviews.
    pub average: Option<f64>,
}

use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::reviews::{CreateReviewRequest, ProductReviews},
    entity::{
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::{Column as OrderCol, Entity as Orders},
        products::Entity as Products,
        reviews::{ActiveModel as ReviewActive, Column as ReviewCol, Entity as Reviews, Model as ReviewModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, Capability},
    models::Review,
    response::ApiResponse,
    state::AppState,
};

fn check_rating(rating: i32) -> AppResult<()> {
    if !(1..=5).contains(&rating) {
        return Err(AppError::BadRequest("rating must be between 1 and 5".into()));
    }
    Ok(())
}

/// Mean rating rounded to one decimal.
fn average(ratings: &[i32]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
    let mean = sum as f64 / ratings.len() as f64;
    Some((mean * 10.0).round() / 10.0)
}

pub async fn list_for_product(
    state: &AppState,
    product_id: Uuid,
) -> AppResult<ApiResponse<ProductReviews>> {
    let reviews = Reviews::find()
        .filter(ReviewCol::ProductId.eq(product_id))
        .order_by_desc(ReviewCol::CreatedAt)
        .all(&state.orm)
        .await?;
    let ratings: Vec<i32> = reviews.iter().map(|r| r.rating).collect();

    Ok(ApiResponse::ok(
        "Reviews",
        ProductReviews {
            count: reviews.len() as i64,
            average: average(&ratings),
            items: reviews.into_iter().map(Review::from).collect(),
        },
    ))
}

pub async fn create_review(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: CreateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    check_rating(payload.rating)?;
    Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let purchases = OrderItems::find()
        .inner_join(Orders)
        .filter(OrderCol::UserId.eq(user.user_id))
        .filter(OrderItemCol::ProductId.eq(product_id))
        .count(&state.orm)
        .await?;

    let review = ReviewActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        product_id: Set(product_id),
        rating: Set(payload.rating),
        comment: Set(payload.comment.filter(|c| !c.trim().is_empty())),
        verified_purchase: Set(purchases > 0),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await
    .map_err(|e| AppError::on_unique_violation(e, "You already reviewed this product"))?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "review_create",
        "reviews",
        serde_json::json!({ "review_id": review.id, "product_id": product_id }),
    )
    .await;

    Ok(ApiResponse::ok("Review saved", review.into()))
}

async fn owned_review(state: &AppState, user: &AuthUser, id: Uuid, staff_ok: bool) -> AppResult<ReviewModel> {
    let review = Reviews::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let allowed = review.user_id == user.user_id
        || (staff_ok && user.role.can(Capability::ManageStore));
    if !allowed {
        return Err(AppError::Forbidden);
    }
    Ok(review)
}

pub async fn update_review(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: CreateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    check_rating(payload.rating)?;
    let review = owned_review(state, user, id, false).await?;

    let mut active: ReviewActive = review.into();
    active.rating = Set(payload.rating);
    active.comment = Set(payload.comment.filter(|c| !c.trim().is_empty()));
    let review = active.update(&state.orm).await?;
    Ok(ApiResponse::ok("Review updated", review.into()))
}

pub async fn delete_review(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let review = owned_review(state, user, id, true).await?;
    let product_id = review.product_id;
    review.delete(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "review_delete",
        "reviews",
        serde_json::json!({ "review_id": id, "product_id": product_id }),
    )
    .await;

    Ok(ApiResponse::ok("Review deleted", serde_json::json!({})))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_bounds() {
        assert!(check_rating(0).is_err());
        assert!(check_rating(6).is_err());
        assert!(check_rating(1).is_ok());
        assert!(check_rating(5).is_ok());
    }

    #[test]
    fn average_rounds_to_one_decimal() {
        assert_eq!(average(&[]), None);
        assert_eq!(average(&[5, 4, 4]), Some(4.3));
        assert_eq!(average(&[3]), Some(3.0));
    }
}

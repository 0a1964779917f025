//! Logged-in customer extras: loyalty, reviews and the wishlist.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::{
        loyalty::{LoyaltySummary, RedeemRequest, RedeemResult},
        reviews::CreateReviewRequest,
        wishlist::{WishlistCheck, WishlistProducts},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Review,
    response::ApiResponse,
    routes::params::Pagination,
    services::{loyalty_service, review_service, wishlist_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/fidelidade", get(loyalty_summary))
        .route("/fidelidade/resgatar", post(redeem_points))
        .route("/produtos/{id}/avaliar", post(create_review))
        .route("/avaliacoes/{id}", put(update_review).delete(delete_review))
        .route("/lista-desejos", get(list_wishlist))
        .route(
            "/lista-desejos/{product_id}",
            get(check_wishlist)
                .post(add_to_wishlist)
                .delete(remove_from_wishlist),
        )
}

#[utoipa::path(
    get,
    path = "/api/fidelidade",
    responses(
        (status = 200, description = "Balance, reward tiers and recent transactions", body = ApiResponse<LoyaltySummary>)
    ),
    security(("bearer_auth" = [])),
    tag = "Loyalty"
)]
pub async fn loyalty_summary(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<LoyaltySummary>>> {
    let resp = loyalty_service::summary(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/fidelidade/resgatar",
    request_body = RedeemRequest,
    responses(
        (status = 200, description = "Reward coupon created", body = ApiResponse<RedeemResult>),
        (status = 400, description = "Not a reward tier"),
        (status = 422, description = "Insufficient points")
    ),
    security(("bearer_auth" = [])),
    tag = "Loyalty"
)]
pub async fn redeem_points(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<RedeemRequest>,
) -> AppResult<Json<ApiResponse<RedeemResult>>> {
    let resp = loyalty_service::redeem(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/produtos/{id}/avaliar",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = CreateReviewRequest,
    responses(
        (status = 200, description = "Review saved", body = ApiResponse<Review>),
        (status = 400, description = "Rating outside 1..5"),
        (status = 422, description = "Product already reviewed")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn create_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateReviewRequest>,
) -> AppResult<Json<ApiResponse<Review>>> {
    let resp = review_service::create_review(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/avaliacoes/{id}",
    params(("id" = Uuid, Path, description = "Review ID")),
    request_body = CreateReviewRequest,
    responses(
        (status = 200, description = "Review updated", body = ApiResponse<Review>),
        (status = 403, description = "Not your review")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn update_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateReviewRequest>,
) -> AppResult<Json<ApiResponse<Review>>> {
    let resp = review_service::update_review(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/avaliacoes/{id}",
    params(("id" = Uuid, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Review deleted"),
        (status = 403, description = "Not your review")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn delete_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = review_service::delete_review(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/lista-desejos",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Wishlisted products", body = ApiResponse<WishlistProducts>)
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlist"
)]
pub async fn list_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<WishlistProducts>>> {
    let resp = wishlist_service::list_wishlist(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/lista-desejos/{product_id}",
    params(("product_id" = Uuid, Path, description = "Product ID")),
    responses((status = 200, description = "Whether the product is wishlisted", body = ApiResponse<WishlistCheck>)),
    security(("bearer_auth" = [])),
    tag = "Wishlist"
)]
pub async fn check_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<WishlistCheck>>> {
    let resp = wishlist_service::check_wishlist(&state, &user, product_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/lista-desejos/{product_id}",
    params(("product_id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Added, or already present", body = ApiResponse<WishlistCheck>),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlist"
)]
pub async fn add_to_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<WishlistCheck>>> {
    let resp = wishlist_service::add_to_wishlist(&state, &user, product_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/lista-desejos/{product_id}",
    params(("product_id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Removed", body = ApiResponse<WishlistCheck>),
        (status = 404, description = "Not in wishlist")
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlist"
)]
pub async fn remove_from_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<WishlistCheck>>> {
    let resp = wishlist_service::remove_from_wishlist(&state, &user, product_id).await?;
    Ok(Json(resp))
}

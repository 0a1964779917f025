use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::{
        catalog::{CategoryList, ExtraList, ProductList},
        reviews::ProductReviews,
    },
    error::AppResult,
    models::Product,
    response::ApiResponse,
    routes::params::ProductQuery,
    services::{catalog_service, review_service},
    settings::StoreSettings,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/produtos", get(list_products))
        .route("/produtos/{id}", get(get_product))
        .route("/produtos/{id}/avaliacoes", get(product_reviews))
        .route("/categorias", get(list_categories))
        .route("/extras", get(list_extras))
        .route("/configuracoes", get(store_settings))
}

#[utoipa::path(
    get,
    path = "/api/produtos",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("q" = Option<String>, Query, description = "Search in name, code and description"),
        ("category_id" = Option<Uuid>, Query, description = "Filter by category"),
        ("featured" = Option<bool>, Query, description = "Only featured products"),
        ("min_price" = Option<i64>, Query, description = "Minimum price in cents"),
        ("max_price" = Option<i64>, Query, description = "Maximum price in cents"),
        ("sort_by" = Option<String>, Query, description = "created_at, price, name"),
        ("sort_order" = Option<String>, Query, description = "asc, desc")
    ),
    responses(
        (status = 200, description = "Active products", body = ApiResponse<ProductList>)
    ),
    tag = "Catalog"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = catalog_service::list_products(&state, query, false).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/produtos/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product", body = ApiResponse<Product>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Catalog"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = catalog_service::get_product(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/produtos/{id}/avaliacoes",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Reviews with average rating", body = ApiResponse<ProductReviews>)
    ),
    tag = "Reviews"
)]
pub async fn product_reviews(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ProductReviews>>> {
    let resp = review_service::list_for_product(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/categorias",
    responses((status = 200, description = "Categories", body = ApiResponse<CategoryList>)),
    tag = "Catalog"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let resp = catalog_service::list_categories(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/extras",
    responses((status = 200, description = "Active extras", body = ApiResponse<ExtraList>)),
    tag = "Catalog"
)]
pub async fn list_extras(State(state): State<AppState>) -> AppResult<Json<ApiResponse<ExtraList>>> {
    let resp = catalog_service::list_extras(&state, false).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/configuracoes",
    responses((status = 200, description = "Public store settings", body = ApiResponse<StoreSettings>)),
    tag = "Catalog"
)]
pub async fn store_settings(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<StoreSettings>>> {
    let resp = catalog_service::store_settings(&state).await?;
    Ok(Json(resp))
}

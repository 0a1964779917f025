use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, sea_query::OnConflict,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::wishlist::{WishlistCheck, WishlistProducts},
    entity::{
        products::{Column as ProdCol, Entity as Products},
        wishlists::{ActiveModel as WishlistActive, Column as WishlistCol, Entity as Wishlists},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

pub async fn list_wishlist(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<WishlistProducts>> {
    let (page, limit, offset) = pagination.normalize();

    let finder = Wishlists::find()
        .filter(WishlistCol::UserId.eq(user.user_id))
        .order_by_desc(WishlistCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;

    let product_ids: Vec<Uuid> = finder
        .select_only()
        .column(WishlistCol::ProductId)
        .limit(limit as u64)
        .offset(offset as u64)
        .into_tuple()
        .all(&state.orm)
        .await?;

    let mut products = if product_ids.is_empty() {
        Vec::new()
    } else {
        Products::find()
            .filter(ProdCol::Id.is_in(product_ids.clone()))
            .all(&state.orm)
            .await?
    };
    // Keep the wishlist order, newest first.
    products.sort_by_key(|p| product_ids.iter().position(|id| *id == p.id));

    let meta = Meta::new(page, limit, total);
    let data = WishlistProducts {
        items: products.into_iter().map(Product::from).collect(),
    };
    Ok(ApiResponse::success("OK", data, Some(meta)))
}

pub async fn add_to_wishlist(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<WishlistCheck>> {
    Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let row = WishlistActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        product_id: Set(product_id),
        created_at: NotSet,
    };
    let inserted = Wishlists::insert(row)
        .on_conflict(
            OnConflict::columns([WishlistCol::UserId, WishlistCol::ProductId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&state.orm)
        .await?;

    if inserted == 0 {
        return Ok(ApiResponse::ok(
            "Product already in wishlist",
            WishlistCheck { in_wishlist: true },
        ));
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "wishlist_add",
        "wishlists",
        serde_json::json!({ "product_id": product_id }),
    )
    .await;

    Ok(ApiResponse::ok(
        "Added to wishlist",
        WishlistCheck { in_wishlist: true },
    ))
}

pub async fn remove_from_wishlist(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<WishlistCheck>> {
    let result = Wishlists::delete_many()
        .filter(WishlistCol::UserId.eq(user.user_id))
        .filter(WishlistCol::ProductId.eq(product_id))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "wishlist_remove",
        "wishlists",
        serde_json::json!({ "product_id": product_id }),
    )
    .await;

    Ok(ApiResponse::ok(
        "Removed from wishlist",
        WishlistCheck { in_wishlist: false },
    ))
}

pub async fn check_wishlist(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<WishlistCheck>> {
    let count = Wishlists::find()
        .filter(WishlistCol::UserId.eq(user.user_id))
        .filter(WishlistCol::ProductId.eq(product_id))
        .count(&state.orm)
        .await?;
    Ok(ApiResponse::ok(
        "OK",
        WishlistCheck {
            in_wishlist: count > 0,
        },
    ))
}

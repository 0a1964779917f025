use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, ConnectionTrait, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait, sea_query::LockType,
};
use uuid::Uuid;

use crate::{
    audit,
    domain::pricing::{self, DeliveryType, PricedLine},
    dto::cart::{AddToCartRequest, CartQuery, ExtraSelection, UpdateCartItemRequest},
    entity::{
        cart_item_extras::{
            ActiveModel as CartExtraActive, Column as CartExtraCol, Entity as CartItemExtras,
        },
        cart_items::{ActiveModel as CartActive, Column as CartCol, Entity as CartItems, Model as CartModel},
        extras::{Column as ExtraCol, Entity as Extras, Model as ExtraModel},
        products::{Column as ProdCol, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{CartLine, CartView, LineExtra},
    response::ApiResponse,
    services::coupon_service,
    state::AppState,
};

/// True when `wanted` more units fit next to the `held` ones. Counts are
/// widened so request-sized quantities cannot wrap.
pub fn within_stock(stock: i32, held: i64, wanted: i32) -> bool {
    held + i64::from(wanted) <= i64::from(stock)
}

/// A cart row joined with its live product and the still-active extras.
pub struct CartRow {
    pub item: CartModel,
    pub product: ProductModel,
    pub extras: Vec<(ExtraModel, i32)>,
}

impl CartRow {
    pub fn priced_line(&self) -> PricedLine {
        PricedLine {
            unit_price: self.product.price,
            extras_per_unit: self
                .extras
                .iter()
                .map(|(extra, quantity)| extra.price * i64::from(*quantity))
                .sum(),
            quantity: self.item.quantity,
        }
    }

    fn into_line(self) -> CartLine {
        let line_total = self.priced_line().total();
        CartLine {
            id: self.item.id,
            product_id: self.product.id,
            product_name: self.product.name,
            unit_price: self.product.price,
            quantity: self.item.quantity,
            observations: self.item.observations,
            extras: self
                .extras
                .into_iter()
                .map(|(extra, quantity)| LineExtra {
                    extra_id: extra.id,
                    name: extra.name,
                    quantity,
                    price: extra.price,
                })
                .collect(),
            line_total,
        }
    }
}

/// Active extras among `ids`, keyed by id. Unknown or inactive ids are absent.
pub async fn active_extras<C: ConnectionTrait>(
    conn: &C,
    ids: impl IntoIterator<Item = Uuid>,
) -> AppResult<HashMap<Uuid, ExtraModel>> {
    let ids: Vec<Uuid> = ids.into_iter().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(Extras::find()
        .filter(ExtraCol::Id.is_in(ids))
        .filter(ExtraCol::Active.eq(true))
        .all(conn)
        .await?
        .into_iter()
        .map(|e| (e.id, e))
        .collect())
}

/// Keeps the selections that name an active extra, with their catalog rows.
pub async fn resolve_selections<C: ConnectionTrait>(
    conn: &C,
    selections: &[ExtraSelection],
) -> AppResult<Vec<(ExtraModel, i32)>> {
    let found = active_extras(conn, selections.iter().map(|s| s.extra_id)).await?;
    Ok(selections
        .iter()
        .filter_map(|s| found.get(&s.extra_id).map(|e| (e.clone(), s.quantity())))
        .collect())
}

/// Loads a user's cart. With `lock_products` the product rows are read
/// `FOR UPDATE`, which checkout relies on inside its transaction.
pub async fn load_cart<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    lock_products: bool,
) -> AppResult<Vec<CartRow>> {
    let items = CartItems::find()
        .filter(CartCol::UserId.eq(user_id))
        .order_by_asc(CartCol::CreatedAt)
        .all(conn)
        .await?;
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let product_ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
    let mut product_query = Products::find().filter(ProdCol::Id.is_in(product_ids));
    if lock_products {
        product_query = product_query.order_by_asc(ProdCol::Id).lock(LockType::Update);
    }
    let products: HashMap<Uuid, ProductModel> = product_query
        .all(conn)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let item_ids: Vec<Uuid> = items.iter().map(|i| i.id).collect();
    let selections = CartItemExtras::find()
        .filter(CartExtraCol::CartItemId.is_in(item_ids))
        .all(conn)
        .await?;
    let extras = active_extras(conn, selections.iter().map(|s| s.extra_id)).await?;

    let mut extras_by_item: HashMap<Uuid, Vec<(ExtraModel, i32)>> = HashMap::new();
    for selection in selections {
        if let Some(extra) = extras.get(&selection.extra_id) {
            extras_by_item
                .entry(selection.cart_item_id)
                .or_default()
                .push((extra.clone(), selection.quantity));
        }
    }

    Ok(items
        .into_iter()
        .filter_map(|item| {
            let product = products.get(&item.product_id)?.clone();
            let extras = extras_by_item.remove(&item.id).unwrap_or_default();
            Some(CartRow {
                item,
                product,
                extras,
            })
        })
        .collect())
}

/// Quantity of `product_id` already in the cart, optionally ignoring one row.
async fn quantity_in_cart(
    state: &AppState,
    user_id: Uuid,
    product_id: Uuid,
    except: Option<Uuid>,
) -> AppResult<i64> {
    let mut condition = Condition::all()
        .add(CartCol::UserId.eq(user_id))
        .add(CartCol::ProductId.eq(product_id));
    if let Some(id) = except {
        condition = condition.add(CartCol::Id.ne(id));
    }
    Ok(CartItems::find()
        .filter(condition)
        .all(&state.orm)
        .await?
        .iter()
        .map(|i| i64::from(i.quantity))
        .sum())
}

pub async fn view_cart(
    state: &AppState,
    user: &AuthUser,
    query: CartQuery,
) -> AppResult<ApiResponse<CartView>> {
    let rows = load_cart(&state.orm, user.user_id, false).await?;
    let lines: Vec<PricedLine> = rows.iter().map(CartRow::priced_line).collect();
    let subtotal = pricing::subtotal(&lines);

    let mut coupon_error = None;
    let mut applied = None;
    if let Some(code) = query.coupon.as_deref().filter(|c| !c.trim().is_empty()) {
        match coupon_service::find_by_code(&state.orm, code, false).await? {
            None => coupon_error = Some("Coupon not found".to_string()),
            Some(model) => {
                let rules = coupon_service::rules_for(&model);
                match rules.check_for_subtotal(Utc::now(), subtotal) {
                    Ok(()) => applied = Some((model.code, rules)),
                    Err(rejection) => coupon_error = Some(rejection.to_string()),
                }
            }
        }
    }

    let policy = state.settings.shipping_policy().await?;
    let delivery = query.delivery_type.unwrap_or(DeliveryType::Delivery);
    let quote = pricing::quote(
        &lines,
        applied.as_ref().map(|(_, rules)| rules),
        delivery,
        &policy,
    );

    let view = CartView {
        items: rows.into_iter().map(CartRow::into_line).collect(),
        quote,
        coupon_code: applied.map(|(code, _)| code),
        coupon_error,
    };
    Ok(ApiResponse::ok("Cart", view))
}

pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartLine>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let product = Products::find_by_id(payload.product_id)
        .filter(ProdCol::Active.eq(true))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::BadRequest("product not found".to_string()))?;

    let already = quantity_in_cart(state, user.user_id, product.id, None).await?;
    if !within_stock(product.stock, already, payload.quantity) {
        return Err(AppError::business(format!(
            "Insufficient stock for {}",
            product.name
        )));
    }

    let extras = resolve_selections(&state.orm, &payload.extras).await?;

    let txn = state.orm.begin().await?;
    let item = CartActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        product_id: Set(product.id),
        quantity: Set(payload.quantity),
        observations: Set(payload.observations.filter(|o| !o.trim().is_empty())),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;
    for (extra, quantity) in &extras {
        CartExtraActive {
            id: Set(Uuid::new_v4()),
            cart_item_id: Set(item.id),
            extra_id: Set(extra.id),
            quantity: Set(*quantity),
        }
        .insert(&txn)
        .await?;
    }
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "cart_add",
        "cart_items",
        serde_json::json!({ "product_id": product.id, "quantity": item.quantity }),
    )
    .await;

    let row = CartRow {
        item,
        product,
        extras,
    };
    Ok(ApiResponse::ok("Added to cart", row.into_line()))
}

async fn owned_item(state: &AppState, user: &AuthUser, item_id: Uuid) -> AppResult<CartModel> {
    CartItems::find_by_id(item_id)
        .filter(CartCol::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn update_quantity(
    state: &AppState,
    user: &AuthUser,
    item_id: Uuid,
    payload: UpdateCartItemRequest,
) -> AppResult<ApiResponse<CartLine>> {
    if payload.quantity < 1 {
        return Err(AppError::BadRequest("quantity must be at least 1".into()));
    }
    let item = owned_item(state, user, item_id).await?;
    let product = Products::find_by_id(item.product_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let others = quantity_in_cart(state, user.user_id, product.id, Some(item.id)).await?;
    if !within_stock(product.stock, others, payload.quantity) {
        return Err(AppError::business(format!(
            "Insufficient stock for {}",
            product.name
        )));
    }

    let mut active: CartActive = item.into();
    active.quantity = Set(payload.quantity);
    let item = active.update(&state.orm).await?;

    let selections = CartItemExtras::find()
        .filter(CartExtraCol::CartItemId.eq(item.id))
        .all(&state.orm)
        .await?;
    let extras = active_extras(&state.orm, selections.iter().map(|s| s.extra_id)).await?;
    let extras = selections
        .into_iter()
        .filter_map(|s| extras.get(&s.extra_id).map(|e| (e.clone(), s.quantity)))
        .collect();

    let row = CartRow {
        item,
        product,
        extras,
    };
    Ok(ApiResponse::ok("Cart updated", row.into_line()))
}

pub async fn remove_from_cart(
    state: &AppState,
    user: &AuthUser,
    item_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = CartItems::delete_many()
        .filter(CartCol::Id.eq(item_id))
        .filter(CartCol::UserId.eq(user.user_id))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "cart_remove",
        "cart_items",
        serde_json::json!({ "cart_item_id": item_id }),
    )
    .await;

    Ok(ApiResponse::ok("Removed", serde_json::json!({})))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_check_counts_units_already_held() {
        assert!(within_stock(5, 0, 5));
        assert!(within_stock(5, 2, 3));
        assert!(!within_stock(5, 2, 4));
    }

    #[test]
    fn stock_check_does_not_wrap_on_huge_quantities() {
        assert!(!within_stock(5, 1, i32::MAX));
        assert!(!within_stock(i32::MAX, i64::from(i32::MAX), i32::MAX));
    }
}

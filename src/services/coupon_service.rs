use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, sea_query::LockType,
};
use uuid::Uuid;

use crate::{
    audit,
    domain::coupon::{CouponRules, DiscountKind},
    dto::coupons::{CouponList, CreateCouponRequest, UpdateCouponRequest},
    entity::coupons::{ActiveModel, Column, Entity as Coupons, Model as CouponModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Coupon,
    response::ApiResponse,
    state::AppState,
};

pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Validity rules of a stored coupon. Unknown discount types are treated as
/// inactive so they can never discount anything.
pub fn rules_for(model: &CouponModel) -> CouponRules {
    let kind = model.discount_type.parse::<DiscountKind>();
    CouponRules {
        active: model.active && kind.is_ok(),
        kind: kind.unwrap_or(DiscountKind::Fixed),
        value: model.discount_value,
        min_purchase: model.min_purchase,
        max_uses: model.max_uses,
        times_used: model.times_used,
        valid_from: model.valid_from.map(|dt| dt.with_timezone(&Utc)),
        valid_until: model.valid_until.map(|dt| dt.with_timezone(&Utc)),
    }
}

pub async fn find_by_code<C: ConnectionTrait>(
    conn: &C,
    code: &str,
    lock: bool,
) -> AppResult<Option<CouponModel>> {
    let mut finder = Coupons::find().filter(Column::Code.eq(normalize_code(code)));
    if lock {
        finder = finder.lock(LockType::Update);
    }
    Ok(finder.one(conn).await?)
}

fn validate_value(kind: DiscountKind, value: i64, min_purchase: i64) -> AppResult<()> {
    if value <= 0 {
        return Err(AppError::BadRequest("discount_value must be positive".into()));
    }
    if kind == DiscountKind::Percentage && value > 100 {
        return Err(AppError::BadRequest(
            "percentage discount must not exceed 100".into(),
        ));
    }
    if min_purchase < 0 {
        return Err(AppError::BadRequest("min_purchase must not be negative".into()));
    }
    Ok(())
}

pub async fn list_coupons(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<CouponList>> {
    ensure_admin(user)?;
    let items = Coupons::find()
        .order_by_desc(Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Coupon::from)
        .collect();
    Ok(ApiResponse::ok("Coupons", CouponList { items }))
}

pub async fn create_coupon(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCouponRequest,
) -> AppResult<ApiResponse<Coupon>> {
    ensure_admin(user)?;
    let code = normalize_code(&payload.code);
    if code.is_empty() {
        return Err(AppError::BadRequest("code is required".into()));
    }
    validate_value(
        payload.discount_type,
        payload.discount_value,
        payload.min_purchase,
    )?;

    let coupon = ActiveModel {
        id: Set(Uuid::new_v4()),
        code: Set(code),
        discount_type: Set(payload.discount_type.as_str().to_string()),
        discount_value: Set(payload.discount_value),
        min_purchase: Set(payload.min_purchase),
        max_uses: Set(payload.max_uses),
        times_used: Set(0),
        valid_from: Set(Some(payload.valid_from.unwrap_or_else(Utc::now).into())),
        valid_until: Set(payload.valid_until.map(Into::into)),
        active: Set(true),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await
    .map_err(|e| AppError::on_unique_violation(e, "Coupon code already exists"))?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "coupon_create",
        "coupons",
        serde_json::json!({ "coupon_id": coupon.id, "code": coupon.code }),
    )
    .await;

    Ok(ApiResponse::ok("Coupon created", coupon.into()))
}

pub async fn update_coupon(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCouponRequest,
) -> AppResult<ApiResponse<Coupon>> {
    ensure_admin(user)?;
    let existing = Coupons::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let current = rules_for(&existing);
    validate_value(
        payload.discount_type.unwrap_or(current.kind),
        payload.discount_value.unwrap_or(current.value),
        payload.min_purchase.unwrap_or(current.min_purchase),
    )?;

    let mut active: ActiveModel = existing.into();
    if let Some(kind) = payload.discount_type {
        active.discount_type = Set(kind.as_str().to_string());
    }
    if let Some(value) = payload.discount_value {
        active.discount_value = Set(value);
    }
    if let Some(min) = payload.min_purchase {
        active.min_purchase = Set(min);
    }
    if let Some(max) = payload.max_uses {
        active.max_uses = Set(Some(max));
    }
    if let Some(from) = payload.valid_from {
        active.valid_from = Set(Some(from.into()));
    }
    if let Some(until) = payload.valid_until {
        active.valid_until = Set(Some(until.into()));
    }
    if let Some(flag) = payload.active {
        active.active = Set(flag);
    }
    let coupon = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "coupon_update",
        "coupons",
        serde_json::json!({ "coupon_id": coupon.id }),
    )
    .await;

    Ok(ApiResponse::ok("Updated", coupon.into()))
}

pub async fn toggle_coupon(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Coupon>> {
    ensure_admin(user)?;
    let existing = Coupons::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let flag = !existing.active;
    let mut active: ActiveModel = existing.into();
    active.active = Set(flag);
    let coupon = active.update(&state.orm).await?;
    let message = if coupon.active {
        "Coupon activated"
    } else {
        "Coupon deactivated"
    };
    Ok(ApiResponse::ok(message, coupon.into()))
}

pub async fn delete_coupon(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Coupons::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "coupon_delete",
        "coupons",
        serde_json::json!({ "coupon_id": id }),
    )
    .await;

    Ok(ApiResponse::ok("Deleted", serde_json::json!({})))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(discount_type: &str) -> CouponModel {
        CouponModel {
            id: Uuid::new_v4(),
            code: "PROMO10".into(),
            discount_type: discount_type.into(),
            discount_value: 10,
            min_purchase: 0,
            max_uses: None,
            times_used: 0,
            valid_from: None,
            valid_until: None,
            active: true,
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn codes_are_upper_cased() {
        assert_eq!(normalize_code("  promo10 "), "PROMO10");
    }

    #[test]
    fn stored_percentage_coupon_discounts_ten_percent() {
        let rules = rules_for(&model("percentage"));
        assert!(rules.is_valid(Utc::now()));
        assert_eq!(rules.discount_for(10_000), 1_000);
    }

    #[test]
    fn unknown_discount_type_is_never_valid() {
        assert!(!rules_for(&model("bogus")).is_valid(Utc::now()));
    }

    #[test]
    fn percentage_above_hundred_is_rejected() {
        assert!(validate_value(DiscountKind::Percentage, 150, 0).is_err());
        assert!(validate_value(DiscountKind::Fixed, 15_000, 0).is_ok());
    }
}

use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait, sea_query::LockType,
};
use uuid::Uuid;

use crate::{
    audit,
    domain::{
        coupon::DiscountKind,
        loyalty::{self, EARN, REDEEM, REWARD_TIERS, RedeemRejection},
        money::format_brl,
        status::PaymentStatus,
    },
    dto::loyalty::{LoyaltySummary, RedeemRequest, RedeemResult},
    entity::{
        coupons::ActiveModel as CouponActive,
        loyalty_accounts::{
            ActiveModel as AccountActive, Column as AccountCol, Entity as LoyaltyAccounts,
            Model as AccountModel,
        },
        loyalty_transactions::{
            ActiveModel as TxActive, Column as TxCol, Entity as LoyaltyTransactions,
        },
        orders::Model as OrderModel,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::ApiResponse,
    state::AppState,
};

const RECENT_TRANSACTIONS: u64 = 20;

/// The user's account, created empty on first use.
async fn account_for<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    lock: bool,
) -> AppResult<AccountModel> {
    let fresh = AccountActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        points: Set(0),
        total_earned: Set(0),
        total_spent: Set(0),
        updated_at: NotSet,
    };
    LoyaltyAccounts::insert(fresh)
        .on_conflict(
            OnConflict::column(AccountCol::UserId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    let mut finder = LoyaltyAccounts::find().filter(AccountCol::UserId.eq(user_id));
    if lock {
        finder = finder.lock(LockType::Update);
    }
    finder
        .one(conn)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("loyalty account missing after upsert")))
}

/// Credits points for an approved order. Returns the points credited, or
/// `None` when the order is not approved or was already credited.
pub async fn earn_for_order<C: ConnectionTrait>(
    conn: &C,
    order: &OrderModel,
) -> AppResult<Option<i32>> {
    if order.payment_status != PaymentStatus::Approved.as_str() {
        return Ok(None);
    }

    let account = account_for(conn, order.user_id, true).await?;
    let already = LoyaltyTransactions::find()
        .filter(TxCol::OrderId.eq(order.id))
        .filter(TxCol::TransactionType.eq(EARN))
        .count(conn)
        .await?;
    if already > 0 {
        return Ok(None);
    }

    let points = loyalty::points_for_total(order.total);
    if points <= 0 {
        return Ok(None);
    }

    LoyaltyAccounts::update_many()
        .col_expr(AccountCol::Points, Expr::col(AccountCol::Points).add(points))
        .col_expr(
            AccountCol::TotalEarned,
            Expr::col(AccountCol::TotalEarned).add(points),
        )
        .col_expr(AccountCol::UpdatedAt, Expr::current_timestamp().into())
        .filter(AccountCol::Id.eq(account.id))
        .exec(conn)
        .await?;

    TxActive {
        id: Set(Uuid::new_v4()),
        loyalty_account_id: Set(account.id),
        points: Set(points),
        transaction_type: Set(EARN.to_string()),
        description: Set(Some(format!("Pedido {}", order.order_code))),
        order_id: Set(Some(order.id)),
        created_at: NotSet,
    }
    .insert(conn)
    .await?;

    tracing::debug!(order_id = %order.id, points, "loyalty points credited");
    Ok(Some(points))
}

pub async fn summary(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<LoyaltySummary>> {
    let account = account_for(&state.orm, user.user_id, false).await?;
    let transactions = LoyaltyTransactions::find()
        .filter(TxCol::LoyaltyAccountId.eq(account.id))
        .order_by_desc(TxCol::CreatedAt)
        .limit(RECENT_TRANSACTIONS)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let summary = LoyaltySummary {
        available_rewards: loyalty::available_rewards(account.points),
        reward_tiers: REWARD_TIERS.to_vec(),
        transactions,
        account: account.into(),
    };
    Ok(ApiResponse::ok("Loyalty", summary))
}

pub async fn redeem(
    state: &AppState,
    user: &AuthUser,
    payload: RedeemRequest,
) -> AppResult<ApiResponse<RedeemResult>> {
    let txn = state.orm.begin().await?;
    let account = account_for(&txn, user.user_id, true).await?;

    let tier = loyalty::check_redeem(account.points, payload.points).map_err(|rejection| {
        match rejection {
            RedeemRejection::InsufficientPoints { .. } => AppError::business(rejection.to_string()),
            RedeemRejection::UnknownTier(_) => AppError::BadRequest(rejection.to_string()),
        }
    })?;

    let now = Utc::now();
    let code = loyalty::reward_coupon_code(now);
    let coupon = CouponActive {
        id: Set(Uuid::new_v4()),
        code: Set(code.clone()),
        discount_type: Set(DiscountKind::Fixed.as_str().to_string()),
        discount_value: Set(tier.discount),
        min_purchase: Set(0),
        max_uses: Set(Some(1)),
        times_used: Set(0),
        valid_from: Set(Some(now.into())),
        valid_until: Set(Some(loyalty::reward_coupon_expiry(now).into())),
        active: Set(true),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let points_left = account.points - tier.points;
    let total_spent = account.total_spent + tier.points;
    let mut active: AccountActive = account.into();
    active.points = Set(points_left);
    active.total_spent = Set(total_spent);
    active.updated_at = Set(now.into());
    let account = active.update(&txn).await?;

    TxActive {
        id: Set(Uuid::new_v4()),
        loyalty_account_id: Set(account.id),
        points: Set(-tier.points),
        transaction_type: Set(REDEEM.to_string()),
        description: Set(Some(format!(
            "Resgate: cupom de {} - {}",
            format_brl(tier.discount),
            code
        ))),
        order_id: Set(None),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "loyalty_redeem",
        "loyalty_accounts",
        serde_json::json!({ "points": tier.points, "coupon": code }),
    )
    .await;

    Ok(ApiResponse::ok(
        format!(
            "Coupon {} worth {} created, valid for {} days",
            code,
            format_brl(tier.discount),
            loyalty::COUPON_VALIDITY_DAYS
        ),
        RedeemResult {
            coupon: coupon.into(),
            account: account.into(),
        },
    ))
}

use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use password_hash::rand_core::OsRng;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::auth::{Claims, LoginRequest, LoginResponse, RegisterRequest},
    entity::users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    error::{AppError, AppResult},
    middleware::auth::{Role, sign_token},
    models::User,
    response::{ApiResponse, Meta},
    state::AppState,
};

const MIN_PASSWORD_LEN: usize = 6;

/// Expiry for a token issued now, as the `exp` claim.
pub fn expiry_after(hours: i64) -> AppResult<usize> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(hours))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;
    Ok(expiration.timestamp() as usize)
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    let RegisterRequest {
        username,
        phone,
        email,
        password,
    } = payload;
    let username = username.trim().to_string();
    let phone = phone.trim().to_string();
    let email = email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty());

    if username.is_empty() || phone.is_empty() {
        return Err(AppError::BadRequest("username and phone are required".into()));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "password must have at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let mut taken = Condition::any().add(UserCol::Phone.eq(phone.clone()));
    if let Some(email) = &email {
        taken = taken.add(UserCol::Email.eq(email.clone()));
    }
    if Users::find().filter(taken).one(&state.orm).await?.is_some() {
        return Err(AppError::BadRequest(
            "Phone or email is already registered".into(),
        ));
    }

    let user = UserActive {
        id: Set(Uuid::new_v4()),
        username: Set(username),
        email: Set(email),
        phone: Set(phone),
        password_hash: Set(Some(hash_password(&password)?)),
        role: Set(Role::Customer.as_str().to_string()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await
    .map_err(|e| AppError::on_unique_violation(e, "Phone or email is already registered"))?;

    audit::record(
        &state.pool,
        Some(user.id),
        "user_register",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::ok("User created", user.into()))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { login, password } = payload;
    let login = login.trim();
    let user = Users::find()
        .filter(
            Condition::any()
                .add(UserCol::Email.eq(login.to_lowercase()))
                .add(UserCol::Phone.eq(login)),
        )
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid login or password".into()))?;

    // Accounts created at the counter have no password and cannot log in.
    let stored = user
        .password_hash
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("Invalid login or password".into()))?;
    let parsed_hash = PasswordHash::new(stored)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::BadRequest("Invalid login or password".into()));
    }

    let claims = Claims {
        sub: user.id.to_string(),
        role: user.role.clone(),
        exp: expiry_after(24)?,
    };
    let token = sign_token(&claims)?;

    audit::record(
        &state.pool,
        Some(user.id),
        "user_login",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse {
            token,
            user: user.into(),
        },
        Some(Meta::empty()),
    ))
}

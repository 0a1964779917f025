use std::{fmt, str::FromStr};

use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::{
    config::jwt_secret,
    dto::auth::{Claims, TableClaims},
    error::{AppError, AppResult},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Customer,
    Admin,
    Manager,
    Waiter,
    Kitchen,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Waiter => "waiter",
            Role::Kitchen => "kitchen",
        }
    }

    pub fn can(&self, capability: Capability) -> bool {
        match capability {
            Capability::ManageStore => matches!(self, Role::Admin | Role::Manager),
            Capability::OperatePdv => matches!(self, Role::Admin | Role::Manager | Role::Waiter),
            Capability::OperateKitchen => {
                matches!(self, Role::Admin | Role::Manager | Role::Kitchen)
            }
        }
    }

    pub fn is_staff(&self) -> bool {
        !matches!(self, Role::Customer)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Role::Customer),
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "waiter" => Ok(Role::Waiter),
            "kitchen" => Ok(Role::Kitchen),
            other => Err(format!("Unknown role {other}")),
        }
    }
}

/// What a route needs from the caller, checked with [`ensure_capability`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Back-office: orders, catalog, coupons, settings.
    ManageStore,
    /// Tables, comandas and the cash register.
    OperatePdv,
    /// Kitchen display and preparation statuses.
    OperateKitchen,
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
}

pub fn ensure_capability(user: &AuthUser, capability: Capability) -> Result<(), AppError> {
    if !user.role.can(capability) {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_capability(user, Capability::ManageStore)
}

/// A guest holding the PIN of an open comanda at a table.
#[derive(Debug, Clone)]
pub struct TableSession {
    pub table_id: Uuid,
    pub comanda_id: Uuid,
}

pub fn sign_token<T: Serialize>(claims: &T) -> AppResult<String> {
    let secret = jwt_secret()?;
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

fn decode_claims<T: DeserializeOwned>(token: &str) -> AppResult<T> {
    let secret = jwt_secret()?;
    let decoded = decode::<T>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;
    Ok(decoded.claims)
}

pub fn decode_user_token(token: &str) -> AppResult<AuthUser> {
    let claims: Claims = decode_claims(token)?;
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;
    let role = claims
        .role
        .parse::<Role>()
        .map_err(|_| AppError::Unauthorized("Invalid role in token".into()))?;
    Ok(AuthUser { user_id, role })
}

pub fn decode_table_token(token: &str) -> AppResult<TableSession> {
    let claims: TableClaims = decode_claims(token)?;
    Ok(TableSession {
        table_id: claims.table_id,
        comanda_id: claims.comanda_id,
    })
}

fn bearer_token(parts: &axum::http::request::Parts) -> AppResult<&str> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

    auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".into()))
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        decode_user_token(bearer_token(parts)?)
    }
}

impl<S> FromRequestParts<S> for TableSession
where
    S: Send + Sync,
{
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        decode_table_token(bearer_token(parts)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            role,
        }
    }

    #[test]
    fn capabilities_by_role() {
        assert!(ensure_admin(&user(Role::Manager)).is_ok());
        assert!(ensure_admin(&user(Role::Waiter)).is_err());
        assert!(ensure_capability(&user(Role::Waiter), Capability::OperatePdv).is_ok());
        assert!(ensure_capability(&user(Role::Kitchen), Capability::OperatePdv).is_err());
        assert!(ensure_capability(&user(Role::Kitchen), Capability::OperateKitchen).is_ok());
        assert!(ensure_capability(&user(Role::Customer), Capability::OperateKitchen).is_err());
    }

    #[test]
    fn roles_parse_from_storage() {
        assert_eq!("waiter".parse::<Role>(), Ok(Role::Waiter));
        assert!("user".parse::<Role>().is_err());
        assert!(!Role::Customer.is_staff());
    }

    #[test]
    fn forbidden_role_maps_to_forbidden() {
        let err = ensure_capability(&user(Role::Customer), Capability::ManageStore).unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
    }
}

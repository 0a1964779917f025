//! Store settings: typed view over key/value rows.
//!
//! `SettingsService` owns parsing and defaults; where the rows live is
//! decided by the injected `SettingsStore` (database in the server, memory
//! in tests).

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use sea_orm::{ActiveValue::NotSet, EntityTrait, Set, sea_query::{Expr, OnConflict}};
use serde::Serialize;
use tokio::sync::RwLock;
use utoipa::ToSchema;

use crate::{
    db::OrmConn,
    domain::pricing::{DeliveryType, ShippingPolicy},
    dto::settings::UpdateSettingsRequest,
    entity::store_settings::{ActiveModel as SettingActive, Column as SettingCol, Entity as StoreSettingRows},
    error::{AppError, AppResult},
};

pub const STORE_NAME: &str = "store_name";
pub const STORE_DESCRIPTION: &str = "store_description";
pub const PICKUP_ENABLED: &str = "pickup_enabled";
pub const PICKUP_ADDRESS: &str = "pickup_address";
pub const DELIVERY_ENABLED: &str = "delivery_enabled";
pub const SHIPPING_COST: &str = "shipping_cost";
pub const FREE_SHIPPING_MIN: &str = "free_shipping_min";

pub const DEFAULT_SHIPPING_COST: i64 = 1_500;
pub const DEFAULT_FREE_SHIPPING_MIN: i64 = 30_000;

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn all(&self) -> AppResult<HashMap<String, String>>;
    async fn set(&self, key: &str, value: &str) -> AppResult<()>;
}

pub struct DbSettingsStore {
    orm: OrmConn,
}

impl DbSettingsStore {
    pub fn new(orm: OrmConn) -> Self {
        Self { orm }
    }
}

#[async_trait]
impl SettingsStore for DbSettingsStore {
    async fn all(&self) -> AppResult<HashMap<String, String>> {
        let rows = StoreSettingRows::find().all(&self.orm).await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| row.setting_value.map(|value| (row.setting_key, value)))
            .collect())
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let row = SettingActive {
            id: Set(uuid::Uuid::new_v4()),
            setting_key: Set(key.to_string()),
            setting_value: Set(Some(value.to_string())),
            updated_at: NotSet,
        };
        StoreSettingRows::insert(row)
            .on_conflict(
                OnConflict::column(SettingCol::SettingKey)
                    .update_column(SettingCol::SettingValue)
                    .value(SettingCol::UpdatedAt, Expr::current_timestamp())
                    .to_owned(),
            )
            .exec(&self.orm)
            .await?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemorySettingsStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn all(&self) -> AppResult<HashMap<String, String>> {
        Ok(self.values.read().await.clone())
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StoreSettings {
    pub store_name: String,
    pub store_description: Option<String>,
    pub pickup_enabled: bool,
    pub pickup_address: Option<String>,
    pub delivery_enabled: bool,
    /// Flat delivery fee in cents.
    pub shipping_cost: i64,
    /// Subtotal in cents from which delivery is free.
    pub free_shipping_min: i64,
}

impl StoreSettings {
    fn from_values(values: &HashMap<String, String>) -> Self {
        let text = |key: &str| values.get(key).filter(|v| !v.trim().is_empty()).cloned();
        let flag = |key: &str, default: bool| {
            values
                .get(key)
                .map(|v| matches!(v.trim(), "true" | "1" | "on"))
                .unwrap_or(default)
        };
        let cents = |key: &str, default: i64| {
            values
                .get(key)
                .and_then(|v| v.trim().parse::<i64>().ok())
                .filter(|v| *v >= 0)
                .unwrap_or(default)
        };
        Self {
            store_name: text(STORE_NAME).unwrap_or_else(|| "Restaurante".to_string()),
            store_description: text(STORE_DESCRIPTION),
            pickup_enabled: flag(PICKUP_ENABLED, true),
            pickup_address: text(PICKUP_ADDRESS),
            delivery_enabled: flag(DELIVERY_ENABLED, true),
            shipping_cost: cents(SHIPPING_COST, DEFAULT_SHIPPING_COST),
            free_shipping_min: cents(FREE_SHIPPING_MIN, DEFAULT_FREE_SHIPPING_MIN),
        }
    }

    pub fn shipping_policy(&self) -> ShippingPolicy {
        ShippingPolicy {
            flat_fee: self.shipping_cost,
            free_shipping_min: self.free_shipping_min,
        }
    }

    pub fn allows(&self, delivery: DeliveryType) -> bool {
        match delivery {
            DeliveryType::Delivery => self.delivery_enabled,
            DeliveryType::Pickup => self.pickup_enabled,
        }
    }
}

#[derive(Clone)]
pub struct SettingsService {
    store: Arc<dyn SettingsStore>,
}

impl SettingsService {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    pub async fn store_settings(&self) -> AppResult<StoreSettings> {
        Ok(StoreSettings::from_values(&self.store.all().await?))
    }

    pub async fn shipping_policy(&self) -> AppResult<ShippingPolicy> {
        Ok(self.store_settings().await?.shipping_policy())
    }

    pub async fn update(&self, req: UpdateSettingsRequest) -> AppResult<StoreSettings> {
        let mut writes: Vec<(&str, String)> = Vec::new();
        if let Some(name) = req.store_name {
            if name.trim().is_empty() {
                return Err(AppError::BadRequest("store_name must not be empty".into()));
            }
            writes.push((STORE_NAME, name.trim().to_string()));
        }
        if let Some(description) = req.store_description {
            writes.push((STORE_DESCRIPTION, description));
        }
        if let Some(enabled) = req.pickup_enabled {
            writes.push((PICKUP_ENABLED, enabled.to_string()));
        }
        if let Some(address) = req.pickup_address {
            writes.push((PICKUP_ADDRESS, address));
        }
        if let Some(enabled) = req.delivery_enabled {
            writes.push((DELIVERY_ENABLED, enabled.to_string()));
        }
        for (key, value) in [
            (SHIPPING_COST, req.shipping_cost),
            (FREE_SHIPPING_MIN, req.free_shipping_min),
        ] {
            if let Some(value) = value {
                if value < 0 {
                    return Err(AppError::BadRequest(format!("{key} must not be negative")));
                }
                writes.push((key, value.to_string()));
            }
        }

        for (key, value) in &writes {
            self.store.set(key, value).await?;
        }
        self.store_settings().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_service() -> SettingsService {
        SettingsService::new(Arc::new(MemorySettingsStore::new()))
    }

    #[tokio::test]
    async fn defaults_apply_when_empty() {
        let settings = memory_service().store_settings().await.unwrap();
        assert_eq!(settings.shipping_cost, 1_500);
        assert_eq!(settings.free_shipping_min, 30_000);
        assert!(settings.pickup_enabled);
        assert!(settings.delivery_enabled);
    }

    #[tokio::test]
    async fn update_persists_and_reads_back() {
        let service = memory_service();
        let updated = service
            .update(UpdateSettingsRequest {
                shipping_cost: Some(900),
                delivery_enabled: Some(false),
                pickup_address: Some("Rua A, 10".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.shipping_cost, 900);
        assert!(!updated.allows(DeliveryType::Delivery));
        assert!(updated.allows(DeliveryType::Pickup));
        assert_eq!(updated.pickup_address.as_deref(), Some("Rua A, 10"));
    }

    #[tokio::test]
    async fn negative_amounts_are_rejected_without_writes() {
        let service = memory_service();
        let err = service
            .update(UpdateSettingsRequest {
                store_name: Some("Casa".into()),
                free_shipping_min: Some(-1),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        let settings = service.store_settings().await.unwrap();
        assert_eq!(settings.store_name, "Restaurante");
    }

    #[test]
    fn garbage_values_fall_back_to_defaults() {
        let mut values = HashMap::new();
        values.insert(SHIPPING_COST.to_string(), "abc".to_string());
        values.insert(PICKUP_ENABLED.to_string(), "false".to_string());
        let settings = StoreSettings::from_values(&values);
        assert_eq!(settings.shipping_cost, DEFAULT_SHIPPING_COST);
        assert!(!settings.pickup_enabled);
    }
}

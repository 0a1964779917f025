use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::{DbPool, OrmConn, create_orm_conn},
    notify::NotificationHub,
    settings::{DbSettingsStore, SettingsService},
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub settings: SettingsService,
    pub notifier: NotificationHub,
    pub public_base_url: Arc<str>,
}

impl AppState {
    pub fn new(pool: DbPool, config: &AppConfig) -> Self {
        let orm = create_orm_conn(pool.clone());
        let settings = SettingsService::new(Arc::new(DbSettingsStore::new(orm.clone())));
        Self {
            pool,
            orm,
            settings,
            notifier: NotificationHub::new(config.notify_buffer),
            public_base_url: Arc::from(config.public_base_url.as_str()),
        }
    }
}

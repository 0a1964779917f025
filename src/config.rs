use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_db_connections: u32,
    /// Base URL printed on table QR codes, e.g. `https://loja.example.com`.
    pub public_base_url: String,
    /// Capacity of the notification broadcast channel.
    pub notify_buffer: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let max_db_connections = env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);
        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://{host}:{port}"));
        let notify_buffer = env::var("NOTIFY_BUFFER")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(256);
        Ok(Self {
            port,
            database_url,
            host,
            max_db_connections,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            notify_buffer,
        })
    }
}

/// Secret used to sign user and table-session tokens.
pub fn jwt_secret() -> anyhow::Result<String> {
    env::var("JWT_SECRET").map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))
}

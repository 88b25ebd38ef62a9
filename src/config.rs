use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Days a signed token stays valid.
    pub token_ttl_days: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory where uploaded files are written.
    pub uploads_dir: std::path::PathBuf,
    /// Maximum accepted upload size in bytes.
    pub max_upload_size: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("auth.token_ttl_days", 7)?
            .set_default("storage.uploads_dir", "./uploads")?
            .set_default("storage.max_upload_size", 50 * 1024 * 1024)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., RESEARCH_HUB__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("RESEARCH_HUB").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

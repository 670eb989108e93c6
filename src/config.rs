use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub executor: ExecutorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

/// 批量写入配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// 同时进行的写入数
    pub concurrency: usize,
    /// 单次写入超时
    pub write_timeout_secs: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            write_timeout_secs: 30,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "postgres://localhost/inventory".to_string(),
                max_connections: 20,
                acquire_timeout_secs: 10,
            },
            executor: ExecutorConfig::default(),
        }
    }
}

impl AppConfig {
    /// 加载配置: 默认值 -> reconcile.toml (可选) -> RECONCILE_* 环境变量
    ///
    /// 兼容 DATABASE_URL / SERVER_HOST / SERVER_PORT。
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("reconcile")
    }

    /// 同 `load`，配置文件名（不含扩展名）由调用方指定
    pub fn load_from(file: &str) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", defaults.server.port as i64)?
            .set_default("database.url", defaults.database.url)?
            .set_default("database.max_connections", defaults.database.max_connections as i64)?
            .set_default("database.acquire_timeout_secs", defaults.database.acquire_timeout_secs as i64)?
            .set_default("executor.concurrency", defaults.executor.concurrency as i64)?
            .set_default("executor.write_timeout_secs", defaults.executor.write_timeout_secs as i64)?
            .add_source(File::with_name(file).required(false))
            .add_source(
                Environment::with_prefix("RECONCILE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option(
                "server.port",
                std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<i64>().ok()),
            )?
            .build()?
            .try_deserialize()
    }
}

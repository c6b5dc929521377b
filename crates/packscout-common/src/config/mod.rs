//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, BridgeConfig, ConfigError, DatabaseConfig, Environment, IngestConfig,
    IngestMode, RedisConfig,
};

//! Layered configuration: `config/default`, `config/local`, then `APP__*` env

mod app_config;

pub use app_config::{
    AppConfig, AuthConfig, LimitsConfig, LogFormat, LoggingConfig, NotificationConfig,
    ServerConfig, StorageSettings,
};

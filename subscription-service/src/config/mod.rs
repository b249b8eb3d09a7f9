//! Service configuration.
//!
//! Values come from an optional `configuration` file followed by
//! `SUBSCRIPTION__*` environment variables, e.g.
//! `SUBSCRIPTION__SERVER__PORT=3010` or `SUBSCRIPTION__STORE__BACKEND=mongo`.

use config::{Config as Cfg, Environment, File};
use secrecy::Secret;
use serde::Deserialize;
use std::time::Duration;

use crate::error::AppError;

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub cache: CacheConfig,
    pub observability: ObservabilityConfig,
    pub features: FeatureConfig,
    pub service_name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Mongo,
}

#[derive(Deserialize, Clone, Debug)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub mongodb_uri: Option<Secret<String>>,
    pub mongodb_database: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct CacheConfig {
    pub ttl_seconds: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct FeatureConfig {
    pub beta_testing_enabled: bool,
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .set_default("service_name", "subscription-service")?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3010)?
            .set_default("store.backend", "memory")?
            .set_default("store.mongodb_database", "subscription_db")?
            .set_default("cache.ttl_seconds", 30)?
            .set_default("observability.log_level", "info,subscription_service=debug")?
            .set_default("features.beta_testing_enabled", false)?
            .add_source(File::with_name("configuration").required(false))
            .add_source(Environment::with_prefix("SUBSCRIPTION").separator("__"))
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.store.backend == StoreBackend::Mongo && self.store.mongodb_uri.is_none() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "store.mongodb_uri is required when store.backend is mongo"
            )));
        }
        Ok(())
    }

    /// In-memory configuration on a random port, used by tests.
    pub fn for_tests() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            store: StoreConfig {
                backend: StoreBackend::Memory,
                mongodb_uri: None,
                mongodb_database: "subscription_test".to_string(),
            },
            cache: CacheConfig { ttl_seconds: 30 },
            observability: ObservabilityConfig {
                log_level: "warn".to_string(),
                otlp_endpoint: None,
            },
            features: FeatureConfig {
                beta_testing_enabled: false,
            },
            service_name: "subscription-service-test".to_string(),
        }
    }
}

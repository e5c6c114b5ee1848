//! Configuration management for kms-jose
//!
//! Settings come from `KMS_JOSE_*` environment variables (optionally seeded
//! from a `.env` file), with defaults for everything but the key ids.

use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::collections::HashMap;
use std::env;

pub const ENV_PREFIX: &str = "KMS_JOSE";
pub const DEFAULT_DATA_KEY_SPEC: &str = "AES_256";
pub const DEFAULT_SIGNING_ALGORITHM: &str = "RSASSA_PSS_SHA_256";
pub const DEFAULT_ENCRYPTION_ALGORITHM: &str = "SYMMETRIC_DEFAULT";

/// KMS connection and key configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct KmsJoseConfig {
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub signing_key_id: Option<String>,
    pub wrapping_key_id: Option<String>,
    pub cek_key_id: Option<String>,
    pub data_key_spec: String,
    pub signing_algorithm: String,
    pub encryption_algorithm: String,
    pub log_level: String,
    pub log_format: String,
}

impl KmsJoseConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        let mut config = Self::load(Environment::with_prefix(ENV_PREFIX))?;
        if config.region.is_none() {
            config.region = env::var("AWS_REGION").ok();
        }
        Ok(config)
    }

    /// Load configuration from an explicit variable map instead of the process environment
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let aws_region = vars.get("AWS_REGION").cloned();
        let source = vars.into_iter().collect::<config::Map<String, String>>();

        let mut config = Self::load(Environment::with_prefix(ENV_PREFIX).source(Some(source)))?;
        if config.region.is_none() {
            config.region = aws_region;
        }
        Ok(config)
    }

    fn load(environment: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("data_key_spec", DEFAULT_DATA_KEY_SPEC)?
            .set_default("signing_algorithm", DEFAULT_SIGNING_ALGORITHM)?
            .set_default("encryption_algorithm", DEFAULT_ENCRYPTION_ALGORITHM)?
            .set_default("log_level", "info")?
            .set_default("log_format", "console")?
            .add_source(environment)
            .build()?
            .try_deserialize()
    }

    /// Get log level, defaulting to "info"
    pub fn log_level(&self) -> &str {
        if self.log_level.is_empty() {
            "info"
        } else {
            &self.log_level
        }
    }
}

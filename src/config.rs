use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for cardstash
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CardstashConfig {
    /// Naming service settings
    pub naming: NamingConfig,
    /// Collection store settings
    pub store: StoreConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Endpoint that suggests a collection name for an item payload
    pub endpoint: String,
    /// Bearer token for the naming endpoint (can be set via env var)
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the collection database
    pub data_dir: String,
    /// Enable automatic migrations on open
    pub auto_migrate: bool,
}

impl StoreConfig {
    /// Connection URL for the sqlite-backed store.
    pub fn database_url(&self) -> String {
        format!("sqlite:{}/collections.db", self.data_dir)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level
    pub log_level: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8787/v1/collection-name".to_string(),
            api_key: None, // Will be read from env var or .env
            timeout_seconds: 30,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: ".cardstash".to_string(),
            auto_migrate: true,
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Default for CardstashConfig {
    fn default() -> Self {
        Self {
            naming: NamingConfig::default(),
            store: StoreConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl CardstashConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (cardstash.toml)
    /// 3. Environment variables (prefixed with CARDSTASH_)
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder();

        if Path::new("cardstash.toml").exists() {
            builder = builder.add_source(File::with_name("cardstash"));
        }

        builder = builder.add_source(
            Environment::with_prefix("CARDSTASH")
                .separator("_")
                .try_parsing(true),
        );

        let config = builder.build()?;

        let mut cardstash_config: CardstashConfig = config.try_deserialize()?;

        // Special handling for the naming API key - the env source cannot
        // reach a nested field whose name itself contains the separator
        if cardstash_config.naming.api_key.is_none() {
            if let Ok(key) = std::env::var("CARDSTASH_NAMING_API_KEY") {
                cardstash_config.naming.api_key = Some(key);
            }
        }

        Ok(cardstash_config)
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

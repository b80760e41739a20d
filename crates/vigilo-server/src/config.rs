use serde::{Deserialize, Serialize};
use std::time::Duration;
use vigilo_common::types::RuleFields;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub index: IndexConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            data_dir: default_data_dir(),
            database: DatabaseConfig::default(),
            index: IndexConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Full connection URL. When unset, `vigilo.db` under `data_dir` is used.
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Upper bound for a metric index query while enriching a response.
    #[serde(default = "default_index_timeout_ms")]
    pub timeout_ms: u64,
    /// Metric names known at startup.
    #[serde(default)]
    pub metrics: Vec<String>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_index_timeout_ms(),
            metrics: Vec::new(),
        }
    }
}

impl IndexConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_http_port() -> u16 {
    8080
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_index_timeout_ms() -> u64 {
    200
}

impl ServerConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Database URL, defaulting to `sqlite://{data_dir}/vigilo.db?mode=rwc`.
    pub fn database_url(&self) -> String {
        match &self.database.url {
            Some(url) => url.clone(),
            None => format!("sqlite://{}/vigilo.db?mode=rwc", self.data_dir),
        }
    }
}

/// Projects and rules imported by `init-rules`.
#[derive(Debug, Clone, Deserialize)]
pub struct RulesSeedFile {
    #[serde(default)]
    pub projects: Vec<SeedProject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedProject {
    pub name: String,
    #[serde(default)]
    pub rules: Vec<RuleFields>,
}

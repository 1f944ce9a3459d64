use serde::Deserialize;
use std::num::NonZeroUsize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub data_source: DataSourceSettings,
    #[serde(default)]
    pub dashboard: DashboardSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

/// Where catalog and usage data come from
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataSourceSettings {
    /// Serve from this process, optionally seeded from a fixture file
    Memory {
        #[serde(default)]
        fixture_path: Option<PathBuf>,
    },
    /// Proxy to another instance of this service
    Remote {
        base_url: String,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
}

impl Default for DataSourceSettings {
    fn default() -> Self {
        DataSourceSettings::Memory { fixture_path: None }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardSettings {
    #[serde(default = "default_top_models")]
    pub top_models: NonZeroUsize,
    #[serde(default = "default_recent_samples")]
    pub recent_samples: NonZeroUsize,
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            top_models: default_top_models(),
            recent_samples: default_recent_samples(),
            refresh_interval_secs: default_refresh_interval_secs(),
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_top_models() -> NonZeroUsize {
    NonZeroUsize::new(10).unwrap_or(NonZeroUsize::MIN)
}

fn default_recent_samples() -> NonZeroUsize {
    NonZeroUsize::new(5).unwrap_or(NonZeroUsize::MIN)
}

fn default_refresh_interval_secs() -> u64 {
    30
}

/// Load `config/server.toml`, overridden by `TRACKER_*` environment variables
/// (nested keys separated by `__`, e.g. `TRACKER_DASHBOARD__TOP_MODELS=5`).
pub fn load_server_config() -> anyhow::Result<ServerConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/server").required(false))
        .add_source(
            config::Environment::with_prefix("TRACKER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

//! Configuration loading, validation, and management for CoinClaw.
//!
//! Loads configuration from `~/.coinclaw/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Provider names the chain builder knows how to construct.
pub const KNOWN_PROVIDERS: &[&str] = &["coingecko", "coincap", "binance"];

/// Recent queries a session remembers.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Maximum age of a cached price, in seconds.
pub const DEFAULT_FRESHNESS_WINDOW_SECS: u64 = 120;

/// Substrings that mark a query as asking for predictions or advice.
pub const DEFAULT_DISALLOWED_KEYWORDS: &[&str] = &[
    "predict",
    "prediction",
    "forecast",
    "invest",
    "buy",
    "sell",
    "future",
];

/// Symbols the consensus heuristic treats as Proof of Work.
pub const DEFAULT_POW_SYMBOLS: &[&str] = &["BTC", "DOGE", "LTC"];

/// The root configuration structure.
///
/// Maps directly to `~/.coinclaw/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Fact store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Query pipeline settings
    #[serde(default)]
    pub agent: AgentConfig,

    /// Price provider chain
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Store pre-population (`coinclaw populate`)
    #[serde(default)]
    pub populate: PopulateConfig,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// "file" or "memory"
    #[serde(default = "default_store_backend")]
    pub backend: String,

    /// JSON file path for the file backend. Defaults to `~/.coinclaw/data/kb.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

fn default_store_backend() -> String {
    "file".into()
}

impl StoreConfig {
    /// The resolved file path for the file backend.
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| AppConfig::config_dir().join("data").join("kb.json"))
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// How many recent queries a session remembers
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Maximum age of a cached price before a refresh is attempted
    #[serde(default = "default_freshness_window")]
    pub freshness_window_secs: u64,

    /// Queries containing any of these (case-insensitive substring) are refused
    #[serde(default = "default_disallowed_keywords")]
    pub disallowed_keywords: Vec<String>,
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}
fn default_freshness_window() -> u64 {
    DEFAULT_FRESHNESS_WINDOW_SECS
}
fn default_disallowed_keywords() -> Vec<String> {
    DEFAULT_DISALLOWED_KEYWORDS.iter().map(|s| s.to_string()).collect()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            freshness_window_secs: default_freshness_window(),
            disallowed_keywords: default_disallowed_keywords(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Fallback order; first success wins
    #[serde(default = "default_provider_order")]
    pub order: Vec<String>,

    /// Sent with every provider request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Symbols assumed to be Proof of Work when a provider has no consensus data
    #[serde(default = "default_pow_symbols")]
    pub pow_symbols: Vec<String>,

    /// Per-provider overrides, keyed by provider name
    #[serde(default)]
    pub endpoints: HashMap<String, ProviderEndpointConfig>,
}

fn default_provider_order() -> Vec<String> {
    KNOWN_PROVIDERS.iter().map(|s| s.to_string()).collect()
}
fn default_user_agent() -> String {
    format!("coinclaw/{}", env!("CARGO_PKG_VERSION"))
}
fn default_pow_symbols() -> Vec<String> {
    DEFAULT_POW_SYMBOLS.iter().map(|s| s.to_string()).collect()
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            order: default_provider_order(),
            user_agent: default_user_agent(),
            pow_symbols: default_pow_symbols(),
            endpoints: HashMap::new(),
        }
    }
}

impl ProvidersConfig {
    /// Override block for a provider, or the defaults.
    pub fn endpoint(&self, name: &str) -> ProviderEndpointConfig {
        self.endpoints.get(name).cloned().unwrap_or_default()
    }

    /// Per-request timeout for a provider.
    pub fn timeout_secs(&self, name: &str) -> u64 {
        self.endpoint(name)
            .timeout_secs
            .unwrap_or(match name {
                "coingecko" => 5,
                _ => 3,
            })
    }

    /// Whether the chain should guess consensus from `pow_symbols` for this provider.
    pub fn estimates_consensus(&self, name: &str) -> bool {
        self.endpoint(name)
            .estimate_consensus
            .unwrap_or(name == "coincap")
    }

    /// Enabled providers, in fallback order.
    pub fn enabled_order(&self) -> Vec<&str> {
        self.order
            .iter()
            .map(String::as_str)
            .filter(|name| self.endpoint(name).enabled)
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderEndpointConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate_consensus: Option<bool>,
}

impl Default for ProviderEndpointConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            timeout_secs: None,
            enabled: true,
            estimate_consensus: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Conversations kept in memory; the least recently used is dropped first
    #[serde(default = "default_max_sessions")]
    pub max_sessions: u64,

    /// A conversation idle this long is forgotten
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
}

fn default_port() -> u16 {
    5000
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_max_sessions() -> u64 {
    1000
}
fn default_session_idle_secs() -> u64 {
    1800
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            max_sessions: default_max_sessions(),
            session_idle_secs: default_session_idle_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulateConfig {
    /// Symbols fetched by `coinclaw populate` when none are given
    #[serde(default = "default_populate_symbols")]
    pub symbols: Vec<String>,

    /// Pause between fetches, to stay under public rate limits
    #[serde(default = "default_populate_delay")]
    pub delay_ms: u64,
}

fn default_populate_symbols() -> Vec<String> {
    [
        "BTC", "ETH", "BNB", "SOL", "XRP", "USDT", "USDC", "ADA", "DOGE", "AVAX", "TRX", "DOT",
        "LINK", "MATIC", "LTC", "BCH", "UNI", "DAI", "SHIB", "PEPE", "PI",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_populate_delay() -> u64 {
    1500
}

impl Default for PopulateConfig {
    fn default() -> Self {
        Self {
            symbols: default_populate_symbols(),
            delay_ms: default_populate_delay(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.coinclaw/config.toml).
    ///
    /// Environment variable overrides (highest priority):
    /// - `COINCLAW_STORE_PATH`
    /// - `COINCLAW_GATEWAY_PORT`
    /// - `COINCLAW_PROVIDERS` (comma-separated fallback order)
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup, then re-validate.
    pub fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(path) = lookup("COINCLAW_STORE_PATH") {
            self.store.path = Some(path);
        }

        if let Some(port) = lookup("COINCLAW_GATEWAY_PORT") {
            self.gateway.port = port.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!("COINCLAW_GATEWAY_PORT is not a port: {port}"))
            })?;
        }

        if let Some(order) = lookup("COINCLAW_PROVIDERS") {
            self.providers.order = order
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect();
        }

        self.validate()
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".coinclaw")
    }

    /// Get the configuration file path.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.agent.history_limit == 0 {
            return Err(ConfigError::ValidationError(
                "agent.history_limit must be at least 1".into(),
            ));
        }

        if self.agent.freshness_window_secs == 0 {
            return Err(ConfigError::ValidationError(
                "agent.freshness_window_secs must be greater than 0".into(),
            ));
        }

        if self.gateway.max_sessions == 0 || self.gateway.session_idle_secs == 0 {
            return Err(ConfigError::ValidationError(
                "gateway.max_sessions and gateway.session_idle_secs must be greater than 0".into(),
            ));
        }

        if self.providers.order.is_empty() {
            return Err(ConfigError::ValidationError(
                "providers.order must name at least one provider".into(),
            ));
        }

        if let Some(unknown) = self
            .providers
            .order
            .iter()
            .find(|name| !KNOWN_PROVIDERS.contains(&name.as_str()))
        {
            return Err(ConfigError::ValidationError(format!(
                "unknown provider '{unknown}' (expected one of: {})",
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if !matches!(self.store.backend.as_str(), "file" | "memory") {
            return Err(ConfigError::ValidationError(format!(
                "store.backend must be \"file\" or \"memory\", got \"{}\"",
                self.store.backend
            )));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

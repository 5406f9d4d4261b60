use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub host: HostConfig,
    pub http: HttpClientConfig,
    pub cache: CacheConfig,
    pub modules: ModulesConfig,
    pub webhook: WebhookConfig,
    pub medal: MedalConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub http_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            http_port: 3001,
        }
    }
}

/// Values normally owned by the host application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// User-Agent sent with every upstream request
    pub user_agent: String,
    /// Token the host injects as `apikey` into every plugin route
    pub api_token: String,
    /// Relative route prefix embedded into descriptor `api_path`s
    pub api_prefix: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36".to_string(),
            api_token: String::new(),
            api_prefix: "plugin/ExploreServices".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    pub connect_timeout_seconds: u64,
    pub timeout_seconds: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout_seconds: 10,
            timeout_seconds: 30,
        }
    }
}

impl HttpClientConfig {
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of cached upstream responses
    pub capacity: u64,
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 32,
            ttl_seconds: 1800,
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

/// Per-adapter switches. Disabled adapters are neither registered nor routed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModulesConfig {
    pub bangumidaily: bool,
    pub cctv: bool,
    pub tencentvideo: bool,
    pub mangguo: bool,
}

impl Default for ModulesConfig {
    fn default() -> Self {
        Self {
            bangumidaily: true,
            cctv: true,
            tencentvideo: true,
            mangguo: true,
        }
    }
}

impl ModulesConfig {
    /// Whether the adapter with the given id is switched on
    #[must_use]
    pub fn is_enabled(&self, source_id: &str) -> bool {
        match source_id {
            "bangumidaily" => self.bangumidaily,
            "cctv" => self.cctv,
            "tencentvideo" => self.tencentvideo,
            "mangguo" => self.mangguo,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    pub enabled: bool,
    /// When set, accepted messages are POSTed here as JSON
    pub forward_url: Option<String>,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            forward_url: None,
        }
    }
}

/// Medal wall scraping for NexusPHP trackers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MedalConfig {
    pub enabled: bool,
    /// Pages followed per site before giving up on pagination
    pub max_pages: u32,
    pub sites: Vec<MedalSiteConfig>,
}

impl Default for MedalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_pages: 20,
            sites: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedalSiteConfig {
    pub name: String,
    /// Site root, e.g. `https://tracker.example`
    pub url: String,
    #[serde(default)]
    pub cookie: Option<String>,
    /// Overrides `host.user_agent` for this site
    #[serde(default)]
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "pretty"
    pub file_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file_path: None,
        }
    }
}

impl Config {
    /// Load configuration
    ///
    /// Sources, in increasing priority:
    /// 1. Built-in defaults
    /// 2. Config file (if provided and present)
    /// 3. Environment variables (`EXPLORE_HOST__API_TOKEN`, ...)
    pub fn load(config_file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_file {
            if Path::new(path).exists() {
                builder = builder.add_source(File::with_name(path));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("EXPLORE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Get HTTP listen address
    #[must_use]
    pub fn http_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.http_port)
    }
}

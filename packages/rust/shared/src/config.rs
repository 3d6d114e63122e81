//! Application configuration for Subjekt.
//!
//! User config lives at `~/.subjekt/subjekt.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SubjektError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "subjekt.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".subjekt";

/// Browser-like identification sent to the HTML directory, which rejects
/// obvious bots.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

// ---------------------------------------------------------------------------
// Config structs (matching subjekt.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP surface settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Source strategy selection.
    #[serde(default)]
    pub search: SearchConfig,

    /// Business registry REST API.
    #[serde(default)]
    pub registry: RegistryConfig,

    /// HTML business directory.
    #[serde(default)]
    pub directory: DirectoryConfig,

    /// Registry enrichment (contact scraper) site.
    #[serde(default)]
    pub enrichment: EnrichmentConfig,

    /// Reverse geocoding upstream.
    #[serde(default)]
    pub geocode: GeocodeConfig,
}

/// `[server]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Allow cross-origin calls from any origin (the UI is served separately).
    #[serde(default = "default_true")]
    pub cors_allow_any: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            cors_allow_any: true,
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".into()
}
fn default_true() -> bool {
    true
}

/// Which source adapters answer a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchStrategy {
    /// Identifier → registry lookup, keyword → registry search,
    /// location only → directory listing.
    #[default]
    Routed,
    /// Registry API only.
    Registry,
    /// Directory scraper only.
    Directory,
    /// Built-in sample dataset, no network.
    Mock,
}

impl FromStr for SearchStrategy {
    type Err = SubjektError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "routed" => Ok(Self::Routed),
            "registry" => Ok(Self::Registry),
            "directory" => Ok(Self::Directory),
            "mock" => Ok(Self::Mock),
            other => Err(SubjektError::config(format!(
                "unknown search strategy '{other}' (expected routed, registry, directory or mock)"
            ))),
        }
    }
}

/// `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub strategy: SearchStrategy,

    /// Run the contact scraper over results that carry a registry identifier.
    #[serde(default = "default_true")]
    pub enrich_contacts: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            strategy: SearchStrategy::default(),
            enrich_contacts: true,
        }
    }
}

/// `[registry]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// REST root, without trailing slash.
    #[serde(default = "default_registry_url")]
    pub base_url: String,

    #[serde(default = "default_registry_timeout")]
    pub timeout_secs: u64,

    /// Records requested per full-text search.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: default_registry_url(),
            timeout_secs: default_registry_timeout(),
            page_size: default_page_size(),
        }
    }
}

impl RegistryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_registry_url() -> String {
    "https://ares.gov.cz/ekonomicke-subjekty-v-be/rest".into()
}
fn default_registry_timeout() -> u64 {
    8
}
fn default_page_size() -> u32 {
    20
}

/// `[directory]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    #[serde(default = "default_directory_url")]
    pub base_url: String,

    /// Per-page timeout.
    #[serde(default = "default_directory_timeout")]
    pub timeout_secs: u64,

    /// Unique records wanted before pagination stops.
    #[serde(default = "default_target_count")]
    pub target_count: usize,

    #[serde(default = "default_browser_user_agent")]
    pub user_agent: String,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: default_directory_url(),
            timeout_secs: default_directory_timeout(),
            target_count: default_target_count(),
            user_agent: default_browser_user_agent(),
        }
    }
}

impl DirectoryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_directory_url() -> String {
    "https://www.firmy.cz".into()
}
fn default_directory_timeout() -> u64 {
    12
}
fn default_target_count() -> usize {
    25
}
fn default_browser_user_agent() -> String {
    BROWSER_USER_AGENT.into()
}

/// `[enrichment]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    #[serde(default = "default_enrichment_url")]
    pub base_url: String,

    #[serde(default = "default_enrichment_timeout")]
    pub timeout_secs: u64,

    /// Maximum enrichment calls in flight per query.
    #[serde(default = "default_enrichment_concurrency")]
    pub concurrency: usize,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            base_url: default_enrichment_url(),
            timeout_secs: default_enrichment_timeout(),
            concurrency: default_enrichment_concurrency(),
        }
    }
}

impl EnrichmentConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_enrichment_url() -> String {
    "https://rejstrik-firem.kurzy.cz".into()
}
fn default_enrichment_timeout() -> u64 {
    4
}
fn default_enrichment_concurrency() -> usize {
    8
}

/// `[geocode]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeConfig {
    /// Reverse-geocoding endpoint.
    #[serde(default = "default_geocode_url")]
    pub base_url: String,

    #[serde(default = "default_geocode_timeout")]
    pub timeout_secs: u64,

    /// Descriptive client identification; Nominatim's usage policy requires one.
    #[serde(default = "default_geocode_user_agent")]
    pub user_agent: String,
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocode_url(),
            timeout_secs: default_geocode_timeout(),
            user_agent: default_geocode_user_agent(),
        }
    }
}

impl GeocodeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_geocode_url() -> String {
    "https://nominatim.openstreetmap.org/reverse".into()
}
fn default_geocode_timeout() -> u64 {
    5
}
fn default_geocode_user_agent() -> String {
    concat!("subjekt-search/", env!("CARGO_PKG_VERSION")).into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.subjekt/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SubjektError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.subjekt/subjekt.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SubjektError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| SubjektError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| SubjektError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| SubjektError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SubjektError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

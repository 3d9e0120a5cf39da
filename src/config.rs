use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_PORT: u16 = 4000;
const DEFAULT_CATALOG_URL: &str = "http://www.omdbapi.com/";
const DEFAULT_CATALOG_TIMEOUT_SECS: u64 = 5;
const DEFAULT_FFPROBE: &str = "ffprobe";
const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CONCURRENCY: usize = 8;

#[derive(Deserialize, Default, Debug)]
pub struct FileConfig {
    pub port: Option<u16>,
    pub media_dir: Option<PathBuf>,
    pub localhost: Option<bool>,
    pub omdb_api_key: Option<String>,
    pub catalog_url: Option<String>,
    pub catalog_timeout_secs: Option<u64>,
    pub ffprobe: Option<PathBuf>,
    pub probe_timeout_secs: Option<u64>,
    pub concurrency: Option<usize>,
    pub cache_metadata: Option<bool>,
}

/// Settings for the external movie catalog.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// `None` puts the catalog client in passthrough mode: no network calls,
    /// filename-derived titles only.
    pub api_key: Option<String>,
    pub base_url: String,
    /// Upper bound on a single lookup, connection included.
    pub timeout: Duration,
}

/// Settings for the container duration probe.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub ffprobe: PathBuf,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub media_dir: PathBuf,
    pub localhost: bool,
    pub catalog: CatalogConfig,
    pub probe: ProbeConfig,
    /// Files enriched at the same time during one listing. Always >= 1.
    pub concurrency: usize,
    pub cache_metadata: bool,
}

impl Config {
    /// Merge CLI/env arguments over the config file over built-in defaults.
    pub fn resolve(file: Option<FileConfig>, args: &crate::cli::Args) -> Result<Self, ConfigError> {
        let file = file.unwrap_or_default();
        let media_dir = args
            .media_dir
            .clone()
            .or(file.media_dir)
            .ok_or(ConfigError::MissingMediaDir)?;

        // An empty key (e.g. `OMDB_API_KEY=` in a shell profile) means "not configured".
        let api_key = args
            .omdb_api_key
            .clone()
            .or(file.omdb_api_key)
            .filter(|k| !k.trim().is_empty());

        Ok(Config {
            port: args.port.or(file.port).unwrap_or(DEFAULT_PORT),
            media_dir,
            localhost: args.localhost || file.localhost.unwrap_or(false),
            catalog: CatalogConfig {
                api_key,
                base_url: file
                    .catalog_url
                    .unwrap_or_else(|| DEFAULT_CATALOG_URL.to_string()),
                timeout: Duration::from_secs(
                    file.catalog_timeout_secs
                        .unwrap_or(DEFAULT_CATALOG_TIMEOUT_SECS),
                ),
            },
            probe: ProbeConfig {
                ffprobe: file
                    .ffprobe
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_FFPROBE)),
                timeout: Duration::from_secs(
                    file.probe_timeout_secs.unwrap_or(DEFAULT_PROBE_TIMEOUT_SECS),
                ),
            },
            concurrency: args
                .concurrency
                .or(file.concurrency)
                .unwrap_or(DEFAULT_CONCURRENCY)
                .max(1),
            cache_metadata: file.cache_metadata.unwrap_or(true),
        })
    }
}

pub fn find_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_owned());
    }
    let cwd_config = PathBuf::from("reelshelf.toml");
    if cwd_config.exists() {
        return Some(cwd_config);
    }
    if let Some(config_dir) = dirs::config_dir() {
        let xdg_config = config_dir.join("reelshelf").join("config.toml");
        if xdg_config.exists() {
            return Some(xdg_config);
        }
    }
    None
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("no media directory given (pass it as an argument, set REELSHELF_MEDIA_DIR, or add media_dir to the config file)")]
    MissingMediaDir,
}

pub fn load_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: FileConfig = toml::from_str(&content)?;
    Ok(config)
}

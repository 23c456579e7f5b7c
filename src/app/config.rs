use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{
    APP_NAME, CATALOG_EXTENSION, CATALOG_PREFIX, DATA_FILE_EXTENSION, DEFAULT_BASE_URL,
    DEFAULT_POLICY, DEFAULT_USER_AGENT, ENV_PREFIX, HTTP_REQUEST_TIMEOUT_SECS, LOCAL_CONFIG_FILE,
    STATION_DATA_DIR,
};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Local cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Remote archive configuration
    #[serde(default)]
    pub origin: OriginConfig,

    /// Alias name to station id. Aliased stations are never discardable.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

/// Local cache configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache directory (defaults to the platform cache dir)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    /// Set to false to always go to the origin
    pub enabled: bool,
    /// Freshness policy used when none is given
    pub default_policy: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: None,
            enabled: true,
            default_policy: DEFAULT_POLICY.to_string(),
        }
    }
}

/// Remote archive configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OriginConfig {
    /// Archive root; catalogs live here, station files under `all/`
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: HTTP_REQUEST_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl OriginConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Cache root to use, or `None` when caching is disabled
    pub fn cache_root(&self) -> Option<PathBuf> {
        if !self.cache.enabled {
            return None;
        }
        self.cache.dir.clone().or_else(default_cache_dir)
    }

    /// Station ids referenced by an alias
    pub fn protected_ids(&self) -> HashSet<String> {
        self.aliases.values().cloned().collect()
    }

    /// Turn a CLI resource into a URI.
    ///
    /// Accepts a full URI, an alias, a catalog file name, or a station id
    /// (with or without the `.dly` extension).
    pub fn resolve(&self, resource: &str) -> String {
        if resource.contains("://") {
            return resource.to_string();
        }

        let resource = self
            .aliases
            .get(resource)
            .map(String::as_str)
            .unwrap_or(resource);

        let base = self.origin.base_url.trim_end_matches('/');
        if resource.starts_with(CATALOG_PREFIX) && resource.ends_with(CATALOG_EXTENSION) {
            return format!("{}/{}", base, resource);
        }

        let id = resource.strip_suffix(DATA_FILE_EXTENSION).unwrap_or(resource);
        format!("{}/{}{}{}", base, STATION_DATA_DIR, id, DATA_FILE_EXTENSION)
    }
}

/// Platform cache directory (~/.cache/ghcnd-cache on Linux)
pub fn default_cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Layer defaults, then each existing file in order, then environment
fn build_figment(files: &[PathBuf]) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    for file in files {
        if file.exists() {
            figment = figment.merge(Toml::file(file));
        }
    }

    // GHCND_CACHE__DIR=/tmp/x style overrides
    figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load configuration from multiple sources
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let mut files = vec![get_config_dir()?.join("config.toml"), PathBuf::from(LOCAL_CONFIG_FILE)];

    if let Some(path) = explicit {
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        files.push(path.to_path_buf());
    }

    build_figment(&files)
        .extract()
        .context("Failed to load configuration")
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", APP_NAME) {
        Ok(proj_dirs.config_dir().to_path_buf())
    } else {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .context("Could not determine home directory")?;
        Ok(PathBuf::from(home).join(".config").join(APP_NAME))
    }
}

/// Save configuration to file
pub fn save_config(config: &Config, path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(p) => p,
        None => get_config_dir()?.join("config.toml"),
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let toml_string = toml::to_string_pretty(config)?;
    std::fs::write(&path, toml_string)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(())
}

/// Write a default config file if missing and create the cache directory.
///
/// This is the only place the cache directory is ever created.
pub fn init_config(config: &Config) -> Result<()> {
    let config_file = get_config_dir()?.join("config.toml");
    if !config_file.exists() {
        save_config(&Config::default(), Some(config_file.clone()))?;
        println!("Created default configuration at: {}", config_file.display());
    }

    match config.cache_root() {
        Some(root) => {
            std::fs::create_dir_all(&root)
                .with_context(|| format!("Failed to create cache directory {}", root.display()))?;
            println!("Cache directory: {}", root.display());
        }
        None => println!("Caching is disabled; no cache directory created"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_resources() {
        let mut config = Config::default();
        config.origin.base_url = "https://archive.example/daily/".to_string();
        config.aliases.insert("victoria".to_string(), "CA001018620".to_string());

        assert_eq!(config.resolve("http://x/ghcnd-stations.txt"), "http://x/ghcnd-stations.txt");
        assert_eq!(
            config.resolve("ghcnd-stations.txt"),
            "https://archive.example/daily/ghcnd-stations.txt"
        );
        assert_eq!(
            config.resolve("USC00011084"),
            "https://archive.example/daily/all/USC00011084.dly"
        );
        assert_eq!(
            config.resolve("USC00011084.dly"),
            "https://archive.example/daily/all/USC00011084.dly"
        );
        assert_eq!(
            config.resolve("victoria"),
            "https://archive.example/daily/all/CA001018620.dly"
        );
    }

    #[test]
    fn test_cache_root_and_protected_ids() {
        let mut config = Config::default();
        config.cache.dir = Some(PathBuf::from("/var/cache/ghcnd"));
        config.aliases.insert("home".to_string(), "USW00094728".to_string());
        config.aliases.insert("work".to_string(), "USW00094728".to_string());

        assert_eq!(config.cache_root(), Some(PathBuf::from("/var/cache/ghcnd")));
        assert_eq!(config.protected_ids(), HashSet::from(["USW00094728".to_string()]));

        config.cache.enabled = false;
        assert_eq!(config.cache_root(), None);
    }

    #[test]
    fn test_toml_layering() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("config.toml");
        std::fs::write(
            &file,
            r#"
[cache]
dir = "/data/ghcnd"
default_policy = "yearly"

[origin]
timeout_secs = 5

[aliases]
albert = "CA001015105"
"#,
        )
        .unwrap();

        let config: Config = build_figment(&[temp_dir.path().join("absent.toml"), file])
            .extract()
            .unwrap();

        assert_eq!(config.cache.dir, Some(PathBuf::from("/data/ghcnd")));
        assert!(config.cache.enabled);
        assert_eq!(config.cache.default_policy, "yearly");
        assert_eq!(config.origin.timeout(), Duration::from_secs(5));
        assert_eq!(config.origin.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.aliases.get("albert").map(String::as_str), Some("CA001015105"));
    }

    #[test]
    fn test_save_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.aliases.insert("home".to_string(), "USW00094728".to_string());
        save_config(&config, Some(path.clone())).unwrap();

        let loaded: Config = toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, config);
    }
}

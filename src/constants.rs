/// Constants module to avoid magic numbers in the codebase

// Archive
pub const DEFAULT_BASE_URL: &str = "https://www.ncei.noaa.gov/pub/data/ghcn/daily/";
pub const STATION_DATA_DIR: &str = "all/";
pub const DEFAULT_USER_AGENT: &str = concat!("ghcnd-cache/", env!("CARGO_PKG_VERSION"));

// Timeouts
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 60;

// Freshness
pub const DEFAULT_POLICY: &str = "7";

// Cache directory naming conventions
pub const DATA_FILE_EXTENSION: &str = ".dly";
pub const CATALOG_PREFIX: &str = "ghcnd-";
pub const CATALOG_EXTENSION: &str = ".txt";
pub const STATIONS_CATALOG: &str = "ghcnd-stations.txt";
pub const COUNTRIES_CATALOG: &str = "ghcnd-countries.txt";
pub const TEMP_SUFFIX: &str = ".tmp";

// Config
pub const APP_NAME: &str = "ghcnd-cache";
pub const ENV_PREFIX: &str = "GHCND_";
pub const LOCAL_CONFIG_FILE: &str = ".ghcnd-cache.toml";

//! Configuration Module
//!
//! Environment-variable configuration for the cache and store services,
//! with sensible defaults for local development.

use std::env;

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// == Cache Config ==
/// Configuration for the cache service.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// HTTP server port
    pub port: u16,
    /// Base URL of the storage service
    pub storage_service_url: String,
    /// Hard upper bound on live cache entries
    pub max_cache_size: usize,
    /// Default TTL in seconds for entries without explicit TTL (0 = none)
    pub default_ttl: u64,
    /// Expiry sweep interval in seconds
    pub cleanup_interval: u64,
    /// Requests allowed per client per window
    pub rate_limit_max_requests: u32,
    /// Rate limit window in milliseconds
    pub rate_limit_window_ms: u64,
}

impl CacheConfig {
    /// Loads cache configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `PORT` - HTTP port (default: 3001)
    /// - `STORAGE_SERVICE_URL` - store base URL (default: http://localhost:3002)
    /// - `MAX_CACHE_SIZE` - entry bound (default: 1000)
    /// - `DEFAULT_TTL` - default TTL seconds (default: 3600)
    /// - `CLEANUP_INTERVAL` - sweep interval seconds (default: 60)
    /// - `RATE_LIMIT_MAX_REQUESTS` - requests per window (default: 100)
    /// - `RATE_LIMIT_WINDOW_MS` - window length (default: 60000)
    pub fn from_env() -> Self {
        Self {
            port: env_parse("PORT", 3001),
            storage_service_url: env::var("STORAGE_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:3002".to_string()),
            max_cache_size: env_parse("MAX_CACHE_SIZE", 1000),
            default_ttl: env_parse("DEFAULT_TTL", 3600),
            cleanup_interval: env_parse("CLEANUP_INTERVAL", 60),
            rate_limit_max_requests: env_parse("RATE_LIMIT_MAX_REQUESTS", 100),
            rate_limit_window_ms: env_parse("RATE_LIMIT_WINDOW_MS", 60_000),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            port: 3001,
            storage_service_url: "http://localhost:3002".to_string(),
            max_cache_size: 1000,
            default_ttl: 3600,
            cleanup_interval: 60,
            rate_limit_max_requests: 100,
            rate_limit_window_ms: 60_000,
        }
    }
}

// == Store Config ==
/// Configuration for the store service.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// HTTP server port
    pub port: u16,
    /// Data directory root
    pub data_path: String,
    /// Backup interval in milliseconds; 0 or negative disables backups
    pub backup_interval_ms: i64,
    /// Maximum serialized entry size in bytes
    pub max_file_size: usize,
    /// Requests allowed per client per window
    pub rate_limit_max_requests: u32,
    /// Rate limit window in milliseconds
    pub rate_limit_window_ms: u64,
}

impl StoreConfig {
    /// Loads store configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `PORT` - HTTP port (default: 3002)
    /// - `DATA_PATH` - data root (default: ./data)
    /// - `BACKUP_INTERVAL` - backup period ms, <= 0 disables (default: 300000)
    /// - `MAX_FILE_SIZE` - entry size cap in bytes (default: 10485760)
    /// - `RATE_LIMIT_MAX_REQUESTS` / `RATE_LIMIT_WINDOW_MS` - as for the cache
    pub fn from_env() -> Self {
        Self {
            port: env_parse("PORT", 3002),
            data_path: env::var("DATA_PATH").unwrap_or_else(|_| "./data".to_string()),
            backup_interval_ms: env_parse("BACKUP_INTERVAL", 300_000),
            max_file_size: env_parse("MAX_FILE_SIZE", 10 * 1024 * 1024),
            rate_limit_max_requests: env_parse("RATE_LIMIT_MAX_REQUESTS", 100),
            rate_limit_window_ms: env_parse("RATE_LIMIT_WINDOW_MS", 60_000),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            port: 3002,
            data_path: "./data".to_string(),
            backup_interval_ms: 300_000,
            max_file_size: 10 * 1024 * 1024,
            rate_limit_max_requests: 100,
            rate_limit_window_ms: 60_000,
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.port, 3001);
        assert_eq!(config.max_cache_size, 1000);
        assert_eq!(config.default_ttl, 3600);
        assert_eq!(config.rate_limit_max_requests, 100);
    }

    #[test]
    fn test_store_config_default() {
        let config = StoreConfig::default();
        assert_eq!(config.port, 3002);
        assert_eq!(config.data_path, "./data");
        assert_eq!(config.backup_interval_ms, 300_000);
        assert_eq!(config.max_file_size, 10 * 1024 * 1024);
    }
}

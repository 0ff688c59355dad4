use std::env;
use std::str::FromStr;
use std::time::Duration;

use fetch_cache::CacheConfig;
use pokeapi_client::PokeApiClient;
use route_guard::GuardConfig;

/// Application configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub pokeapi_base_url: String,
    pub cors_origins: Vec<String>,
    pub guard: GuardConfig,
    pub cache: CacheConfig,
    pub prune_interval: Duration,
    /// Shared secret for maintenance endpoints; those endpoints refuse every
    /// request when unset
    pub internal_secret: Option<String>,
}

impl Config {
    /// Parse configuration from environment variables
    pub fn from_env() -> Self {
        let port = parse_env("PORT").unwrap_or(3000);

        let pokeapi_base_url = env::var("POKEAPI_BASE_URL")
            .unwrap_or_else(|_| PokeApiClient::DEFAULT_BASE_URL.to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|s| s.split(',').map(|o| o.trim().to_string()).collect())
            .unwrap_or_else(|_| vec!["http://localhost:3000".to_string()]);

        let defaults = CacheConfig::default();
        let cache = CacheConfig {
            fresh_window: parse_env("CACHE_FRESH_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.fresh_window),
            stale_window: parse_env("CACHE_STALE_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.stale_window),
            max_entries: parse_env("CACHE_MAX_ENTRIES").unwrap_or(defaults.max_entries),
            fetch_timeout: parse_env("FETCH_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.fetch_timeout),
        };

        let prune_interval = parse_env("PRUNE_INTERVAL_SECS")
            .filter(|&secs: &u64| secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(300));

        let internal_secret = env::var("INTERNAL_SECRET")
            .ok()
            .filter(|s| !s.trim().is_empty());

        Self {
            port,
            pokeapi_base_url,
            cors_origins,
            guard: GuardConfig::from_env(),
            cache,
            prune_interval,
            internal_secret,
        }
    }
}

/// Unset and unparseable values both fall back to the default
fn parse_env<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env() {
        assert_eq!(parse_env::<u16>("WHOSTHAT_TEST_UNSET_VARIABLE"), None);

        env::set_var("WHOSTHAT_TEST_GARBAGE_PORT", "eighty");
        assert_eq!(parse_env::<u16>("WHOSTHAT_TEST_GARBAGE_PORT"), None);

        env::set_var("WHOSTHAT_TEST_PADDED_PORT", " 8080 ");
        assert_eq!(parse_env::<u16>("WHOSTHAT_TEST_PADDED_PORT"), Some(8080));
    }
}

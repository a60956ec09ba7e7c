//! Runtime configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::trivia::{OpenTdbClient, TriviaResult};

const DEFAULT_QUESTIONS_URL: &str = "https://opentdb.com/api.php";
const DEFAULT_CATEGORIES_URL: &str = "https://opentdb.com/api_category.php";

/// Server and upstream configuration
#[derive(Debug, Clone)]
pub struct LoungeConfig {
    /// Address the HTTP server binds to
    pub addr: SocketAddr,
    /// Directory with the built front end
    pub static_dir: PathBuf,
    /// Open Trivia DB question feed
    pub questions_url: String,
    /// Open Trivia DB category list
    pub categories_url: String,
    /// Timeout for each upstream request
    pub upstream_timeout: Duration,
}

impl Default for LoungeConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            static_dir: PathBuf::from("static"),
            questions_url: DEFAULT_QUESTIONS_URL.to_string(),
            categories_url: DEFAULT_CATEGORIES_URL.to_string(),
            upstream_timeout: Duration::from_secs(10),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

impl LoungeConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let addr = match non_empty_var("PLAYLOUNGE_ADDR") {
            Some(raw) => raw.parse::<SocketAddr>().unwrap_or_else(|e| {
                tracing::warn!("Ignoring invalid PLAYLOUNGE_ADDR {:?}: {}", raw, e);
                defaults.addr
            }),
            None => defaults.addr,
        };

        Self {
            addr,
            static_dir: non_empty_var("PLAYLOUNGE_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            questions_url: non_empty_var("OPENTDB_BASE_URL").unwrap_or(defaults.questions_url),
            categories_url: non_empty_var("OPENTDB_CATEGORIES_URL")
                .unwrap_or(defaults.categories_url),
            upstream_timeout: non_empty_var("OPENTDB_TIMEOUT")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.upstream_timeout),
        }
    }

    /// Build the Open Trivia DB client described by this config
    pub fn build_source(&self) -> TriviaResult<OpenTdbClient> {
        OpenTdbClient::new(
            self.questions_url.clone(),
            self.categories_url.clone(),
            self.upstream_timeout,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEYS: &[&str] = &[
        "PLAYLOUNGE_ADDR",
        "PLAYLOUNGE_STATIC_DIR",
        "OPENTDB_BASE_URL",
        "OPENTDB_CATEGORIES_URL",
        "OPENTDB_TIMEOUT",
    ];

    fn clear_env() {
        for key in KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_without_env() {
        clear_env();
        let config = LoungeConfig::from_env();
        assert_eq!(config.questions_url, DEFAULT_QUESTIONS_URL);
        assert_eq!(config.categories_url, DEFAULT_CATEGORIES_URL);
        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.upstream_timeout, Duration::from_secs(10));
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        std::env::set_var("OPENTDB_BASE_URL", " http://localhost:9000/api.php ");
        std::env::set_var("OPENTDB_TIMEOUT", "3");
        std::env::set_var("PLAYLOUNGE_ADDR", "127.0.0.1:8080");

        let config = LoungeConfig::from_env();
        assert_eq!(config.questions_url, "http://localhost:9000/api.php");
        assert_eq!(config.upstream_timeout, Duration::from_secs(3));
        assert_eq!(config.addr, SocketAddr::from(([127, 0, 0, 1], 8080)));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_values_fall_back() {
        clear_env();
        std::env::set_var("PLAYLOUNGE_ADDR", "not-an-addr");
        std::env::set_var("OPENTDB_TIMEOUT", "soon");
        std::env::set_var("OPENTDB_CATEGORIES_URL", "   ");

        let config = LoungeConfig::from_env();
        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.upstream_timeout, Duration::from_secs(10));
        assert_eq!(config.categories_url, DEFAULT_CATEGORIES_URL);

        clear_env();
    }
}

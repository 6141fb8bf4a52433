use std::time::Duration;

use crate::gate::RedirectConfig;
use crate::session::token::TokenConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_SESSION_COOKIE: &str = "session_token";
const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 30 * 60;

/// Process configuration, read once at startup and shared through `AppState`
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind_addr: String,
    /// Postgres connection string; in-memory repositories are used when unset
    pub database_url: Option<String>,
    pub token: TokenConfig,
    pub session_cookie_name: String,
    /// Adds `Secure` to the session cookie; turn off only for plain-HTTP development
    pub secure_cookies: bool,
    pub redirects: RedirectConfig,
    pub session_cleanup_interval: Duration,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let cleanup_secs = std::env::var("SESSION_CLEANUP_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_CLEANUP_INTERVAL_SECS);

        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            database_url: std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            token: TokenConfig::new(),
            session_cookie_name: std::env::var("SESSION_COOKIE_NAME")
                .unwrap_or_else(|_| DEFAULT_SESSION_COOKIE.to_string()),
            secure_cookies: std::env::var("SESSION_COOKIE_SECURE")
                .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no"))
                .unwrap_or(true),
            redirects: RedirectConfig {
                sign_in_path: std::env::var("SIGN_IN_PATH")
                    .unwrap_or_else(|_| RedirectConfig::default().sign_in_path),
                home_path: std::env::var("HOME_PATH")
                    .unwrap_or_else(|_| RedirectConfig::default().home_path),
            },
            session_cleanup_interval: Duration::from_secs(cleanup_secs),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            database_url: None,
            token: TokenConfig::default(),
            session_cookie_name: DEFAULT_SESSION_COOKIE.to_string(),
            secure_cookies: true,
            redirects: RedirectConfig::default(),
            session_cleanup_interval: Duration::from_secs(DEFAULT_CLEANUP_INTERVAL_SECS),
        }
    }
}

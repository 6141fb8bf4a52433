use axum::http::HeaderValue;

use crate::config::AppConfig;
use crate::shared::AppError;

/// `Set-Cookie` value carrying a freshly issued session token
pub fn session_cookie(config: &AppConfig, token: &str) -> Result<HeaderValue, AppError> {
    let max_age = config.token.expiration_days * 24 * 60 * 60;
    build(config, token, max_age)
}

/// `Set-Cookie` value that makes the browser drop the session cookie
pub fn cleared_session_cookie(config: &AppConfig) -> Result<HeaderValue, AppError> {
    build(config, "", 0)
}

fn build(config: &AppConfig, value: &str, max_age_secs: i64) -> Result<HeaderValue, AppError> {
    let secure = if config.secure_cookies { "; Secure" } else { "" };
    HeaderValue::from_str(&format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{}",
        config.session_cookie_name, value, max_age_secs, secure
    ))
    .map_err(|_| AppError::Internal)
}

//! HttpOnly cookie transport for the token pair
//!
//! Browsers get the pair as `access_token` / `refresh_token` cookies alongside
//! the JSON body. Each cookie lives as long as the token it carries.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::config::AuthConfig;
use crate::domain::token::TokenPair;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Lifetimes and flags applied to token cookies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenCookieSettings {
    pub access_max_age: Duration,
    pub refresh_max_age: Duration,
    pub secure: bool,
}

impl Default for TokenCookieSettings {
    fn default() -> Self {
        Self::from_config(&AuthConfig::default())
    }
}

impl TokenCookieSettings {
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            access_max_age: minutes(config.access_token_minutes),
            refresh_max_age: minutes(config.refresh_token_minutes),
            secure: config.cookie_secure,
        }
    }

    /// Add both token cookies to the jar
    pub fn attach(&self, jar: CookieJar, tokens: &TokenPair) -> CookieJar {
        jar.add(self.build(ACCESS_TOKEN_COOKIE, tokens.access.clone(), self.access_max_age))
            .add(self.build(REFRESH_TOKEN_COOKIE, tokens.refresh.clone(), self.refresh_max_age))
    }

    /// Expire both token cookies, whether or not the request carried them
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        [ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE]
            .into_iter()
            .fold(jar, |jar, name| {
                let mut cookie = self.build(name, String::new(), Duration::ZERO);
                cookie.make_removal();
                jar.add(cookie)
            })
    }

    fn build(&self, name: &'static str, value: String, max_age: Duration) -> Cookie<'static> {
        Cookie::build((name, value))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(max_age)
            .build()
    }
}

fn minutes(value: u64) -> Duration {
    i64::try_from(value)
        .ok()
        .and_then(|m| m.checked_mul(60))
        .map_or(Duration::MAX, Duration::seconds)
}

/// Non-empty token stored under `name`
pub fn token_from_jar(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use axum::http::{header, HeaderMap};
    use axum::response::IntoResponse;

    use super::*;

    fn pair() -> TokenPair {
        TokenPair {
            access: "access-value".to_string(),
            refresh: "refresh-value".to_string(),
        }
    }

    fn set_cookies(jar: CookieJar) -> Vec<String> {
        jar.into_response()
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_settings_follow_token_lifetimes() {
        let settings = TokenCookieSettings::default();

        assert_eq!(settings.access_max_age, Duration::minutes(15));
        assert_eq!(settings.refresh_max_age, Duration::minutes(10080));
        assert!(!settings.secure);
    }

    #[test]
    fn test_attach_sets_http_only_cookies() {
        let cookies = set_cookies(TokenCookieSettings::default().attach(CookieJar::new(), &pair()));

        let access = cookies
            .iter()
            .find(|c| c.starts_with("access_token=access-value"))
            .unwrap();
        assert!(access.contains("HttpOnly"));
        assert!(access.contains("Path=/"));
        assert!(access.contains("Max-Age=900"));
        assert!(!access.contains("Secure"));

        let refresh = cookies
            .iter()
            .find(|c| c.starts_with("refresh_token=refresh-value"))
            .unwrap();
        assert!(refresh.contains("Max-Age=604800"));
    }

    #[test]
    fn test_secure_flag() {
        let settings = TokenCookieSettings {
            secure: true,
            ..TokenCookieSettings::default()
        };

        let cookies = set_cookies(settings.attach(CookieJar::new(), &pair()));
        assert!(cookies.iter().all(|c| c.contains("Secure")));
    }

    #[test]
    fn test_clear_expires_both_cookies() {
        let cookies = set_cookies(TokenCookieSettings::default().clear(CookieJar::new()));

        assert_eq!(cookies.len(), 2);
        assert!(cookies.iter().any(|c| c.starts_with("access_token=;")));
        assert!(cookies.iter().any(|c| c.starts_with("refresh_token=;")));
        assert!(cookies.iter().all(|c| c.contains("Max-Age=0")));
    }

    #[test]
    fn test_token_from_jar() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            "access_token=abc; refresh_token=".parse().unwrap(),
        );
        let jar = CookieJar::from_headers(&headers);

        assert_eq!(token_from_jar(&jar, ACCESS_TOKEN_COOKIE).as_deref(), Some("abc"));
        assert_eq!(token_from_jar(&jar, REFRESH_TOKEN_COOKIE), None);
    }
}

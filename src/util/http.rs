//! Shared HTTP client construction and auth headers.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};

/// Request timeout applied to every Graph call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Build the reqwest client used for Graph calls.
pub fn build_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .pool_max_idle_per_host(10)
        .build()
}

/// Default headers for a Bearer-token JSON API.
pub fn bearer_headers(access_token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    if let Ok(val) = HeaderValue::from_str(&format!("Bearer {access_token}")) {
        headers.insert(AUTHORIZATION, val);
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_headers_carry_token() {
        let headers = bearer_headers("abc");
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abc");
        assert_eq!(headers.get(ACCEPT).unwrap(), "application/json");
    }

    #[test]
    fn invalid_header_value_is_skipped() {
        let headers = bearer_headers("bad\ntoken");
        assert!(headers.get(AUTHORIZATION).is_none());
    }
}

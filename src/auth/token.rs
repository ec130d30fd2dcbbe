use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// OAuth token payload stored in a token store.
///
/// # Example
/// ```no_run
/// use meetai::auth::Token;
/// use chrono::{DateTime, Utc};
///
/// let token = Token {
///     access_token: "access".to_string(),
///     refresh_token: Some("refresh".to_string()),
///     id_token: None,
///     expires_at: None,
///     last_refresh: Some(DateTime::<Utc>::from(std::time::SystemTime::now())),
///     scopes: Some(vec!["Files.ReadWrite.All".to_string()]),
///     account_id: None,
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub id_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_refresh: Option<DateTime<Utc>>,
    pub scopes: Option<Vec<String>>,
    pub account_id: Option<String>,
}

impl Token {
    /// True when the token expires within `skew` from now.
    ///
    /// Tokens without an expiry are treated as valid.
    pub fn expires_within(&self, skew: Duration) -> bool {
        self.expires_at
            .map(|exp| exp - Utc::now() < skew)
            .unwrap_or(false)
    }

    /// Carry over the refresh and ID tokens the provider omitted from a renewal.
    pub fn inherit_from(mut self, previous: &Token) -> Self {
        if self.refresh_token.is_none() {
            self.refresh_token = previous.refresh_token.clone();
        }
        if self.id_token.is_none() {
            self.id_token = previous.id_token.clone();
        }
        if self.account_id.is_none() {
            self.account_id = previous.account_id.clone();
        }
        self
    }
}

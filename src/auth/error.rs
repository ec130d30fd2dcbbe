use thiserror::Error;

/// Normalized authentication errors for the identity provider.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Not logged in")]
    NotLoggedIn,
    #[error("Sign-in cancelled")]
    Cancelled,
    #[error("Access denied")]
    AccessDenied,
    #[error("Expired or invalid grant")]
    ExpiredOrInvalidGrant,
    #[error("Interaction required: {0}")]
    InteractionRequired(String),
    #[error("Device code expired")]
    DeviceCodeExpired,
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AuthError {
    /// Map an OAuth `error` code from the token endpoint.
    pub fn from_oauth_code(code: &str, description: Option<&str>) -> Self {
        let detail = description.unwrap_or(code).to_string();
        match code {
            "invalid_grant" => Self::ExpiredOrInvalidGrant,
            "interaction_required" | "consent_required" | "login_required" => {
                Self::InteractionRequired(detail)
            }
            "access_denied" | "authorization_declined" => Self::AccessDenied,
            "expired_token" => Self::DeviceCodeExpired,
            other => Self::InvalidResponse(format!("{other}: {detail}")),
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.to_string())
    }
}

impl From<std::io::Error> for AuthError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::de::Error> for AuthError {
    fn from(error: toml::de::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::ser::Error> for AuthError {
    fn from(error: toml::ser::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oauth_codes_map_to_variants() {
        assert!(matches!(
            AuthError::from_oauth_code("invalid_grant", None),
            AuthError::ExpiredOrInvalidGrant
        ));
        assert!(matches!(
            AuthError::from_oauth_code("authorization_declined", None),
            AuthError::AccessDenied
        ));
        assert!(matches!(
            AuthError::from_oauth_code("expired_token", None),
            AuthError::DeviceCodeExpired
        ));
        match AuthError::from_oauth_code("consent_required", Some("AADSTS65001")) {
            AuthError::InteractionRequired(msg) => assert_eq!(msg, "AADSTS65001"),
            other => panic!("expected InteractionRequired, got {other:?}"),
        }
    }

    #[test]
    fn unknown_oauth_code_keeps_code_in_message() {
        let err = AuthError::from_oauth_code("invalid_client", Some("bad client"));
        assert_eq!(
            err.to_string(),
            "Invalid response: invalid_client: bad client"
        );
    }
}

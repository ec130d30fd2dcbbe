//! Signed-in account identity derived from the ID token.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;

use super::token::Token;

/// The account currently signed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Home account id, `<oid>.<tid>`.
    pub account_id: String,
    pub username: Option<String>,
}

impl Session {
    /// Build a session from a token's account id and ID token claims.
    pub fn from_token(token: &Token) -> Option<Self> {
        let claims = token.id_token.as_deref().and_then(decode_id_token);
        let account_id = token
            .account_id
            .clone()
            .or_else(|| claims.as_ref().and_then(IdTokenClaims::home_account_id))?;
        let username = claims.and_then(|c| c.preferred_username.or(c.name));
        Some(Self {
            account_id,
            username,
        })
    }

    /// Username if known, otherwise the account id.
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.account_id)
    }
}

/// The subset of ID token claims needed to identify the account.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdTokenClaims {
    pub oid: Option<String>,
    pub tid: Option<String>,
    pub preferred_username: Option<String>,
    pub name: Option<String>,
}

impl IdTokenClaims {
    pub fn home_account_id(&self) -> Option<String> {
        match (&self.oid, &self.tid) {
            (Some(oid), Some(tid)) => Some(format!("{oid}.{tid}")),
            (Some(oid), None) => Some(oid.clone()),
            _ => None,
        }
    }
}

/// Decode the payload segment of a JWT without verifying its signature.
///
/// The token came straight from the token endpoint over TLS; the claims are
/// only used for display and cache keys.
pub fn decode_id_token(id_token: &str) -> Option<IdTokenClaims> {
    let payload = id_token.split('.').nth(1)?;
    let bytes = match URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::debug!(error = %err, "ID token payload is not base64url");
            return None;
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(claims) => Some(claims),
        Err(err) => {
            tracing::debug!(error = %err, "ID token payload is not JSON");
            None
        }
    }
}

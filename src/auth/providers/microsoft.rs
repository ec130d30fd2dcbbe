use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::Deserialize;

use crate::auth::authenticator::IdentityProvider;
use crate::auth::device_code::{DeviceCodePoll, DeviceCodeSession};
use crate::auth::error::AuthError;
use crate::auth::session::decode_id_token;
use crate::auth::token::Token;
use crate::config::MeetConfig;

pub const DEFAULT_CLIENT_ID: &str = "8060cd03-4874-4350-a41c-6c7c69178b82";
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com/common";
pub const DEFAULT_SCOPES: &[&str] = &["Files.ReadWrite.All", "User.Read"];

/// Scopes the browser sign-in library adds on its own; `offline_access`
/// is what makes the endpoint hand out a refresh token.
const OIDC_SCOPES: &[&str] = &["openid", "profile", "offline_access"];
const DEVICE_CODE_GRANT: &str = "urn:ietf:params:oauth:grant-type:device_code";
const SLOW_DOWN_STEP_SECS: u64 = 5;

/// Callback that shows the verification URL and user code to the user.
pub type DeviceCodePrompt = Arc<dyn Fn(&DeviceCodeSession) + Send + Sync>;

/// Microsoft identity platform client (v2.0 endpoints).
///
/// Silent renewal uses the refresh-token grant. The interactive step is the
/// device-code flow: the prompt callback shows a code, then the token
/// endpoint is polled until the user finishes in a browser.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use meetai::auth::DeviceCodeSession;
/// use meetai::auth::providers::MicrosoftIdentity;
///
/// let identity = MicrosoftIdentity::new(
///     "client-id",
///     "https://login.microsoftonline.com/common",
///     vec!["Files.ReadWrite.All".to_string()],
/// )
/// .with_prompt(Arc::new(|session: &DeviceCodeSession| {
///     println!("Visit {} and enter {}", session.verification_url, session.user_code);
/// }));
/// ```
pub struct MicrosoftIdentity {
    client: reqwest::Client,
    client_id: String,
    token_url: String,
    device_code_url: String,
    scopes: Vec<String>,
    prompt: DeviceCodePrompt,
}

impl MicrosoftIdentity {
    pub fn new(client_id: impl Into<String>, authority: &str, scopes: Vec<String>) -> Self {
        let authority = authority.trim_end_matches('/');
        Self {
            client: reqwest::Client::new(),
            client_id: client_id.into(),
            token_url: format!("{authority}/oauth2/v2.0/token"),
            device_code_url: format!("{authority}/oauth2/v2.0/devicecode"),
            scopes,
            prompt: Arc::new(log_prompt),
        }
    }

    pub fn from_config(config: &MeetConfig) -> Self {
        Self::new(
            config.client_id.clone(),
            &config.authority,
            config.scopes.clone(),
        )
    }

    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    pub fn with_device_code_url(mut self, url: impl Into<String>) -> Self {
        self.device_code_url = url.into();
        self
    }

    pub fn with_prompt(mut self, prompt: DeviceCodePrompt) -> Self {
        self.prompt = prompt;
        self
    }

    /// Space-separated scope parameter, resource scopes first.
    pub fn scope_param(&self) -> String {
        let mut scopes: Vec<&str> = self.scopes.iter().map(String::as_str).collect();
        for extra in OIDC_SCOPES {
            if !scopes.iter().any(|s| s.eq_ignore_ascii_case(extra)) {
                scopes.push(extra);
            }
        }
        scopes.join(" ")
    }

    pub async fn start_device_code(&self) -> Result<DeviceCodeSession, AuthError> {
        let scope = self.scope_param();
        let resp = self
            .client
            .post(&self.device_code_url)
            .header("Accept", "application/json")
            .form(&[("client_id", self.client_id.as_str()), ("scope", scope.as_str())])
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(error_from_body(status.as_u16(), &body));
        }
        let payload: DeviceCodeResponse = serde_json::from_str(&body)?;
        Ok(DeviceCodeSession {
            verification_url: payload.verification_uri,
            user_code: payload.user_code,
            device_code: payload.device_code,
            message: payload.message,
            interval_secs: payload.interval,
            expires_at: Utc::now() + Duration::seconds(payload.expires_in as i64),
        })
    }

    pub async fn poll_device_code(
        &self,
        session: &DeviceCodeSession,
    ) -> Result<DeviceCodePoll, AuthError> {
        if Utc::now() >= session.expires_at {
            return Ok(DeviceCodePoll::Expired);
        }
        let resp = self
            .client
            .post(&self.token_url)
            .header("Accept", "application/json")
            .form(&[
                ("grant_type", DEVICE_CODE_GRANT),
                ("client_id", self.client_id.as_str()),
                ("device_code", session.device_code.as_str()),
            ])
            .send()
            .await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        // Pending and declined answers arrive as 400 with an OAuth error body.
        let payload: TokenEndpointResponse = serde_json::from_str(&body).map_err(|_| {
            AuthError::InvalidResponse(format!("device token poll returned status {status}"))
        })?;
        if payload.access_token.is_some() {
            return Ok(DeviceCodePoll::Authorized {
                token: payload.into_token()?,
            });
        }
        match payload.error.as_deref() {
            Some("authorization_pending") => Ok(DeviceCodePoll::Pending {
                interval_secs: session.interval_secs,
            }),
            Some("slow_down") => Ok(DeviceCodePoll::SlowDown {
                interval_secs: session.interval_secs + SLOW_DOWN_STEP_SECS,
            }),
            Some("expired_token") | Some("code_expired") => Ok(DeviceCodePoll::Expired),
            Some("authorization_declined") | Some("access_denied") => {
                Ok(DeviceCodePoll::AccessDenied)
            }
            Some(code) => Err(AuthError::from_oauth_code(
                code,
                payload.error_description.as_deref(),
            )),
            None => Err(AuthError::InvalidResponse(
                "device token response missing token and error".to_string(),
            )),
        }
    }

    /// Redeem a refresh token for a fresh access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Token, AuthError> {
        let scope = self.scope_param();
        let resp = self
            .client
            .post(&self.token_url)
            .header("Accept", "application/json")
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", self.client_id.as_str()),
                ("refresh_token", refresh_token),
                ("scope", scope.as_str()),
            ])
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(error_from_body(status.as_u16(), &body));
        }
        let payload: TokenEndpointResponse = serde_json::from_str(&body)?;
        payload.into_token()
    }

    async fn run_device_code_flow(&self) -> Result<Token, AuthError> {
        let mut session = self.start_device_code().await?;
        (self.prompt)(&session);
        loop {
            tokio::time::sleep(std::time::Duration::from_secs(session.interval_secs)).await;
            match self.poll_device_code(&session).await? {
                DeviceCodePoll::Authorized { token } => return Ok(token),
                DeviceCodePoll::Pending { .. } => continue,
                DeviceCodePoll::SlowDown { interval_secs } => {
                    tracing::debug!(interval_secs, "identity provider asked to slow down");
                    session.interval_secs = interval_secs;
                }
                DeviceCodePoll::AccessDenied => return Err(AuthError::AccessDenied),
                DeviceCodePoll::Expired => return Err(AuthError::DeviceCodeExpired),
            }
        }
    }
}

#[async_trait]
impl IdentityProvider for MicrosoftIdentity {
    async fn acquire_token_silent(&self, refresh_token: &str) -> Result<Token, AuthError> {
        self.refresh(refresh_token).await
    }

    async fn acquire_token_interactive(&self) -> Result<Token, AuthError> {
        self.run_device_code_flow().await
    }
}

fn log_prompt(session: &DeviceCodeSession) {
    match &session.message {
        Some(message) => tracing::info!("{message}"),
        None => tracing::info!(
            url = %session.verification_url,
            code = %session.user_code,
            "open the verification page and enter the code"
        ),
    }
}

fn error_from_body(status: u16, body: &str) -> AuthError {
    match serde_json::from_str::<TokenEndpointResponse>(body) {
        Ok(TokenEndpointResponse {
            error: Some(code),
            error_description,
            ..
        }) => AuthError::from_oauth_code(&code, error_description.as_deref()),
        _ => AuthError::InvalidResponse(format!("token endpoint returned status {status}")),
    }
}

#[derive(Debug, Deserialize)]
struct DeviceCodeResponse {
    device_code: String,
    user_code: String,
    verification_uri: String,
    expires_in: u64,
    #[serde(default = "default_interval")]
    interval: u64,
    message: Option<String>,
}

fn default_interval() -> u64 {
    5
}

#[derive(Debug, Deserialize)]
struct TokenEndpointResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    id_token: Option<String>,
    expires_in: Option<i64>,
    scope: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

impl TokenEndpointResponse {
    fn into_token(self) -> Result<Token, AuthError> {
        let access_token = self.access_token.ok_or_else(|| {
            AuthError::InvalidResponse("token response missing access_token".to_string())
        })?;
        let now = Utc::now();
        let account_id = self
            .id_token
            .as_deref()
            .and_then(decode_id_token)
            .and_then(|claims| claims.home_account_id());
        Ok(Token {
            access_token,
            refresh_token: self.refresh_token,
            id_token: self.id_token,
            expires_at: self.expires_in.map(|secs| now + Duration::seconds(secs)),
            last_refresh: Some(now),
            scopes: self
                .scope
                .map(|s| s.split_whitespace().map(str::to_string).collect()),
            account_id,
        })
    }
}

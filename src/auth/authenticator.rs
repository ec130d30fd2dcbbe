use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use super::error::AuthError;
use super::session::Session;
use super::store::TokenStore;
use super::token::Token;

/// Token store slot used for the Graph credential.
pub const STORE_KEY: &str = "microsoft-graph";

/// Renew this long before the provider-declared expiry.
const EXPIRY_SKEW_MINUTES: i64 = 5;

/// Bearer credential handed to the remote store client.
#[derive(Clone)]
pub struct Credential {
    pub access_token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"..")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl From<&Token> for Credential {
    fn from(token: &Token) -> Self {
        Self {
            access_token: token.access_token.clone(),
            expires_at: token.expires_at,
        }
    }
}

/// Anything that can hand out a bearer credential on demand.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn acquire_token(&self) -> Result<Credential, AuthError>;
}

/// The identity provider collaborator: a silent renewal and an interactive sign-in.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn acquire_token_silent(&self, refresh_token: &str) -> Result<Token, AuthError>;
    async fn acquire_token_interactive(&self) -> Result<Token, AuthError>;
}

#[derive(Default)]
struct SessionState {
    restored: bool,
    token: Option<Token>,
    session: Option<Session>,
}

/// Holds the single signed-in identity and produces tokens for it.
///
/// `acquire_token` returns the cached token while it is fresh, otherwise
/// tries a silent renewal and, only if that fails, one interactive sign-in.
/// Calls are serialized so concurrent requests never open two prompts.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use meetai::auth::{MemoryTokenStore, SessionAuthenticator};
/// use meetai::auth::providers::MicrosoftIdentity;
///
/// let identity = MicrosoftIdentity::new(
///     "client-id",
///     "https://login.microsoftonline.com/common",
///     vec!["Files.ReadWrite.All".to_string()],
/// );
/// let auth = SessionAuthenticator::new(Arc::new(identity), Arc::new(MemoryTokenStore::new()));
/// ```
pub struct SessionAuthenticator {
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn TokenStore>,
    profile: String,
    state: Mutex<SessionState>,
}

impl SessionAuthenticator {
    pub fn new(identity: Arc<dyn IdentityProvider>, store: Arc<dyn TokenStore>) -> Self {
        Self {
            identity,
            store,
            profile: "default".to_string(),
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Run the interactive sign-in and remember the account it produced.
    pub async fn sign_in(&self) -> Result<Session, AuthError> {
        let mut state = self.state.lock().await;
        self.restore(&mut state);
        let token = self.identity.acquire_token_interactive().await?;
        self.remember(&mut state, token);
        state.session.clone().ok_or_else(|| {
            AuthError::InvalidResponse("sign-in response did not identify an account".to_string())
        })
    }

    /// Forget the session and drop the cached token.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let mut state = self.state.lock().await;
        *state = SessionState {
            restored: true,
            ..SessionState::default()
        };
        self.store.clear(STORE_KEY, &self.profile)
    }

    /// The current session, restored from the token cache on first use.
    pub async fn session(&self) -> Option<Session> {
        let mut state = self.state.lock().await;
        self.restore(&mut state);
        state.session.clone()
    }

    fn restore(&self, state: &mut SessionState) {
        if state.restored {
            return;
        }
        state.restored = true;
        match self.store.load(STORE_KEY, &self.profile) {
            Ok(Some(token)) => {
                state.session = Session::from_token(&token);
                state.token = Some(token);
                tracing::debug!(profile = %self.profile, "restored cached token");
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(error = %err, "ignoring unreadable token cache");
            }
        }
    }

    fn remember(&self, state: &mut SessionState, token: Token) {
        let token = match &state.token {
            Some(previous) => token.inherit_from(previous),
            None => token,
        };
        if let Err(err) = self.store.save(STORE_KEY, &self.profile, &token) {
            tracing::warn!(error = %err, "failed to persist token; continuing in memory");
        }
        if let Some(session) = Session::from_token(&token) {
            state.session = Some(session);
        }
        state.token = Some(token);
    }

    async fn try_silent(&self, state: &SessionState) -> Result<Token, AuthError> {
        let token = state.token.as_ref().ok_or(AuthError::NotLoggedIn)?;
        let refresh_token = token.refresh_token.as_deref().ok_or_else(|| {
            AuthError::InteractionRequired("no refresh token cached".to_string())
        })?;
        self.identity.acquire_token_silent(refresh_token).await
    }
}

#[async_trait]
impl CredentialProvider for SessionAuthenticator {
    async fn acquire_token(&self) -> Result<Credential, AuthError> {
        let mut state = self.state.lock().await;
        self.restore(&mut state);

        if let Some(token) = &state.token {
            if !token.expires_within(Duration::minutes(EXPIRY_SKEW_MINUTES)) {
                return Ok(Credential::from(token));
            }
        }

        match self.try_silent(&state).await {
            Ok(token) => {
                tracing::debug!("silent token renewal succeeded");
                self.remember(&mut state, token);
            }
            Err(err) => {
                tracing::warn!(error = %err, "silent token renewal failed; prompting");
                let token = self.identity.acquire_token_interactive().await?;
                self.remember(&mut state, token);
            }
        }

        state
            .token
            .as_ref()
            .map(Credential::from)
            .ok_or(AuthError::NotLoggedIn)
    }
}

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use meetai::auth::{AuthError, IdentityProvider, Token, TokenStore};

#[derive(Default)]
pub struct InMemoryTokenStore {
    tokens: Mutex<HashMap<(String, String), Token>>,
    saves: AtomicUsize,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, key: &str, profile: &str, token: Token) {
        self.tokens
            .lock()
            .expect("store lock poisoned")
            .insert((key.to_string(), profile.to_string()), token);
    }

    pub fn get(&self, key: &str, profile: &str) -> Option<Token> {
        self.tokens
            .lock()
            .expect("store lock poisoned")
            .get(&(key.to_string(), profile.to_string()))
            .cloned()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl TokenStore for InMemoryTokenStore {
    fn load(&self, key: &str, profile: &str) -> Result<Option<Token>, AuthError> {
        Ok(self.get(key, profile))
    }

    fn save(&self, key: &str, profile: &str, token: &Token) -> Result<(), AuthError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.tokens
            .lock()
            .expect("store lock poisoned")
            .insert((key.to_string(), profile.to_string()), token.clone());
        Ok(())
    }

    fn clear(&self, key: &str, profile: &str) -> Result<(), AuthError> {
        self.tokens
            .lock()
            .expect("store lock poisoned")
            .remove(&(key.to_string(), profile.to_string()));
        Ok(())
    }
}

/// Unsigned JWT carrying the given claims.
pub fn id_token(claims: serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.sig")
}

pub fn alice_id_token() -> String {
    id_token(serde_json::json!({
        "oid": "00000000-0000-0000-0000-0000000000a1",
        "tid": "9188040d-6c67-4c5b-b112-36a304b66dad",
        "preferred_username": "alice@contoso.com",
        "name": "Alice"
    }))
}

pub const ALICE_ACCOUNT: &str =
    "00000000-0000-0000-0000-0000000000a1.9188040d-6c67-4c5b-b112-36a304b66dad";

pub fn token(access_token: &str) -> Token {
    Token {
        access_token: access_token.to_string(),
        refresh_token: None,
        id_token: None,
        expires_at: None,
        last_refresh: Some(Utc::now()),
        scopes: None,
        account_id: None,
    }
}

/// A signed-in token for alice that stays fresh for an hour.
pub fn fresh_token(access_token: &str) -> Token {
    Token {
        refresh_token: Some("refresh-1".to_string()),
        id_token: Some(alice_id_token()),
        expires_at: Some(Utc::now() + Duration::hours(1)),
        account_id: Some(ALICE_ACCOUNT.to_string()),
        ..token(access_token)
    }
}

/// Same as `fresh_token` but already past its expiry.
pub fn stale_token(access_token: &str) -> Token {
    Token {
        expires_at: Some(Utc::now() - Duration::minutes(1)),
        ..fresh_token(access_token)
    }
}

type Scripted = Mutex<Vec<Result<Token, AuthError>>>;

/// Identity provider returning scripted answers and counting calls.
#[derive(Default)]
pub struct ScriptedIdentity {
    silent: Scripted,
    interactive: Scripted,
    silent_calls: AtomicUsize,
    interactive_calls: AtomicUsize,
    seen_refresh_tokens: Mutex<Vec<String>>,
}

impl ScriptedIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_silent(self, result: Result<Token, AuthError>) -> Self {
        self.silent.lock().expect("lock").push(result);
        self
    }

    pub fn on_interactive(self, result: Result<Token, AuthError>) -> Self {
        self.interactive.lock().expect("lock").push(result);
        self
    }

    pub fn silent_calls(&self) -> usize {
        self.silent_calls.load(Ordering::SeqCst)
    }

    pub fn interactive_calls(&self) -> usize {
        self.interactive_calls.load(Ordering::SeqCst)
    }

    pub fn seen_refresh_tokens(&self) -> Vec<String> {
        self.seen_refresh_tokens.lock().expect("lock").clone()
    }

    fn next(queue: &Scripted) -> Result<Token, AuthError> {
        let mut queue = queue.lock().expect("lock");
        if queue.is_empty() {
            return Err(AuthError::InvalidResponse("no scripted answer".to_string()));
        }
        queue.remove(0)
    }
}

#[async_trait]
impl IdentityProvider for ScriptedIdentity {
    async fn acquire_token_silent(&self, refresh_token: &str) -> Result<Token, AuthError> {
        self.silent_calls.fetch_add(1, Ordering::SeqCst);
        self.seen_refresh_tokens
            .lock()
            .expect("lock")
            .push(refresh_token.to_string());
        Self::next(&self.silent)
    }

    async fn acquire_token_interactive(&self) -> Result<Token, AuthError> {
        self.interactive_calls.fetch_add(1, Ordering::SeqCst);
        Self::next(&self.interactive)
    }
}

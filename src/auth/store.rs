use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::AuthError;
use super::token::Token;

const TOKEN_FILE_VERSION: u32 = 1;

/// Storage abstraction for cached OAuth tokens, keyed by account slot and profile.
pub trait TokenStore: Send + Sync {
    fn load(&self, key: &str, profile: &str) -> Result<Option<Token>, AuthError>;
    fn save(&self, key: &str, profile: &str, token: &Token) -> Result<(), AuthError>;
    fn clear(&self, key: &str, profile: &str) -> Result<(), AuthError>;
}

/// Configuration for file-backed token storage.
#[derive(Debug, Clone)]
pub struct TokenStoreConfig {
    pub base_dir: PathBuf,
}

impl TokenStoreConfig {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn default_dir() -> PathBuf {
        default_meetai_dir()
    }
}

/// File-backed token cache, one TOML file per key and profile.
///
/// Plays the role the browser's local storage played for the sign-in
/// library: a later process can renew silently without prompting.
///
/// # Example
/// ```no_run
/// use meetai::auth::{FileTokenStore, Token, TokenStore};
///
/// let store = FileTokenStore::new_default();
/// let token = Token {
///     access_token: "access".to_string(),
///     refresh_token: Some("refresh".to_string()),
///     id_token: None,
///     expires_at: None,
///     last_refresh: None,
///     scopes: None,
///     account_id: None,
/// };
/// store.save("microsoft-graph", "default", &token)?;
/// # Ok::<(), meetai::auth::AuthError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    base_dir: PathBuf,
}

impl FileTokenStore {
    pub fn new(config: TokenStoreConfig) -> Self {
        Self {
            base_dir: config.base_dir,
        }
    }

    pub fn new_default() -> Self {
        Self {
            base_dir: default_meetai_dir(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn token_path(&self, key: &str, profile: &str) -> PathBuf {
        let key = normalize_label(key);
        let profile = normalize_label(profile);
        let name = if profile == "default" {
            format!("{key}.toml")
        } else {
            format!("{key}.{profile}.toml")
        };
        self.base_dir.join(name)
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self, key: &str, profile: &str) -> Result<Option<Token>, AuthError> {
        let path = self.token_path(key, profile);
        let raw = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(AuthError::Io(err.to_string())),
        };
        let file: TokenFile = toml::from_str(&raw)?;
        if file.version != TOKEN_FILE_VERSION {
            return Err(AuthError::Serialization(format!(
                "unsupported token file version {} at {}",
                file.version,
                path.display()
            )));
        }
        Ok(Some(file.token))
    }

    fn save(&self, key: &str, profile: &str, token: &Token) -> Result<(), AuthError> {
        let path = self.token_path(key, profile);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = TokenFile {
            version: TOKEN_FILE_VERSION,
            key: key.to_string(),
            profile: profile.to_string(),
            token: token.clone(),
            saved_at: Utc::now(),
        };
        fs::write(&path, toml::to_string(&file)?)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    fn clear(&self, key: &str, profile: &str) -> Result<(), AuthError> {
        match fs::remove_file(self.token_path(key, profile)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AuthError::Io(err.to_string())),
        }
    }
}

/// Process-local token store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<HashMap<(String, String), Token>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self, key: &str, profile: &str) -> Result<Option<Token>, AuthError> {
        let guard = self
            .tokens
            .lock()
            .map_err(|_| AuthError::Io("token store lock poisoned".to_string()))?;
        Ok(guard.get(&(key.to_string(), profile.to_string())).cloned())
    }

    fn save(&self, key: &str, profile: &str, token: &Token) -> Result<(), AuthError> {
        self.tokens
            .lock()
            .map_err(|_| AuthError::Io("token store lock poisoned".to_string()))?
            .insert((key.to_string(), profile.to_string()), token.clone());
        Ok(())
    }

    fn clear(&self, key: &str, profile: &str) -> Result<(), AuthError> {
        self.tokens
            .lock()
            .map_err(|_| AuthError::Io("token store lock poisoned".to_string()))?
            .remove(&(key.to_string(), profile.to_string()));
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TokenFile {
    version: u32,
    key: String,
    profile: String,
    token: Token,
    saved_at: DateTime<Utc>,
}

fn default_meetai_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".meetai"))
        .unwrap_or_else(|| PathBuf::from(".meetai"))
}

fn normalize_label(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return "default".to_string();
    }
    let out: String = trimmed
        .chars()
        .map(|ch| {
            let lower = ch.to_ascii_lowercase();
            if lower.is_ascii_alphanumeric() || lower == '-' {
                lower
            } else {
                '-'
            }
        })
        .collect();
    if out.trim_matches('-').is_empty() {
        "default".to_string()
    } else {
        out
    }
}

//! Configuration (code > env > defaults).

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use crate::auth::providers::microsoft::{DEFAULT_AUTHORITY, DEFAULT_CLIENT_ID, DEFAULT_SCOPES};
use crate::auth::store::{FileTokenStore, TokenStore, TokenStoreConfig};
use crate::drive::{FolderLookup, DEFAULT_FOLDER_NAME, DEFAULT_GRAPH_URL};
use crate::error::{MeetError, Result};

/// Static configuration for sign-in and upload.
///
/// Resolution order: explicit `with_*` setters, then `MEETAI_*` environment
/// variables (a `.env` file is loaded if present), then built-in defaults.
#[derive(Debug, Clone)]
pub struct MeetConfig {
    pub client_id: String,
    pub authority: String,
    pub scopes: Vec<String>,
    pub graph_url: String,
    pub folder_name: String,
    pub folder_lookup: FolderLookup,
    pub retry_attempts: u32,
    pub token_dir: PathBuf,
}

impl Default for MeetConfig {
    fn default() -> Self {
        Self {
            client_id: DEFAULT_CLIENT_ID.to_string(),
            authority: DEFAULT_AUTHORITY.to_string(),
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
            graph_url: DEFAULT_GRAPH_URL.to_string(),
            folder_name: DEFAULT_FOLDER_NAME.to_string(),
            folder_lookup: FolderLookup::default(),
            retry_attempts: 1,
            token_dir: TokenStoreConfig::default_dir(),
        }
    }
}

impl MeetConfig {
    /// Load from `MEETAI_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = var("MEETAI_CLIENT_ID") {
            config.client_id = v;
        }
        if let Some(v) = var("MEETAI_AUTHORITY") {
            config.authority = v;
        }
        if let Some(v) = var("MEETAI_SCOPES") {
            config.scopes = v
                .split([',', ' '])
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(v) = var("MEETAI_GRAPH_URL") {
            config.graph_url = v;
        }
        if let Some(v) = var("MEETAI_FOLDER") {
            config.folder_name = v;
        }
        if let Some(v) = var("MEETAI_FOLDER_LOOKUP") {
            config.folder_lookup = FolderLookup::from_str(&v).map_err(|_| {
                MeetError::Configuration(format!(
                    "MEETAI_FOLDER_LOOKUP must be direct_path or listing, got '{v}'"
                ))
            })?;
        }
        if let Some(v) = var("MEETAI_RETRY_ATTEMPTS") {
            config.retry_attempts = v.parse().map_err(|_| {
                MeetError::Configuration(format!(
                    "MEETAI_RETRY_ATTEMPTS must be a positive integer, got '{v}'"
                ))
            })?;
        }
        if let Some(v) = var("MEETAI_TOKEN_DIR") {
            config.token_dir = PathBuf::from(v);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_folder_name(mut self, name: impl Into<String>) -> Self {
        self.folder_name = name.into();
        self
    }

    pub fn with_folder_lookup(mut self, lookup: FolderLookup) -> Self {
        self.folder_lookup = lookup;
        self
    }

    pub fn with_graph_url(mut self, url: impl Into<String>) -> Self {
        self.graph_url = url.into();
        self
    }

    pub fn with_token_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.token_dir = dir.into();
        self
    }

    /// Reject values that cannot work at all.
    pub fn validate(&self) -> Result<()> {
        if self.client_id.is_empty() {
            return Err(MeetError::Configuration("client id is empty".to_string()));
        }
        if self.scopes.is_empty() {
            return Err(MeetError::Configuration("no scopes configured".to_string()));
        }
        if self.retry_attempts == 0 {
            return Err(MeetError::Configuration(
                "retry attempts must be at least 1".to_string(),
            ));
        }
        let name = self.folder_name.trim();
        if name.is_empty() || name.contains('/') || name.contains('\\') {
            return Err(MeetError::Configuration(format!(
                "folder name '{}' must be a single non-empty path segment",
                self.folder_name
            )));
        }
        Ok(())
    }

    /// File-backed token cache under `token_dir`.
    pub fn token_store(&self) -> Arc<dyn TokenStore> {
        Arc::new(FileTokenStore::new(TokenStoreConfig::new(
            self.token_dir.clone(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<MeetConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        MeetConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_target_common_authority_and_audio_folder() {
        let config = from_pairs(&[]).unwrap();
        assert_eq!(config.client_id, DEFAULT_CLIENT_ID);
        assert_eq!(config.authority, "https://login.microsoftonline.com/common");
        assert_eq!(config.scopes, vec!["Files.ReadWrite.All", "User.Read"]);
        assert_eq!(config.folder_name, "AudioParaTranscribir");
        assert_eq!(config.folder_lookup, FolderLookup::DirectPath);
        assert_eq!(config.retry_attempts, 1);
    }

    #[test]
    fn env_overrides_are_applied() {
        let config = from_pairs(&[
            ("MEETAI_CLIENT_ID", "my-app"),
            ("MEETAI_SCOPES", "Files.ReadWrite, User.Read"),
            ("MEETAI_FOLDER", "Meetings"),
            ("MEETAI_FOLDER_LOOKUP", "listing"),
            ("MEETAI_RETRY_ATTEMPTS", "3"),
            ("MEETAI_TOKEN_DIR", "/tmp/meetai-tokens"),
        ])
        .unwrap();
        assert_eq!(config.client_id, "my-app");
        assert_eq!(config.scopes, vec!["Files.ReadWrite", "User.Read"]);
        assert_eq!(config.folder_name, "Meetings");
        assert_eq!(config.folder_lookup, FolderLookup::Listing);
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.token_dir, PathBuf::from("/tmp/meetai-tokens"));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = from_pairs(&[("MEETAI_FOLDER", "   ")]).unwrap();
        assert_eq!(config.folder_name, DEFAULT_FOLDER_NAME);
    }

    #[test]
    fn invalid_values_are_configuration_errors() {
        assert!(matches!(
            from_pairs(&[("MEETAI_FOLDER_LOOKUP", "random")]),
            Err(MeetError::Configuration(_))
        ));
        assert!(matches!(
            from_pairs(&[("MEETAI_RETRY_ATTEMPTS", "many")]),
            Err(MeetError::Configuration(_))
        ));
        assert!(matches!(
            from_pairs(&[("MEETAI_RETRY_ATTEMPTS", "0")]),
            Err(MeetError::Configuration(_))
        ));
        assert!(matches!(
            from_pairs(&[("MEETAI_FOLDER", "a/b")]),
            Err(MeetError::Configuration(_))
        ));
    }
}

//! Per-provider access tokens.
//!
//! The picker only reads and writes opaque token strings; obtaining them
//! (OAuth, SDK login) is the host's business.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing::debug;

use crate::types::Provider;

const CREDENTIALS_FILE: &str = "credentials.json";

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Failed to access credential file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Credential file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub trait CredentialStore: Send + Sync {
    /// Stored token for `provider`. Empty strings count as absent.
    fn token(&self, provider: Provider) -> Option<String>;

    /// Replace (`Some`) or forget (`None`) the token for `provider`.
    fn set_token(&self, provider: Provider, token: Option<String>) -> Result<(), CredentialError>;
}

/// Tokens that live only as long as the picker session.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    tokens: Mutex<BTreeMap<Provider, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(provider: Provider, token: impl Into<String>) -> Self {
        let store = Self::default();
        lock(&store.tokens).insert(provider, token.into());
        store
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn token(&self, provider: Provider) -> Option<String> {
        lock(&self.tokens)
            .get(&provider)
            .filter(|t| !t.is_empty())
            .cloned()
    }

    fn set_token(&self, provider: Provider, token: Option<String>) -> Result<(), CredentialError> {
        let mut tokens = lock(&self.tokens);
        match token {
            Some(t) => tokens.insert(provider, t),
            None => tokens.remove(&provider),
        };
        Ok(())
    }
}

/// Tokens persisted as a small JSON map in a directory, so a login
/// survives across runs of the CLI.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    tokens: Mutex<BTreeMap<Provider, String>>,
}

impl FileCredentialStore {
    /// Open (or lazily create) the store under `dir`.
    pub fn open(dir: &Path) -> Result<Self, CredentialError> {
        let path = dir.join(CREDENTIALS_FILE);
        let tokens = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|source| {
                CredentialError::Corrupt {
                    path: path.clone(),
                    source,
                }
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(CredentialError::Io { path, source }),
        };
        debug!("Loaded credential store from {}", path.display());
        Ok(Self {
            path,
            tokens: Mutex::new(tokens),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, tokens: &BTreeMap<Provider, String>) -> Result<(), CredentialError> {
        let io_err = |source| CredentialError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(tokens).map_err(|source| {
            CredentialError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;
        std::fs::write(&self.path, json).map_err(io_err)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .map_err(io_err)?;
        }
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn token(&self, provider: Provider) -> Option<String> {
        lock(&self.tokens)
            .get(&provider)
            .filter(|t| !t.is_empty())
            .cloned()
    }

    fn set_token(&self, provider: Provider, token: Option<String>) -> Result<(), CredentialError> {
        let mut tokens = lock(&self.tokens);
        match token {
            Some(t) => tokens.insert(provider, t),
            None => tokens.remove(&provider),
        };
        self.persist(&tokens)
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    // A panic while holding the lock cannot leave the map half-written.
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

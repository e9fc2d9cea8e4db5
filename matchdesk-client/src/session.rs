//! Credential store
//!
//! Persists the access/refresh token pair and the serialized identity across
//! process restarts. Backends implement a small string key-value contract;
//! the `SessionStore` facade owns the three well-known keys and keeps their
//! lifecycle in one place: written on login or refresh, cleared together on
//! logout or unrecoverable refresh failure.

use async_trait::async_trait;
use matchdesk_core::{AdminConfig, AdminError, AdminResult, Credentials, ErrorContext, Identity};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Storage key for the short-lived bearer token
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Storage key for the long-lived refresh token
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
/// Storage key for the serialized identity object
pub const IDENTITY_KEY: &str = "identity";

/// Durable string key-value storage for session credentials
#[async_trait]
pub trait CredentialStorage: Send + Sync {
    /// Read a value by key
    async fn read(&self, key: &str) -> AdminResult<Option<String>>;

    /// Write a value under a key, replacing any previous value
    async fn write(&self, key: &str, value: &str) -> AdminResult<()>;

    /// Remove a key; removing an absent key is not an error
    async fn remove(&self, key: &str) -> AdminResult<()>;
}

/// In-memory credential storage (default for tests and short-lived tools)
pub struct MemoryCredentialStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryCredentialStorage {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryCredentialStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStorage for MemoryCredentialStorage {
    async fn read(&self, key: &str) -> AdminResult<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn write(&self, key: &str, value: &str) -> AdminResult<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> AdminResult<()> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }
}

/// File-backed credential storage
///
/// Keeps the whole key set in one JSON file and rewrites it on every
/// mutation. Writes go through the in-memory map first, so readers never
/// observe a partially written state.
pub struct FileCredentialStorage {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl FileCredentialStorage {
    /// Open (or create) the storage file at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> AdminResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AdminError::Storage {
                message: format!("Failed to create storage directory: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("credential_storage")
                    .with_operation("open")
                    .with_suggestion("Check permissions on the data directory"),
            })?;
        }

        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| AdminError::Storage {
                message: format!("Failed to read credential file: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("credential_storage").with_operation("open"),
            })?;
            match serde_json::from_str(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    // A corrupt credential file is equivalent to being logged
                    // out; start over instead of refusing to open.
                    warn!("Discarding unreadable credential file: {}", e);
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    async fn persist(&self, entries: &HashMap<String, String>) -> AdminResult<()> {
        let content = serde_json::to_string_pretty(entries)?;
        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| AdminError::Storage {
                message: format!("Failed to write credential file: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("credential_storage")
                    .with_operation("persist")
                    .with_suggestion("Check permissions on the data directory"),
            })
    }
}

#[async_trait]
impl CredentialStorage for FileCredentialStorage {
    async fn read(&self, key: &str) -> AdminResult<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn write(&self, key: &str, value: &str) -> AdminResult<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries).await
    }

    async fn remove(&self, key: &str) -> AdminResult<()> {
        let mut entries = self.entries.write().await;
        if entries.remove(key).is_some() {
            self.persist(&entries).await?;
        }
        Ok(())
    }
}

/// Typed facade over the three persisted session keys
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn CredentialStorage>,
}

impl SessionStore {
    pub fn with_storage(storage: Arc<dyn CredentialStorage>) -> Self {
        Self { storage }
    }

    /// Volatile store, nothing survives the process
    pub fn in_memory() -> Self {
        Self::with_storage(Arc::new(MemoryCredentialStorage::new()))
    }

    /// Durable store backed by `credentials.json` under `data_dir`
    pub fn on_disk<P: AsRef<Path>>(data_dir: P) -> AdminResult<Self> {
        let storage = FileCredentialStorage::open(data_dir.as_ref().join("credentials.json"))?;
        Ok(Self::with_storage(Arc::new(storage)))
    }

    /// Store selected by configuration: durable under the resolved data dir
    /// when credential persistence is enabled, volatile otherwise
    pub fn from_config(config: &AdminConfig) -> AdminResult<Self> {
        if config.storage.persist_credentials {
            Self::on_disk(config.resolved_data_dir())
        } else {
            Ok(Self::in_memory())
        }
    }

    pub async fn access_token(&self) -> AdminResult<Option<String>> {
        self.storage.read(ACCESS_TOKEN_KEY).await
    }

    pub async fn refresh_token(&self) -> AdminResult<Option<String>> {
        self.storage.read(REFRESH_TOKEN_KEY).await
    }

    /// The locally cached identity, if a session is stored
    ///
    /// An unreadable cached identity is treated as absent rather than an
    /// error; `check` will re-establish it from the server.
    pub async fn identity(&self) -> AdminResult<Option<Identity>> {
        let raw = self.storage.read(IDENTITY_KEY).await?;
        Ok(raw.and_then(|raw| match serde_json::from_str(&raw) {
            Ok(identity) => Some(identity),
            Err(e) => {
                debug!("Ignoring unreadable cached identity: {}", e);
                None
            }
        }))
    }

    /// Persist a full credential set issued by a successful login
    pub async fn store_credentials(&self, credentials: &Credentials) -> AdminResult<()> {
        self.storage
            .write(ACCESS_TOKEN_KEY, &credentials.access_token)
            .await?;
        self.storage
            .write(REFRESH_TOKEN_KEY, &credentials.refresh_token)
            .await?;
        let identity = serde_json::to_string(&credentials.identity)?;
        self.storage.write(IDENTITY_KEY, &identity).await
    }

    /// Replace the token pair after a refresh, keeping the cached identity
    pub async fn store_tokens(&self, access_token: &str, refresh_token: &str) -> AdminResult<()> {
        self.storage.write(ACCESS_TOKEN_KEY, access_token).await?;
        self.storage.write(REFRESH_TOKEN_KEY, refresh_token).await
    }

    /// Clear all three keys together
    pub async fn clear(&self) -> AdminResult<()> {
        self.storage.remove(ACCESS_TOKEN_KEY).await?;
        self.storage.remove(REFRESH_TOKEN_KEY).await?;
        self.storage.remove(IDENTITY_KEY).await
    }
}

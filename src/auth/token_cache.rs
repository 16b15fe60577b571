use crate::config::Config;
use crate::error::{RdsError, Result};
use crate::models::CachedToken;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Persistence for the single token owned by a refreshing authenticator
#[cfg_attr(test, mockall::automock)]
pub trait TokenStore: Send + Sync {
    /// Returns `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> Result<Option<CachedToken>>;

    fn save(&self, token: &CachedToken) -> Result<()>;
}

/// Token cache file at `<config_dir>/token-cache/<service>.json`
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Per-service cache file under the user's configuration directory
    pub fn for_service(service: &str) -> Result<Self> {
        let path = Config::config_dir()?
            .join("token-cache")
            .join(format!("{}.json", service));
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        let Some(dir) = self.path.parent() else {
            return Ok(());
        };
        if dir.exists() {
            return Ok(());
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            fs::DirBuilder::new()
                .recursive(true)
                .mode(0o700)
                .create(dir)?;
        }
        #[cfg(not(unix))]
        fs::create_dir_all(dir)?;

        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<CachedToken>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)?;
        let token: CachedToken = serde_json::from_str(&contents)?;
        Ok(Some(token))
    }

    fn save(&self, token: &CachedToken) -> Result<()> {
        self.ensure_parent_dir()?;
        let json = serde_json::to_string_pretty(token)?;

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path)?;
        file.write_all(json.as_bytes())?;

        // `mode` only applies on creation; tighten files left by older versions.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }
}

/// In-process token store, for tests and callers that must not touch disk
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<CachedToken>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: CachedToken) -> Self {
        Self {
            token: Mutex::new(Some(token)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<CachedToken>> {
        let guard = self
            .token
            .lock()
            .map_err(|_| RdsError::Config("token store lock poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn save(&self, token: &CachedToken) -> Result<()> {
        let mut guard = self
            .token
            .lock()
            .map_err(|_| RdsError::Config("token store lock poisoned".to_string()))?;
        *guard = Some(token.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("mysql.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_file_store_round_trip_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("token-cache").join("mysql.json"));
        let token = CachedToken::new("abc", Utc::now(), 86400).unwrap();

        store.save(&token).unwrap();
        assert_eq!(store.load().unwrap(), Some(token));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_permissions_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let cache_dir = dir.path().join("token-cache");
        let store = FileTokenStore::new(cache_dir.join("postgres.json"));
        store
            .save(&CachedToken::new("abc", Utc::now(), 60).unwrap())
            .unwrap();

        let file_mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(file_mode & 0o777, 0o600);
        let dir_mode = fs::metadata(&cache_dir).unwrap().permissions().mode();
        assert_eq!(dir_mode & 0o777, 0o700);
    }

    #[test]
    fn test_file_store_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mariadb.json");
        fs::write(&path, "not json").unwrap();

        let store = FileTokenStore::new(path);
        assert!(store.load().is_err());
    }

    #[test]
    fn test_file_store_on_disk_format() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("mysql.json"));
        store
            .save(&CachedToken::new("abc", Utc::now(), 60).unwrap())
            .unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["token"], "abc");
        assert!(raw["expires_at"].is_string());
        assert!(raw["issued_at"].is_string());
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryTokenStore::new();
        assert!(store.load().unwrap().is_none());

        let token = CachedToken::new("abc", Utc::now(), 60).unwrap();
        store.save(&token).unwrap();
        assert_eq!(store.load().unwrap(), Some(token));
    }
}

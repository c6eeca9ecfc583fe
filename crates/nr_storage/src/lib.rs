use async_trait::async_trait;
use nr_core::{Error, KeyValueStore, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

pub mod backends;

pub use backends::*;

#[async_trait]
pub trait StorageBackend: KeyValueStore + Sized {
    fn get_error_message() -> &'static str;
    async fn open(config: &BackendConfig) -> Result<Self>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageKind {
    Memory,
    #[default]
    File,
    Sqlite,
}

impl StorageKind {
    fn default_path(&self) -> PathBuf {
        match self {
            StorageKind::Memory => PathBuf::new(),
            StorageKind::File => PathBuf::from("nr-storage.json"),
            StorageKind::Sqlite => PathBuf::from("nr-storage.db"),
        }
    }
}

impl FromStr for StorageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StorageKind::Memory),
            "file" | "json" => Ok(StorageKind::File),
            "sqlite" => Ok(StorageKind::Sqlite),
            other => Err(Error::Storage(format!(
                "Unknown storage backend '{}'. Available: memory, file, sqlite",
                other
            ))),
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StorageKind::Memory => "memory",
            StorageKind::File => "file",
            StorageKind::Sqlite => "sqlite",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub kind: StorageKind,
    pub path: PathBuf,
}

impl BackendConfig {
    pub fn new(kind: StorageKind) -> Self {
        Self {
            path: kind.default_path(),
            kind,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }
}

async fn open_backend<T: StorageBackend + 'static>(config: &BackendConfig) -> Result<Arc<dyn KeyValueStore>> {
    let storage = T::open(config).await.map_err(|e| {
        Error::Storage(format!("{} ({})", T::get_error_message(), e))
    })?;
    Ok(Arc::new(storage))
}

/// Open the configured backend behind the storage port.
pub async fn create_storage(config: &BackendConfig) -> Result<Arc<dyn KeyValueStore>> {
    let storage = match config.kind {
        StorageKind::Memory => open_backend::<InMemoryStorage>(config).await?,
        StorageKind::File => open_backend::<FileStorage>(config).await?,
        #[cfg(feature = "sqlite")]
        StorageKind::Sqlite => open_backend::<SQLiteStorage>(config).await?,
        #[cfg(not(feature = "sqlite"))]
        StorageKind::Sqlite => {
            return Err(Error::Storage(
                "nr_storage was built without the `sqlite` feature".to_string(),
            ))
        }
    };
    info!(kind = %config.kind, path = %config.path.display(), "Storage backend ready");
    Ok(storage)
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_storage, BackendConfig, StorageBackend, StorageKind};
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_storage_kind_parsing() {
        assert_eq!("memory".parse::<StorageKind>().unwrap(), StorageKind::Memory);
        assert_eq!("JSON".parse::<StorageKind>().unwrap(), StorageKind::File);
        assert_eq!("sqlite".parse::<StorageKind>().unwrap(), StorageKind::Sqlite);
        assert!("redis".parse::<StorageKind>().is_err());
    }

    #[test]
    fn test_default_paths() {
        assert_eq!(
            BackendConfig::new(StorageKind::File).path,
            PathBuf::from("nr-storage.json")
        );
        let config = BackendConfig::new(StorageKind::Sqlite).with_path("/tmp/x.db");
        assert_eq!(config.path, PathBuf::from("/tmp/x.db"));
    }

    #[tokio::test]
    async fn test_create_file_storage() {
        let temp_dir = tempdir().unwrap();
        let config = BackendConfig::new(StorageKind::File).with_path(temp_dir.path().join("s.json"));
        let storage = create_storage(&config).await.unwrap();
        storage.set("favorites", "[]").await.unwrap();
        assert!(temp_dir.path().join("s.json").exists());
    }

    #[cfg(not(feature = "sqlite"))]
    #[tokio::test]
    async fn test_sqlite_requires_feature() {
        let config = BackendConfig::new(StorageKind::Sqlite);
        assert!(create_storage(&config).await.is_err());
    }
}

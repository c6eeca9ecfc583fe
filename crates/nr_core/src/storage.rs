use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::Error;
use crate::types::{Article, Collection, HistoryEntry};
use crate::Result;

/// Text key-value store with the semantics of browser local storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the raw text stored under `key`
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the text stored under `key`
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Drop `key` entirely
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Decode a stored collection, reporting malformed text as `StorageParse`.
pub fn parse_collection<T: DeserializeOwned>(key: &str, raw: &str) -> Result<Vec<T>> {
    serde_json::from_str(raw).map_err(|source| Error::StorageParse {
        key: key.to_string(),
        source,
    })
}

/// Typed access to the `favorites`, `readLaters` and `history` slots.
///
/// Every mutation is a full read-modify-write of one slot. Nothing guards
/// against another process writing the same slot in between.
#[derive(Clone)]
pub struct CollectionRepository {
    store: Arc<dyn KeyValueStore>,
}

impl CollectionRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(Vec::new());
        };
        match parse_collection(key, &raw) {
            Ok(items) => Ok(items),
            Err(e) => {
                warn!(key, error = %e, "Discarding unreadable collection");
                Ok(Vec::new())
            }
        }
    }

    async fn write<T: Serialize>(&self, key: &str, items: &[T]) -> Result<()> {
        let raw = serde_json::to_string(items)?;
        self.store.set(key, &raw).await
    }

    pub async fn articles(&self, collection: Collection) -> Result<Vec<Article>> {
        self.read(collection.key()).await
    }

    pub async fn history(&self) -> Result<Vec<HistoryEntry>> {
        self.read(Collection::History.key()).await
    }

    /// Keys of every article saved in `collection`.
    pub async fn membership(&self, collection: Collection) -> Result<HashSet<String>> {
        Ok(self
            .articles(collection)
            .await?
            .iter()
            .map(|a| a.key().to_string())
            .collect())
    }

    pub async fn contains(&self, collection: Collection, article: &Article) -> Result<bool> {
        let key = article.key();
        Ok(self.articles(collection).await?.iter().any(|a| a.key() == key))
    }

    /// Remove the article if saved, otherwise save it at the front.
    /// Returns whether it is saved afterwards.
    pub async fn toggle(&self, collection: Collection, article: &Article) -> Result<bool> {
        let mut items = self.articles(collection).await?;
        let key = article.key();
        let saved = if let Some(pos) = items.iter().position(|a| a.key() == key) {
            items.remove(pos);
            false
        } else {
            items.insert(0, article.clone());
            true
        };
        self.write(collection.key(), &items).await?;
        debug!(%collection, key, saved, "Toggled collection membership");
        Ok(saved)
    }

    pub async fn remove(&self, collection: Collection, article: &Article) -> Result<()> {
        let key = article.key();
        let items: Vec<Article> = self
            .articles(collection)
            .await?
            .into_iter()
            .filter(|a| a.key() != key)
            .collect();
        self.write(collection.key(), &items).await
    }

    pub async fn record_history(&self, article: &Article) -> Result<()> {
        let mut entries = self.history().await?;
        entries.push(HistoryEntry::from(article));
        self.write(Collection::History.key(), &entries).await
    }
}

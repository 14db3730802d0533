use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, warn};

use crate::domain::ports::KeyValueStore;
use crate::error::AppError;

/// Typed JSON blobs over a [`KeyValueStore`].
///
/// Reads are self-healing: a missing or unparsable value is replaced by the
/// seed and the corruption is logged, never returned.
#[derive(Clone)]
pub struct PersistentStore {
    kv: Arc<dyn KeyValueStore>,
}

impl PersistentStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    pub async fn load<T>(&self, key: &str, initial: T) -> Result<T, AppError>
    where
        T: Serialize + DeserializeOwned,
    {
        self.load_with(key, || initial).await
    }

    /// Like [`load`](Self::load) but only builds the seed when it is needed.
    pub async fn load_with<T, F>(&self, key: &str, seed: F) -> Result<T, AppError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        if let Some(raw) = self.kv.get(key).await? {
            match serde_json::from_str::<T>(&raw) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    let corrupt = AppError::StorageCorrupt { key: key.to_string(), reason: e.to_string() };
                    warn!(error = %corrupt, "Reseeding corrupt storage entry");
                }
            }
        } else {
            debug!("No stored value for {}, seeding", key);
        }

        let value = seed();
        self.save(key, &value).await?;
        Ok(value)
    }

    pub async fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), AppError> {
        let raw = serde_json::to_string(value)?;
        self.kv.set(key, &raw).await
    }

    /// Writes every staged entry in order. When a write fails, the entries
    /// already written are put back to their previous values before the
    /// error is returned.
    pub async fn commit(&self, batch: WriteBatch) -> Result<(), AppError> {
        let mut written: Vec<(&'static str, Option<String>)> = Vec::with_capacity(batch.entries.len());

        for (key, raw) in &batch.entries {
            let result = match self.kv.get(key).await {
                Ok(previous) => self.kv.set(key, raw).await.map(|()| previous),
                Err(e) => Err(e),
            };
            match result {
                Ok(previous) => written.push((*key, previous)),
                Err(e) => {
                    warn!(key = %key, error = %e, "Write failed, rolling back {} staged entries", written.len());
                    self.rollback(written).await;
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    async fn rollback(&self, written: Vec<(&'static str, Option<String>)>) {
        for (key, previous) in written.into_iter().rev() {
            let restored = match previous {
                Some(raw) => self.kv.set(key, &raw).await,
                None => self.kv.remove(key).await,
            };
            if let Err(e) = restored {
                error!(key = %key, error = %e, "Rollback failed, storage may be out of step");
            }
        }
    }

    pub async fn remove(&self, key: &str) -> Result<(), AppError> {
        self.kv.remove(key).await
    }

    pub fn backend(&self) -> Arc<dyn KeyValueStore> {
        self.kv.clone()
    }
}

/// Serialized values for several keys, written together by
/// [`PersistentStore::commit`].
#[derive(Default)]
pub struct WriteBatch {
    entries: Vec<(&'static str, String)>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> Result<(), AppError> {
        self.entries.push((key, serde_json::to_string(value)?));
        Ok(())
    }
}

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockWriteGuard};
use tracing::{error, info};

use crate::domain::models::credential::Credential;
use crate::domain::services::persistent_store::PersistentStore;
use crate::error::AppError;

pub const CREDENTIALS_KEY: &str = "ecotrack-credentials";

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::InternalWithMsg(format!("Password hashing failed: {}", e)))
}

/// Argon2 hashes keyed by login identifier, stored under their own key and
/// never merged into profile records.
#[derive(Clone)]
pub struct CredentialStore {
    store: PersistentStore,
    records: Arc<RwLock<Vec<Credential>>>,
}

impl CredentialStore {
    pub async fn load<F>(store: PersistentStore, seed: F) -> Result<Self, AppError>
    where
        F: FnOnce() -> Vec<Credential>,
    {
        let records = store.load_with(CREDENTIALS_KEY, seed).await?;
        Ok(Self { store, records: Arc::new(RwLock::new(records)) })
    }

    pub async fn set_password(
        &self,
        identifier: &str,
        household_id: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let password_hash = hash_password(password)?;
        let mut guard = self.records.write().await;
        let mut records = guard.clone();

        match records.iter_mut().find(|c| c.identifier == identifier) {
            Some(existing) => {
                existing.household_id = household_id.to_string();
                existing.password_hash = password_hash;
                existing.updated_at = now;
            }
            None => records.push(Credential {
                identifier: identifier.to_string(),
                household_id: household_id.to_string(),
                password_hash,
                updated_at: now,
            }),
        }

        self.store.save(CREDENTIALS_KEY, &records).await?;
        *guard = records;
        info!("Credential updated for household {}", household_id);
        Ok(())
    }

    /// Constant-time comparison through argon2. Unknown identifiers verify false.
    pub async fn verify(&self, identifier: &str, password: &str) -> Result<bool, AppError> {
        let records = self.records.read().await;
        let Some(record) = records.iter().find(|c| c.identifier == identifier) else {
            return Ok(false);
        };

        let parsed_hash = PasswordHash::new(&record.password_hash).map_err(|e| {
            error!("Stored hash for {} is unreadable: {}", record.household_id, e);
            AppError::Internal
        })?;

        Ok(Argon2::default().verify_password(password.as_bytes(), &parsed_hash).is_ok())
    }

    pub async fn has_identifier(&self, identifier: &str) -> bool {
        self.records.read().await.iter().any(|c| c.identifier == identifier)
    }

    /// Exclusive access for repository changes that must be committed together
    /// with other collections. Callers stage a modified copy, commit it, then
    /// swap it in.
    pub(crate) async fn lock(&self) -> RwLockWriteGuard<'_, Vec<Credential>> {
        self.records.write().await
    }
}

/// Drops every credential belonging to `household_id`.
pub(crate) fn drop_household_credentials(records: &[Credential], household_id: &str) -> Vec<Credential> {
    records.iter().filter(|c| c.household_id != household_id).cloned().collect()
}

/// Re-keys the credential for `household_id` from `from` to `to`.
pub(crate) fn rekey_credential(records: &[Credential], household_id: &str, from: &str, to: &str) -> Vec<Credential> {
    records
        .iter()
        .cloned()
        .map(|mut c| {
            if c.household_id == household_id && c.identifier == from {
                c.identifier = to.to_string();
            }
            c
        })
        .collect()
}

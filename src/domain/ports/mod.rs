use crate::domain::models::{payment::Payment, user::Location};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// String-keyed blob storage. Durable backends live in `infra::repositories`.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), AppError>;
    async fn remove(&self, key: &str) -> Result<(), AppError>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    Approved,
    Rejected { reason: String },
}

/// Decides how a pending payment resolves and how long that takes.
pub trait VerificationPolicy: Send + Sync {
    fn delay(&self) -> Duration;
    fn verify(&self, payment: &Payment) -> VerificationOutcome;
}

/// Periodic position fixes for a staff device. `Ok(None)` means the feed
/// has ended.
#[async_trait]
pub trait LocationSource: Send + Sync {
    async fn next_fix(&self) -> Result<Option<Location>, AppError>;
}

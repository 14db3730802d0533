use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use ecotrack::{
    config::Config,
    domain::models::{payment::Payment, user::Location},
    domain::ports::{Clock, KeyValueStore, LocationSource, VerificationOutcome, VerificationPolicy},
    error::AppError,
    infra::factory::assemble_state,
    infra::repositories::{memory_kv_repo::MemoryKvRepo, sqlite_kv_repo::SqliteKvRepo},
    state::AppState,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::collections::{HashSet, VecDeque};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

pub const VERIFICATION_DELAY: Duration = Duration::from_millis(3000);

pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

#[allow(dead_code)]
impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, by: ChronoDuration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Hands out queued outcomes in order, approving once the queue is empty.
pub struct ScriptedVerificationPolicy {
    delay: Duration,
    outcomes: Mutex<VecDeque<VerificationOutcome>>,
}

#[allow(dead_code)]
impl ScriptedVerificationPolicy {
    pub fn new(delay: Duration) -> Self {
        Self { delay, outcomes: Mutex::new(VecDeque::new()) }
    }

    pub fn push(&self, outcome: VerificationOutcome) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }
}

impl VerificationPolicy for ScriptedVerificationPolicy {
    fn delay(&self) -> Duration {
        self.delay
    }

    fn verify(&self, _payment: &Payment) -> VerificationOutcome {
        self.outcomes.lock().unwrap().pop_front().unwrap_or(VerificationOutcome::Approved)
    }
}

pub struct ScriptedLocationSource {
    fixes: Mutex<VecDeque<Result<Option<Location>, AppError>>>,
}

#[allow(dead_code)]
impl ScriptedLocationSource {
    pub fn new(fixes: Vec<Result<Option<Location>, AppError>>) -> Self {
        Self { fixes: Mutex::new(fixes.into()) }
    }
}

#[async_trait]
impl LocationSource for ScriptedLocationSource {
    async fn next_fix(&self) -> Result<Option<Location>, AppError> {
        self.fixes.lock().unwrap().pop_front().unwrap_or(Ok(None))
    }
}

/// Memory store whose writes to the chosen keys fail until healed.
#[derive(Default)]
pub struct FailingKvStore {
    inner: MemoryKvRepo,
    failing: Mutex<HashSet<String>>,
}

#[allow(dead_code)]
impl FailingKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes_to(&self, key: &str) {
        self.failing.lock().unwrap().insert(key.to_string());
    }

    pub fn heal(&self) {
        self.failing.lock().unwrap().clear();
    }
}

#[async_trait]
impl KeyValueStore for FailingKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        if self.failing.lock().unwrap().contains(key) {
            return Err(AppError::InternalWithMsg(format!("write to {} failed", key)));
        }
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), AppError> {
        self.inner.remove(key).await
    }
}

/// 2024-08-09 10:00 IST.
pub fn default_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 8, 9, 4, 30, 0).unwrap()
}

#[allow(dead_code)]
pub struct TestApp {
    pub state: AppState,
    pub config: Config,
    pub clock: Arc<FixedClock>,
    pub verifier: Arc<ScriptedVerificationPolicy>,
    pub durable: Arc<dyn KeyValueStore>,
    pub ephemeral: Arc<dyn KeyValueStore>,
    pub db_filename: Option<String>,
}

#[allow(dead_code)]
impl TestApp {
    /// Backed by a throwaway SQLite file, removed on drop.
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config { database_url: db_url, ..Config::default() };
        Self::build(config, Arc::new(SqliteKvRepo::new(pool)), Some(db_filename)).await
    }

    /// Memory-only durable scope. Use with a paused tokio clock.
    pub async fn in_memory() -> Self {
        Self::build(Config::default(), Arc::new(MemoryKvRepo::new()), None).await
    }

    /// Over a caller-supplied durable store.
    pub async fn with_durable(durable: Arc<dyn KeyValueStore>) -> Self {
        Self::build(Config::default(), durable, None).await
    }

    async fn build(config: Config, durable: Arc<dyn KeyValueStore>, db_filename: Option<String>) -> Self {
        let clock = Arc::new(FixedClock::new(default_now()));
        let verifier = Arc::new(ScriptedVerificationPolicy::new(VERIFICATION_DELAY));
        let ephemeral: Arc<dyn KeyValueStore> = Arc::new(MemoryKvRepo::new());

        let state = assemble_state(&config, durable.clone(), ephemeral.clone(), clock.clone(), verifier.clone())
            .await
            .expect("Failed to assemble state");

        Self { state, config, clock, verifier, durable, ephemeral, db_filename }
    }

    /// Fresh state over the same durable storage, as after a restart.
    /// `keep_ephemeral` models a reload within the same client session.
    pub async fn restart(&self, keep_ephemeral: bool) -> AppState {
        let ephemeral: Arc<dyn KeyValueStore> =
            if keep_ephemeral { self.ephemeral.clone() } else { Arc::new(MemoryKvRepo::new()) };

        assemble_state(&self.config, self.durable.clone(), ephemeral, self.clock.clone(), self.verifier.clone())
            .await
            .expect("Failed to reassemble state")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(file) = &self.db_filename {
            for suffix in ["", "-wal", "-shm"] {
                let _ = std::fs::remove_file(format!("{}{}", file, suffix));
            }
        }
    }
}

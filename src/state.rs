use std::sync::Arc;

use crate::config::Config;
use crate::domain::services::auth_service::AuthService;
use crate::domain::services::data_repository::DataRepository;
use crate::domain::services::persistent_store::PersistentStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: PersistentStore,
    pub repo: DataRepository,
    pub auth_service: Arc<AuthService>,
}

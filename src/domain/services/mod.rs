pub mod attendance;
pub mod auth_service;
pub mod credentials;
pub mod data_repository;
pub mod defaults;
pub mod identifier;
pub mod password_policy;
pub mod persistent_store;
pub mod streak;
pub mod tracking;

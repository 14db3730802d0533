pub mod memory_kv_repo;
pub mod postgres_kv_repo;
pub mod sqlite_kv_repo;

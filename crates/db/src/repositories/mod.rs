//! PostgreSQL repositories.

pub mod monitor_state_repo;

pub use monitor_state_repo::{MonitorStateRepo, PgStateStore};

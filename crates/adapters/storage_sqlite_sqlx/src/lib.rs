//! # accessline-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the repository port traits defined in `accessline-app::ports::storage`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//! - Enforce tag uniqueness for live subscribers at write time
//!
//! ## Dependency rule
//! Depends on `accessline-app` (for port traits) and `accessline-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod error;
mod instance_repo;
mod link_repo;
mod pool;
mod service_repo;
mod subscriber_repo;

pub use error::StorageError;
pub use instance_repo::SqliteServiceInstanceRepository;
pub use link_repo::SqliteServiceInstanceLinkRepository;
pub use pool::{Config, Database};
pub use service_repo::SqliteServiceRepository;
pub use subscriber_repo::SqliteSubscriberRepository;

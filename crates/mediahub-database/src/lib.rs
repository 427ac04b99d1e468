//! # mediahub-database
//!
//! The store interface consumed by the session manager and the
//! relationship aggregator, with a PostgreSQL implementation (sqlx) and an
//! in-memory implementation (dashmap) used for tests and local runs.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use repositories::{PgAccountStore, PgRelationStore};
pub use store::{AccountStore, RelationStore, Stores};

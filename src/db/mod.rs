//! Persistence layer: reference-data reads and the conversation log.
//!
//! The agents see only the [`Store`] trait. The libsql implementation backs
//! it with a local file or in-memory database; seeding fills the methodology
//! and exercise reference tables on first start.

/// The `Store` trait and provider configuration.
pub mod traits;
/// libsql-backed store (in-memory or local file).
pub mod libsql;
/// Methodology and exercise seed data.
pub mod seed;

pub use libsql::LibsqlStore;
pub use traits::{Store, StoreProvider};

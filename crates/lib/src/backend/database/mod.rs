//! Concrete key-value engines behind [`BackendImpl`](super::BackendImpl).
//!
//! `InMemory` is always available. The SQL engines are gated on the
//! `sqlite` and `postgres` features.

mod in_memory;
#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub mod sql;

pub use in_memory::InMemory;
#[cfg(feature = "postgres")]
pub use sql::Postgres;
#[cfg(feature = "sqlite")]
pub use sql::Sqlite;
#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub use sql::{DbKind, SqlxBackend};

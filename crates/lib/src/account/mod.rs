//! Account records: creation, lookup, credentials and the administrator invariant.
//!
//! Accounts are keyed by username in the `account` namespace. Each account is
//! issued an [`Identity`] that is never reused, even after deletion; the set
//! of issued identities is persisted next to the records under a reserved key.
//!
//! The store keeps at least one administrator at all times once it has been
//! opened: [`AccountStore::delete`] and [`AccountStore::set_administrator`]
//! refuse to remove the last one.

pub mod crypto;
pub mod errors;
mod identity;
mod policy;
mod store;
mod types;

pub use errors::AccountError;
pub use identity::IdentityGenerator;
pub use policy::AccountPolicy;
pub use store::AccountStore;
pub use types::{AccountRecord, AccountSummary, Identity};

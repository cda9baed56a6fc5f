//! Preference module integration tests

mod scopes;

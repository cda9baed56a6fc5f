//! Constants used throughout the Filefly library.
//!
//! Central definitions for namespace names, reserved keys and the
//! bootstrap credentials.

use std::time::Duration;

/// Namespace holding account records, keyed by username.
pub const ACCOUNTS_NAMESPACE: &str = "account";

/// Namespace holding preference documents, keyed by identity.
pub const PREFERENCES_NAMESPACE: &str = "pref";

/// Reserved key in the account namespace holding every identity ever issued.
///
/// Starts with a control character, which usernames may not contain.
pub const ISSUED_IDENTITIES_KEY: &str = "\u{1}issued_identities";

/// Username of the administrator created on first start.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// Password of the administrator created on first start.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin";

/// Upper bound on accepted password length, in bytes.
pub const MAX_PASSWORD_BYTES: usize = 256;

/// Default time a lock holder may keep the access queue before it is pre-empted.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Default number of identity candidates tried before giving up.
pub const DEFAULT_IDENTITY_RETRY_LIMIT: u32 = 16;

/// Returns true for keys in the account namespace that are not usernames.
pub(crate) fn is_reserved_key(key: &str) -> bool {
    key.starts_with('\u{1}')
}

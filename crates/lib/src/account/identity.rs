//! Generation of stable, never-reused account identities.
//!
//! An identity is `<digest>.<millis>`: the unpadded base64url SHA-256 of the
//! username followed by a millisecond timestamp. Candidates are checked
//! against every identity the store has ever issued.

use std::collections::HashSet;
use std::sync::Arc;

use base64ct::{Base64UrlUnpadded, Encoding};
use sha2::{Digest, Sha256};

use super::errors::AccountError;
use super::types::Identity;
use crate::clock::Clock;

#[derive(Debug, Clone)]
pub struct IdentityGenerator {
    clock: Arc<dyn Clock>,
    retry_limit: u32,
}

impl IdentityGenerator {
    /// `retry_limit` is the total number of candidates tried; at least one is always tried.
    pub fn new(clock: Arc<dyn Clock>, retry_limit: u32) -> Self {
        Self {
            clock,
            retry_limit: retry_limit.max(1),
        }
    }

    pub fn retry_limit(&self) -> u32 {
        self.retry_limit
    }

    /// Produce an identity for `username` that is not in `taken`.
    ///
    /// On collision the timestamp is moved strictly past the rejected
    /// candidate's, so a clock that does not advance still yields new
    /// candidates.
    pub fn generate(
        &self,
        username: &str,
        taken: &HashSet<Identity>,
    ) -> Result<Identity, AccountError> {
        let digest = Base64UrlUnpadded::encode_string(&Sha256::digest(username.as_bytes()));
        let mut millis = self.clock.now_millis();

        for attempt in 1..=self.retry_limit {
            let candidate = Identity::new(format!("{digest}.{millis}"));
            if !taken.contains(&candidate) {
                return Ok(candidate);
            }
            tracing::debug!(%candidate, attempt, "Identity candidate collided, regenerating");
            millis = self.clock.now_millis().max(millis.saturating_add(1));
        }

        Err(AccountError::IdentityExhausted {
            username: username.to_string(),
            attempts: self.retry_limit,
        })
    }
}

//! Hash-based review id generation.
//!
//! Ids have the form `{prefix}-{hash}` (e.g. `rev-a3f8`): the hash is the
//! base36 encoding of a SHA-256 digest over the review's title, target system,
//! applicant, the creation time and a nonce.
//!
//! - **Adaptive length**: 4 characters up to 500 reviews, 5 up to 1,500,
//!   6 beyond
//! - **Collision resistant**: up to 100 nonces per length, then one longer id
//!
//! # Example
//!
//! ```
//! use archgate::id_generation::{IdGenerator, IdGeneratorConfig};
//!
//! let mut generator = IdGenerator::new(IdGeneratorConfig {
//!     prefix: "rev".to_string(),
//!     database_size: 0,
//! });
//!
//! let id = generator.generate("Ledger cluster migration", "ledger", "alice").unwrap();
//! assert!(id.as_str().starts_with("rev-"));
//! ```

use crate::domain::ReviewId;
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

const BASE36_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const MAX_NONCE: u32 = 100;
const MIN_HASH_LENGTH: usize = 4;
const MAX_HASH_LENGTH: usize = 6;

/// Errors that can occur during id generation.
#[derive(Debug, Error)]
pub enum IdGenerationError {
    /// Every nonce collided at every permitted length.
    #[error("Unable to generate unique review id after {attempts} attempts")]
    CollisionExhausted {
        /// Nonces tried at the final length
        attempts: u32,
    },
}

/// Configuration for id generation.
#[derive(Debug, Clone)]
pub struct IdGeneratorConfig {
    /// Prefix for all ids (e.g. "rev")
    pub prefix: String,

    /// Number of reviews already stored (drives the adaptive length)
    pub database_size: usize,
}

/// Review id generator with collision detection.
///
/// Create one per creation request and register the ids already in use.
#[derive(Debug)]
pub struct IdGenerator {
    config: IdGeneratorConfig,
    existing_ids: HashSet<String>,
}

impl IdGenerator {
    /// Create a new generator.
    #[must_use]
    pub fn new(config: IdGeneratorConfig) -> Self {
        Self {
            config,
            existing_ids: HashSet::new(),
        }
    }

    /// Register an id that is already taken.
    pub fn register_id(&mut self, id: impl Into<String>) {
        self.existing_ids.insert(id.into());
    }

    /// Generate an id not previously generated or registered.
    ///
    /// # Errors
    ///
    /// Returns `IdGenerationError::CollisionExhausted` if every candidate at
    /// the maximum length collides.
    pub fn generate(
        &mut self,
        title: &str,
        target_system: &str,
        applicant: &str,
    ) -> Result<ReviewId, IdGenerationError> {
        let timestamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let content = format!("{title}|{target_system}|{applicant}|{timestamp}");

        let mut length = self.adaptive_length();
        loop {
            for nonce in 0..MAX_NONCE {
                let id = self.hash_id(&content, nonce, length);
                if self.existing_ids.insert(id.clone()) {
                    if nonce > 0 {
                        debug!(nonce, length, "Generated unique review id after collisions");
                    }
                    return Ok(ReviewId::new(id));
                }
            }

            if length >= MAX_HASH_LENGTH {
                return Err(IdGenerationError::CollisionExhausted {
                    attempts: MAX_NONCE,
                });
            }
            warn!(
                length,
                max_nonce = MAX_NONCE,
                "All nonces exhausted, increasing review id length"
            );
            length += 1;
        }
    }

    fn hash_id(&self, content: &str, nonce: u32, length: usize) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        hasher.update(nonce.to_be_bytes());
        let digest = hasher.finalize();
        format!("{}-{}", self.config.prefix, encode_base36(&digest[..8], length))
    }

    fn adaptive_length(&self) -> usize {
        match self.config.database_size {
            0..=500 => MIN_HASH_LENGTH,
            501..=1500 => 5,
            _ => MAX_HASH_LENGTH,
        }
    }
}

/// Encode up to eight bytes as exactly `length` base36 digits.
fn encode_base36(bytes: &[u8], length: usize) -> String {
    let mut n = bytes
        .iter()
        .fold(0u64, |acc, &byte| acc.wrapping_shl(8) | u64::from(byte));

    let mut digits = Vec::with_capacity(length);
    while digits.len() < length {
        // n % 36 < 36, so the index is always in range
        let digit = usize::try_from(n % 36).unwrap_or_default();
        digits.push(char::from(BASE36_CHARS[digit]));
        n /= 36;
    }
    digits.iter().rev().collect()
}

/// Whether `id` is a well-formed review id for `prefix`.
#[must_use]
pub fn validate_id(id: &str, prefix: &str) -> bool {
    let Some(hash) = id
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('-'))
    else {
        return false;
    };
    (MIN_HASH_LENGTH..=MAX_HASH_LENGTH).contains(&hash.len())
        && hash
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(database_size: usize) -> IdGenerator {
        IdGenerator::new(IdGeneratorConfig {
            prefix: "rev".to_string(),
            database_size,
        })
    }

    #[test]
    fn base36_has_requested_length() {
        let encoded = encode_base36(&[0x12, 0x34, 0x56, 0x78], 6);
        assert_eq!(encoded.len(), 6);
        assert!(encoded.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn length_grows_with_database_size() {
        assert_eq!(generator(100).adaptive_length(), 4);
        assert_eq!(generator(800).adaptive_length(), 5);
        assert_eq!(generator(2000).adaptive_length(), 6);
    }

    #[test]
    fn generated_ids_are_valid_and_distinct() {
        let mut generator = generator(0);
        let first = generator.generate("Same", "payments", "alice").unwrap();
        let second = generator.generate("Same", "payments", "alice").unwrap();
        assert_ne!(first, second);
        assert!(validate_id(first.as_str(), "rev"));
        assert!(validate_id(second.as_str(), "rev"));
    }

    #[test]
    fn registered_ids_are_avoided() {
        let mut generator = generator(0);
        generator.register_id("rev-0000");
        let id = generator.generate("New", "ledger", "bob").unwrap();
        assert_ne!(id.as_str(), "rev-0000");
    }

    #[test]
    fn id_validation() {
        assert!(validate_id("rev-a3f8", "rev"));
        assert!(validate_id("rev-abc123", "rev"));
        assert!(!validate_id("rev-", "rev"));
        assert!(!validate_id("rev-ab", "rev"));
        assert!(!validate_id("rev-abcdefg", "rev"));
        assert!(!validate_id("rev-A3F8", "rev"));
        assert!(!validate_id("other-a3f8", "rev"));
        assert!(!validate_id("reva3f8", "rev"));
    }
}

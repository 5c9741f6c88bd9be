//! Username directory
//!
//! Tracks every display name currently claimed by a connection, enforcing
//! case-insensitive uniqueness for the lifetime of the claim. The directory
//! is owned by the server actor, so claim's check-then-insert is atomic: two
//! simultaneous joiners can never both win the same name.

use std::collections::HashSet;

use crate::error::NameError;

/// Minimum display name length (after trimming)
pub const NAME_MIN_LEN: usize = 2;

/// Maximum display name length
pub const NAME_MAX_LEN: usize = 20;

/// Set of currently-claimed display names, keyed by normalized form
#[derive(Debug, Default)]
pub struct UsernameDirectory {
    claimed: HashSet<String>,
}

impl UsernameDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `raw` and claim its normalized (trimmed, lower-cased) form
    ///
    /// Returns the normalized form on success. Validation order: emptiness,
    /// length bounds, character set, availability.
    pub fn claim(&mut self, raw: &str) -> Result<String, NameError> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(NameError::Empty);
        }

        let len = trimmed.chars().count();
        if len < NAME_MIN_LEN {
            return Err(NameError::TooShort);
        }
        if len > NAME_MAX_LEN {
            return Err(NameError::TooLong);
        }

        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '-' || c == '_')
        {
            return Err(NameError::InvalidChars);
        }

        let normalized = trimmed.to_lowercase();
        if self.claimed.contains(&normalized) {
            return Err(NameError::Taken);
        }

        self.claimed.insert(normalized.clone());
        Ok(normalized)
    }

    /// Release a previously claimed name; no-op if not present
    pub fn release(&mut self, normalized: &str) {
        self.claimed.remove(normalized);
    }

    /// Number of names currently claimed
    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_returns_normalized() {
        let mut dir = UsernameDirectory::new();
        let normalized = dir.claim("  Alice ").unwrap();
        assert_eq!(normalized, "alice");
        assert_eq!(dir.len(), 1);
    }

    #[test]
    fn test_duplicate_claim_case_insensitive() {
        let mut dir = UsernameDirectory::new();
        dir.claim("Ann").unwrap();

        assert_eq!(dir.claim("ann"), Err(NameError::Taken));
        assert_eq!(dir.claim("ANN"), Err(NameError::Taken));
        assert_eq!(dir.claim(" ann "), Err(NameError::Taken));
    }

    #[test]
    fn test_release_frees_name_for_reuse() {
        let mut dir = UsernameDirectory::new();
        let normalized = dir.claim("Bob").unwrap();

        dir.release(&normalized);
        assert!(dir.is_empty());
        assert!(dir.claim("bob").is_ok());
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut dir = UsernameDirectory::new();
        let normalized = dir.claim("Bob").unwrap();

        dir.release(&normalized);
        dir.release(&normalized);
        dir.release("never-claimed");
        assert!(dir.is_empty());
    }

    #[test]
    fn test_blank_rejected() {
        let mut dir = UsernameDirectory::new();
        assert_eq!(dir.claim(""), Err(NameError::Empty));
        assert_eq!(dir.claim("   "), Err(NameError::Empty));
    }

    #[test]
    fn test_length_bounds() {
        let mut dir = UsernameDirectory::new();
        assert_eq!(dir.claim("a"), Err(NameError::TooShort));
        assert_eq!(dir.claim(&"x".repeat(21)), Err(NameError::TooLong));

        // Boundaries are inclusive
        assert!(dir.claim("ab").is_ok());
        assert!(dir.claim(&"y".repeat(20)).is_ok());
    }

    #[test]
    fn test_length_measured_after_trim() {
        let mut dir = UsernameDirectory::new();
        assert!(dir.claim("  ab  ").is_ok());
    }

    #[test]
    fn test_character_set() {
        let mut dir = UsernameDirectory::new();
        assert!(dir.claim("Jo Smith-Jones_3").is_ok());

        assert_eq!(dir.claim("bad!name"), Err(NameError::InvalidChars));
        assert_eq!(dir.claim("émile"), Err(NameError::InvalidChars));
        assert_eq!(dir.claim("a\tb"), Err(NameError::InvalidChars));
    }
}

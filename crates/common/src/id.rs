//! Identifiers for rows and sessions.

use std::sync::{Mutex, PoisonError};

use ulid::{Generator, Ulid};
use uuid::Uuid;

// Shared by every IdGenerator so ids from different services still order
static MONOTONIC: Mutex<Generator> = Mutex::new(Generator::new());

/// Issues primary keys and session tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdGenerator;

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// A lowercase ULID, greater than every id generated before it.
    ///
    /// Listings order by creation time and then by id, so two posts written
    /// within the same millisecond still come out newest first.
    #[must_use]
    pub fn generate(&self) -> String {
        let next = MONOTONIC
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .generate()
            // Only after 2^80 ids in one millisecond
            .unwrap_or_else(|_| Ulid::new());
        next.to_string().to_lowercase()
    }

    /// A random session token.
    #[must_use]
    pub fn generate_token(&self) -> String {
        // No time component in session tokens
        Uuid::new_v4().simple().to_string()
    }
}

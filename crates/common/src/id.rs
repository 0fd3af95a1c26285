//! ID generation utilities.

use std::sync::{Mutex, PoisonError};

use ulid::{Generator, Ulid};
use uuid::Uuid;

/// Shared so ids from every `IdGenerator` are strictly increasing.
static ULID_GENERATOR: Mutex<Generator> = Mutex::new(Generator::new());

/// ID generator for entities.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new ULID-based ID.
    ///
    /// IDs are monotonic within the process: one generated in the same
    /// millisecond as the previous one increments its random part. This
    /// keeps `id DESC` a stable tiebreaker for rows sharing a `created_at`.
    #[must_use]
    pub fn generate(&self) -> String {
        let ulid = ULID_GENERATOR
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .generate()
            // Random part exhausted within one millisecond
            .unwrap_or_else(|_| Ulid::new());

        ulid.to_string().to_lowercase()
    }

    /// Generate an API token for a user.
    #[must_use]
    pub fn generate_token(&self) -> String {
        // No time component in tokens
        Uuid::new_v4().simple().to_string()
    }
}

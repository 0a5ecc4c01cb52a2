//! Domain entity representing a short-lived API token.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Number of characters in a token value.
pub const TOKEN_LENGTH: usize = 128;

/// Minutes a token stays usable after creation.
pub const VALIDITY_WINDOW_MINUTES: i64 = 40;

/// The validity window as a [`Duration`].
pub fn validity_window() -> Duration {
    Duration::minutes(VALIDITY_WINDOW_MINUTES)
}

/// Latest creation instant that is already outside the validity window at `now`.
///
/// Tokens created at or before the cutoff are expired and prunable; tokens
/// created strictly after it are still inside the window.
pub fn expiry_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - validity_window()
}

/// A single-use API access token.
///
/// The value and creation time are fixed at construction. The `used` flag can
/// only be observed here; flipping it happens in storage through
/// [`crate::domain::repositories::TokenRepository::consume`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    id: i64,
    value: String,
    used: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Token {
    /// Creates a Token instance from stored fields.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let token = Token::new(1, generate_token(), false, Utc::now(), Utc::now());
    /// ```
    pub fn new(
        id: i64,
        value: String,
        used: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            value,
            used,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_used(&self) -> bool {
        self.used
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Instant from which the token is no longer valid.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.created_at + validity_window()
    }

    /// Returns `true` if the validity window has elapsed at `now`.
    ///
    /// Ignores the `used` flag.
    pub fn is_past_window(&self, now: DateTime<Utc>) -> bool {
        self.created_at <= expiry_cutoff(now)
    }

    /// The "not expired" predicate: unused and created less than
    /// [`VALIDITY_WINDOW_MINUTES`] before `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.used && !self.is_past_window(now)
    }
}

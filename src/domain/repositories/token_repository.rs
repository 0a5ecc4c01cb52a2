//! Repository trait for API token persistence.

use crate::domain::entities::Token;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository interface for API token storage.
///
/// Implementations never consult a clock: every time-dependent call receives
/// the instant or cutoff it has to apply. Cutoffs follow
/// [`crate::domain::entities::expiry_cutoff`]: a row is inside the validity
/// window when its creation time is strictly after the cutoff.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgTokenRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Persists a new unused token created at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on database errors, including a unique
    /// violation on the token value.
    async fn insert(&self, value: &str, now: DateTime<Utc>) -> Result<Token, AppError>;

    /// Finds a token by exact value.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on database errors.
    async fn find_by_value(&self, value: &str) -> Result<Option<Token>, AppError>;

    /// Atomically marks a token used if it is still valid.
    ///
    /// The update only applies to a row that matches `value`, is unused and
    /// was created after `cutoff`. Returns the updated token, or `None` when
    /// no row qualified (missing, already used, or expired).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on database errors.
    async fn consume(
        &self,
        value: &str,
        cutoff: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Option<Token>, AppError>;

    /// Deletes every token created at or before `cutoff`, used or not.
    ///
    /// Returns the number of deleted rows.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on database errors.
    async fn delete_created_at_or_before(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError>;

    /// Counts unused tokens created after `cutoff`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on database errors.
    async fn count_active(&self, cutoff: DateTime<Utc>) -> Result<i64, AppError>;

    /// Counts every stored token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on database errors.
    async fn count_all(&self) -> Result<i64, AppError>;
}

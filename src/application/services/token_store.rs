//! Token lifecycle service: issuance, validation, single-use consumption and pruning.

use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;

use crate::domain::clock::{Clock, SystemClock};
use crate::domain::entities::{Token, expiry_cutoff};
use crate::domain::repositories::TokenRepository;
use crate::error::{AppError, is_unique_violation_on_token};
use crate::utils::token_generator::{generate_token, is_well_formed};

/// Number of fresh values tried when an insert collides on the token value.
const MAX_ISSUE_ATTEMPTS: usize = 3;

/// Service owning every API token record.
///
/// A token is valid while it is unused and younger than
/// [`crate::domain::entities::VALIDITY_WINDOW_MINUTES`]. All decisions are
/// made against the injected [`Clock`]; the repository only ever sees explicit
/// instants.
///
/// Single use is enforced by the repository's conditional update, not by any
/// lock in this process, so several service instances may share one table.
pub struct TokenStore<R: TokenRepository> {
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R: TokenRepository> TokenStore<R> {
    /// Creates a store reading time from the system clock.
    pub fn new(repository: Arc<R>) -> Self {
        Self::with_clock(repository, Arc::new(SystemClock))
    }

    /// Creates a store with an explicit time source.
    pub fn with_clock(repository: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Issues a new unused token created now.
    ///
    /// A unique violation on the value is retried with a fresh value up to
    /// three times in total.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on database errors or repeated collisions.
    pub async fn issue(&self) -> Result<Token, AppError> {
        let now = self.clock.now();

        for attempt in 1..=MAX_ISSUE_ATTEMPTS {
            match self.repository.insert(&generate_token(), now).await {
                Ok(token) => {
                    tracing::info!(token_id = token.id(), "Issued API token");
                    return Ok(token);
                }
                Err(e) if is_unique_violation_on_token(&e) => {
                    tracing::warn!(attempt, "token value collision, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::storage(
            "Failed to generate unique token",
            json!({ "reason": "Too many collisions" }),
        ))
    }

    /// Finds a token by exact value, whatever its state.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no token has this value.
    /// Returns [`AppError::Storage`] on database errors.
    pub async fn lookup(&self, value: &str) -> Result<Token, AppError> {
        if !is_well_formed(value) {
            tracing::debug!("rejected malformed token value");
            return Err(AppError::token_not_found());
        }

        self.repository
            .find_by_value(value)
            .await?
            .ok_or_else(AppError::token_not_found)
    }

    /// Checks that a token exists, is unused and inside its validity window.
    ///
    /// Does not change the token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no token has this value.
    /// Returns [`AppError::Expired`] if the token is used or too old.
    /// Returns [`AppError::Storage`] on database errors.
    pub async fn validate(&self, value: &str) -> Result<Token, AppError> {
        let token = self.lookup(value).await?;
        let now = self.clock.now();

        if !token.is_valid_at(now) {
            tracing::warn!(token_id = token.id(), used = token.is_used(), "rejected token");
            return Err(expired(&token, now));
        }

        Ok(token)
    }

    /// Validates a token and marks it used in one atomic storage operation.
    ///
    /// Of several concurrent calls for the same value at most one succeeds;
    /// the rest fail with [`AppError::Expired`].
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no token has this value.
    /// Returns [`AppError::Expired`] if the token is used or too old.
    /// Returns [`AppError::Storage`] on database errors.
    pub async fn consume(&self, value: &str) -> Result<Token, AppError> {
        if !is_well_formed(value) {
            tracing::debug!("rejected malformed token value");
            return Err(AppError::token_not_found());
        }

        let now = self.clock.now();

        if let Some(token) = self
            .repository
            .consume(value, expiry_cutoff(now), now)
            .await?
        {
            tracing::info!(token_id = token.id(), "Consumed API token");
            return Ok(token);
        }

        // The conditional update matched nothing; find out why.
        match self.repository.find_by_value(value).await? {
            Some(token) => {
                tracing::warn!(token_id = token.id(), used = token.is_used(), "rejected token");
                Err(expired(&token, now))
            }
            None => Err(AppError::token_not_found()),
        }
    }

    /// Deletes every token whose validity window has elapsed, used or not.
    ///
    /// Safe to call repeatedly and concurrently with other operations.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on database errors.
    pub async fn prune(&self) -> Result<u64, AppError> {
        let cutoff = expiry_cutoff(self.clock.now());
        let removed = self.repository.delete_created_at_or_before(cutoff).await?;

        tracing::info!(removed, cutoff = %cutoff, "Pruned expired API tokens");

        Ok(removed)
    }

    /// Counts tokens that would currently pass [`TokenStore::validate`].
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on database errors.
    pub async fn count_active(&self) -> Result<i64, AppError> {
        self.repository
            .count_active(expiry_cutoff(self.clock.now()))
            .await
    }

    /// Counts every stored token, including expired rows awaiting pruning.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on database errors.
    pub async fn count_all(&self) -> Result<i64, AppError> {
        self.repository.count_all().await
    }
}

fn expired(token: &Token, now: DateTime<Utc>) -> AppError {
    let (reason, expired_at) = if token.is_used() {
        ("used", token.updated_at())
    } else {
        ("too_old", token.expires_at())
    };

    AppError::token_expired(json!({
        "reason": reason,
        "expired_at": expired_at,
        "checked_at": now,
    }))
}

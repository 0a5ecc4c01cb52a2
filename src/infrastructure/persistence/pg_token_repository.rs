//! PostgreSQL implementation of token repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::Token;
use crate::domain::repositories::TokenRepository;
use crate::error::AppError;

/// Row layout of the `api_tokens` table. Timestamps are epoch seconds.
#[derive(sqlx::FromRow)]
struct TokenRow {
    token_id: i64,
    token: String,
    is_used_already: bool,
    created_timestamp: i64,
    updated_timestamp: i64,
}

impl TryFrom<TokenRow> for Token {
    type Error = AppError;

    fn try_from(row: TokenRow) -> Result<Self, Self::Error> {
        let created_at = from_epoch(row.created_timestamp, row.token_id)?;
        let updated_at = from_epoch(row.updated_timestamp, row.token_id)?;

        Ok(Token::new(
            row.token_id,
            row.token,
            row.is_used_already,
            created_at,
            updated_at,
        ))
    }
}

fn from_epoch(secs: i64, token_id: i64) -> Result<DateTime<Utc>, AppError> {
    DateTime::from_timestamp(secs, 0).ok_or_else(|| {
        AppError::storage(
            "Stored timestamp out of range",
            json!({ "token_id": token_id, "timestamp": secs }),
        )
    })
}

/// PostgreSQL repository for API token storage.
///
/// The single-use guarantee relies on [`TokenRepository::consume`] being one
/// conditional `UPDATE`: concurrent callers race on the row lock and only the
/// first sees `is_used_already = FALSE`.
pub struct PgTokenRepository {
    pool: Arc<PgPool>,
}

impl PgTokenRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenRepository for PgTokenRepository {
    async fn insert(&self, value: &str, now: DateTime<Utc>) -> Result<Token, AppError> {
        let row = sqlx::query_as::<_, TokenRow>(
            r#"
            INSERT INTO api_tokens (token, is_used_already, created_timestamp, updated_timestamp)
            VALUES ($1, FALSE, $2, $2)
            RETURNING token_id, token, is_used_already, created_timestamp, updated_timestamp
            "#,
        )
        .bind(value)
        .bind(now.timestamp())
        .fetch_one(self.pool.as_ref())
        .await?;

        row.try_into()
    }

    async fn find_by_value(&self, value: &str) -> Result<Option<Token>, AppError> {
        let row = sqlx::query_as::<_, TokenRow>(
            r#"
            SELECT token_id, token, is_used_already, created_timestamp, updated_timestamp
            FROM api_tokens
            WHERE token = $1
            "#,
        )
        .bind(value)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Token::try_from).transpose()
    }

    async fn consume(
        &self,
        value: &str,
        cutoff: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Option<Token>, AppError> {
        let row = sqlx::query_as::<_, TokenRow>(
            r#"
            UPDATE api_tokens
            SET is_used_already = TRUE,
                updated_timestamp = $3
            WHERE token = $1
              AND is_used_already = FALSE
              AND created_timestamp > $2
            RETURNING token_id, token, is_used_already, created_timestamp, updated_timestamp
            "#,
        )
        .bind(value)
        .bind(cutoff.timestamp())
        .bind(now.timestamp())
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Token::try_from).transpose()
    }

    async fn delete_created_at_or_before(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            DELETE FROM api_tokens
            WHERE created_timestamp <= $1
            "#,
        )
        .bind(cutoff.timestamp())
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected())
    }

    async fn count_active(&self, cutoff: DateTime<Utc>) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM api_tokens
            WHERE is_used_already = FALSE
              AND created_timestamp > $1
            "#,
        )
        .bind(cutoff.timestamp())
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }

    async fn count_all(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM api_tokens")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }
}

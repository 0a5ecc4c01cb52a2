#![allow(dead_code)]

use api_tokens::prelude::*;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::PgPool;
use std::sync::Arc;

/// Fixed starting instant for clock-driven tests.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

pub fn repository(pool: PgPool) -> Arc<PgTokenRepository> {
    Arc::new(PgTokenRepository::new(Arc::new(pool)))
}

/// Builds a store over `pool` whose clock starts at [`t0`].
pub fn create_test_store(pool: PgPool) -> (TokenStore<PgTokenRepository>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(t0()));
    let store = TokenStore::with_clock(repository(pool), clock.clone());
    (store, clock)
}

/// Inserts a token row directly, bypassing the store.
pub async fn create_test_token(
    pool: &PgPool,
    value: &str,
    created_at: DateTime<Utc>,
    used: bool,
) -> i64 {
    sqlx::query_scalar(
        r#"
        INSERT INTO api_tokens (token, is_used_already, created_timestamp, updated_timestamp)
        VALUES ($1, $2, $3, $3)
        RETURNING token_id
        "#,
    )
    .bind(value)
    .bind(used)
    .bind(created_at.timestamp())
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn token_exists(pool: &PgPool, value: &str) -> bool {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM api_tokens WHERE token = $1")
        .bind(value)
        .fetch_one(pool)
        .await
        .unwrap()
        == 1
}

/// A well-formed token value built from a single repeated character.
pub fn fixed_value(c: char) -> String {
    c.to_string().repeat(TOKEN_LENGTH)
}

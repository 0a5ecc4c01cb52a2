mod common;

use api_tokens::prelude::*;
use chrono::Duration;
use common::{create_test_store, create_test_token, fixed_value, t0, token_exists};
use sqlx::PgPool;
use std::sync::Arc;

#[sqlx::test]
async fn test_issue_then_validate(pool: PgPool) {
    let (store, _clock) = create_test_store(pool);

    let token = store.issue().await.unwrap();

    assert_eq!(token.value().len(), TOKEN_LENGTH);
    assert!(token.value().chars().all(|c| c.is_ascii_alphanumeric()));

    let validated = store.validate(token.value()).await.unwrap();
    assert_eq!(validated.id(), token.id());
    assert!(!validated.is_used());
}

#[sqlx::test]
async fn test_lookup_nonexistent(pool: PgPool) {
    let (store, _clock) = create_test_store(pool);

    let result = store.lookup("nonexistent").await;
    assert!(matches!(result, Err(AppError::NotFound { .. })));

    let result = store.lookup(&fixed_value('z')).await;
    assert!(matches!(result, Err(AppError::NotFound { .. })));
}

#[sqlx::test]
async fn test_validate_does_not_consume(pool: PgPool) {
    let (store, _clock) = create_test_store(pool);
    let token = store.issue().await.unwrap();

    store.validate(token.value()).await.unwrap();
    store.validate(token.value()).await.unwrap();

    assert!(!store.lookup(token.value()).await.unwrap().is_used());
}

#[sqlx::test]
async fn test_validate_token_created_41_minutes_ago(pool: PgPool) {
    let (store, _clock) = create_test_store(pool.clone());
    create_test_token(&pool, &fixed_value('a'), t0() - Duration::minutes(41), false).await;

    let err = store.validate(&fixed_value('a')).await.unwrap_err();

    assert!(matches!(err, AppError::Expired { .. }));
    assert_eq!(err.to_string(), "the token is expired");
}

#[sqlx::test]
async fn test_consume_once(pool: PgPool) {
    let (store, _clock) = create_test_store(pool);
    let token = store.issue().await.unwrap();

    let consumed = store.consume(token.value()).await.unwrap();
    assert!(consumed.is_used());

    let second = store.consume(token.value()).await;
    assert!(matches!(second, Err(AppError::Expired { .. })));

    let validate = store.validate(token.value()).await;
    assert!(matches!(validate, Err(AppError::Expired { .. })));
}

#[sqlx::test]
async fn test_consume_unknown_token(pool: PgPool) {
    let (store, _clock) = create_test_store(pool);

    let result = store.consume(&fixed_value('q')).await;
    assert!(matches!(result, Err(AppError::NotFound { .. })));
}

#[sqlx::test]
async fn test_consume_expired_token(pool: PgPool) {
    let (store, clock) = create_test_store(pool);
    let token = store.issue().await.unwrap();

    clock.advance(Duration::minutes(41));

    let result = store.consume(token.value()).await;
    assert!(matches!(result, Err(AppError::Expired { .. })));
    assert!(!store.lookup(token.value()).await.unwrap().is_used());
}

#[sqlx::test]
async fn test_concurrent_consume_single_winner(pool: PgPool) {
    let (store, _clock) = create_test_store(pool);
    let store = Arc::new(store);
    let token = store.issue().await.unwrap();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let store = store.clone();
            let value = token.value().to_string();
            tokio::spawn(async move { store.consume(&value).await })
        })
        .collect();

    let mut successes = 0;
    let mut expired = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(AppError::Expired { .. }) => expired += 1,
            Err(e) => panic!("unexpected error: {e:?}"),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(expired, 15);
}

#[sqlx::test]
async fn test_prune_removes_only_old_rows(pool: PgPool) {
    let (store, _clock) = create_test_store(pool.clone());

    create_test_token(&pool, &fixed_value('a'), t0() - Duration::minutes(41), false).await;
    create_test_token(&pool, &fixed_value('b'), t0() - Duration::minutes(40), true).await;
    create_test_token(&pool, &fixed_value('c'), t0() - Duration::minutes(39), true).await;
    create_test_token(&pool, &fixed_value('d'), t0() - Duration::minutes(1), false).await;

    let removed = store.prune().await.unwrap();

    assert_eq!(removed, 2);
    assert!(!token_exists(&pool, &fixed_value('a')).await);
    assert!(!token_exists(&pool, &fixed_value('b')).await);
    assert!(token_exists(&pool, &fixed_value('c')).await);
    assert!(token_exists(&pool, &fixed_value('d')).await);

    assert_eq!(store.prune().await.unwrap(), 0);
}

#[sqlx::test]
async fn test_count_active(pool: PgPool) {
    let (store, clock) = create_test_store(pool);

    let first = store.issue().await.unwrap();
    store.issue().await.unwrap();
    store.consume(first.value()).await.unwrap();

    assert_eq!(store.count_active().await.unwrap(), 1);
    assert_eq!(store.count_all().await.unwrap(), 2);

    clock.advance(Duration::minutes(40));
    assert_eq!(store.count_active().await.unwrap(), 0);
}

#[sqlx::test]
async fn test_token_lifecycle_scenario(pool: PgPool) {
    let (store, clock) = create_test_store(pool.clone());

    let token = store.issue().await.unwrap();

    clock.advance(Duration::minutes(39));
    assert!(store.validate(token.value()).await.is_ok());

    clock.advance(Duration::minutes(2));
    let result = store.validate(token.value()).await;
    assert!(matches!(result, Err(AppError::Expired { .. })));

    assert_eq!(store.prune().await.unwrap(), 1);
    assert!(!token_exists(&pool, token.value()).await);

    let result = store.lookup(token.value()).await;
    assert!(matches!(result, Err(AppError::NotFound { .. })));
}

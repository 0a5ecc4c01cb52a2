//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx.
//!
//! # Repositories
//!
//! - [`PgTokenRepository`] - API token storage, single-use consumption and pruning

pub mod pg_token_repository;

pub use pg_token_repository::PgTokenRepository;

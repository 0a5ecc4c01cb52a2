//! Repository trait definitions for the domain layer.
//!
//! Traits define the contract for data operations; implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are
//! auto-generated via `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`TokenRepository`] - API token persistence
//!
//! # Testing
//!
//! See integration tests in `tests/repository_token.rs` for usage examples.

pub mod token_repository;

pub use token_repository::TokenRepository;

#[cfg(test)]
pub use token_repository::MockTokenRepository;

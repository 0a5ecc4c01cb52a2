//! Business logic services for the application layer.

pub mod token_store;

pub use token_store::TokenStore;

//! Application layer services implementing business logic.
//!
//! Services consume repository traits and apply the token lifecycle rules
//! (validity window, single use) on top of them.
//!
//! # Available Services
//!
//! - [`services::token_store::TokenStore`] - Token issuance, validation, consumption and pruning

pub mod services;

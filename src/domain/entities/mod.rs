//! Core domain entities.
//!
//! - [`Token`] - A short-lived, single-use API access token
//!
//! Entities are plain data structures; validity rules that depend only on the
//! entity itself (the "not expired" predicate) live next to it, while anything
//! that touches storage belongs to [`crate::application::services::TokenStore`].

pub mod token;

pub use token::{
    TOKEN_LENGTH, Token, VALIDITY_WINDOW_MINUTES, expiry_cutoff, validity_window,
};

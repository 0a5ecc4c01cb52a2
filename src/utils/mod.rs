//! Utility functions.
//!
//! - [`token_generator`] - Random token value generation and shape checks

pub mod token_generator;

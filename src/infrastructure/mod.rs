//! Infrastructure layer for external integrations.
//!
//! # Modules
//!
//! - [`database`] - Connection pool setup and schema migrations
//! - [`persistence`] - PostgreSQL repository implementations

pub mod database;
pub mod persistence;

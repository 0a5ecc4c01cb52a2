//! Domain layer containing business entities and contracts.
//!
//! # Architecture
//!
//! - [`entities`] - The [`entities::Token`] entity and its validity window
//! - [`repositories`] - Data access trait definitions
//! - [`clock`] - Injected time source
//!
//! # Design Principles
//!
//! - Domain layer has no dependencies on infrastructure
//! - Repository traits define contracts implemented by infrastructure layer
//! - Nothing in this layer reads the wall clock; "now" always arrives through
//!   a [`clock::Clock`] or an explicit argument

pub mod clock;
pub mod entities;
pub mod repositories;

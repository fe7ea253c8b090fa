//! GreenLine Persistence - Database entities
//!
//! This crate provides:
//! - SeaORM entity definitions for every GreenLine table
//! - A pagination model shared by list endpoints
//!
//! Persistence is entirely delegated to the managed Postgres service;
//! there is no embedded storage backend.

pub mod entity;
pub mod model;

// Re-export sea-orm for convenience
pub use sea_orm;

// Re-export entity prelude
pub use entity::prelude::*;

// Re-export model types
pub use model::Page;

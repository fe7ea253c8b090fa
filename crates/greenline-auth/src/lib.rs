//! GreenLine Auth - Authentication and authorization
//!
//! This crate provides:
//! - JWT session token handling with a decode cache
//! - The membership role model (owner/admin/member per business)
//! - User and membership services

pub mod model;
pub mod service;

// Re-export commonly used types
pub use model::*;

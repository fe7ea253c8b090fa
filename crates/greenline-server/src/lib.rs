//! GreenLine365 platform server
//!
//! Stateless actix-web request handlers over the domain services in
//! `greenline-core`: one request, one handler invocation, no shared
//! mutable state beyond the `AppState` clients.

pub mod api;
pub mod middleware;
pub mod model;
pub mod secured;
pub mod startup;

// Re-export types used by the secured! macro expansion
pub use greenline_common::error;
pub use greenline_common::{ActionTypes, ApiType, Tier};
pub use secured::{Secured, SecuredBuilder};

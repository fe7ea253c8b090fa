//! GreenLine Core - Domain services
//!
//! Every service here follows the same shape: validate, run one or a
//! few SeaORM queries, optionally call an integration client, return.
//! There is no shared mutable state and no coordination between
//! in-flight operations; concurrency control is whatever the managed
//! database provides.

pub mod service;

pub use service::skills::SkillRegistry;
pub use service::weather::WatcherHandle;

//! SeaORM entity definitions for the GreenLine schema
//!
//! One module per table. Entities are conventional normalized rows with
//! JSON metadata columns; soft deletion happens through status flags.

pub mod audit_log;
pub mod businesses;
pub mod call_logs;
pub mod coupons;
pub mod crm_leads;
pub mod directory_listings;
pub mod memory_conversations;
pub mod memory_facts;
pub mod memory_insights;
pub mod memory_preferences;
pub mod platform_events;
pub mod polls;
pub mod profiles;
pub mod storage_usage_events;
pub mod user_businesses;
pub mod weather_alerts;

pub mod prelude;

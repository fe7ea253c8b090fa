//! Re-exports of every entity under a table-named alias

pub use super::audit_log::Entity as AuditLog;
pub use super::businesses::Entity as Businesses;
pub use super::call_logs::Entity as CallLogs;
pub use super::coupons::Entity as Coupons;
pub use super::crm_leads::Entity as CrmLeads;
pub use super::directory_listings::Entity as DirectoryListings;
pub use super::memory_conversations::Entity as MemoryConversations;
pub use super::memory_facts::Entity as MemoryFacts;
pub use super::memory_insights::Entity as MemoryInsights;
pub use super::memory_preferences::Entity as MemoryPreferences;
pub use super::platform_events::Entity as PlatformEvents;
pub use super::polls::Entity as Polls;
pub use super::profiles::Entity as Profiles;
pub use super::storage_usage_events::Entity as StorageUsageEvents;
pub use super::user_businesses::Entity as UserBusinesses;
pub use super::weather_alerts::Entity as WeatherAlerts;

//! GreenLine Common - Shared types and utilities
//!
//! This crate provides the foundational types used across all GreenLine
//! components:
//! - Error types and error codes
//! - Subscription tier model
//! - Shared request/permission enums
//! - Utility functions

pub mod error;
pub mod utils;

// Re-exports for convenience
pub use error::{AppError, ErrorCode, GreenLineError};
pub use utils::{is_valid_identifier, normalize_phone, slugify};

/// Query parameter names
pub const BUSINESS_ID: &str = "businessId";
pub const LISTING_ID: &str = "listingId";
pub const LEAD_ID: &str = "leadId";
pub const PAGE_NO: &str = "pageNo";
pub const PAGE_SIZE: &str = "pageSize";

/// Action types for permission control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionTypes {
    #[default]
    Read,
    Write,
}

impl ActionTypes {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionTypes::Read => "r",
            ActionTypes::Write => "w",
        }
    }
}

impl std::fmt::Display for ActionTypes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ActionTypes {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "r" => Ok(ActionTypes::Read),
            "w" => Ok(ActionTypes::Write),
            _ => Err(format!("Invalid action: {}", s)),
        }
    }
}

/// API access types with different authentication rules
///
/// - `ConsoleApi`: platform-operator endpoints, always JWT + global admin
/// - `BusinessApi`: tenant endpoints, JWT + membership role + tier checks
/// - `OpenApi`: public endpoints (directory reads, lead capture, poll votes)
/// - `WebhookApi`: vendor callbacks authenticated by HMAC signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ApiType {
    ConsoleApi,
    BusinessApi,
    #[default]
    OpenApi,
    WebhookApi,
}

impl ApiType {
    pub fn description(&self) -> &'static str {
        match self {
            ApiType::ConsoleApi => "CONSOLE_API",
            ApiType::BusinessApi => "BUSINESS_API",
            ApiType::OpenApi => "OPEN_API",
            ApiType::WebhookApi => "WEBHOOK_API",
        }
    }
}

impl std::fmt::Display for ApiType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl std::str::FromStr for ApiType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CONSOLE_API" => Ok(ApiType::ConsoleApi),
            "BUSINESS_API" => Ok(ApiType::BusinessApi),
            "OPEN_API" => Ok(ApiType::OpenApi),
            "WEBHOOK_API" => Ok(ApiType::WebhookApi),
            _ => Err(format!("Invalid API type: {}", s)),
        }
    }
}

/// Subscription tier gating feature access
///
/// Ordering is meaningful: `Tier1 < Tier2 < Tier3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Tier {
    #[default]
    Tier1,
    Tier2,
    Tier3,
}

impl Tier {
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Tier1 => "tier1",
            Tier::Tier2 => "tier2",
            Tier::Tier3 => "tier3",
        }
    }

    /// Maximum number of photos a directory listing may carry
    pub fn photo_limit(self) -> usize {
        match self {
            Tier::Tier1 => 3,
            Tier::Tier2 => 10,
            Tier::Tier3 => usize::MAX,
        }
    }

    /// Maximum number of simultaneously active coupons
    pub fn active_coupon_limit(self) -> usize {
        match self {
            Tier::Tier1 => 1,
            Tier::Tier2 => 5,
            Tier::Tier3 => 20,
        }
    }

    /// Storage quota in bytes
    pub fn storage_quota_bytes(self) -> i64 {
        match self {
            Tier::Tier1 => 512 * 1024 * 1024,
            Tier::Tier2 => 5 * 1024 * 1024 * 1024,
            Tier::Tier3 => 50 * 1024 * 1024 * 1024,
        }
    }

    /// AI content tools (chat, marketing skills) require tier2+
    pub fn ai_tools_enabled(self) -> bool {
        self >= Tier::Tier2
    }

    /// Weather watcher coverage requires tier2+
    pub fn weather_watch_enabled(self) -> bool {
        self >= Tier::Tier2
    }

    /// Voice AI (Retell call handling, nudges) requires tier3
    pub fn voice_ai_enabled(self) -> bool {
        self >= Tier::Tier3
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tier1" => Ok(Tier::Tier1),
            "tier2" => Ok(Tier::Tier2),
            "tier3" => Ok(Tier::Tier3),
            _ => Err(format!("Invalid tier: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_types() {
        assert_eq!(ActionTypes::default(), ActionTypes::Read);
        assert_eq!(ActionTypes::Read.as_str(), "r");
        assert_eq!(ActionTypes::Write.as_str(), "w");
        assert_eq!("w".parse::<ActionTypes>().unwrap(), ActionTypes::Write);
    }

    #[test]
    fn test_api_type() {
        assert_eq!(ApiType::default(), ApiType::OpenApi);
        assert_eq!(ApiType::ConsoleApi.description(), "CONSOLE_API");
        assert_eq!("WEBHOOK_API".parse::<ApiType>().unwrap(), ApiType::WebhookApi);
    }

    #[test]
    fn test_tier_ordering() {
        assert!(Tier::Tier1 < Tier::Tier2);
        assert!(Tier::Tier2 < Tier::Tier3);
        assert_eq!(Tier::default(), Tier::Tier1);
        assert_eq!("tier3".parse::<Tier>().unwrap(), Tier::Tier3);
        assert!("tier4".parse::<Tier>().is_err());
    }

    #[test]
    fn test_tier_gates() {
        assert!(!Tier::Tier1.ai_tools_enabled());
        assert!(Tier::Tier2.ai_tools_enabled());
        assert!(!Tier::Tier2.voice_ai_enabled());
        assert!(Tier::Tier3.voice_ai_enabled());
        assert_eq!(Tier::Tier1.photo_limit(), 3);
        assert_eq!(Tier::Tier2.active_coupon_limit(), 5);
    }
}

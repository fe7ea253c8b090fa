//! Error types and error codes for GreenLine
//!
//! This module defines:
//! - `GreenLineError`: Application-specific error enum
//! - `AppError`: Wrapper for integration with web frameworks
//! - `ErrorCode`: Structured error codes for API responses

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Application-specific error types
#[derive(thiserror::Error, Debug)]
pub enum GreenLineError {
    #[error("caused: {0}")]
    IllegalArgument(String),

    #[error("user '{0}' not exist!")]
    UserNotExist(String),

    #[error("business '{0}' not exist")]
    BusinessNotExist(String),

    #[error("user '{0}' is not a member of business '{1}'")]
    MembershipNotFound(String, String),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("resource conflict: {0}")]
    Conflict(String),

    #[error("tier '{0}' does not include {1}")]
    TierDenied(String, String),

    #[error("storage quota exceeded for business '{0}'")]
    QuotaExceeded(String),

    #[error("nudge limit reached for call '{0}'")]
    NudgeLimitReached(String),

    #[error("invalid webhook signature")]
    SignatureInvalid,

    #[error("marketing skill '{0}' not found")]
    SkillNotFound(String),

    #[error("upstream service error: {0}")]
    UpstreamError(String),

    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("authentication error: {0}")]
    AuthError(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

/// Wrapper for application errors
#[derive(Debug)]
pub struct AppError {
    inner: anyhow::Error,
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(value: anyhow::Error) -> Self {
        AppError { inner: value }
    }
}

impl AppError {
    pub fn inner(&self) -> &anyhow::Error {
        &self.inner
    }

    pub fn downcast_ref<E: std::error::Error + Send + Sync + 'static>(&self) -> Option<&E> {
        self.inner.downcast_ref::<E>()
    }
}

/// Error code structure for API responses
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ErrorCode<'a> {
    pub code: i32,
    pub message: &'a str,
}

// General success and error codes
pub const SUCCESS: ErrorCode<'static> = ErrorCode {
    code: 0,
    message: "success",
};

pub const PARAMETER_MISSING: ErrorCode<'static> = ErrorCode {
    code: 10000,
    message: "parameter missing",
};

pub const ACCESS_DENIED: ErrorCode<'static> = ErrorCode {
    code: 10001,
    message: "access denied",
};

pub const DATA_ACCESS_ERROR: ErrorCode<'static> = ErrorCode {
    code: 10002,
    message: "data access error",
};

pub const PARAMETER_VALIDATE_ERROR: ErrorCode<'static> = ErrorCode {
    code: 20002,
    message: "parameter validate error",
};

pub const RESOURCE_NOT_FOUND: ErrorCode<'static> = ErrorCode {
    code: 20004,
    message: "resource not found",
};

pub const RESOURCE_CONFLICT: ErrorCode<'static> = ErrorCode {
    code: 20005,
    message: "resource conflict",
};

// Tenant and tier errors
pub const BUSINESS_NOT_EXIST: ErrorCode<'static> = ErrorCode {
    code: 22001,
    message: "business not exist",
};

pub const BUSINESS_ALREADY_EXIST: ErrorCode<'static> = ErrorCode {
    code: 22002,
    message: "business already exist",
};

pub const TIER_LIMIT_REACHED: ErrorCode<'static> = ErrorCode {
    code: 22010,
    message: "tier limit reached",
};

pub const TIER_FEATURE_DISABLED: ErrorCode<'static> = ErrorCode {
    code: 22011,
    message: "feature not included in tier",
};

pub const STORAGE_QUOTA_EXCEEDED: ErrorCode<'static> = ErrorCode {
    code: 22012,
    message: "storage quota exceeded",
};

// CRM and directory errors
pub const LEAD_NOT_FOUND: ErrorCode<'static> = ErrorCode {
    code: 23001,
    message: "lead not found",
};

pub const LISTING_NOT_FOUND: ErrorCode<'static> = ErrorCode {
    code: 23002,
    message: "listing not found",
};

pub const COUPON_CODE_EXISTS: ErrorCode<'static> = ErrorCode {
    code: 23003,
    message: "coupon code already exists",
};

pub const POLL_CLOSED: ErrorCode<'static> = ErrorCode {
    code: 23004,
    message: "poll is closed",
};

// Voice AI and nudges
pub const CALL_NOT_FOUND: ErrorCode<'static> = ErrorCode {
    code: 24001,
    message: "call log not found",
};

pub const NUDGE_LIMIT_REACHED: ErrorCode<'static> = ErrorCode {
    code: 24002,
    message: "nudge limit reached",
};

// Webhook and upstream errors
pub const WEBHOOK_SIGNATURE_INVALID: ErrorCode<'static> = ErrorCode {
    code: 25001,
    message: "webhook signature invalid",
};

pub const UPSTREAM_ERROR: ErrorCode<'static> = ErrorCode {
    code: 25002,
    message: "upstream service error",
};

pub const SKILL_NOT_FOUND: ErrorCode<'static> = ErrorCode {
    code: 25003,
    message: "marketing skill not found",
};

pub const SERVER_ERROR: ErrorCode<'static> = ErrorCode {
    code: 30000,
    message: "server error",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greenline_error_display() {
        let err = GreenLineError::IllegalArgument("invalid param".to_string());
        assert_eq!(format!("{}", err), "caused: invalid param");

        let err = GreenLineError::UserNotExist("testuser".to_string());
        assert_eq!(format!("{}", err), "user 'testuser' not exist!");

        let err = GreenLineError::TierDenied("tier1".to_string(), "voice AI".to_string());
        assert_eq!(format!("{}", err), "tier 'tier1' does not include voice AI");
    }

    #[test]
    fn test_error_code_constants() {
        assert_eq!(SUCCESS.code, 0);
        assert_eq!(SUCCESS.message, "success");
        assert_eq!(PARAMETER_MISSING.code, 10000);
        assert_eq!(ACCESS_DENIED.code, 10001);
        assert_eq!(TIER_LIMIT_REACHED.code, 22010);
    }

    #[test]
    fn test_app_error_from_anyhow() {
        let anyhow_err = anyhow::anyhow!("test error");
        let app_err = AppError::from(anyhow_err);
        assert_eq!(format!("{}", app_err), "test error");
    }

    #[test]
    fn test_app_error_downcast() {
        let err: anyhow::Error = GreenLineError::SignatureInvalid.into();
        let app_err = AppError::from(err);
        assert!(matches!(
            app_err.downcast_ref::<GreenLineError>(),
            Some(GreenLineError::SignatureInvalid)
        ));
    }
}

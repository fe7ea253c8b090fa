//! HTTP response types for the GreenLine server
//!
//! This module provides common response structures for API responses.

use actix_web::{HttpResponse, HttpResponseBuilder, http::StatusCode};
use serde::{Deserialize, Serialize};

use greenline_common::error;

/// Generic result wrapper for API responses
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Result<T> {
    pub code: i32,
    pub message: String,
    pub data: T,
}

impl<T> Result<T> {
    pub fn new(code: i32, message: String, data: T) -> Self {
        Result::<T> {
            code,
            message,
            data,
        }
    }

    pub fn success(data: T) -> Result<T> {
        Result::<T> {
            code: 0,
            message: "success".to_string(),
            data,
        }
    }

    pub fn http_success(data: impl Serialize) -> HttpResponse {
        HttpResponse::Ok().json(Result::success(data))
    }

    pub fn http_response(
        status: u16,
        code: i32,
        message: String,
        data: impl Serialize,
    ) -> HttpResponse {
        HttpResponseBuilder::new(StatusCode::from_u16(status).unwrap_or_default())
            .json(Result::new(code, message, data))
    }
}

/// Error result for auth failures
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorResult {
    pub timestamp: String,
    pub status: i32,
    pub error: String,
    pub message: String,
    pub path: String,
}

impl ErrorResult {
    pub fn new(status: i32, error: String, message: String, path: String) -> Self {
        ErrorResult {
            timestamp: chrono::Utc::now().to_rfc3339(),
            status,
            error,
            message,
            path,
        }
    }

    pub fn forbidden(message: &str, path: &str) -> Self {
        ErrorResult {
            timestamp: chrono::Utc::now().to_rfc3339(),
            status: StatusCode::FORBIDDEN.as_u16() as i32,
            error: StatusCode::FORBIDDEN
                .canonical_reason()
                .unwrap_or_default()
                .to_string(),
            message: message.to_string(),
            path: path.to_string(),
        }
    }

    pub fn http_response_forbidden(code: i32, message: &str, path: &str) -> HttpResponse {
        HttpResponse::Forbidden().json(ErrorResult::forbidden(
            format!("Code: {}, Message: {}", code, message).as_str(),
            path,
        ))
    }
}

/// Console exception handling utilities
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConsoleException {}

impl ConsoleException {
    pub fn handle_access_exception(message: String) -> HttpResponse {
        Result::<String>::http_response(403, error::ACCESS_DENIED.code, message, String::new())
    }

    pub fn handle_illegal_argument_exception(message: String) -> HttpResponse {
        Result::<String>::http_response(
            400,
            error::PARAMETER_VALIDATE_ERROR.code,
            format!("caused: {}", message),
            String::new(),
        )
    }

    pub fn handle_not_found_exception(message: String) -> HttpResponse {
        Result::<String>::http_response(
            404,
            error::RESOURCE_NOT_FOUND.code,
            format!("caused: {}", message),
            String::new(),
        )
    }

    pub fn handle_conflict_exception(message: String) -> HttpResponse {
        Result::<String>::http_response(
            409,
            error::RESOURCE_CONFLICT.code,
            format!("caused: {}", message),
            String::new(),
        )
    }

    pub fn handle_upstream_exception(message: String) -> HttpResponse {
        Result::<String>::http_response(
            502,
            error::UPSTREAM_ERROR.code,
            format!("caused: {}", message),
            String::new(),
        )
    }

    pub fn handle_exception(_uri: String, message: String) -> HttpResponse {
        Result::<String>::http_response(
            500,
            error::SERVER_ERROR.code,
            htmlescape::encode_minimal(format!("caused: {}", message).as_str()),
            String::new(),
        )
    }
}

/// Map a service error onto the uniform envelope by domain variant
///
/// Handlers call this in their failure arm; the anyhow chain is probed
/// with `downcast_ref` exactly once.
pub fn handle_service_error(path: &str, err: anyhow::Error) -> HttpResponse {
    use greenline_common::error::GreenLineError;

    match err.downcast_ref::<GreenLineError>() {
        Some(GreenLineError::IllegalArgument(m)) => {
            ConsoleException::handle_illegal_argument_exception(m.to_string())
        }
        Some(GreenLineError::NotFound(m)) => ConsoleException::handle_not_found_exception(m.to_string()),
        Some(GreenLineError::UserNotExist(u)) => {
            ConsoleException::handle_not_found_exception(format!("user '{}'", u))
        }
        Some(GreenLineError::BusinessNotExist(b)) => {
            ConsoleException::handle_not_found_exception(format!("business '{}'", b))
        }
        Some(GreenLineError::MembershipNotFound(u, b)) => {
            ConsoleException::handle_not_found_exception(format!(
                "membership of '{}' in '{}'",
                u, b
            ))
        }
        Some(GreenLineError::Conflict(m)) => ConsoleException::handle_conflict_exception(m.to_string()),
        Some(GreenLineError::TierDenied(tier, feature)) => Result::<String>::http_response(
            403,
            error::TIER_LIMIT_REACHED.code,
            format!("tier '{}' does not include {}", tier, feature),
            String::new(),
        ),
        Some(GreenLineError::QuotaExceeded(b)) => Result::<String>::http_response(
            403,
            error::STORAGE_QUOTA_EXCEEDED.code,
            format!("storage quota exceeded for business '{}'", b),
            String::new(),
        ),
        Some(GreenLineError::NudgeLimitReached(c)) => Result::<String>::http_response(
            403,
            error::NUDGE_LIMIT_REACHED.code,
            format!("nudge limit reached for call '{}'", c),
            String::new(),
        ),
        Some(GreenLineError::SkillNotFound(s)) => Result::<String>::http_response(
            400,
            error::SKILL_NOT_FOUND.code,
            format!("marketing skill '{}' not found", s),
            String::new(),
        ),
        Some(GreenLineError::SignatureInvalid) => Result::<String>::http_response(
            401,
            error::WEBHOOK_SIGNATURE_INVALID.code,
            "webhook signature invalid".to_string(),
            String::new(),
        ),
        Some(GreenLineError::UpstreamError(m)) => {
            ConsoleException::handle_upstream_exception(m.to_string())
        }
        _ => {
            tracing::error!(path, "Unhandled service error: {}", err);
            ConsoleException::handle_exception(path.to_string(), err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenline_common::error::GreenLineError;

    #[test]
    fn test_result_success() {
        let result = Result::success("ok");
        assert_eq!(result.code, 0);
        assert_eq!(result.message, "success");
        assert_eq!(result.data, "ok");
    }

    #[test]
    fn test_error_result_forbidden() {
        let result = ErrorResult::forbidden("no token", "/v1/crm/leads");
        assert_eq!(result.status, 403);
        assert_eq!(result.error, "Forbidden");
        assert_eq!(result.path, "/v1/crm/leads");
    }

    #[test]
    fn test_handle_service_error_statuses() {
        let cases: Vec<(anyhow::Error, u16)> = vec![
            (GreenLineError::IllegalArgument("x".into()).into(), 400),
            (GreenLineError::NotFound("x".into()).into(), 404),
            (GreenLineError::Conflict("x".into()).into(), 409),
            (
                GreenLineError::TierDenied("tier1".into(), "voice AI".into()).into(),
                403,
            ),
            (GreenLineError::UpstreamError("llm down".into()).into(), 502),
            (anyhow::anyhow!("boom"), 500),
        ];

        for (err, expected) in cases {
            let response = handle_service_error("/test", err);
            assert_eq!(response.status().as_u16(), expected);
        }
    }
}

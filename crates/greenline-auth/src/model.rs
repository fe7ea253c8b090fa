//! Authentication and authorization models
//!
//! This file defines data structures for users, memberships, and JWT
//! session tokens.

use jsonwebtoken::errors::ErrorKind;
use serde::{Deserialize, Serialize};

use greenline_persistence::entity::{profiles, user_businesses};

// Auth configuration keys
pub const AUTH_ENABLED: &str = "greenline.auth.enabled";
pub const AUTH_CONSOLE_ENABLED: &str = "greenline.auth.console.enabled";
pub const TOKEN_SECRET_KEY: &str = "greenline.auth.token.secret.key";
pub const TOKEN_EXPIRE_SECONDS: &str = "greenline.auth.token.expire.seconds";
pub const DEFAULT_TOKEN_EXPIRE_SECONDS: i64 = 18000;

pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const TOKEN_PREFIX: &str = "Bearer ";
pub const PARAM_USERNAME: &str = "username";
pub const PARAM_PASSWORD: &str = "password";
pub const CONSOLE_RESOURCE_NAME_PREFIX: &str = "console/";
pub const UPDATE_PASSWORD_ENTRY_POINT: &str = "console/user/password";
pub const ONLY_IDENTITY: &str = "only_identity";

pub const MAX_PASSWORD_LENGTH: i32 = 72;
pub const USER_NOT_FOUND_MESSAGE: &str =
    "User not found! Please check user exist or password is right!";

/// Membership role within a business
///
/// Ordering is meaningful: `Member < Admin < Owner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Member,
    Admin,
    Owner,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Admin => "admin",
            Role::Owner => "owner",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(Role::Member),
            "admin" => Ok(Role::Admin),
            "owner" => Ok(Role::Owner),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// Basic user account information
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
    pub global_admin: bool,
    pub enabled: bool,
}

impl From<profiles::Model> for User {
    fn from(value: profiles::Model) -> Self {
        Self {
            username: value.username,
            email: value.email,
            display_name: value.display_name,
            global_admin: value.global_admin != 0,
            enabled: value.enabled != 0,
        }
    }
}

impl From<&profiles::Model> for User {
    fn from(value: &profiles::Model) -> Self {
        Self {
            username: value.username.to_string(),
            email: value.email.to_string(),
            display_name: value.display_name.clone(),
            global_admin: value.global_admin != 0,
            enabled: value.enabled != 0,
        }
    }
}

/// JWT payload for session tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionJwtPayload {
    pub sub: String,
    pub exp: i64,
}

/// Membership information for one (user, business) pair
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipInfo {
    pub username: String,
    pub business_id: String,
    pub role: String,
}

impl MembershipInfo {
    /// Parse the stored role string, treating unknown values as member
    pub fn parsed_role(&self) -> Role {
        self.role.parse().unwrap_or_default()
    }
}

impl From<user_businesses::Model> for MembershipInfo {
    fn from(value: user_businesses::Model) -> Self {
        Self {
            username: value.username,
            business_id: value.business_id,
            role: value.role,
        }
    }
}

impl From<&user_businesses::Model> for MembershipInfo {
    fn from(value: &user_businesses::Model) -> Self {
        Self {
            username: value.username.to_string(),
            business_id: value.business_id.to_string(),
            role: value.role.to_string(),
        }
    }
}

/// Auth context passed through request extensions
#[derive(Debug, Default, Clone)]
pub struct AuthContext {
    pub username: String,
    pub jwt_error: Option<jsonwebtoken::errors::Error>,
    pub token_provided: bool,
}

impl AuthContext {
    pub fn jwt_error_string(&self) -> String {
        if let Some(e) = &self.jwt_error {
            match e.kind() {
                ErrorKind::ExpiredSignature => "token expired!".to_string(),
                _ => e.to_string(),
            }
        } else {
            String::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_constants() {
        assert_eq!(AUTHORIZATION_HEADER, "Authorization");
        assert_eq!(TOKEN_PREFIX, "Bearer ");
        assert_eq!(DEFAULT_TOKEN_EXPIRE_SECONDS, 18000);
        assert_eq!(CONSOLE_RESOURCE_NAME_PREFIX, "console/");
    }

    #[test]
    fn test_role_ordering() {
        assert!(Role::Member < Role::Admin);
        assert!(Role::Admin < Role::Owner);
        assert_eq!(Role::default(), Role::Member);
        assert_eq!("owner".parse::<Role>().unwrap(), Role::Owner);
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn test_membership_parsed_role_fallback() {
        let membership = MembershipInfo {
            username: "kelly".to_string(),
            business_id: "biz-1".to_string(),
            role: "not-a-role".to_string(),
        };
        assert_eq!(membership.parsed_role(), Role::Member);
    }

    #[test]
    fn test_auth_context_default() {
        let ctx = AuthContext::default();
        assert!(ctx.username.is_empty());
        assert!(ctx.jwt_error.is_none());
        assert!(!ctx.token_provided);
        assert_eq!(ctx.jwt_error_string(), "");
    }
}

//! Caller identity extracted from gateway headers.
//!
//! The upstream gateway authenticates the user and forwards the identity as
//! `X-User-ID` and `X-User-Type`. Requests without them are rejected.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const USER_ID_HEADER: &str = "X-User-ID";
pub const USER_TYPE_HEADER: &str = "X-User-Type";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Teacher,
    Student,
    Admin,
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "teacher" => Ok(UserRole::Teacher),
            "student" => Ok(UserRole::Student),
            "admin" => Ok(UserRole::Admin),
            _ => Err(format!("Invalid user type: {}", s)),
        }
    }
}

/// Authenticated caller of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerContext {
    pub user_id: i64,
    pub role: UserRole,
}

impl CallerContext {
    pub fn new(user_id: i64, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn teacher(user_id: i64) -> Self {
        Self::new(user_id, UserRole::Teacher)
    }

    /// Reject callers that are not teachers.
    pub fn require_teacher(&self) -> Result<(), AppError> {
        if self.role == UserRole::Teacher {
            Ok(())
        } else {
            Err(AppError::Forbidden(anyhow::anyhow!(
                "Access denied: requires teacher role"
            )))
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CallerContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Unauthorized(anyhow::anyhow!(
                    "Missing X-User-ID header (required from gateway)"
                ))
            })?
            .trim()
            .parse::<i64>()
            .map_err(|_| AppError::Unauthorized(anyhow::anyhow!("Invalid X-User-ID header")))?;

        let role = parts
            .headers
            .get(USER_TYPE_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Unauthorized(anyhow::anyhow!(
                    "Missing X-User-Type header (required from gateway)"
                ))
            })?
            .parse::<UserRole>()
            .map_err(|e| AppError::Unauthorized(anyhow::anyhow!(e)))?;

        tracing::Span::current().record("user_id", user_id);

        Ok(CallerContext::new(user_id, role))
    }
}

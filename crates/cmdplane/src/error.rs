// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The closed error-kind set surfaced to clients.

use std::fmt;

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

/// Error kinds surfaced in `CommandResponse.response.error_kind` and HTTP bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaneError {
    Validation,
    Auth,
    Forbidden,
    NotFound,
    Conflict,
    Timeout,
    RateLimited,
    Upstream,
    Internal,
}

impl PlaneError {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::Auth => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Timeout => 504,
            Self::RateLimited => 429,
            Self::Upstream => 502,
            Self::Internal => 500,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Auth => "auth",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Timeout => "timeout",
            Self::RateLimited => "rate_limited",
            Self::Upstream => "upstream",
            Self::Internal => "internal",
        }
    }

    pub fn to_error_body(&self, message: impl Into<String>) -> ErrorBody {
        ErrorBody { kind: self.as_str().to_owned(), message: message.into() }
    }

    pub fn to_http_response(
        &self,
        message: impl Into<String>,
    ) -> (StatusCode, Json<ErrorResponse>) {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse { error: self.to_error_body(message) };
        (status, Json(body))
    }
}

impl fmt::Display for PlaneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level error response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Error body with machine-readable kind and human-readable message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
}

/// A typed failure carrying both the kind and a user-safe message — what
/// stores and handlers return on the failure path.
#[derive(Debug, Clone)]
pub struct PlaneFailure {
    pub kind: PlaneError,
    pub message: String,
}

impl PlaneFailure {
    pub fn new(kind: PlaneError, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(PlaneError::NotFound, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(PlaneError::Validation, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(PlaneError::Forbidden, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(PlaneError::Conflict, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(PlaneError::Timeout, message)
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(PlaneError::Upstream, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(PlaneError::Internal, message)
    }
}

impl fmt::Display for PlaneFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for PlaneFailure {}

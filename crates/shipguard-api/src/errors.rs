// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Machine error taxonomy for the service surface.
///
/// `InvalidArgument` is always a client error rejected before any
/// upstream call. The upstream codes preserve the distinction between
/// "cart/product absent", "credentials rejected" (operator-actionable)
/// and "any other non-2xx".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ApiErrorCode {
    InvalidArgument,
    NotFound,
    UpstreamAuth,
    Upstream,
    MalformedResponse,
    Internal,
}

impl ApiErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::NotFound => "not_found",
            Self::UpstreamAuth => "upstream_auth",
            Self::Upstream => "upstream",
            Self::MalformedResponse => "malformed_response",
            Self::Internal => "internal",
        }
    }

    /// HTTP status the code renders as. Callers must still check the
    /// `success` flag in the body; the two can legitimately diverge.
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::InvalidArgument => 400,
            Self::NotFound => 404,
            Self::UpstreamAuth | Self::Upstream | Self::MalformedResponse => 502,
            Self::Internal => 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    pub details: Value,
}

impl ApiError {
    #[must_use]
    pub fn new(code: ApiErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
        }
    }

    #[must_use]
    pub fn invalid_argument(field: &str, reason: &str) -> Self {
        Self::new(
            ApiErrorCode::InvalidArgument,
            format!("invalid request field: {field}"),
            json!({"field": field, "reason": reason}),
        )
    }

    #[must_use]
    pub fn cart_not_found(cart_id: &str) -> Self {
        Self::new(
            ApiErrorCode::NotFound,
            "cart not found upstream",
            json!({"cart_id": cart_id}),
        )
    }

    #[must_use]
    pub fn upstream(status: Option<u16>, message: &str) -> Self {
        Self::new(
            ApiErrorCode::Upstream,
            "upstream cart store request failed",
            json!({"upstream_status": status, "upstream_message": message}),
        )
    }

    #[must_use]
    pub fn upstream_auth(message: &str) -> Self {
        Self::new(
            ApiErrorCode::UpstreamAuth,
            "upstream cart store rejected credentials",
            json!({"upstream_message": message}),
        )
    }

    #[must_use]
    pub fn malformed_response(message: &str) -> Self {
        Self::new(
            ApiErrorCode::MalformedResponse,
            "upstream cart payload could not be interpreted",
            json!({"reason": message}),
        )
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_serialize_as_snake_case() {
        let rendered = serde_json::to_value(ApiErrorCode::UpstreamAuth).expect("serialize");
        assert_eq!(rendered, serde_json::json!("upstream_auth"));
    }

    #[test]
    fn status_mapping_keeps_client_errors_4xx() {
        assert_eq!(ApiErrorCode::InvalidArgument.http_status(), 400);
        assert_eq!(ApiErrorCode::NotFound.http_status(), 404);
        assert_eq!(ApiErrorCode::Upstream.http_status(), 502);
        assert_eq!(ApiErrorCode::Internal.http_status(), 500);
    }
}

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::domain::types::Ineligible;

/// OTP service error variants.
///
/// `InvalidCode` deliberately covers wrong code, expired, already consumed
/// and no record at all, so callers cannot tell those cases apart.
#[derive(Debug, thiserror::Error)]
pub enum OtpServiceError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("invalid value for field: {0}")]
    InvalidField(&'static str),
    #[error("invalid identifier")]
    InvalidIdentifier,
    #[error("invalid OTP purpose")]
    InvalidPurpose,
    #[error("{0}")]
    NotEligible(Ineligible),
    #[error("failed to deliver code")]
    DeliveryFailed,
    #[error("invalid or expired code")]
    InvalidCode,
    #[error("password must be at least 6 characters and contain a letter and a number")]
    WeakPassword,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl OtpServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "MISSING_FIELD",
            Self::InvalidField(_) => "INVALID_FIELD",
            Self::InvalidIdentifier => "INVALID_IDENTIFIER",
            Self::InvalidPurpose => "INVALID_PURPOSE",
            Self::NotEligible(Ineligible::UnknownPrincipal) => "USER_NOT_FOUND",
            Self::NotEligible(Ineligible::PrincipalExists) => "USER_ALREADY_EXISTS",
            Self::DeliveryFailed => "DELIVERY_FAILED",
            Self::InvalidCode => "INVALID_CODE",
            Self::WeakPassword => "WEAK_PASSWORD",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

/// Unparseable bodies, wrong content types and mistyped fields all answer
/// with the regular error body instead of axum's plain-text rejection.
impl From<JsonRejection> for OtpServiceError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(%rejection, "rejected request body");
        Self::InvalidField("body")
    }
}

impl IntoResponse for OtpServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::MissingField(_)
            | Self::InvalidField(_)
            | Self::WeakPassword
            | Self::InvalidIdentifier
            | Self::InvalidPurpose
            | Self::InvalidCode => StatusCode::BAD_REQUEST,
            Self::NotEligible(Ineligible::UnknownPrincipal) => StatusCode::NOT_FOUND,
            Self::NotEligible(Ineligible::PrincipalExists) => StatusCode::CONFLICT,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::DeliveryFailed => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // TraceLayer already records method/uri/status for every request; only
        // internal errors carry a cause worth logging here.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = ?e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "error": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}

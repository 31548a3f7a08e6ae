use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};

use crate::domain::types::{Principal, Purpose};
use crate::error::OtpServiceError;
use crate::infra::db::{DbOtpRepository, DbPrincipalDirectory};
use crate::infra::notify::Notifier;
use crate::state::AppState;
use crate::usecase::issue::{IssueOtpInput, IssueOtpUseCase};
use crate::usecase::resend::ResendOtpUseCase;
use crate::usecase::verify::{VerifyOtpInput, VerifyOtpUseCase};

/// Body of `POST /otp/send` and `POST /otp/resend`. Extra context fields
/// (the client sends form data along) are ignored.
#[derive(Deserialize)]
pub struct SendOtpRequest {
    #[serde(alias = "email")]
    pub identifier: Option<String>,
    #[serde(alias = "type")]
    pub purpose: Option<String>,
}

impl SendOtpRequest {
    pub fn into_input(self) -> Result<IssueOtpInput, OtpServiceError> {
        Ok(IssueOtpInput {
            identifier: require(self.identifier, "identifier")?,
            purpose: require(self.purpose, "purpose")?.parse()?,
        })
    }
}

#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    #[serde(alias = "email")]
    pub identifier: Option<String>,
    #[serde(alias = "otp")]
    pub code: Option<String>,
    #[serde(alias = "type")]
    pub purpose: Option<String>,
}

impl VerifyOtpRequest {
    pub fn into_input(self) -> Result<VerifyOtpInput, OtpServiceError> {
        Ok(VerifyOtpInput {
            identifier: require(self.identifier, "identifier")?,
            code: require(self.code, "code")?,
            purpose: require(self.purpose, "purpose")?.parse::<Purpose>()?,
        })
    }
}

fn require(value: Option<String>, field: &'static str) -> Result<String, OtpServiceError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(OtpServiceError::MissingField(field))
}

#[derive(Serialize)]
pub struct SendOtpResponse {
    pub message: &'static str,
    pub identifier: String,
}

#[derive(Serialize)]
pub struct VerifyOtpResponse {
    pub message: &'static str,
    pub identifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<Principal>,
}

fn issue_usecase(
    state: &AppState,
) -> IssueOtpUseCase<DbPrincipalDirectory, DbOtpRepository, Notifier> {
    IssueOtpUseCase {
        directory: state.directory(),
        otps: state.otp_repo(),
        notifier: state.notifier.clone(),
        notify_timeout: state.notify_timeout,
    }
}

// ── POST /otp/send ────────────────────────────────────────────────────────────

pub async fn send_otp(
    State(state): State<AppState>,
    body: Result<Json<SendOtpRequest>, JsonRejection>,
) -> Result<Json<SendOtpResponse>, OtpServiceError> {
    let Json(body) = body?;
    let out = issue_usecase(&state).execute(body.into_input()?).await?;
    Ok(Json(SendOtpResponse {
        message: "OTP sent successfully",
        identifier: out.identifier,
    }))
}

// ── POST /otp/resend ──────────────────────────────────────────────────────────

pub async fn resend_otp(
    State(state): State<AppState>,
    body: Result<Json<SendOtpRequest>, JsonRejection>,
) -> Result<Json<SendOtpResponse>, OtpServiceError> {
    let Json(body) = body?;
    let usecase = ResendOtpUseCase {
        issue: issue_usecase(&state),
    };
    let out = usecase.execute(body.into_input()?).await?;
    Ok(Json(SendOtpResponse {
        message: "OTP sent successfully",
        identifier: out.identifier,
    }))
}

// ── POST /otp/verify ──────────────────────────────────────────────────────────

pub async fn verify_otp(
    State(state): State<AppState>,
    body: Result<Json<VerifyOtpRequest>, JsonRejection>,
) -> Result<Json<VerifyOtpResponse>, OtpServiceError> {
    let Json(body) = body?;
    let usecase = VerifyOtpUseCase {
        directory: state.directory(),
        otps: state.otp_repo(),
    };
    let out = usecase.execute(body.into_input()?).await?;
    Ok(Json(VerifyOtpResponse {
        message: "OTP verified successfully",
        identifier: out.identifier,
        principal: out.principal,
    }))
}

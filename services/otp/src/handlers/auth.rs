use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::types::Principal;
use crate::error::OtpServiceError;
use crate::state::AppState;
use crate::usecase::principal::{LoginInput, LoginUseCase, SignupInput, SignupUseCase};

/// Accepts ISO dates (`2001-04-23`) and the `DD/MM/YYYY` form the mobile client sends.
fn parse_dob(raw: &str) -> Result<NaiveDate, OtpServiceError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .map_err(|_| OtpServiceError::InvalidField("dob"))
}

#[derive(Serialize)]
pub struct PrincipalResponse {
    pub message: &'static str,
    pub principal: Principal,
}

// ── POST /auth/signup ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SignupRequest {
    #[serde(alias = "firstName")]
    pub first_name: Option<String>,
    #[serde(alias = "lastName")]
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub dob: Option<String>,
    pub password: Option<String>,
}

impl SignupRequest {
    pub fn into_input(self) -> Result<SignupInput, OtpServiceError> {
        let dob = match self.dob.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_dob(raw)?),
        };
        Ok(SignupInput {
            first_name: self
                .first_name
                .ok_or(OtpServiceError::MissingField("first_name"))?,
            last_name: self
                .last_name
                .ok_or(OtpServiceError::MissingField("last_name"))?,
            email: self.email.ok_or(OtpServiceError::MissingField("email"))?,
            dob,
            password: self
                .password
                .ok_or(OtpServiceError::MissingField("password"))?,
        })
    }
}

pub async fn signup(
    State(state): State<AppState>,
    body: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PrincipalResponse>), OtpServiceError> {
    let Json(body) = body?;
    let usecase = SignupUseCase {
        directory: state.directory(),
    };
    let principal = usecase.execute(body.into_input()?).await?;
    Ok((
        StatusCode::CREATED,
        Json(PrincipalResponse {
            message: "User created successfully",
            principal,
        }),
    ))
}

// ── POST /auth/login ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<PrincipalResponse>, OtpServiceError> {
    let Json(body) = body?;
    let input = LoginInput {
        email: body.email.ok_or(OtpServiceError::MissingField("email"))?,
        password: body
            .password
            .ok_or(OtpServiceError::MissingField("password"))?,
    };
    let usecase = LoginUseCase {
        directory: state.directory(),
    };
    let principal = usecase.execute(input).await?;
    Ok(Json(PrincipalResponse {
        message: "Login successful",
        principal,
    }))
}

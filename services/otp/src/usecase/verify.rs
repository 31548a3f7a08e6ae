use chrono::Utc;
use tracing::info;

use crate::domain::repository::{OtpRepository, PrincipalDirectory};
use crate::domain::types::{Ineligible, Principal, Purpose};
use crate::domain::validation::{is_well_formed_code, normalize_identifier};
use crate::error::OtpServiceError;

pub struct VerifyOtpInput {
    pub identifier: String,
    pub code: String,
    pub purpose: Purpose,
}

#[derive(Debug)]
pub struct VerifyOtpOutput {
    pub identifier: String,
    /// Present for `login`: the principal the code was issued to.
    pub principal: Option<Principal>,
}

pub struct VerifyOtpUseCase<D, R>
where
    D: PrincipalDirectory,
    R: OtpRepository,
{
    pub directory: D,
    pub otps: R,
}

impl<D, R> VerifyOtpUseCase<D, R>
where
    D: PrincipalDirectory,
    R: OtpRepository,
{
    pub async fn execute(&self, input: VerifyOtpInput) -> Result<VerifyOtpOutput, OtpServiceError> {
        let identifier = normalize_identifier(&input.identifier)?;
        let code = input.code.trim();
        if !is_well_formed_code(code) {
            return Err(OtpServiceError::InvalidCode);
        }

        // Consumption is the single conditional update; it must land before any
        // downstream step so a code never completes two logins.
        let consumed = self
            .otps
            .consume(&identifier, input.purpose, code, Utc::now())
            .await?;
        if !consumed {
            return Err(OtpServiceError::InvalidCode);
        }

        let principal = match input.purpose {
            Purpose::Login => {
                let record = self
                    .directory
                    .find(&identifier)
                    .await?
                    .ok_or(OtpServiceError::NotEligible(Ineligible::UnknownPrincipal))?;
                Some(record.principal)
            }
            Purpose::Signup => None,
        };

        info!(purpose = %input.purpose, "otp verified");
        Ok(VerifyOtpOutput {
            identifier,
            principal,
        })
    }
}

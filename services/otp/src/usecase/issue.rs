use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use rand::RngExt;
use tokio::time::timeout;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::repository::{NotificationSender, OtpRepository, PrincipalDirectory};
use crate::domain::types::{OTP_CODE_LEN, OTP_TTL_SECS, OtpRecord, Purpose};
use crate::domain::validation::normalize_identifier;
use crate::error::OtpServiceError;

const DIGITS: &[u8] = b"0123456789";

const ROLLBACK_ATTEMPTS: u32 = 2;

/// Uniform over the full `10^OTP_CODE_LEN` space, leading zeros included.
pub fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..OTP_CODE_LEN)
        .map(|_| DIGITS[rng.random_range(0..DIGITS.len())] as char)
        .collect()
}

pub struct IssueOtpInput {
    pub identifier: String,
    pub purpose: Purpose,
}

#[derive(Debug)]
pub struct IssueOtpOutput {
    pub identifier: String,
}

pub struct IssueOtpUseCase<D, R, N>
where
    D: PrincipalDirectory,
    R: OtpRepository,
    N: NotificationSender,
{
    pub directory: D,
    pub otps: R,
    pub notifier: N,
    pub notify_timeout: StdDuration,
}

impl<D, R, N> IssueOtpUseCase<D, R, N>
where
    D: PrincipalDirectory,
    R: OtpRepository,
    N: NotificationSender,
{
    pub async fn execute(&self, input: IssueOtpInput) -> Result<IssueOtpOutput, OtpServiceError> {
        let identifier = normalize_identifier(&input.identifier)?;
        let purpose = input.purpose;

        // 1. Eligibility: login needs a known principal, signup an unknown one.
        let exists = self.directory.exists(&identifier).await?;
        purpose
            .check_eligibility(exists)
            .map_err(OtpServiceError::NotEligible)?;

        // 2. Replace whatever was live for this pair with a fresh record.
        let now = Utc::now();
        let record = OtpRecord {
            id: Uuid::new_v4(),
            identifier: identifier.clone(),
            purpose,
            code: generate_code(),
            issued_at: now,
            expires_at: now + Duration::seconds(OTP_TTL_SECS),
            consumed: false,
        };
        self.otps.replace(&record).await?;

        // 3. Deliver; a code that never reached the user must not stay valid.
        let delivery = timeout(
            self.notify_timeout,
            self.notifier.send(&identifier, &record.code, purpose),
        )
        .await;
        let failure = match delivery {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(e.to_string()),
            Err(_) => Some(format!(
                "timed out after {}ms",
                self.notify_timeout.as_millis()
            )),
        };
        if let Some(reason) = failure {
            warn!(otp_id = %record.id, %purpose, %reason, "otp delivery failed, rolling back");
            self.roll_back(record.id).await;
            return Err(OtpServiceError::DeliveryFailed);
        }

        info!(otp_id = %record.id, %purpose, "otp issued");
        Ok(IssueOtpOutput { identifier })
    }

    /// Delete an undelivered record, retrying once. The caller reports the
    /// delivery failure either way.
    async fn roll_back(&self, id: Uuid) {
        for attempt in 1..=ROLLBACK_ATTEMPTS {
            match self.otps.delete_by_id(id).await {
                Ok(()) => return,
                Err(e) => error!(otp_id = %id, attempt, error = ?e, "otp rollback failed"),
            }
        }
    }
}

use tracing::debug;

use crate::domain::repository::{NotificationSender, OtpRepository, PrincipalDirectory};
use crate::domain::validation::normalize_identifier;
use crate::error::OtpServiceError;
use crate::usecase::issue::{IssueOtpInput, IssueOtpOutput, IssueOtpUseCase};

/// Drop whatever code is live for the pair, then issue a fresh one through
/// the regular issuance path (eligibility is checked again).
pub struct ResendOtpUseCase<D, R, N>
where
    D: PrincipalDirectory,
    R: OtpRepository,
    N: NotificationSender,
{
    pub issue: IssueOtpUseCase<D, R, N>,
}

impl<D, R, N> ResendOtpUseCase<D, R, N>
where
    D: PrincipalDirectory,
    R: OtpRepository,
    N: NotificationSender,
{
    pub async fn execute(&self, input: IssueOtpInput) -> Result<IssueOtpOutput, OtpServiceError> {
        let identifier = normalize_identifier(&input.identifier)?;
        let removed = self.issue.otps.delete_for(&identifier, input.purpose).await?;
        debug!(removed, purpose = %input.purpose, "cleared previous otp before resend");

        self.issue
            .execute(IssueOtpInput {
                identifier,
                purpose: input.purpose,
            })
            .await
    }
}

use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info};

use crate::domain::repository::OtpRepository;
use crate::error::OtpServiceError;
use crate::infra::db::DbOtpRepository;

/// Delete every record already past its expiry. Returns the number removed.
///
/// Verification checks `expires_at` itself, so skipping or delaying a sweep
/// only costs storage.
pub async fn sweep_expired<R: OtpRepository>(otps: &R) -> Result<u64, OtpServiceError> {
    let deleted = otps.delete_expired(Utc::now()).await?;
    if deleted > 0 {
        info!(deleted, "swept expired otp records");
    }
    Ok(deleted)
}

/// Run [`sweep_expired`] every `period` until the process exits.
pub fn spawn_sweeper(otps: DbOtpRepository, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(e) = sweep_expired(&otps).await {
                error!(error = ?e, "otp sweep failed");
            }
        }
    })
}

use std::time::Duration;

use sea_orm::DatabaseConnection;

use crate::infra::db::{DbOtpRepository, DbPrincipalDirectory};
use crate::infra::notify::Notifier;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub notifier: Notifier,
    pub notify_timeout: Duration,
}

impl AppState {
    pub fn otp_repo(&self) -> DbOtpRepository {
        DbOtpRepository {
            db: self.db.clone(),
        }
    }

    pub fn directory(&self) -> DbPrincipalDirectory {
        DbPrincipalDirectory {
            db: self.db.clone(),
        }
    }
}

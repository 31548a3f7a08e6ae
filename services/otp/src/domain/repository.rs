#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::types::{OtpRecord, PrincipalRecord, Purpose};
use crate::error::OtpServiceError;

/// Durable store of OTP records.
pub trait OtpRepository: Send + Sync {
    /// Make `record` the only record for its `(identifier, purpose)`, as one
    /// atomic write. Concurrent replacements resolve last-writer-wins, and the
    /// ids they overwrite stop existing.
    async fn replace(&self, record: &OtpRecord) -> Result<(), OtpServiceError>;

    /// Delete every record for `(identifier, purpose)`. Returns the number removed.
    async fn delete_for(&self, identifier: &str, purpose: Purpose)
    -> Result<u64, OtpServiceError>;

    /// Delete a single record by id (issuance rollback). Missing ids are not an error.
    async fn delete_by_id(&self, id: Uuid) -> Result<(), OtpServiceError>;

    /// Atomically mark the matching record consumed.
    ///
    /// Matches on identifier, purpose, exact code, `consumed = false` and
    /// `expires_at > now` in one conditional update. Returns `true` only for
    /// the caller whose update actually changed the row.
    async fn consume(
        &self,
        identifier: &str,
        purpose: Purpose,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, OtpServiceError>;

    /// Delete every record with `expires_at < now`. Returns the number removed.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, OtpServiceError>;
}

/// Store of known principals, consulted for OTP eligibility.
pub trait PrincipalDirectory: Send + Sync {
    async fn exists(&self, identifier: &str) -> Result<bool, OtpServiceError>;

    async fn find(&self, identifier: &str) -> Result<Option<PrincipalRecord>, OtpServiceError>;

    /// Insert a new principal. Returns `false` if the email is already taken.
    async fn create(&self, record: &PrincipalRecord) -> Result<bool, OtpServiceError>;
}

/// Out-of-band delivery of an issued code (email in production).
///
/// Callers bound each `send` with a timeout; implementations need not.
pub trait NotificationSender: Send + Sync {
    async fn send(
        &self,
        identifier: &str,
        code: &str,
        purpose: Purpose,
    ) -> Result<(), anyhow::Error>;
}

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use resolveit_otp::domain::repository::{NotificationSender, OtpRepository, PrincipalDirectory};
use resolveit_otp::domain::types::{OtpRecord, Principal, PrincipalRecord, Purpose};
use resolveit_otp::error::OtpServiceError;
use resolveit_otp::usecase::issue::IssueOtpUseCase;
use resolveit_otp::usecase::principal::hash_password;
use resolveit_otp::usecase::verify::VerifyOtpUseCase;

// ── MockDirectory ────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockDirectory {
    pub principals: Arc<Mutex<Vec<PrincipalRecord>>>,
}

impl MockDirectory {
    pub fn new(principals: Vec<PrincipalRecord>) -> Self {
        Self {
            principals: Arc::new(Mutex::new(principals)),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

impl PrincipalDirectory for MockDirectory {
    async fn exists(&self, identifier: &str) -> Result<bool, OtpServiceError> {
        Ok(self
            .principals
            .lock()
            .unwrap()
            .iter()
            .any(|p| p.principal.email == identifier))
    }

    async fn find(&self, identifier: &str) -> Result<Option<PrincipalRecord>, OtpServiceError> {
        Ok(self
            .principals
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.principal.email == identifier)
            .cloned())
    }

    async fn create(&self, record: &PrincipalRecord) -> Result<bool, OtpServiceError> {
        let mut principals = self.principals.lock().unwrap();
        if principals
            .iter()
            .any(|p| p.principal.email == record.principal.email)
        {
            return Ok(false);
        }
        principals.push(record.clone());
        Ok(true)
    }
}

// ── MockOtpRepo ──────────────────────────────────────────────────────────────

/// In-memory store. Every method holds the lock for its whole body, so
/// `consume` is a single indivisible check-and-set like the SQL update.
#[derive(Clone, Default)]
pub struct MockOtpRepo {
    pub records: Arc<Mutex<Vec<OtpRecord>>>,
}

impl MockOtpRepo {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns a shared handle to the internal record list for post-execution inspection.
    pub fn records_handle(&self) -> Arc<Mutex<Vec<OtpRecord>>> {
        Arc::clone(&self.records)
    }
}

impl OtpRepository for MockOtpRepo {
    async fn replace(&self, record: &OtpRecord) -> Result<(), OtpServiceError> {
        let mut records = self.records.lock().unwrap();
        records.retain(|r| !(r.identifier == record.identifier && r.purpose == record.purpose));
        records.push(record.clone());
        Ok(())
    }

    async fn delete_for(
        &self,
        identifier: &str,
        purpose: Purpose,
    ) -> Result<u64, OtpServiceError> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| !(r.identifier == identifier && r.purpose == purpose));
        Ok((before - records.len()) as u64)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), OtpServiceError> {
        self.records.lock().unwrap().retain(|r| r.id != id);
        Ok(())
    }

    async fn consume(
        &self,
        identifier: &str,
        purpose: Purpose,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, OtpServiceError> {
        let mut records = self.records.lock().unwrap();
        match records.iter_mut().find(|r| {
            r.identifier == identifier && r.purpose == purpose && r.code == code && r.is_valid_at(now)
        }) {
            Some(record) => {
                record.consumed = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, OtpServiceError> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| r.expires_at >= now);
        Ok((before - records.len()) as u64)
    }
}

/// Wraps [`MockOtpRepo`] so the first `failures` calls to `delete_by_id` error out.
#[derive(Clone)]
pub struct FlakyDeleteRepo {
    pub inner: MockOtpRepo,
    failures: Arc<AtomicU32>,
}

impl FlakyDeleteRepo {
    pub fn new(inner: MockOtpRepo, failures: u32) -> Self {
        Self {
            inner,
            failures: Arc::new(AtomicU32::new(failures)),
        }
    }
}

impl OtpRepository for FlakyDeleteRepo {
    async fn replace(&self, record: &OtpRecord) -> Result<(), OtpServiceError> {
        self.inner.replace(record).await
    }

    async fn delete_for(
        &self,
        identifier: &str,
        purpose: Purpose,
    ) -> Result<u64, OtpServiceError> {
        self.inner.delete_for(identifier, purpose).await
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), OtpServiceError> {
        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(anyhow::anyhow!("connection reset").into());
        }
        self.inner.delete_by_id(id).await
    }

    async fn consume(
        &self,
        identifier: &str,
        purpose: Purpose,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, OtpServiceError> {
        self.inner.consume(identifier, purpose, code, now).await
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, OtpServiceError> {
        self.inner.delete_expired(now).await
    }
}

// ── Notification senders ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub identifier: String,
    pub code: String,
    pub purpose: Purpose,
}

/// Records every delivery so tests can read the code a user would receive.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub sent: Arc<Mutex<Vec<Delivery>>>,
}

impl RecordingNotifier {
    pub fn sent_handle(&self) -> Arc<Mutex<Vec<Delivery>>> {
        Arc::clone(&self.sent)
    }
}

impl NotificationSender for RecordingNotifier {
    async fn send(&self, identifier: &str, code: &str, purpose: Purpose) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(Delivery {
            identifier: identifier.to_owned(),
            code: code.to_owned(),
            purpose,
        });
        Ok(())
    }
}

pub struct FailingNotifier;

impl NotificationSender for FailingNotifier {
    async fn send(&self, _identifier: &str, _code: &str, _purpose: Purpose) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("smtp connection refused"))
    }
}

/// Never answers within any sane timeout.
pub struct StalledNotifier;

impl NotificationSender for StalledNotifier {
    async fn send(&self, _identifier: &str, _code: &str, _purpose: Purpose) -> anyhow::Result<()> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }
}

// ── Use case builders ────────────────────────────────────────────────────────

pub const TEST_NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

pub fn issue_usecase<N: NotificationSender>(
    directory: &MockDirectory,
    otps: &MockOtpRepo,
    notifier: N,
) -> IssueOtpUseCase<MockDirectory, MockOtpRepo, N> {
    IssueOtpUseCase {
        directory: directory.clone(),
        otps: otps.clone(),
        notifier,
        notify_timeout: TEST_NOTIFY_TIMEOUT,
    }
}

pub fn verify_usecase(
    directory: &MockDirectory,
    otps: &MockOtpRepo,
) -> VerifyOtpUseCase<MockDirectory, MockOtpRepo> {
    VerifyOtpUseCase {
        directory: directory.clone(),
        otps: otps.clone(),
    }
}

// ── Test fixture helpers ─────────────────────────────────────────────────────

pub const KNOWN_EMAIL: &str = "user@example.com";
pub const NEW_EMAIL: &str = "a@b.com";
pub const TEST_PASSWORD: &str = "resolve42";

pub fn test_principal() -> PrincipalRecord {
    PrincipalRecord {
        principal: Principal {
            id: Uuid::parse_str("00000000-0000-0000-0000-000000000001").unwrap(),
            first_name: "Jane".to_owned(),
            last_name: "Doe".to_owned(),
            email: KNOWN_EMAIL.to_owned(),
            dob: None,
            created_at: Utc::now(),
        },
        password_hash: hash_password(TEST_PASSWORD).unwrap(),
    }
}

pub fn last_code(sent: &Arc<Mutex<Vec<Delivery>>>) -> String {
    sent.lock()
        .unwrap()
        .last()
        .map(|d| d.code.clone())
        .expect("no code was delivered")
}

/// A code that differs from `code` but is still well-formed.
pub fn wrong_code(code: &str) -> String {
    if code == "0000" { "1111" } else { "0000" }.to_owned()
}

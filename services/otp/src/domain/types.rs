use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::OtpServiceError;

/// Transaction context an OTP is scoped to. A code issued for one purpose
/// never verifies for another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    Login,
    Signup,
}

impl Purpose {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Signup => "signup",
        }
    }

    /// Whether an identifier's directory status allows issuing a code for this purpose.
    pub fn check_eligibility(self, principal_exists: bool) -> Result<(), Ineligible> {
        match (self, principal_exists) {
            (Self::Login, false) => Err(Ineligible::UnknownPrincipal),
            (Self::Signup, true) => Err(Ineligible::PrincipalExists),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Purpose {
    type Err = OtpServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "login" => Ok(Self::Login),
            "signup" => Ok(Self::Signup),
            _ => Err(OtpServiceError::InvalidPurpose),
        }
    }
}

/// Why an identifier may not receive a code for the requested purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligible {
    /// `login` requested for an identifier the directory does not know.
    UnknownPrincipal,
    /// `signup` requested for an identifier that is already registered.
    PrincipalExists,
}

impl fmt::Display for Ineligible {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPrincipal => f.write_str("user not found"),
            Self::PrincipalExists => f.write_str("user already exists"),
        }
    }
}

/// One-time code bound to an (identifier, purpose) pair.
#[derive(Debug, Clone)]
pub struct OtpRecord {
    pub id: Uuid,
    pub identifier: String,
    pub purpose: Purpose,
    pub code: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub consumed: bool,
}

impl OtpRecord {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.consumed && self.expires_at > now
    }
}

/// Registered principal as exposed outside the service (no password hash).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub dob: Option<NaiveDate>,
    #[serde(serialize_with = "resolveit_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

/// Principal row including its credential, used by registration and password login.
#[derive(Debug, Clone)]
pub struct PrincipalRecord {
    pub principal: Principal,
    pub password_hash: String,
}

/// OTP code length in digits.
pub const OTP_CODE_LEN: usize = 4;

/// OTP time-to-live in seconds (10 minutes).
pub const OTP_TTL_SECS: i64 = 600;

/// Default period between expiry sweeps in seconds (5 minutes).
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;

/// Default bound on a single Notification Sender call in seconds.
pub const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 10;

use anyhow::anyhow;
use argon2::password_hash::{self, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{NaiveDate, Utc};
use rand::RngExt;
use tracing::info;
use uuid::Uuid;

use crate::domain::repository::PrincipalDirectory;
use crate::domain::types::{Ineligible, Principal, PrincipalRecord};
use crate::domain::validation::{check_password_strength, normalize_identifier, normalize_name};
use crate::error::OtpServiceError;

/// Hash a password into an Argon2 PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, OtpServiceError> {
    let salt_bytes: [u8; 16] = rand::rng().random();
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| anyhow!("encode salt: {e}"))?;
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("hash password: {e}"))?;
    Ok(hash.to_string())
}

/// Check a password against a stored PHC string. A mismatch is `Ok(false)`;
/// a corrupt stored hash is an internal error.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, OtpServiceError> {
    let parsed = PasswordHash::new(stored).map_err(|e| anyhow!("invalid PHC hash: {e}"))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow!("verify password: {e}").into()),
    }
}

// ── Signup ───────────────────────────────────────────────────────────────────

pub struct SignupInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub dob: Option<NaiveDate>,
    pub password: String,
}

pub struct SignupUseCase<D: PrincipalDirectory> {
    pub directory: D,
}

impl<D: PrincipalDirectory> SignupUseCase<D> {
    pub async fn execute(&self, input: SignupInput) -> Result<Principal, OtpServiceError> {
        let email = normalize_identifier(&input.email)?;
        let first_name = normalize_name(&input.first_name, "first_name")?;
        let last_name = normalize_name(&input.last_name, "last_name")?;
        check_password_strength(&input.password)?;

        let taken = OtpServiceError::NotEligible(Ineligible::PrincipalExists);
        if self.directory.exists(&email).await? {
            return Err(taken);
        }

        let record = PrincipalRecord {
            principal: Principal {
                id: Uuid::new_v4(),
                first_name,
                last_name,
                email,
                dob: input.dob,
                created_at: Utc::now(),
            },
            password_hash: hash_password(&input.password)?,
        };
        // The unique index decides races between concurrent signups.
        if !self.directory.create(&record).await? {
            return Err(taken);
        }

        info!(principal_id = %record.principal.id, "principal registered");
        Ok(record.principal)
    }
}

// ── Password login ───────────────────────────────────────────────────────────

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

pub struct LoginUseCase<D: PrincipalDirectory> {
    pub directory: D,
}

impl<D: PrincipalDirectory> LoginUseCase<D> {
    /// Unknown email and wrong password both yield `InvalidCredentials`.
    pub async fn execute(&self, input: LoginInput) -> Result<Principal, OtpServiceError> {
        let email =
            normalize_identifier(&input.email).map_err(|_| OtpServiceError::InvalidCredentials)?;
        let record = self
            .directory
            .find(&email)
            .await?
            .ok_or(OtpServiceError::InvalidCredentials)?;

        if !verify_password(&input.password, &record.password_hash)? {
            return Err(OtpServiceError::InvalidCredentials);
        }
        Ok(record.principal)
    }
}

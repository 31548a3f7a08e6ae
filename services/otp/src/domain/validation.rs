use std::sync::LazyLock;

use regex::Regex;

use crate::domain::types::OTP_CODE_LEN;
use crate::error::OtpServiceError;

static EMAIL_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());

/// Basic email shape check on already-normalized input.
fn valid_email(identifier: &str) -> bool {
    EMAIL_RE
        .as_ref()
        .is_some_and(|regex| regex.is_match(identifier))
}

/// Trim and lower-case an email identifier, rejecting anything not shaped like an address.
pub fn normalize_identifier(raw: &str) -> Result<String, OtpServiceError> {
    let identifier = raw.trim().to_lowercase();
    if identifier.is_empty() {
        return Err(OtpServiceError::MissingField("identifier"));
    }
    if !valid_email(&identifier) {
        return Err(OtpServiceError::InvalidIdentifier);
    }
    Ok(identifier)
}

/// Whether `code` has the shape of an issued code (exactly `OTP_CODE_LEN` ASCII digits).
pub fn is_well_formed_code(code: &str) -> bool {
    code.len() == OTP_CODE_LEN && code.bytes().all(|b| b.is_ascii_digit())
}

/// Passwords need at least 6 characters with a letter and a digit.
pub fn check_password_strength(password: &str) -> Result<(), OtpServiceError> {
    let long_enough = password.chars().count() >= 6;
    let has_letter = password.chars().any(|c| c.is_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if long_enough && has_letter && has_digit {
        Ok(())
    } else {
        Err(OtpServiceError::WeakPassword)
    }
}

/// Names need at least two non-blank characters. Returns the trimmed name.
pub fn normalize_name(raw: &str, field: &'static str) -> Result<String, OtpServiceError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(OtpServiceError::MissingField(field));
    }
    if name.chars().count() < 2 {
        return Err(OtpServiceError::InvalidField(field));
    }
    Ok(name.to_owned())
}

//! sea-orm entities owned by the OTP service.

pub mod otp_records;
pub mod users;

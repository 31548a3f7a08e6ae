pub mod issue;
pub mod principal;
pub mod resend;
pub mod verify;

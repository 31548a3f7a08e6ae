use std::time::Duration;

use anyhow::bail;

use resolveit_core::config::{optional, parse_or, required};

use crate::domain::types::{DEFAULT_NOTIFY_TIMEOUT_SECS, DEFAULT_SWEEP_INTERVAL_SECS};

/// How issued codes leave the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierConfig {
    /// Log the code (development).
    Log,
    /// POST the rendered email to a mail relay.
    Http {
        relay_url: String,
        relay_token: Option<String>,
        from: String,
    },
}

/// OTP service configuration loaded from environment variables.
#[derive(Debug)]
pub struct OtpConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// TCP port to listen on (default 3120). Env var: `OTP_PORT`.
    pub otp_port: u16,
    /// Env vars: `NOTIFIER` (`log` | `http`), `MAIL_RELAY_URL`, `MAIL_RELAY_TOKEN`, `MAIL_FROM`.
    pub notifier: NotifierConfig,
    /// Bound on each delivery attempt. Env var: `NOTIFY_TIMEOUT_SECS`.
    pub notify_timeout: Duration,
    /// Period of the expired-record sweep. Env var: `SWEEP_INTERVAL_SECS`.
    pub sweep_interval: Duration,
}

impl OtpConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let notifier = match optional("NOTIFIER").as_deref().unwrap_or("log") {
            "log" => NotifierConfig::Log,
            "http" => NotifierConfig::Http {
                relay_url: required("MAIL_RELAY_URL")?,
                relay_token: optional("MAIL_RELAY_TOKEN"),
                from: optional("MAIL_FROM").unwrap_or_else(|| "no-reply@resolveit.app".to_owned()),
            },
            other => bail!("unknown NOTIFIER {other:?} (expected \"log\" or \"http\")"),
        };

        let notify_timeout_secs = parse_or("NOTIFY_TIMEOUT_SECS", DEFAULT_NOTIFY_TIMEOUT_SECS)?;
        let sweep_interval_secs = parse_or("SWEEP_INTERVAL_SECS", DEFAULT_SWEEP_INTERVAL_SECS)?;
        if notify_timeout_secs == 0 || sweep_interval_secs == 0 {
            bail!("NOTIFY_TIMEOUT_SECS and SWEEP_INTERVAL_SECS must be positive");
        }

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            otp_port: parse_or("OTP_PORT", 3120)?,
            notifier,
            notify_timeout: Duration::from_secs(notify_timeout_secs),
            sweep_interval: Duration::from_secs(sweep_interval_secs),
        })
    }
}

use anyhow::Context as _;
use serde::Serialize;
use tracing::info;

use crate::domain::repository::NotificationSender;
use crate::domain::types::{OTP_TTL_SECS, Purpose};

/// Rendered OTP email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OtpEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

impl OtpEmail {
    pub fn render(from: &str, to: &str, code: &str, purpose: Purpose) -> Self {
        let subject = match purpose {
            Purpose::Login => "Login OTP - ResolveIt",
            Purpose::Signup => "Signup OTP - ResolveIt",
        };
        let text = format!(
            "Your one-time password is {code}.\n\n\
             Use it to complete your {purpose} on ResolveIt. It is valid for {} minutes.\n\n\
             Never share this code with anyone. If you did not request it, ignore this email.",
            OTP_TTL_SECS / 60
        );
        Self {
            from: from.to_owned(),
            to: to.to_owned(),
            subject: subject.to_owned(),
            text,
        }
    }
}

// ── Log sender (development) ─────────────────────────────────────────────────

/// Writes the code to the service log instead of sending it anywhere.
#[derive(Clone, Debug, Default)]
pub struct LogNotificationSender;

impl NotificationSender for LogNotificationSender {
    async fn send(&self, identifier: &str, code: &str, purpose: Purpose) -> anyhow::Result<()> {
        info!(to = %identifier, %purpose, %code, "otp delivery stub");
        Ok(())
    }
}

// ── Mail relay sender ────────────────────────────────────────────────────────

/// POSTs the rendered email as JSON to an HTTP mail relay.
#[derive(Clone, Debug)]
pub struct HttpNotificationSender {
    client: reqwest::Client,
    relay_url: String,
    relay_token: Option<String>,
    from: String,
}

impl HttpNotificationSender {
    pub fn new(relay_url: String, relay_token: Option<String>, from: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            relay_url,
            relay_token,
            from,
        }
    }
}

impl NotificationSender for HttpNotificationSender {
    async fn send(&self, identifier: &str, code: &str, purpose: Purpose) -> anyhow::Result<()> {
        let email = OtpEmail::render(&self.from, identifier, code, purpose);
        let mut request = self.client.post(&self.relay_url).json(&email);
        if let Some(token) = &self.relay_token {
            request = request.bearer_auth(token);
        }
        request
            .send()
            .await
            .context("mail relay request")?
            .error_for_status()
            .context("mail relay rejected message")?;
        Ok(())
    }
}

// ── Runtime selection ────────────────────────────────────────────────────────

/// Sender chosen at startup from configuration.
#[derive(Clone, Debug)]
pub enum Notifier {
    Log(LogNotificationSender),
    Http(HttpNotificationSender),
}

impl NotificationSender for Notifier {
    async fn send(&self, identifier: &str, code: &str, purpose: Purpose) -> anyhow::Result<()> {
        match self {
            Self::Log(sender) => sender.send(identifier, code, purpose).await,
            Self::Http(sender) => sender.send(identifier, code, purpose).await,
        }
    }
}

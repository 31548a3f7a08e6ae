use anyhow::Context as _;
use sea_orm::Database;
use tracing::info;

use resolveit_core::tracing::init_tracing;
use resolveit_otp::config::{NotifierConfig, OtpConfig};
use resolveit_otp::infra::notify::{HttpNotificationSender, LogNotificationSender, Notifier};
use resolveit_otp::router::build_router;
use resolveit_otp::state::AppState;
use resolveit_otp::sweeper::spawn_sweeper;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = OtpConfig::from_env()?;

    let db = Database::connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    let notifier = match config.notifier {
        NotifierConfig::Log => {
            info!("otp codes will be written to the log (NOTIFIER=log)");
            Notifier::Log(LogNotificationSender)
        }
        NotifierConfig::Http {
            relay_url,
            relay_token,
            from,
        } => Notifier::Http(HttpNotificationSender::new(relay_url, relay_token, from)),
    };

    let state = AppState {
        db,
        notifier,
        notify_timeout: config.notify_timeout,
    };

    spawn_sweeper(state.otp_repo(), config.sweep_interval);

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.otp_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("otp service listening on {addr}");
    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}

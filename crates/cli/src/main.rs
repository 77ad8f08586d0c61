//! Portfolio server entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration**: flags and environment variables via
//!    [`config::CliConfig`].
//! 2. **Wire observability**: `tracing-subscriber` with a JSON (or pretty)
//!    layer and an optional OpenTelemetry OTLP exporter.
//! 3. **Construct infrastructure**: the shared rate limiter, the
//!    `WebhookNotifier` (when a webhook URL is configured), and the
//!    `ContactIntake` pipeline they are injected into.
//! 4. **Serve**: bind the HTTP listener, start the rate-limit sweeper, and
//!    run until Ctrl-C or SIGTERM.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use intake::{ContactIntake, FixedWindowLimiter, NotificationSink, SystemClock};
use tracing::{info, warn};
use webhook::WebhookNotifier;

use crate::config::CliConfig;

mod config;
mod observability;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();
    let telemetry = observability::init(config.log_format, config.otlp_endpoint.as_deref())?;

    let result = run(config).await;
    if let Err(e) = &result {
        tracing::error!(error = %format!("{e:#}"), "server exited with error");
    }

    telemetry.shutdown();
    result
}

async fn run(config: CliConfig) -> anyhow::Result<()> {
    let limiter = Arc::new(
        FixedWindowLimiter::new(config.rate_limit_config(), Arc::new(SystemClock::new()))
            .context("invalid rate-limit configuration")?,
    );

    let sink = notification_sink(&config)?;
    let intake = Arc::new(ContactIntake::new(
        limiter.clone(),
        sink,
        config.branding(),
    ));
    if !intake.is_configured() {
        warn!("DISCORD_WEBHOOK_URL is not set; contact submissions will fail with a configuration error");
    }

    let app = listener::router(intake, &config.listener_config());
    let tcp = listener::bind(config.bind).await?;
    let rate_limit = *limiter.config();
    let sweeper = listener::spawn_sweeper(limiter, rate_limit.window);

    info!(
        max_requests = rate_limit.max_requests,
        window_secs = rate_limit.window.as_secs(),
        max_tracked_clients = rate_limit.max_tracked_clients,
        entry_document = %config.entry_document.display(),
        "portfolio server starting"
    );

    let served = listener::serve(tcp, app, shutdown_signal()).await;
    sweeper.abort();
    served?;

    info!("portfolio server stopped");
    Ok(())
}

fn notification_sink(config: &CliConfig) -> anyhow::Result<Option<Arc<dyn NotificationSink>>> {
    let Some(url) = config.webhook_url() else {
        return Ok(None);
    };

    let notifier =
        WebhookNotifier::new(url, config.webhook_timeout()).context("invalid webhook URL")?;
    info!(host = notifier.host(), "webhook delivery configured");
    Ok(Some(Arc::new(notifier)))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received");
}

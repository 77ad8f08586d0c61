//! Command-line and environment configuration.
//!
//! Every flag can also be supplied through the environment variable named in
//! its `env` attribute, so the server can be configured entirely from a
//! container or `.env`-style deployment.

use std::{net::SocketAddr, path::PathBuf, time::Duration};

use clap::{Parser, ValueEnum};
use intake::{
    NotificationBranding, RateLimitConfig, DEFAULT_MAX_REQUESTS, DEFAULT_MAX_TRACKED_CLIENTS,
};
use listener::ListenerConfig;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// One JSON object per event (default; suited to log shippers).
    Json,
    /// Multi-line human-readable output for local development.
    Pretty,
}

/// Portfolio site server.
#[derive(Debug, Clone, Parser)]
#[command(name = "portfolio", version, about)]
pub struct CliConfig {
    /// Address to listen on.
    #[arg(long, env = "PORTFOLIO_BIND", default_value = "0.0.0.0:5000")]
    pub bind: SocketAddr,

    /// Chat webhook that receives contact notifications. Without it every
    /// contact submission fails with a configuration error.
    #[arg(long, env = "DISCORD_WEBHOOK_URL", hide_env_values = true)]
    pub webhook_url: Option<String>,

    /// Upper bound on one webhook delivery attempt, in seconds.
    #[arg(long, env = "PORTFOLIO_WEBHOOK_TIMEOUT_SECS", default_value_t = 10)]
    pub webhook_timeout_secs: u64,

    /// Icon shown in the notification footer.
    #[arg(long, env = "PORTFOLIO_FOOTER_ICON_URL")]
    pub footer_icon_url: Option<String>,

    /// HTML document served on `GET /`.
    #[arg(long, env = "PORTFOLIO_ENTRY_DOCUMENT", default_value = "main.html")]
    pub entry_document: PathBuf,

    /// Accepted contact submissions per client per window.
    #[arg(long, env = "PORTFOLIO_RATE_LIMIT_MAX", default_value_t = DEFAULT_MAX_REQUESTS)]
    pub rate_limit_max: u32,

    /// Rate-limit window length, in seconds.
    #[arg(long, env = "PORTFOLIO_RATE_LIMIT_WINDOW_SECS", default_value_t = 900)]
    pub rate_limit_window_secs: u64,

    /// Maximum number of clients tracked by the rate limiter.
    #[arg(long, env = "PORTFOLIO_MAX_TRACKED_CLIENTS", default_value_t = DEFAULT_MAX_TRACKED_CLIENTS)]
    pub max_tracked_clients: usize,

    /// Identify clients by `X-Forwarded-For` (enable only behind a trusted proxy).
    #[arg(long, env = "PORTFOLIO_TRUST_FORWARDED_FOR")]
    pub trust_forwarded_for: bool,

    /// Log output format.
    #[arg(long, env = "PORTFOLIO_LOG_FORMAT", value_enum, default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,

    /// OTLP collector endpoint; traces are exported only when set.
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

impl CliConfig {
    /// Webhook URL, treating an empty value the same as an absent one.
    pub fn webhook_url(&self) -> Option<&str> {
        self.webhook_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn webhook_timeout(&self) -> Duration {
        Duration::from_secs(self.webhook_timeout_secs)
    }

    pub fn rate_limit_config(&self) -> RateLimitConfig {
        RateLimitConfig {
            max_requests: self.rate_limit_max,
            window: Duration::from_secs(self.rate_limit_window_secs),
            max_tracked_clients: self.max_tracked_clients,
        }
    }

    pub fn listener_config(&self) -> ListenerConfig {
        ListenerConfig {
            entry_document: self.entry_document.clone(),
            trust_forwarded_for: self.trust_forwarded_for,
        }
    }

    pub fn branding(&self) -> NotificationBranding {
        NotificationBranding {
            footer_icon_url: self.footer_icon_url.clone(),
            ..NotificationBranding::default()
        }
    }
}

//! Conversion of a validated submission into a chat-webhook notification.
//!
//! The wire shape follows the common chat-webhook convention: a short
//! `content` line plus one rich `embed` with a title, accent colour, named
//! fields, a footer and an ISO-8601 timestamp.

use serde::{Deserialize, Serialize};

use crate::{ContactSubmission, Timestamp};

/// Maximum message characters carried into the notification.
pub const MAX_NOTIFICATION_MESSAGE_CHARS: usize = 1000;
/// Appended to a message body that was cut at [`MAX_NOTIFICATION_MESSAGE_CHARS`].
pub const TRUNCATION_MARKER: &str = "...";

const EMBED_TITLE: &str = "🔥 New Contact Form Submission";
const EMBED_COLOR: u32 = 0x3b_82_f6;
const DEFAULT_FOOTER_TEXT: &str = "Portfolio Contact Form";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Body POSTed to the webhook target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationMessage {
    /// Plain-text line shown above the embed.
    pub content: String,
    /// Rich attachments; always exactly one for contact submissions.
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    /// 24-bit RGB accent colour.
    pub color: u32,
    pub fields: Vec<EmbedField>,
    pub footer: EmbedFooter,
    /// ISO-8601 time the notification was built.
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedFooter {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub icon_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Site-specific decoration applied to every notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationBranding {
    pub footer_text: String,
    pub footer_icon_url: Option<String>,
}

impl Default for NotificationBranding {
    fn default() -> Self {
        Self {
            footer_text: DEFAULT_FOOTER_TEXT.to_owned(),
            footer_icon_url: None,
        }
    }
}

/// Cuts `message` to [`MAX_NOTIFICATION_MESSAGE_CHARS`] characters, appending
/// [`TRUNCATION_MARKER`] when anything was removed.
///
/// Applied even though validation already caps the message at the same
/// length, so the notification stays bounded if the validation rules change.
pub fn truncate_message(message: &str) -> String {
    match message.char_indices().nth(MAX_NOTIFICATION_MESSAGE_CHARS) {
        Some((cut, _)) => format!("{}{TRUNCATION_MARKER}", &message[..cut]),
        None => message.to_owned(),
    }
}

/// Builds the notification for `submission`, stamped with `at`.
pub fn format_notification(
    submission: &ContactSubmission,
    branding: &NotificationBranding,
    at: Timestamp,
) -> NotificationMessage {
    let embed = Embed {
        title: EMBED_TITLE.to_owned(),
        color: EMBED_COLOR,
        fields: vec![
            EmbedField {
                name: "👤 Name".to_owned(),
                value: submission.name().to_owned(),
                inline: true,
            },
            EmbedField {
                name: "📧 Email".to_owned(),
                value: submission.email().to_owned(),
                inline: true,
            },
            EmbedField {
                name: "💬 Message".to_owned(),
                value: truncate_message(submission.message()),
                inline: false,
            },
        ],
        footer: EmbedFooter {
            text: branding.footer_text.clone(),
            icon_url: branding.footer_icon_url.clone(),
        },
        timestamp: at.to_iso8601(),
    };

    NotificationMessage {
        content: format!("📬 **New message from {}!**", submission.name()),
        embeds: vec![embed],
    }
}

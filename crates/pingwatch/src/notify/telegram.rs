//! Telegram Bot API notifier.
//!
//! Messages go out as `POST <api>/bot<TOKEN>/sendMessage` with a
//! form-encoded body (`chat_id`, `text`, `parse_mode=HTML`). The API answers
//! with `{"ok": bool, "description": "..."}`.

use std::fmt;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use tracing::debug;
use url::form_urlencoded;

use super::{Notifier, NotifyError};

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

const DEFAULT_HEADER: &str = "pingwatch";

#[derive(Clone)]
struct Credentials {
    token: String,
    chat_id: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    client: reqwest::Client,
    api_base: String,
    header: String,
    credentials: Option<Credentials>,
}

impl TelegramNotifier {
    /// Build a notifier. If either credential is missing the notifier is
    /// created anyway and every `send` reports `Unconfigured`.
    pub fn new(
        token: Option<String>,
        chat_id: Option<String>,
        request_timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .user_agent(concat!("pingwatch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let credentials = match (token, chat_id) {
            (Some(token), Some(chat_id)) => Some(Credentials { token, chat_id }),
            _ => None,
        };

        Ok(Self {
            client,
            api_base: DEFAULT_API_BASE.to_string(),
            header: DEFAULT_HEADER.to_string(),
            credentials,
        })
    }

    /// Replace the HTTP client, e.g. to change proxy or TLS settings
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Bold first line prepended to every message
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    fn endpoint(&self, token: &str) -> String {
        format!("{}/bot{}/sendMessage", self.api_base.trim_end_matches('/'), token)
    }

    /// HTML text as Telegram will render it
    pub fn format(&self, message: &str) -> String {
        format!("<b>{}</b>\n{}", escape_html(&self.header), escape_html(message))
    }
}

#[async_trait::async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        let Some(credentials) = &self.credentials else {
            return Err(NotifyError::Unconfigured);
        };

        let body = encode_form(&credentials.chat_id, &self.format(message));

        let response = self
            .client
            .post(self.endpoint(&credentials.token))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let reply: ApiResponse = response.json().await.map_err(transport_error)?;
        debug!("Telegram answered {} (ok={})", status, reply.ok);

        if reply.ok {
            Ok(())
        } else {
            Err(NotifyError::RemoteRejected(
                reply.description.unwrap_or_else(|| format!("HTTP {status}")),
            ))
        }
    }
}

/// The request URL embeds the bot token, keep it out of error messages
fn transport_error(error: reqwest::Error) -> NotifyError {
    NotifyError::Transport(error.without_url())
}

/// Escape the three characters Telegram's HTML parse mode reserves
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// `application/x-www-form-urlencoded` body for `sendMessage`
pub fn encode_form(chat_id: &str, text: &str) -> String {
    form_urlencoded::Serializer::new(String::new())
        .append_pair("chat_id", chat_id)
        .append_pair("text", text)
        .append_pair("parse_mode", "HTML")
        .finish()
}

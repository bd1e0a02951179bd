//! Outbound lead notifications to site staff.

use std::fmt;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use super::domain::Inquiry;
use crate::config::NotifierConfig;

/// Delivers a lead alert. Callers treat every error as non-fatal.
#[async_trait]
pub trait LeadNotifier: Send + Sync {
    async fn send_lead_notification(
        &self,
        inquiry: &Inquiry,
        subject_title: &str,
    ) -> Result<(), NotificationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
    #[error("notification relay answered with status {0}")]
    Rejected(u16),
}

/// Rendered alert message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadEmail {
    pub subject: String,
    pub html: String,
}

impl LeadEmail {
    pub fn render(inquiry: &Inquiry, subject_title: &str) -> Self {
        let title = escape_html(subject_title);
        let html = format!(
            concat!(
                "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">",
                "<h2>New Customer Inquiry</h2>",
                "<p><strong>Property/Type:</strong> {title}</p>",
                "<p><strong>Customer Name:</strong> {name}</p>",
                "<p><strong>Email:</strong> {email}</p>",
                "<p><strong>Phone:</strong> {phone}</p>",
                "<div><p><strong>Message:</strong></p><p>{message}</p></div>",
                "<p style=\"font-size: 12px; color: #666;\">",
                "This inquiry was submitted via the website contact form.</p>",
                "</div>"
            ),
            title = title,
            name = escape_html(&inquiry.name),
            email = escape_html(&inquiry.email),
            phone = escape_html(&inquiry.phone),
            message = escape_html(&inquiry.message),
        );

        Self {
            subject: format!("New Inquiry: {subject_title}"),
            html,
        }
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Logs the alert instead of sending it. Used when no relay is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

#[async_trait]
impl LeadNotifier for TracingNotifier {
    async fn send_lead_notification(
        &self,
        inquiry: &Inquiry,
        subject_title: &str,
    ) -> Result<(), NotificationError> {
        let email = LeadEmail::render(inquiry, subject_title);
        info!(inquiry_id = %inquiry.id, subject = %email.subject, "lead notification (no relay configured)");
        Ok(())
    }
}

/// Posts the rendered alert as JSON to a mail relay or transactional e-mail API.
pub struct WebhookNotifier {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    recipient: Option<String>,
    sender: String,
}

impl WebhookNotifier {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        recipient: Option<String>,
        sender: impl Into<String>,
    ) -> Result<Self, NotificationError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|err| NotificationError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
            recipient,
            sender: sender.into(),
        })
    }

    /// `None` when no relay endpoint is configured.
    pub fn from_config(config: &NotifierConfig) -> Result<Option<Self>, NotificationError> {
        config
            .webhook_url
            .as_ref()
            .map(|endpoint| {
                Self::new(
                    endpoint.clone(),
                    config.api_key.clone(),
                    config.admin_email.clone(),
                    config.sender_name.clone(),
                )
            })
            .transpose()
    }
}

impl fmt::Debug for WebhookNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookNotifier")
            .field("endpoint", &self.endpoint)
            .field("recipient", &self.recipient)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl LeadNotifier for WebhookNotifier {
    async fn send_lead_notification(
        &self,
        inquiry: &Inquiry,
        subject_title: &str,
    ) -> Result<(), NotificationError> {
        let email = LeadEmail::render(inquiry, subject_title);
        let payload = json!({
            "from": self.sender,
            "to": self.recipient,
            "replyTo": inquiry.email,
            "subject": email.subject,
            "html": email.html,
            "inquiryId": inquiry.id,
        });

        let mut request = self.client.post(&self.endpoint).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|err| NotificationError::Transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            info!(inquiry_id = %inquiry.id, "lead notification delivered");
            Ok(())
        } else {
            Err(NotificationError::Rejected(status.as_u16()))
        }
    }
}

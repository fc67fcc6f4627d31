use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde_json::{json, Value};
use tracing::debug;

use super::repository::{ConfirmationNotice, ConfirmationSender, NotificationError};
use crate::config::MailConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Sends the intake confirmation through the ZeptoMail transactional API.
#[derive(Clone)]
pub struct ZeptoMailSender {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    from_address: String,
    from_name: String,
}

impl ZeptoMailSender {
    pub fn from_config(config: &MailConfig) -> Result<Self, NotificationError> {
        let (api_key, from_address) = match (&config.api_key, &config.from_address) {
            (Some(key), Some(from)) => (key.clone(), from.clone()),
            _ => return Err(NotificationError::NotConfigured),
        };

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| NotificationError::Transport(err.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key,
            from_address,
            from_name: config.from_name.clone(),
        })
    }

    fn payload(&self, notice: &ConfirmationNotice) -> Value {
        json!({
            "bounce_address": self.from_address,
            "from": {
                "address": self.from_address,
                "name": self.from_name,
            },
            "to": [{
                "email_address": {
                    "address": notice.to,
                    "name": notice.display_name,
                }
            }],
            "subject": confirmation_subject(&self.from_name),
            "htmlbody": render_confirmation_html(notice, &self.from_name),
        })
    }
}

impl fmt::Debug for ZeptoMailSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZeptoMailSender")
            .field("endpoint", &self.endpoint)
            .field("from_address", &self.from_address)
            .field("from_name", &self.from_name)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ConfirmationSender for ZeptoMailSender {
    async fn send(&self, notice: &ConfirmationNotice) -> Result<(), NotificationError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, &self.api_key)
            .json(&self.payload(notice))
            .send()
            .await
            .map_err(|err| NotificationError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(submission_id = %notice.submission_id, "confirmation email accepted by provider");
        Ok(())
    }
}

/// Stand-in used when no mail credentials are configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledSender;

#[async_trait]
impl ConfirmationSender for DisabledSender {
    async fn send(&self, _notice: &ConfirmationNotice) -> Result<(), NotificationError> {
        Err(NotificationError::NotConfigured)
    }
}

pub fn confirmation_subject(competition: &str) -> String {
    format!("Audition Submission Confirmation - {competition}")
}

pub fn render_confirmation_html(notice: &ConfirmationNotice, competition: &str) -> String {
    let name = escape_html(&notice.display_name);
    let id = escape_html(notice.submission_id.as_str());
    let competition = escape_html(competition);

    format!(
        r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
  <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
    <h1 style="margin: 0;">Audition Submission Received</h1>
    <p>{competition}</p>
    <p>Dear {name},</p>
    <p><strong>Thank you for submitting your audition.</strong> We have received your application.</p>
    <p><strong>Your Submission ID:</strong><br><code>{id}</code></p>
    <p>Please keep this ID for your records.</p>
    <h3>What happens next?</h3>
    <ul>
      <li>Our panel will review every audition submission.</li>
      <li>Selected participants will be notified by email.</li>
      <li>You will receive updates on your submission status.</li>
    </ul>
    <p><strong>Important:</strong> submissions cannot be edited once sent. Contact us immediately if critical information needs to change.</p>
    <p>Best regards,<br><strong>The {competition} Team</strong></p>
    <p style="font-size: 14px; color: #6b7280;">This is an automated message. Please do not reply to this email.</p>
  </div>
</body>
</html>
"#
    )
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

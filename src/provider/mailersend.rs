//! # MailerSend Sender
//!
//! See: <https://www.mailersend.com>.

use async_trait::async_trait;
use serde::Serialize;
use zeroize::Zeroizing;

use super::{ProviderSender, SenderConfig};
use crate::error::Error;

const MAILERSEND_API_URL: &str = "https://api.mailersend.com/v1/email";

pub struct MailerSendSender {
    http: reqwest::Client,
    url: String,
    api_token: Zeroizing<String>,
    sender_email: String,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    from: Recipient<'a>,
    to: Vec<Recipient<'a>>,
    subject: &'a str,
    text: &'a str,
}

#[derive(Serialize)]
struct Recipient<'a> {
    email: &'a str,
}

impl MailerSendSender {
    pub fn new(config: SenderConfig) -> Self {
        Self::with_url(config, MAILERSEND_API_URL)
    }

    /// Sender pointed at an alternate endpoint, for exercising against a
    /// stand-in.
    pub fn with_url(config: SenderConfig, url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
            api_token: config.api_token,
            sender_email: config.sender_email,
        }
    }

    /// The provider answers a successful send with a bare numeric status;
    /// error responses carry a body that does not parse as one.
    fn send_succeeded(result: &str) -> bool {
        result.trim().parse::<i64>().is_ok()
    }

    /// Raw provider result in the shape the provider reports it: the numeric
    /// response status followed by the response body.
    async fn request(&self, payload: &SendRequest<'_>) -> Result<String, reqwest::Error> {
        let response = self
            .http
            .post(&self.url)
            .bearer_auth(self.api_token.as_str())
            .json(payload)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        Ok(format!("{}\n{}", status.as_u16(), body))
    }
}

#[async_trait]
impl ProviderSender for MailerSendSender {
    fn provider_name(&self) -> &'static str {
        "MailerSend"
    }

    /// Transport-level exceptions and non-numeric results both surface as
    /// terminal sending failures for this provider.
    async fn send(
        &self,
        body: &str,
        recipient: &str,
        subject: &str,
        correlation_id: &str,
    ) -> Result<(), Error> {
        let payload = SendRequest {
            from: Recipient {
                email: &self.sender_email,
            },
            to: vec![Recipient { email: recipient }],
            subject,
            text: body,
        };
        let result = match self.request(&payload).await {
            Ok(result) => result,
            Err(err) => {
                return Err(Error::MailSendingFailure {
                    uid: correlation_id.to_string(),
                    reason: err.to_string(),
                });
            }
        };
        if !Self::send_succeeded(&result) {
            return Err(Error::MailSendingFailure {
                uid: correlation_id.to_string(),
                reason: format!("unexpected provider result: {}", result.trim()),
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for MailerSendSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailerSendSender")
            .field("url", &self.url)
            .field("sender_email", &self.sender_email)
            .finish_non_exhaustive()
    }
}

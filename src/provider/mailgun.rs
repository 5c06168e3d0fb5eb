//! # MailGun Sender
//!
//! See: <https://www.mailgun.com>.

use async_trait::async_trait;
use zeroize::Zeroizing;

use super::{ProviderSender, SenderConfig};
use crate::error::Error;

const MAILGUN_API_BASE: &str = "https://api.mailgun.net/v3";

pub struct MailGunSender {
    http: reqwest::Client,
    base_url: String,
    api_token: Zeroizing<String>,
    sender_email: String,
}

impl MailGunSender {
    pub fn new(config: SenderConfig) -> Self {
        Self::with_base_url(config, MAILGUN_API_BASE)
    }

    /// Sender pointed at an alternate API base, for exercising against a
    /// stand-in endpoint.
    pub fn with_base_url(config: SenderConfig, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_token: config.api_token,
            sender_email: config.sender_email,
        }
    }

    /// Messages endpoint for the sending domain, taken from the sender address
    /// after the first `@`.
    fn message_url(&self) -> Option<String> {
        let (_, domain) = self.sender_email.split_once('@')?;
        Some(format!("{}/{}/messages", self.base_url, domain))
    }
}

#[async_trait]
impl ProviderSender for MailGunSender {
    fn provider_name(&self) -> &'static str {
        "MailGun"
    }

    /// Non-2xx responses are client-attributed and terminal; connection-level
    /// failures escalate as transport errors eligible for the dispatcher's
    /// retry.
    async fn send(
        &self,
        body: &str,
        recipient: &str,
        subject: &str,
        correlation_id: &str,
    ) -> Result<(), Error> {
        let Some(url) = self.message_url() else {
            return Err(Error::MailSendingFailure {
                uid: correlation_id.to_string(),
                reason: format!("sender address {:?} has no domain", self.sender_email),
            });
        };
        let response = self
            .http
            .post(&url)
            .basic_auth("api", Some(self.api_token.as_str()))
            .form(&[
                ("from", self.sender_email.as_str()),
                ("to", recipient),
                ("subject", subject),
                ("text", body),
            ])
            .send()
            .await
            .map_err(|err| Error::transport("MailGun API", err))?;

        if let Err(err) = response.error_for_status_ref() {
            return Err(Error::MailSendingFailure {
                uid: correlation_id.to_string(),
                reason: err.to_string(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for MailGunSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailGunSender")
            .field("base_url", &self.base_url)
            .field("sender_email", &self.sender_email)
            .finish_non_exhaustive()
    }
}

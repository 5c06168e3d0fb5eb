//! # Shared Sender Construction
//!
//! Credentials and sender identity resolved from the cluster, common to every
//! provider variant.

use std::fmt;

use base64::{engine::general_purpose, Engine as _};
use serde_json::Value;
use zeroize::Zeroizing;

use crate::cluster::ClusterApi;
use crate::crd::EMAIL_SENDER_CONFIGS;
use crate::error::Error;
use crate::resource::{ResourceHandle, ResourceKind};

const SECRETS: ResourceKind = ResourceKind {
    group: "",
    version: "v1",
    plural: "secrets",
};

/// Credentials and sender identity for one provider config.
///
/// Resolved once per reconciliation and owned exclusively by it; never cached
/// or reused across invocations.
pub struct SenderConfig {
    pub namespace: String,
    pub name: String,
    pub api_token: Zeroizing<String>,
    pub sender_email: String,
}

impl SenderConfig {
    /// Load from the provider-config resource and its companion secret.
    ///
    /// The secret shares the config resource's namespace and name; its
    /// `apiToken` field holds the base64-encoded provider token. No other
    /// secret addressing is supported.
    pub async fn load(
        cluster: &dyn ClusterApi,
        namespace: &str,
        name: &str,
    ) -> Result<Self, Error> {
        let config = ResourceHandle::new(cluster, EMAIL_SENDER_CONFIGS, namespace, name);
        let resource = config.fetch().await?;
        let sender_email = resource
            .pointer("/spec/senderEmail")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Malformed {
                context: format!("emailsenderconfigs {namespace}/{name} has no spec.senderEmail"),
            })?
            .to_string();

        let secret = ResourceHandle::new(cluster, SECRETS, namespace, name)
            .fetch()
            .await?;
        let encoded = secret
            .pointer("/data/apiToken")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Malformed {
                context: format!("secret {namespace}/{name} has no apiToken field"),
            })?;
        let decoded = general_purpose::STANDARD
            .decode(encoded)
            .map_err(|err| Error::Malformed {
                context: format!("secret {namespace}/{name} apiToken is not valid base64: {err}"),
            })?;
        let api_token = String::from_utf8(decoded).map_err(|err| Error::Malformed {
            context: format!("secret {namespace}/{name} apiToken is not valid UTF-8: {err}"),
        })?;

        Ok(Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            api_token: Zeroizing::new(api_token),
            sender_email,
        })
    }
}

impl fmt::Debug for SenderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SenderConfig")
            .field("namespace", &self.namespace)
            .field("name", &self.name)
            .field("api_token", &"<redacted>")
            .field("sender_email", &self.sender_email)
            .finish()
    }
}

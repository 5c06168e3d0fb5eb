//! # EmailSenderConfig
//!
//! Provider configuration resource. The resource name selects the concrete
//! provider implementation; the companion secret of the same name and
//! namespace carries the API token.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{API_GROUP, API_VERSION};
use crate::resource::ResourceKind;

pub const EMAIL_SENDER_CONFIGS: ResourceKind = ResourceKind {
    group: API_GROUP,
    version: API_VERSION,
    plural: "emailsenderconfigs",
};

/// Configuration for one mail-delivery provider.
///
/// # Example
///
/// ```yaml
/// apiVersion: stable.email-sender-operator.dev/v1
/// kind: EmailSenderConfig
/// metadata:
///   name: mail-gun
///   namespace: default
/// spec:
///   senderEmail: ops@example.com
/// ```
///
/// The name `mail-gun` resolves to the MailGun sender; `mailer-send` to
/// MailerSend. Other names are ignored by this controller.
#[derive(CustomResource, Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[kube(
    kind = "EmailSenderConfig",
    group = "stable.email-sender-operator.dev",
    version = "v1",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct EmailSenderConfigSpec {
    /// Address the provider sends from.
    pub sender_email: String,
}

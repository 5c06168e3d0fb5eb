//! # Email
//!
//! Send-request resource and its delivery status.

use std::fmt;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{API_GROUP, API_VERSION};
use crate::resource::{ResourceKind, StatusPayload};

pub const EMAILS: ResourceKind = ResourceKind {
    group: API_GROUP,
    version: API_VERSION,
    plural: "emails",
};

/// A single outbound email send request.
///
/// # Example
///
/// ```yaml
/// apiVersion: stable.email-sender-operator.dev/v1
/// kind: Email
/// metadata:
///   name: welcome-mail
///   namespace: default
/// spec:
///   senderConfigRef: mail-gun
///   recipientEmail: someone@example.com
///   subject: Welcome
///   body: Hello there.
/// ```
#[derive(CustomResource, Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[kube(
    kind = "Email",
    group = "stable.email-sender-operator.dev",
    version = "v1",
    namespaced,
    status = "EmailStatus",
    printcolumn = r#"{"name":"Delivery", "type":"string", "jsonPath":".status.deliveryStatus"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct EmailSpec {
    /// Name of the EmailSenderConfig that should deliver this email.
    pub sender_config_ref: String,
    pub body: String,
    pub recipient_email: String,
    pub subject: String,
}

/// Observed delivery state, written to the status subresource.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmailStatus {
    pub delivery_status: DeliveryStatus,
    /// Cluster uid of the owning resource. Providers' own message identifiers
    /// are not persisted.
    pub message_id: String,
}

impl StatusPayload for EmailStatus {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeliveryStatus {
    Unsent,
    Failed,
    Sent,
}

impl DeliveryStatus {
    /// SENT and FAILED are final; nothing transitions out of them.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Sent | Self::Failed)
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unsent => "UNSENT",
            Self::Failed => "FAILED",
            Self::Sent => "SENT",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_to_wire_fields() {
        let status = EmailStatus {
            delivery_status: DeliveryStatus::Unsent,
            message_id: "uid-1".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&status).unwrap(),
            serde_json::json!({ "deliveryStatus": "UNSENT", "messageId": "uid-1" })
        );
    }

    #[test]
    fn terminal_states() {
        assert!(!DeliveryStatus::Unsent.is_terminal());
        assert!(DeliveryStatus::Failed.is_terminal());
        assert!(DeliveryStatus::Sent.is_terminal());
    }
}

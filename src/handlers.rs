//! # Reconciliation Handlers
//!
//! The two event-triggered procedures composing the resource handle, the
//! provider factory, and the email entity into the observable behavior of the
//! controller.
//!
//! Terminal conditions (unknown provider, provider-rejected send) are absorbed
//! here; anything returned as `Err` is eligible for the dispatcher's bounded
//! retry.

use std::fmt;

use tracing::{error, info, warn};

use crate::cluster::ClusterApi;
use crate::crd::{DeliveryStatus, EmailSpec};
use crate::email::EmailDelivery;
use crate::error::Error;
use crate::provider::SenderRegistry;

/// Why the dispatcher invoked a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventReason {
    Create,
    Update,
}

impl EventReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
        }
    }
}

impl fmt::Display for EventReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle a create or update event for an EmailSenderConfig resource.
///
/// An unknown sender name is not an error state: the resource simply is not
/// one this controller manages, and it is left alone. No status is ever
/// written for config resources.
pub async fn email_sender_config_handler(
    cluster: &dyn ClusterApi,
    registry: &SenderRegistry,
    namespace: &str,
    name: &str,
    reason: EventReason,
) -> Result<(), Error> {
    match registry.create(cluster, namespace, name).await {
        Ok(sender) => {
            info!(
                resource.namespace = namespace,
                resource.name = name,
                provider = sender.provider_name(),
                reason = %reason,
                "known sender acknowledged"
            );
            Ok(())
        }
        Err(err @ Error::UnknownProvider { .. }) => {
            error!(
                resource.namespace = namespace,
                resource.name = name,
                error = %err,
                "ignoring sender config"
            );
            Ok(())
        }
        Err(err) => Err(err),
    }
}

/// Handle a create event for an Email resource.
///
/// Resolves the referenced sender, constructs the delivery entity (which
/// idempotently initializes UNSENT), performs the send, and persists the
/// terminal transition. A delivery that is already settled is not re-sent.
pub async fn email_handler(
    cluster: &dyn ClusterApi,
    registry: &SenderRegistry,
    namespace: &str,
    name: &str,
    reason: EventReason,
    spec: &EmailSpec,
    uid: &str,
) -> Result<(), Error> {
    info!(
        resource.namespace = namespace,
        resource.name = name,
        correlation.id = uid,
        reason = %reason,
        "handling email event"
    );

    let sender = match registry
        .create(cluster, namespace, &spec.sender_config_ref)
        .await
    {
        Ok(sender) => sender,
        Err(err @ Error::UnknownProvider { .. }) => {
            error!(
                resource.namespace = namespace,
                resource.name = name,
                correlation.id = uid,
                error = %err,
                "will not manage email with unknown sender config"
            );
            return Ok(());
        }
        Err(err) => return Err(err),
    };
    info!(
        resource.namespace = namespace,
        resource.name = name,
        correlation.id = uid,
        provider = sender.provider_name(),
        "sender config acquired"
    );

    let mut mail = EmailDelivery::new(cluster, sender.as_ref(), namespace, name, spec).await?;
    info!(
        resource.namespace = namespace,
        resource.name = name,
        correlation.id = uid,
        delivery.status = %mail.delivery_status(),
        "email status loaded"
    );

    if mail.delivery_status().is_terminal() {
        info!(
            resource.namespace = namespace,
            resource.name = name,
            correlation.id = uid,
            delivery.status = %mail.delivery_status(),
            "delivery already settled, skipping send"
        );
        return Ok(());
    }

    match mail.send().await {
        Ok(()) => {
            mail.set_delivery_status(DeliveryStatus::Sent).await?;
            info!(
                resource.namespace = namespace,
                resource.name = name,
                correlation.id = uid,
                delivery.status = %DeliveryStatus::Sent,
                "sent successfully"
            );
            Ok(())
        }
        Err(err @ Error::MailSendingFailure { .. }) => {
            error!(
                resource.namespace = namespace,
                resource.name = name,
                correlation.id = uid,
                error = %err,
                "send rejected by provider"
            );
            mail.set_delivery_status(DeliveryStatus::Failed).await?;
            warn!(
                resource.namespace = namespace,
                resource.name = name,
                correlation.id = uid,
                delivery.status = %DeliveryStatus::Failed,
                "delivery marked failed"
            );
            Ok(())
        }
        Err(err) => Err(err),
    }
}

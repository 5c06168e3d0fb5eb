//! # Email Delivery
//!
//! The delivery lifecycle of one Email resource: UNSENT on first observation,
//! then exactly one of SENT or FAILED, never back.
//!
//! An [`EmailDelivery`] is constructed fresh for every handled event and
//! dropped when the event is done; all durable state lives in the resource's
//! status subresource.

use crate::cluster::ClusterApi;
use crate::crd::{DeliveryStatus, EmailSpec, EmailStatus, EMAILS};
use crate::error::Error;
use crate::provider::ProviderSender;
use crate::resource::ResourceHandle;

pub struct EmailDelivery<'a> {
    resource: ResourceHandle<'a>,
    sender: &'a dyn ProviderSender,
    body: String,
    recipient_email: String,
    subject: String,
    uid: String,
    status: EmailStatus,
}

impl<'a> EmailDelivery<'a> {
    /// Construct against the remote resource.
    ///
    /// A resource without a status is initialized to UNSENT with
    /// `message_id = uid` and the initial status persisted immediately. An
    /// existing status is adopted untouched, so reconstruction never resets an
    /// already-settled delivery.
    pub async fn new(
        cluster: &'a dyn ClusterApi,
        sender: &'a dyn ProviderSender,
        namespace: &str,
        name: &str,
        spec: &EmailSpec,
    ) -> Result<EmailDelivery<'a>, Error> {
        let mut resource = ResourceHandle::new(cluster, EMAILS, namespace, name);
        let uid = resource.resolve_uid().await?;
        let status = match resource.read_status().await? {
            Some(value) => serde_json::from_value(value)?,
            None => {
                let initial = EmailStatus {
                    delivery_status: DeliveryStatus::Unsent,
                    message_id: uid.clone(),
                };
                resource.set_status(&initial).await?;
                initial
            }
        };
        Ok(Self {
            resource,
            sender,
            body: spec.body.clone(),
            recipient_email: spec.recipient_email.clone(),
            subject: spec.subject.clone(),
            uid,
            status,
        })
    }

    pub fn namespace(&self) -> &str {
        self.resource.namespace()
    }

    pub fn name(&self) -> &str {
        self.resource.name()
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn delivery_status(&self) -> DeliveryStatus {
        self.status.delivery_status
    }

    /// Deliver through the resolved sender, with the resource uid as the
    /// correlation id. Status is untouched here; the caller classifies the
    /// outcome and persists the transition.
    pub async fn send(&self) -> Result<(), Error> {
        self.sender
            .send(&self.body, &self.recipient_email, &self.subject, &self.uid)
            .await
    }

    /// Persist a delivery-status transition on the status subresource.
    pub async fn set_delivery_status(
        &mut self,
        delivery_status: DeliveryStatus,
    ) -> Result<(), Error> {
        let status = EmailStatus {
            delivery_status,
            message_id: self.uid.clone(),
        };
        self.resource.set_status(&status).await?;
        self.status = status;
        Ok(())
    }
}

impl std::fmt::Debug for EmailDelivery<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailDelivery")
            .field("resource", &self.resource)
            .field("provider", &self.sender.provider_name())
            .field("recipient_email", &self.recipient_email)
            .field("subject", &self.subject)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

//! Shared test fixtures: an in-memory cluster and a scriptable sender.

#![allow(dead_code, reason = "not every test binary uses every fixture")]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use serde_json::{json, Value};

use email_sender_controller::cluster::ClusterApi;
use email_sender_controller::error::Error;
use email_sender_controller::provider::{ProviderSender, SenderRegistry};
use email_sender_controller::resource::ResourceKind;

/// In-memory stand-in for the cluster API.
///
/// Objects are keyed by `(plural, namespace, name)`; status patches merge into
/// the stored object and are counted.
#[derive(Default)]
pub struct FakeCluster {
    objects: Mutex<HashMap<(String, String, String), Value>>,
    status_patches: Mutex<Vec<(String, Value)>>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, plural: &str, namespace: &str, name: &str, object: Value) {
        self.objects
            .lock()
            .unwrap()
            .insert(key(plural, namespace, name), object);
    }

    /// Seed an EmailSenderConfig resource together with its companion secret.
    pub fn insert_sender_config(
        &self,
        namespace: &str,
        name: &str,
        sender_email: &str,
        api_token: &str,
    ) {
        self.insert(
            "emailsenderconfigs",
            namespace,
            name,
            json!({
                "apiVersion": "stable.email-sender-operator.dev/v1",
                "kind": "EmailSenderConfig",
                "metadata": { "namespace": namespace, "name": name, "uid": format!("uid-{name}") },
                "spec": { "senderEmail": sender_email },
            }),
        );
        self.insert(
            "secrets",
            namespace,
            name,
            json!({
                "apiVersion": "v1",
                "kind": "Secret",
                "metadata": { "namespace": namespace, "name": name },
                "data": { "apiToken": general_purpose::STANDARD.encode(api_token) },
            }),
        );
    }

    /// Seed an Email resource; `status` of `None` models a freshly created one.
    pub fn insert_email(
        &self,
        namespace: &str,
        name: &str,
        uid: &str,
        sender_config_ref: &str,
        status: Option<Value>,
    ) {
        let mut object = json!({
            "apiVersion": "stable.email-sender-operator.dev/v1",
            "kind": "Email",
            "metadata": { "namespace": namespace, "name": name, "uid": uid },
            "spec": {
                "senderConfigRef": sender_config_ref,
                "body": "hi",
                "recipientEmail": "a@b.com",
                "subject": "s",
            },
        });
        if let Some(status) = status {
            object["status"] = status;
        }
        self.insert("emails", namespace, name, object);
    }

    pub fn status_of(&self, plural: &str, namespace: &str, name: &str) -> Option<Value> {
        self.objects
            .lock()
            .unwrap()
            .get(&key(plural, namespace, name))
            .and_then(|object| object.get("status").cloned())
    }

    pub fn status_patch_count(&self) -> usize {
        self.status_patches.lock().unwrap().len()
    }
}

fn key(plural: &str, namespace: &str, name: &str) -> (String, String, String) {
    (
        plural.to_string(),
        namespace.to_string(),
        name.to_string(),
    )
}

#[async_trait]
impl ClusterApi for FakeCluster {
    async fn get_resource(
        &self,
        kind: &ResourceKind,
        namespace: &str,
        name: &str,
    ) -> Result<Value, Error> {
        self.objects
            .lock()
            .unwrap()
            .get(&key(kind.plural, namespace, name))
            .cloned()
            .ok_or_else(|| Error::NotFound {
                plural: kind.plural.to_string(),
                namespace: namespace.to_string(),
                name: name.to_string(),
            })
    }

    async fn patch_status(
        &self,
        kind: &ResourceKind,
        namespace: &str,
        name: &str,
        status: Value,
    ) -> Result<(), Error> {
        {
            let mut objects = self.objects.lock().unwrap();
            let object = objects
                .get_mut(&key(kind.plural, namespace, name))
                .ok_or_else(|| Error::NotFound {
                    plural: kind.plural.to_string(),
                    namespace: namespace.to_string(),
                    name: name.to_string(),
                })?;
            object["status"] = status.clone();
        }
        self.status_patches
            .lock()
            .unwrap()
            .push((name.to_string(), status));
        Ok(())
    }
}

/// Scriptable sender: records calls and returns a configured outcome.
#[derive(Clone, Debug)]
pub struct FakeSender {
    calls: Arc<AtomicUsize>,
    fail_with: Option<String>,
}

impl FakeSender {
    pub fn succeeding() -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            fail_with: None,
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            fail_with: Some(reason.to_string()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderSender for FakeSender {
    fn provider_name(&self) -> &'static str {
        "Fake"
    }

    async fn send(
        &self,
        _body: &str,
        _recipient: &str,
        _subject: &str,
        correlation_id: &str,
    ) -> Result<(), Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(reason) => Err(Error::MailSendingFailure {
                uid: correlation_id.to_string(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Registry that constructs clones of `sender` under the given key.
pub fn registry_with(key: &str, sender: FakeSender) -> SenderRegistry {
    let mut registry = SenderRegistry::new();
    registry.register(key, move |_config| Box::new(sender.clone()));
    registry
}

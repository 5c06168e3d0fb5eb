//! # Watch Loops
//!
//! Watch streams over both custom resource kinds, feeding observed events into
//! the reconciliation handlers.
//!
//! For a single resource the API server delivers events in observation order;
//! the handlers rely on that and do no sequencing of their own.

use std::collections::HashSet;

use anyhow::Result;
use futures::StreamExt;
use kube::api::Api;
use kube::{Client, ResourceExt};
use kube_runtime::{watcher, WatchStreamExt};
use tracing::{error, info, warn};

use crate::cluster::KubeCluster;
use crate::config::ControllerConfig;
use crate::crd::{Email, EmailSenderConfig};
use crate::handlers::{email_handler, email_sender_config_handler, EventReason};
use crate::provider::SenderRegistry;
use crate::runtime::dispatch::{dispatch, RetryPolicy};

/// Run both watch loops until their streams end.
pub async fn run(client: Client, config: ControllerConfig) -> Result<()> {
    let cluster = KubeCluster::new(client.clone());
    let registry = SenderRegistry::builtin();
    let policy = config.retry_policy();

    let (configs, emails) = match config.watch_namespace.as_deref() {
        Some(namespace) => {
            info!(namespace, "watching a single namespace");
            (
                Api::namespaced(client.clone(), namespace),
                Api::namespaced(client, namespace),
            )
        }
        None => (Api::all(client.clone()), Api::all(client)),
    };

    tokio::try_join!(
        watch_sender_configs(configs, &cluster, &registry, &policy),
        watch_emails(emails, &cluster, &registry, &policy),
    )?;
    Ok(())
}

async fn watch_sender_configs(
    api: Api<EmailSenderConfig>,
    cluster: &KubeCluster,
    registry: &SenderRegistry,
    policy: &RetryPolicy,
) -> Result<()> {
    info!("starting EmailSenderConfig watch");
    let mut seen = HashSet::new();
    let mut stream = watcher(api, watcher::Config::default())
        .default_backoff()
        .applied_objects()
        .boxed();
    while let Some(event) = stream.next().await {
        let object = match event {
            Ok(object) => object,
            Err(err) => {
                warn!(error = %err, "EmailSenderConfig watch stream error");
                continue;
            }
        };
        let Some((namespace, name, uid)) = coordinates(&object) else {
            warn!("EmailSenderConfig event without full coordinates, skipping");
            continue;
        };
        let reason = if seen.insert(uid) {
            EventReason::Create
        } else {
            EventReason::Update
        };
        let outcome = dispatch(policy, || {
            email_sender_config_handler(cluster, registry, &namespace, &name, reason)
        })
        .await;
        if let Err(err) = outcome {
            error!(
                resource.namespace = %namespace,
                resource.name = %name,
                error = %err,
                "giving up on EmailSenderConfig event"
            );
        }
    }
    Ok(())
}

async fn watch_emails(
    api: Api<Email>,
    cluster: &KubeCluster,
    registry: &SenderRegistry,
    policy: &RetryPolicy,
) -> Result<()> {
    info!("starting Email watch");
    let mut seen = HashSet::new();
    let mut stream = watcher(api, watcher::Config::default())
        .default_backoff()
        .applied_objects()
        .boxed();
    while let Some(event) = stream.next().await {
        let object = match event {
            Ok(object) => object,
            Err(err) => {
                warn!(error = %err, "Email watch stream error");
                continue;
            }
        };
        let Some((namespace, name, uid)) = coordinates(&object) else {
            warn!("Email event without full coordinates, skipping");
            continue;
        };
        // Emails are handled on create only; our own status patches echo back
        // through the watch as updates of the same uid.
        if !seen.insert(uid.clone()) {
            continue;
        }
        let outcome = dispatch(policy, || {
            email_handler(
                cluster,
                registry,
                &namespace,
                &name,
                EventReason::Create,
                &object.spec,
                &uid,
            )
        })
        .await;
        if let Err(err) = outcome {
            error!(
                resource.namespace = %namespace,
                resource.name = %name,
                correlation.id = %uid,
                error = %err,
                "giving up on Email event"
            );
        }
    }
    Ok(())
}

fn coordinates<K: ResourceExt>(object: &K) -> Option<(String, String, String)> {
    Some((object.namespace()?, object.name_any(), object.uid()?))
}

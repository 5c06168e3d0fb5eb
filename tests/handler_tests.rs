//! End-to-end handler behavior over the fake cluster and senders.

mod common;

use common::{registry_with, FakeCluster, FakeSender};
use email_sender_controller::crd::EmailSpec;
use email_sender_controller::error::Error;
use email_sender_controller::handlers::{
    email_handler, email_sender_config_handler, EventReason,
};
use email_sender_controller::provider::SenderRegistry;
use serde_json::json;

fn email_spec(sender_config_ref: &str) -> EmailSpec {
    EmailSpec {
        sender_config_ref: sender_config_ref.to_string(),
        body: "hi".to_string(),
        recipient_email: "a@b.com".to_string(),
        subject: "s".to_string(),
    }
}

#[tokio::test]
async fn successful_send_marks_the_email_sent() {
    let cluster = FakeCluster::new();
    cluster.insert_sender_config("default", "fake-mail", "ops@example.com", "token");
    cluster.insert_email("default", "welcome", "uid-1", "fake-mail", None);
    let sender = FakeSender::succeeding();
    let registry = registry_with("FakeMail", sender.clone());

    email_handler(
        &cluster,
        &registry,
        "default",
        "welcome",
        EventReason::Create,
        &email_spec("fake-mail"),
        "uid-1",
    )
    .await
    .unwrap();

    assert_eq!(sender.call_count(), 1);
    assert_eq!(
        cluster.status_of("emails", "default", "welcome"),
        Some(json!({ "deliveryStatus": "SENT", "messageId": "uid-1" }))
    );
}

#[tokio::test]
async fn provider_rejection_marks_the_email_failed_without_retry() {
    let cluster = FakeCluster::new();
    cluster.insert_sender_config("default", "fake-mail", "ops@example.com", "token");
    cluster.insert_email("default", "welcome", "uid-1", "fake-mail", None);
    let sender = FakeSender::failing("401 Unauthorized");
    let registry = registry_with("FakeMail", sender.clone());

    // The terminal failure is absorbed: the dispatcher must not see an error.
    let outcome = email_handler(
        &cluster,
        &registry,
        "default",
        "welcome",
        EventReason::Create,
        &email_spec("fake-mail"),
        "uid-1",
    )
    .await;

    assert!(outcome.is_ok());
    assert_eq!(sender.call_count(), 1);
    assert_eq!(
        cluster.status_of("emails", "default", "welcome"),
        Some(json!({ "deliveryStatus": "FAILED", "messageId": "uid-1" }))
    );
}

#[tokio::test]
async fn unknown_sender_config_leaves_the_email_untouched() {
    let cluster = FakeCluster::new();
    cluster.insert_email("default", "welcome", "uid-1", "unknown-vendor", None);
    let registry = SenderRegistry::builtin();

    let outcome = email_handler(
        &cluster,
        &registry,
        "default",
        "welcome",
        EventReason::Create,
        &email_spec("unknown-vendor"),
        "uid-1",
    )
    .await;

    assert!(outcome.is_ok());
    assert_eq!(cluster.status_of("emails", "default", "welcome"), None);
    assert_eq!(cluster.status_patch_count(), 0);
}

#[tokio::test]
async fn settled_deliveries_are_not_resent() {
    let cluster = FakeCluster::new();
    cluster.insert_sender_config("default", "fake-mail", "ops@example.com", "token");
    cluster.insert_email(
        "default",
        "welcome",
        "uid-1",
        "fake-mail",
        Some(json!({ "deliveryStatus": "SENT", "messageId": "uid-1" })),
    );
    let sender = FakeSender::succeeding();
    let registry = registry_with("FakeMail", sender.clone());

    email_handler(
        &cluster,
        &registry,
        "default",
        "welcome",
        EventReason::Create,
        &email_spec("fake-mail"),
        "uid-1",
    )
    .await
    .unwrap();

    assert_eq!(sender.call_count(), 0);
    assert_eq!(cluster.status_patch_count(), 0);
    assert_eq!(
        cluster.status_of("emails", "default", "welcome"),
        Some(json!({ "deliveryStatus": "SENT", "messageId": "uid-1" }))
    );
}

#[tokio::test]
async fn failed_deliveries_are_not_resent_either() {
    let cluster = FakeCluster::new();
    cluster.insert_sender_config("default", "fake-mail", "ops@example.com", "token");
    cluster.insert_email(
        "default",
        "welcome",
        "uid-1",
        "fake-mail",
        Some(json!({ "deliveryStatus": "FAILED", "messageId": "uid-1" })),
    );
    let sender = FakeSender::succeeding();
    let registry = registry_with("FakeMail", sender.clone());

    email_handler(
        &cluster,
        &registry,
        "default",
        "welcome",
        EventReason::Create,
        &email_spec("fake-mail"),
        "uid-1",
    )
    .await
    .unwrap();

    assert_eq!(sender.call_count(), 0);
    assert_eq!(cluster.status_patch_count(), 0);
}

#[tokio::test]
async fn missing_sender_config_escalates_without_status_write() {
    // The referenced config does not exist: construction fails before any send
    // and the error must escalate for the dispatcher's retry.
    let cluster = FakeCluster::new();
    cluster.insert_email("default", "welcome", "uid-1", "fake-mail", None);
    let registry = registry_with("FakeMail", FakeSender::succeeding());

    let err = email_handler(
        &cluster,
        &registry,
        "default",
        "welcome",
        EventReason::Create,
        &email_spec("fake-mail"),
        "uid-1",
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::NotFound { .. }));
    assert_eq!(cluster.status_of("emails", "default", "welcome"), None);
}

#[tokio::test]
async fn known_sender_configs_are_acknowledged() {
    let cluster = FakeCluster::new();
    cluster.insert_sender_config("default", "mail-gun", "ops@example.com", "token");
    let registry = SenderRegistry::builtin();

    email_sender_config_handler(&cluster, &registry, "default", "mail-gun", EventReason::Create)
        .await
        .unwrap();

    // Config resources never get a status.
    assert_eq!(cluster.status_patch_count(), 0);
}

#[tokio::test]
async fn unknown_sender_configs_are_ignored_not_failed() {
    // No cluster objects needed: the name decides before anything is fetched.
    let cluster = FakeCluster::new();
    let registry = SenderRegistry::builtin();

    let outcome = email_sender_config_handler(
        &cluster,
        &registry,
        "default",
        "sendgrid",
        EventReason::Update,
    )
    .await;

    assert!(outcome.is_ok());
}

#[tokio::test]
async fn sender_config_without_secret_escalates() {
    let cluster = FakeCluster::new();
    cluster.insert(
        "emailsenderconfigs",
        "default",
        "mail-gun",
        json!({
            "metadata": { "namespace": "default", "name": "mail-gun", "uid": "u1" },
            "spec": { "senderEmail": "ops@example.com" },
        }),
    );
    let registry = SenderRegistry::builtin();

    let err = email_sender_config_handler(
        &cluster,
        &registry,
        "default",
        "mail-gun",
        EventReason::Create,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::NotFound { ref plural, .. } if plural == "secrets"));
}

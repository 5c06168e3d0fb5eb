//! # Mail Provider Senders
//!
//! Polymorphic senders over mail-delivery providers, and the factory registry
//! that resolves a provider-config name to a concrete variant.
//!
//! Each variant is polymorphic over `send` only; construction is the shared
//! credential-loading step in `common.rs`. The registry maps canonical
//! provider keys to constructors, so a future variant is picked up by
//! registering it under the key matching its config-resource name.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::cluster::ClusterApi;
use crate::error::Error;

mod common;
mod mailersend;
mod mailgun;

pub use common::SenderConfig;
pub use mailersend::MailerSendSender;
pub use mailgun::MailGunSender;

/// One mail-delivery provider, able to deliver a single message.
#[async_trait]
pub trait ProviderSender: Send + Sync + std::fmt::Debug {
    /// Canonical provider name, as registered in the factory.
    fn provider_name(&self) -> &'static str;

    /// Deliver one message. `correlation_id` is the owning resource's cluster
    /// uid, threaded through provider calls and failure reasons.
    async fn send(
        &self,
        body: &str,
        recipient: &str,
        subject: &str,
        correlation_id: &str,
    ) -> Result<(), Error>;
}

type SenderConstructor = Box<dyn Fn(SenderConfig) -> Box<dyn ProviderSender> + Send + Sync>;

/// Registry resolving provider-config names to concrete sender variants.
///
/// Explicitly constructed and passed in; there is no ambient global registry.
#[derive(Default)]
pub struct SenderRegistry {
    constructors: HashMap<String, SenderConstructor>,
}

impl SenderRegistry {
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Registry with all built-in provider variants.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("MailGun", |config| Box::new(MailGunSender::new(config)));
        registry.register("MailerSend", |config| {
            Box::new(MailerSendSender::new(config))
        });
        registry
    }

    pub fn register<F>(&mut self, key: impl Into<String>, constructor: F)
    where
        F: Fn(SenderConfig) -> Box<dyn ProviderSender> + Send + Sync + 'static,
    {
        self.constructors.insert(key.into(), Box::new(constructor));
    }

    pub fn contains(&self, key: &str) -> bool {
        self.constructors.contains_key(key)
    }

    /// Resolve a provider-config name to a constructed sender, loading its
    /// credentials from the cluster.
    ///
    /// The lookup key is derived from the name before anything is fetched, so
    /// an unregistered name costs no cluster round-trips.
    pub async fn create(
        &self,
        cluster: &dyn ClusterApi,
        namespace: &str,
        name: &str,
    ) -> Result<Box<dyn ProviderSender>, Error> {
        let key = provider_key(name);
        let Some(constructor) = self.constructors.get(&key) else {
            return Err(Error::UnknownProvider {
                name: name.to_string(),
            });
        };
        let config = SenderConfig::load(cluster, namespace, name).await?;
        Ok(constructor(config))
    }
}

impl std::fmt::Debug for SenderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SenderRegistry")
            .field("keys", &self.constructors.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Registry key for a hyphenated provider-config name: each token is
/// capitalized and the tokens concatenated (`mail-gun` becomes `MailGun`).
pub fn provider_key(name: &str) -> String {
    name.split('-')
        .map(|token| {
            let mut chars = token.chars();
            match chars.next() {
                Some(first) => {
                    let mut key: String = first.to_uppercase().collect();
                    key.extend(chars.flat_map(char::to_lowercase));
                    key
                }
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_key_capitalizes_hyphenated_tokens() {
        assert_eq!(provider_key("mail-gun"), "MailGun");
        assert_eq!(provider_key("mailer-send"), "MailerSend");
        assert_eq!(provider_key("sendgrid"), "Sendgrid");
    }

    #[test]
    fn provider_key_lowercases_the_token_tail() {
        assert_eq!(provider_key("MAIL-GUN"), "MailGun");
        assert_eq!(provider_key("Mailer-Send"), "MailerSend");
    }

    #[test]
    fn builtin_registry_knows_both_providers() {
        let registry = SenderRegistry::builtin();
        assert!(registry.contains("MailGun"));
        assert!(registry.contains("MailerSend"));
        assert!(!registry.contains("Sendgrid"));
    }

    #[test]
    fn registered_constructors_are_found_by_key() {
        let mut registry = SenderRegistry::new();
        assert!(!registry.contains("MailGun"));
        registry.register("MailGun", |config| Box::new(MailGunSender::new(config)));
        assert!(registry.contains("MailGun"));
    }
}

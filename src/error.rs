//! # Error Taxonomy
//!
//! Failure classification for the controller.
//!
//! Terminal conditions (unknown provider, provider-rejected send) are absorbed
//! at the handler boundary and turned into a logged no-op or a persisted
//! FAILED status. Everything else escalates to the dispatcher, whose bounded
//! retry may re-invoke the handler.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Referenced cluster resource or secret does not exist.
    #[error("{plural} {namespace}/{name} not found")]
    NotFound {
        plural: String,
        namespace: String,
        name: String,
    },

    /// Cluster API or provider API unreachable or failing at the
    /// infrastructure level.
    #[error("transport failure ({context}): {source}")]
    Transport {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The fetched object exists but lacks an expected field or encoding.
    #[error("malformed resource: {context}")]
    Malformed { context: String },

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The controller does not manage this kind of sender.
    #[error("{name} is not a known email sender")]
    UnknownProvider { name: String },

    /// The provider rejected the send. Attributed to the client's request
    /// (bad recipient, invalid credentials, provider rejection).
    #[error("failed to send email with id {uid} ({reason})")]
    MailSendingFailure { uid: String, reason: String },
}

impl Error {
    pub(crate) fn transport<E>(context: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Transport {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Whether the condition must never be retried.
    ///
    /// Non-terminal errors mean "this call itself did not complete and might
    /// succeed if retried by the infrastructure".
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::UnknownProvider { .. } | Self::MailSendingFailure { .. }
        )
    }
}

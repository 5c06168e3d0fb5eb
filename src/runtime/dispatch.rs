//! # Event Dispatch
//!
//! Invokes a handler for one observed event with the retry semantics the core
//! relies on: bounded retries, fixed backoff, a timeout around the whole
//! handler body, and no retry for terminal conditions.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::Error;

/// Retry behavior applied around each handler invocation.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Additional attempts after the first.
    pub retries: u32,
    /// Fixed delay between attempts.
    pub backoff: Duration,
    /// Ceiling on a single handler invocation.
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            backoff: Duration::from_secs(30),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Invoke `handler` until it succeeds, fails terminally, or the retry budget
/// is exhausted.
///
/// A timed-out invocation counts as a transport failure and is retried like
/// one. Terminal errors are returned immediately and must not be re-dispatched
/// by the caller.
pub async fn dispatch<F, Fut>(policy: &RetryPolicy, mut handler: F) -> Result<(), Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), Error>>,
{
    let mut attempt: u32 = 0;
    loop {
        let outcome = match tokio::time::timeout(policy.timeout, handler()).await {
            Ok(outcome) => outcome,
            Err(elapsed) => Err(Error::transport("handler timeout", elapsed)),
        };
        let err = match outcome {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };
        if err.is_terminal() || attempt >= policy.retries {
            return Err(err);
        }
        attempt += 1;
        warn!(
            attempt,
            backoff_secs = policy.backoff.as_secs(),
            error = %err,
            "handler failed, backing off before retry"
        );
        tokio::time::sleep(policy.backoff).await;
    }
}

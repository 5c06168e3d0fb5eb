//! # Runtime
//!
//! Event watch and dispatch around the reconciliation handlers: bounded retry
//! with fixed backoff and a per-call timeout, fed by watch streams over both
//! custom resource kinds.

mod dispatch;
mod watch;

pub use dispatch::{dispatch, RetryPolicy};
pub use watch::run;

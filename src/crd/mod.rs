//! # Custom Resource Definitions
//!
//! CRD types for the email sender operator.
//!
//! - `sender.rs` - EmailSenderConfig, the provider configuration resource
//! - `email.rs` - Email, the send-request resource, and its delivery status

mod email;
mod sender;

/// API group shared by both operator resources.
pub const API_GROUP: &str = "stable.email-sender-operator.dev";
pub const API_VERSION: &str = "v1";

pub use email::{DeliveryStatus, Email, EmailSpec, EmailStatus, EMAILS};
pub use sender::{EmailSenderConfig, EmailSenderConfigSpec, EMAIL_SENDER_CONFIGS};

//! # CRD Generator
//!
//! Generates the CustomResourceDefinition YAML for both operator resources.
//!
//! ```bash
//! cargo run --bin crdgen | kubectl apply -f -
//! ```

use kube::core::CustomResourceExt;

use email_sender_controller::crd::{Email, EmailSenderConfig};

fn main() -> anyhow::Result<()> {
    println!("# This file is auto-generated by crdgen");
    println!("---");
    print!("{}", serde_yaml::to_string(&EmailSenderConfig::crd())?);
    println!("---");
    print!("{}", serde_yaml::to_string(&Email::crd())?);
    Ok(())
}

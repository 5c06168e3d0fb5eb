//! # Resource Access
//!
//! Generic access to one namespaced custom resource instance: fetch, status
//! read, status write-through, uid resolution.
//!
//! Only namespaced resources are supported; there is no cluster-scoped
//! addressing.

use serde::Serialize;
use serde_json::Value;

use crate::cluster::ClusterApi;
use crate::error::Error;

/// Coordinates of a resource kind within the cluster API.
///
/// Fixed per concrete kind as compile-time constants. `group` is empty for
/// core `v1` kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceKind {
    pub group: &'static str,
    pub version: &'static str,
    pub plural: &'static str,
}

impl ResourceKind {
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.to_string()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }
}

/// Capability of any payload written to a status subresource: producing a
/// wire-representable mapping. Nothing else is assumed of it.
pub trait StatusPayload: Serialize {}

/// Typed accessor for one namespaced custom resource instance.
///
/// Every operation is a single round-trip against the cluster API; retry is
/// the event dispatcher's responsibility. A handle is exclusively owned by one
/// in-flight reconciliation.
pub struct ResourceHandle<'a> {
    cluster: &'a dyn ClusterApi,
    kind: ResourceKind,
    namespace: String,
    name: String,
    uid: Option<String>,
    status: Option<Value>,
}

impl<'a> ResourceHandle<'a> {
    pub fn new(
        cluster: &'a dyn ClusterApi,
        kind: ResourceKind,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            cluster,
            kind,
            namespace: namespace.into(),
            name: name.into(),
            uid: None,
            status: None,
        }
    }

    pub fn kind(&self) -> &ResourceKind {
        &self.kind
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last status written through this handle, if any.
    pub fn status(&self) -> Option<&Value> {
        self.status.as_ref()
    }

    /// Full remote representation of the addressed resource.
    pub async fn fetch(&self) -> Result<Value, Error> {
        self.cluster
            .get_resource(&self.kind, &self.namespace, &self.name)
            .await
    }

    /// Current remote status mapping, or `None` when the subresource is unset.
    pub async fn read_status(&self) -> Result<Option<Value>, Error> {
        let resource = self.fetch().await?;
        Ok(resource
            .get("status")
            .filter(|status| !status.is_null())
            .cloned())
    }

    /// Serializes `status`, merge-patches the remote status subresource, and
    /// caches the written payload locally once the remote write succeeds.
    ///
    /// There is no local-only mutation: every status change goes through here.
    pub async fn set_status<S: StatusPayload>(&mut self, status: &S) -> Result<(), Error> {
        let serialized = serde_json::to_value(status)?;
        self.cluster
            .patch_status(&self.kind, &self.namespace, &self.name, serialized.clone())
            .await?;
        self.status = Some(serialized);
        Ok(())
    }

    /// Cluster-assigned uid of the resource, fetched on first use and pinned
    /// for the lifetime of the handle.
    pub async fn resolve_uid(&mut self) -> Result<String, Error> {
        if let Some(uid) = &self.uid {
            return Ok(uid.clone());
        }
        let resource = self.fetch().await?;
        let uid = resource
            .pointer("/metadata/uid")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Malformed {
                context: format!(
                    "{} {}/{} has no metadata.uid",
                    self.kind.plural, self.namespace, self.name
                ),
            })?
            .to_string();
        self.uid = Some(uid.clone());
        Ok(uid)
    }
}

impl std::fmt::Debug for ResourceHandle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceHandle")
            .field("kind", &self.kind)
            .field("namespace", &self.namespace)
            .field("name", &self.name)
            .field("uid", &self.uid)
            .finish_non_exhaustive()
    }
}

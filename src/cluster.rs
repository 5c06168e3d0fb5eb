//! # Cluster API Client
//!
//! Abstraction over the cluster API consumed by the reconciliation core, plus
//! the production implementation backed by a [`kube::Client`].

use async_trait::async_trait;
use kube::api::{Api, ApiResource, DynamicObject, Patch, PatchParams};
use kube::Client;
use serde_json::{json, Value};

use crate::error::Error;
use crate::resource::ResourceKind;

/// Field manager recorded on status patches issued by this controller.
const FIELD_MANAGER: &str = "email-sender-controller";

/// Minimal surface of the cluster API the reconciliation core depends on.
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// Namespaced get of one resource instance, returned as the raw API object.
    async fn get_resource(
        &self,
        kind: &ResourceKind,
        namespace: &str,
        name: &str,
    ) -> Result<Value, Error>;

    /// Merge-patch of the resource's `status` subresource.
    async fn patch_status(
        &self,
        kind: &ResourceKind,
        namespace: &str,
        name: &str,
        status: Value,
    ) -> Result<(), Error>;
}

/// [`ClusterApi`] implementation talking to a real API server.
///
/// Credential bootstrap (in-cluster service account vs kubeconfig) happens in
/// [`kube::Client::try_default`] at startup, not here.
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
}

impl std::fmt::Debug for KubeCluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeCluster").finish_non_exhaustive()
    }
}

impl KubeCluster {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, kind: &ResourceKind, namespace: &str) -> Api<DynamicObject> {
        // The kind name is irrelevant to the namespaced get/patch verbs; only
        // the group/version/plural path segments are used.
        let resource = ApiResource {
            group: kind.group.to_string(),
            version: kind.version.to_string(),
            api_version: kind.api_version(),
            kind: String::new(),
            plural: kind.plural.to_string(),
        };
        Api::namespaced_with(self.client.clone(), namespace, &resource)
    }
}

#[async_trait]
impl ClusterApi for KubeCluster {
    async fn get_resource(
        &self,
        kind: &ResourceKind,
        namespace: &str,
        name: &str,
    ) -> Result<Value, Error> {
        let object = self
            .api(kind, namespace)
            .get(name)
            .await
            .map_err(|err| classify(kind, namespace, name, err))?;
        Ok(serde_json::to_value(&object)?)
    }

    async fn patch_status(
        &self,
        kind: &ResourceKind,
        namespace: &str,
        name: &str,
        status: Value,
    ) -> Result<(), Error> {
        self.api(kind, namespace)
            .patch_status(
                name,
                &PatchParams::apply(FIELD_MANAGER),
                &Patch::Merge(json!({ "status": status })),
            )
            .await
            .map_err(|err| classify(kind, namespace, name, err))?;
        Ok(())
    }
}

/// Map a kube error onto the controller taxonomy: a 404 means the addressed
/// object does not exist, everything else is infrastructure.
fn classify(kind: &ResourceKind, namespace: &str, name: &str, err: kube::Error) -> Error {
    match err {
        kube::Error::Api(response) if response.code == 404 => Error::NotFound {
            plural: kind.plural.to_string(),
            namespace: namespace.to_string(),
            name: name.to_string(),
        },
        other => Error::transport("cluster API", other),
    }
}

//! Cluster control-plane client.
//!
//! The pipeline only needs one operation: create a namespaced custom
//! resource from a JSON object. [`KubeClusterClient`] does this against
//! a Kubernetes API server using kubeconfig credentials; tests supply
//! their own [`ClusterClient`].

use std::time::Duration;

use kube::api::{Api, PostParams};
use kube::core::{ApiResource, DynamicObject, GroupVersionKind};
use kube::config::{KubeConfigOptions, Kubeconfig};
use tracing::{debug, info};

use crate::config::ClusterConfig;
use crate::error::ClusterError;
use crate::workload::WorkloadKind;

pub trait ClusterClient: Send + Sync {
    /// Create `body` as a resource of `kind` in `namespace`.
    ///
    /// Returns once the control plane has accepted the object; it does
    /// not wait for the workload to become ready.
    fn submit_workload(
        &self,
        kind: &WorkloadKind,
        namespace: &str,
        body: serde_json::Value,
    ) -> impl Future<Output = Result<(), ClusterError>> + Send;
}

/// [`ClusterClient`] backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeClusterClient {
    client: kube::Client,
    timeout: Duration,
}

impl KubeClusterClient {
    /// Build a client from the configured kubeconfig file.
    ///
    /// Missing or malformed credentials are reported here, before any
    /// request is served.
    pub async fn connect(config: &ClusterConfig) -> Result<Self, ClusterError> {
        let kubeconfig = Kubeconfig::read_from(&config.kubeconfig_path).map_err(|e| {
            ClusterError::Configuration(format!(
                "{}: {e}",
                config.kubeconfig_path.display()
            ))
        })?;
        let options = KubeConfigOptions {
            context: config.context.clone(),
            ..Default::default()
        };
        let mut client_config = kube::Config::from_custom_kubeconfig(kubeconfig, &options)
            .await
            .map_err(|e| ClusterError::Configuration(e.to_string()))?;

        let timeout = config.submit_timeout();
        client_config.connect_timeout = Some(timeout);
        client_config.read_timeout = Some(timeout);

        let cluster_url = client_config.cluster_url.to_string();
        let client = kube::Client::try_from(client_config)
            .map_err(|e| ClusterError::Configuration(e.to_string()))?;
        info!(%cluster_url, "Cluster client configured");

        Ok(Self { client, timeout })
    }
}

impl ClusterClient for KubeClusterClient {
    async fn submit_workload(
        &self,
        kind: &WorkloadKind,
        namespace: &str,
        body: serde_json::Value,
    ) -> Result<(), ClusterError> {
        let mut object: DynamicObject = serde_json::from_value(body)
            .map_err(|e| ClusterError::Rejected(format!("not a Kubernetes object: {e}")))?;
        object.metadata.namespace = Some(namespace.to_string());

        let gvk = GroupVersionKind::gvk(&kind.group, &kind.version, &kind.kind);
        let resource = match &kind.plural {
            Some(plural) => ApiResource::from_gvk_with_plural(&gvk, plural),
            None => ApiResource::from_gvk(&gvk),
        };
        let api: Api<DynamicObject> = Api::namespaced_with(self.client.clone(), namespace, &resource);

        debug!(%kind, namespace, "Submitting workload");
        match tokio::time::timeout(self.timeout, api.create(&PostParams::default(), &object)).await {
            Err(_) => Err(ClusterError::Unavailable(format!(
                "no response within {}s",
                self.timeout.as_secs()
            ))),
            Ok(Err(e)) => Err(classify(e)),
            Ok(Ok(created)) => {
                info!(
                    %kind,
                    namespace,
                    name = created.metadata.name.as_deref().unwrap_or_default(),
                    "Workload accepted"
                );
                Ok(())
            }
        }
    }
}

/// Map a Kubernetes client error onto the submission failure classes.
pub fn classify(err: kube::Error) -> ClusterError {
    match err {
        kube::Error::Api(response) => {
            let message = format!("{} ({})", response.message, response.reason);
            match response.code {
                401 | 403 => ClusterError::Unauthorized(message),
                409 => ClusterError::Conflict(message),
                408 | 429 | 500..=599 => ClusterError::Unavailable(message),
                _ => ClusterError::Rejected(message),
            }
        }
        kube::Error::Auth(e) => ClusterError::Unauthorized(e.to_string()),
        kube::Error::SerdeError(e) => ClusterError::Rejected(e.to_string()),
        other => ClusterError::Unavailable(other.to_string()),
    }
}

//! Sparoo Provision — the instance provisioning pipeline.
//!
//! A creation request passes request validation and the
//! [`OwnershipValidator`] before it is stored as `pending`. Engines
//! backed by a cluster workload then go through the manifest renderer
//! and [`ClusterClient`], after which the stored status is reconciled
//! to `running` or `failed`.
//!
//! [`HierarchyService`] covers the Organization/Project collaborator
//! operations the pipeline depends on.

pub mod cluster;
pub mod config;
pub mod error;
pub mod hierarchy;
pub mod manifest;
pub mod ownership;
pub mod request;
pub mod service;
pub mod workload;

pub use cluster::{ClusterClient, KubeClusterClient};
pub use config::{ClusterConfig, ProvisionConfig, WorkloadConfig};
pub use error::{ClusterError, TemplateError};
pub use hierarchy::HierarchyService;
pub use manifest::{ManifestParameters, ManifestTemplate, ManifestValue};
pub use ownership::OwnershipValidator;
pub use request::{CreateInstanceRequest, CreateOrganizationRequest, CreateProjectRequest};
pub use service::ProvisioningService;
pub use workload::{WorkloadCatalog, WorkloadDefinition, WorkloadKind, default_workloads};

//! Provisioning configuration.
//!
//! All sections deserialize from the server's TOML file and fall back
//! to the defaults below for any omitted key.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use sparoo_core::models::instance::DatabaseEngine;

/// Pipeline behaviour.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProvisionConfig {
    /// Minimum admin password length in characters (default: 5).
    pub min_password_length: usize,
    /// Reject a second instance with the same name in a project.
    pub reject_duplicate_names: bool,
    /// Namespace that workload objects are created in.
    pub namespace: String,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            min_password_length: 5,
            reject_duplicate_names: true,
            namespace: "sparoo-databases".into(),
        }
    }
}

/// Cluster control-plane access.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Path to the kubeconfig holding the cluster credentials.
    pub kubeconfig_path: PathBuf,
    /// Kubeconfig context to use; `None` selects the current context.
    pub context: Option<String>,
    /// Upper bound for one submission, in seconds (default: 30).
    pub submit_timeout_secs: u64,
}

impl ClusterConfig {
    pub fn submit_timeout(&self) -> Duration {
        Duration::from_secs(self.submit_timeout_secs)
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            kubeconfig_path: PathBuf::from("kubeconfig.yaml"),
            context: None,
            submit_timeout_secs: 30,
        }
    }
}

/// Maps one database engine to the custom resource that runs it.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkloadConfig {
    pub engine: DatabaseEngine,
    pub api_group: String,
    pub version: String,
    pub kind: String,
    /// Resource plural; derived from `kind` when omitted.
    #[serde(default)]
    pub plural: Option<String>,
    /// Template file; the built-in template for the engine when omitted.
    #[serde(default)]
    pub template_path: Option<PathBuf>,
}

//! Server configuration loaded from TOML.
//!
//! ```toml
//! [server]
//! bind = "0.0.0.0:8080"
//!
//! [database]
//! url = "127.0.0.1:8000"
//!
//! [cluster]
//! kubeconfig_path = "/etc/sparoo/kubeconfig.yaml"
//!
//! [[workloads]]
//! engine = "postgres"
//! api_group = "postgresql.cnpg.io"
//! version = "v1"
//! kind = "Cluster"
//! ```

use std::net::SocketAddr;
use std::path::Path;

use serde::Deserialize;
use sparoo_db::DbConfig;
use sparoo_provision::workload::default_workloads;
use sparoo_provision::{ClusterConfig, ProvisionConfig, WorkloadConfig};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: HttpConfig,
    pub database: DbConfig,
    pub cluster: ClusterConfig,
    pub provisioning: ProvisionConfig,
    pub credentials: CredentialConfig,
    pub workloads: Vec<WorkloadConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: HttpConfig::default(),
            database: DbConfig::default(),
            cluster: ClusterConfig::default(),
            provisioning: ProvisionConfig::default(),
            credentials: CredentialConfig::default(),
            workloads: default_workloads(),
        }
    }
}

impl ServerConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load `path`, falling back to the built-in defaults when the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!(path = %path.display(), "No configuration file; using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: SocketAddr,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
        }
    }
}

#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct CredentialConfig {
    /// Secret mixed into admin password hashes.
    pub pepper: Option<String>,
}

impl std::fmt::Debug for CredentialConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialConfig")
            .field("pepper", &self.pepper.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use sparoo_core::models::instance::DatabaseEngine;

    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = ServerConfig::from_toml("").unwrap();
        assert_eq!(config.server.bind.port(), 8080);
        assert_eq!(config.provisioning.min_password_length, 5);
        assert_eq!(config.cluster.submit_timeout_secs, 30);
        assert_eq!(config.workloads.len(), 1);
        assert_eq!(config.workloads[0].engine, DatabaseEngine::Postgres);
    }

    #[test]
    fn sections_override_defaults() {
        let config = ServerConfig::from_toml(
            r#"
            [server]
            bind = "127.0.0.1:9000"

            [provisioning]
            min_password_length = 12
            reject_duplicate_names = false

            [cluster]
            kubeconfig_path = "/etc/sparoo/kubeconfig.yaml"
            context = "prod"

            [credentials]
            pepper = "s3cr3t-pepper"

            [[workloads]]
            engine = "mysql"
            api_group = "mysql.oracle.com"
            version = "v2"
            kind = "InnoDBCluster"
            template_path = "/etc/sparoo/mysql.yaml"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.bind.port(), 9000);
        assert_eq!(config.provisioning.min_password_length, 12);
        assert!(!config.provisioning.reject_duplicate_names);
        assert_eq!(config.provisioning.namespace, "sparoo-databases");
        assert_eq!(config.cluster.context.as_deref(), Some("prod"));
        assert_eq!(config.workloads.len(), 1);
        assert_eq!(config.workloads[0].engine, DatabaseEngine::Mysql);
        assert!(!format!("{:?}", config.credentials).contains("s3cr3t"));
    }

    #[test]
    fn unknown_engine_is_a_parse_error() {
        let err = ServerConfig::from_toml(
            r#"
            [[workloads]]
            engine = "oracle"
            api_group = "x"
            version = "v1"
            kind = "Db"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = ServerConfig::load_or_default(Path::new("/nonexistent/sparoo.toml")).unwrap();
        assert_eq!(config.database.namespace, "sparoo");
    }
}

//! Engine → cluster workload catalogue.
//!
//! Only engines listed here are backed by a cluster workload. Requests
//! for any other engine stop after the record is stored.

use std::collections::HashMap;
use std::fmt;

use sparoo_core::models::instance::DatabaseEngine;

use crate::config::WorkloadConfig;
use crate::error::TemplateError;
use crate::manifest::{self, ManifestParameters, ManifestTemplate};

const POSTGRES_CNPG_TEMPLATE: &str = include_str!("../templates/postgres-cnpg.yaml");

/// Group/version/kind of a custom resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadKind {
    pub group: String,
    pub version: String,
    pub kind: String,
    pub plural: Option<String>,
}

impl WorkloadKind {
    pub fn new(group: impl Into<String>, version: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
            plural: None,
        }
    }

    /// `group/version`, or just `version` for the core group.
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, Kind={}", self.api_version(), self.kind)
    }
}

/// The resource kind and template used for one engine.
#[derive(Debug, Clone)]
pub struct WorkloadDefinition {
    pub kind: WorkloadKind,
    pub template: ManifestTemplate,
}

impl WorkloadDefinition {
    /// Render and parse the workload object, checking it declares the
    /// configured kind.
    pub fn build(&self, params: &ManifestParameters) -> Result<serde_json::Value, TemplateError> {
        let rendered = self.template.render(params)?;
        let object = manifest::parse_manifest(&rendered)?;

        let api_version = object.get("apiVersion").and_then(|v| v.as_str());
        let kind = object.get("kind").and_then(|v| v.as_str());
        if api_version != Some(self.kind.api_version().as_str()) || kind != Some(self.kind.kind.as_str())
        {
            return Err(TemplateError::KindMismatch {
                expected: self.kind.to_string(),
                found: format!(
                    "{}, Kind={}",
                    api_version.unwrap_or("<none>"),
                    kind.unwrap_or("<none>")
                ),
            });
        }
        Ok(object)
    }
}

#[derive(Debug, Clone, Default)]
pub struct WorkloadCatalog {
    workloads: HashMap<DatabaseEngine, WorkloadDefinition>,
}

impl WorkloadCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load definitions, reading template files from disk where given.
    pub fn from_configs(configs: &[WorkloadConfig]) -> Result<Self, TemplateError> {
        let mut catalog = Self::new();
        for config in configs {
            let source = match &config.template_path {
                Some(path) => std::fs::read_to_string(path).map_err(|source| TemplateError::Io {
                    path: path.clone(),
                    source,
                })?,
                None => builtin_template(config.engine)
                    .ok_or_else(|| TemplateError::NoBuiltinTemplate(config.engine.to_string()))?
                    .to_string(),
            };
            let mut kind = WorkloadKind::new(&config.api_group, &config.version, &config.kind);
            kind.plural = config.plural.clone();
            catalog.insert(
                config.engine,
                WorkloadDefinition {
                    kind,
                    template: ManifestTemplate::new(source),
                },
            );
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, engine: DatabaseEngine, definition: WorkloadDefinition) {
        self.workloads.insert(engine, definition);
    }

    pub fn get(&self, engine: DatabaseEngine) -> Option<&WorkloadDefinition> {
        self.workloads.get(&engine)
    }
}

/// Catalogue used when the configuration names none: Postgres as a
/// CloudNativePG `Cluster`.
pub fn default_workloads() -> Vec<WorkloadConfig> {
    vec![WorkloadConfig {
        engine: DatabaseEngine::Postgres,
        api_group: "postgresql.cnpg.io".into(),
        version: "v1".into(),
        kind: "Cluster".into(),
        plural: None,
        template_path: None,
    }]
}

fn builtin_template(engine: DatabaseEngine) -> Option<&'static str> {
    match engine {
        DatabaseEngine::Postgres => Some(POSTGRES_CNPG_TEMPLATE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cnpg_params() -> ManifestParameters {
        ManifestParameters::new()
            .with("RESOURCE_NAME", "sparoo-0b5e")
            .with("NAMESPACE", "sparoo-databases")
            .with("INSTANCE_ID", "0b5e")
            .with("PROJECT_ID", "p1")
            .with("ORGANIZATION_ID", "o1")
            .with("INSTANCE_NAME", "orders-db")
            .with("BACKUP_POLICY", "enabled")
            .with("ADMIN_PASSWORD_HASH", "$argon2id$v=19$m=19456,t=2,p=1$abc$def")
            .with(
                "PG_HBA_RULES",
                vec!["hostssl all all 10.0.0.0/8 scram-sha-256".to_string()],
            )
    }

    #[test]
    fn default_catalogue_backs_only_postgres() {
        let catalog = WorkloadCatalog::from_configs(&default_workloads()).unwrap();
        assert!(catalog.get(DatabaseEngine::Postgres).is_some());
        assert!(catalog.get(DatabaseEngine::Mysql).is_none());
        assert!(catalog.get(DatabaseEngine::Mongodb).is_none());
    }

    #[test]
    fn builtin_postgres_template_renders_a_cnpg_cluster() {
        let catalog = WorkloadCatalog::from_configs(&default_workloads()).unwrap();
        let definition = catalog.get(DatabaseEngine::Postgres).unwrap();
        let object = definition.build(&cnpg_params()).unwrap();

        assert_eq!(object["apiVersion"], "postgresql.cnpg.io/v1");
        assert_eq!(object["kind"], "Cluster");
        assert_eq!(object["metadata"]["name"], "sparoo-0b5e");
        assert_eq!(
            object["metadata"]["annotations"]["sparoo.io/instance-name"],
            "orders-db"
        );
        assert_eq!(
            object["spec"]["postgresql"]["pg_hba"][0],
            "hostssl all all 10.0.0.0/8 scram-sha-256"
        );
    }

    #[test]
    fn kind_mismatch_is_a_template_error() {
        let definition = WorkloadDefinition {
            kind: WorkloadKind::new("postgresql.cnpg.io", "v1", "Cluster"),
            template: ManifestTemplate::new("apiVersion: v1\nkind: ConfigMap\n"),
        };
        assert!(matches!(
            definition.build(&ManifestParameters::new()),
            Err(TemplateError::KindMismatch { .. })
        ));
    }

    #[test]
    fn engines_without_builtin_need_a_template_path() {
        let configs = vec![WorkloadConfig {
            engine: DatabaseEngine::Mysql,
            api_group: "mysql.oracle.com".into(),
            version: "v2".into(),
            kind: "InnoDBCluster".into(),
            plural: None,
            template_path: None,
        }];
        assert!(matches!(
            WorkloadCatalog::from_configs(&configs),
            Err(TemplateError::NoBuiltinTemplate(_))
        ));
    }

    #[test]
    fn core_group_api_version_has_no_prefix() {
        assert_eq!(WorkloadKind::new("", "v1", "ConfigMap").api_version(), "v1");
    }
}

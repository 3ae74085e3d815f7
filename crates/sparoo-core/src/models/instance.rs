//! Database instance domain model.
//!
//! An instance is a request for a managed database. Its lifecycle
//! status is owned by the provisioning pipeline: records are created
//! `Pending` and only the pipeline moves them to `Running` or `Failed`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Supported database engines.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseEngine {
    Mysql,
    Mariadb,
    Mongodb,
    Postgres,
}

impl DatabaseEngine {
    pub const ALL: [DatabaseEngine; 4] = [
        DatabaseEngine::Mysql,
        DatabaseEngine::Mariadb,
        DatabaseEngine::Mongodb,
        DatabaseEngine::Postgres,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseEngine::Mysql => "mysql",
            DatabaseEngine::Mariadb => "mariadb",
            DatabaseEngine::Mongodb => "mongodb",
            DatabaseEngine::Postgres => "postgres",
        }
    }
}

impl fmt::Display for DatabaseEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatabaseEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DatabaseEngine::ALL
            .into_iter()
            .find(|engine| engine.as_str() == s)
            .ok_or_else(|| format!("unknown database engine: {s}"))
    }
}

/// Lifecycle status of an instance.
///
/// `Pending` is the only initial state. `Running` and `Failed` are
/// terminal as far as provisioning is concerned.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InstanceStatus {
    Pending,
    Running,
    Failed,
}

impl InstanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceStatus::Pending => "pending",
            InstanceStatus::Running => "running",
            InstanceStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InstanceStatus::Pending),
            "running" => Ok(InstanceStatus::Running),
            "failed" => Ok(InstanceStatus::Failed),
            other => Err(format!("unknown instance status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub engine: DatabaseEngine,
    pub enable_backups: bool,
    /// Argon2id PHC string. Never serialized to API clients.
    #[serde(skip_serializing, default)]
    pub admin_password_hash: String,
    /// Distinct CIDR ranges allowed to connect, in request order.
    pub allow_cidrs: Vec<String>,
    pub owner_id: String,
    pub status: InstanceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new instance.
#[derive(Debug, Clone)]
pub struct CreateInstance {
    pub organization_id: Uuid,
    pub project_id: Uuid,
    pub owner_id: String,
    pub name: String,
    pub engine: DatabaseEngine,
    pub enable_backups: bool,
    /// Raw password (hashed with Argon2id before storage).
    pub admin_password: String,
    pub allow_cidrs: Vec<String>,
}

//! SurrealDB implementation of [`InstanceRepository`].
//!
//! Admin passwords are hashed with Argon2id using OWASP-recommended
//! parameters (memory: 19 MiB, iterations: 2, parallelism: 1) and a
//! random salt per record. An optional pepper (server-side secret) can
//! be provided at construction time.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};
use chrono::{DateTime, Utc};
use sparoo_core::error::{SparooError, SparooResult};
use sparoo_core::models::instance::{CreateInstance, DatabaseEngine, Instance, InstanceStatus};
use sparoo_core::repository::{InstanceRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use super::{CountRow, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct InstanceRow {
    organization_id: String,
    project_id: String,
    name: String,
    engine: String,
    enable_backups: bool,
    admin_password_hash: String,
    allow_cidrs: Vec<String>,
    owner_id: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl InstanceRow {
    fn into_instance(self, id: Uuid) -> Result<Instance, DbError> {
        Ok(Instance {
            id,
            organization_id: parse_uuid(&self.organization_id, "organization")?,
            project_id: parse_uuid(&self.project_id, "project")?,
            name: self.name,
            engine: self.engine.parse::<DatabaseEngine>().map_err(DbError::Decode)?,
            enable_backups: self.enable_backups,
            admin_password_hash: self.admin_password_hash,
            allow_cidrs: self.allow_cidrs,
            owner_id: self.owner_id,
            status: self.status.parse::<InstanceStatus>().map_err(DbError::Decode)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct InstanceRowWithId {
    record_id: String,
    organization_id: String,
    project_id: String,
    name: String,
    engine: String,
    enable_backups: bool,
    admin_password_hash: String,
    allow_cidrs: Vec<String>,
    owner_id: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl InstanceRowWithId {
    fn try_into_instance(self) -> Result<Instance, DbError> {
        let id = parse_uuid(&self.record_id, "instance")?;
        InstanceRow {
            organization_id: self.organization_id,
            project_id: self.project_id,
            name: self.name,
            engine: self.engine,
            enable_backups: self.enable_backups,
            admin_password_hash: self.admin_password_hash,
            allow_cidrs: self.allow_cidrs,
            owner_id: self.owner_id,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_instance(id)
    }
}

/// Hash an admin password with Argon2id.
///
/// If a pepper is provided, it is prepended to the password before
/// hashing. The salt is randomly generated for each call.
fn hash_admin_password(password: &str, pepper: Option<&str>) -> Result<String, DbError> {
    // OWASP ASVS recommended: m=19456 (19 MiB), t=2, p=1
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| DbError::Crypto(format!("argon2 params: {e}")))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let peppered: String;
    let input = match pepper {
        Some(p) => {
            peppered = format!("{p}{password}");
            peppered.as_bytes()
        }
        None => password.as_bytes(),
    };

    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let hash = argon2
        .hash_password(input, &salt)
        .map_err(|e| DbError::Crypto(format!("password hash: {e}")))?;

    Ok(hash.to_string())
}

/// Verify a plaintext admin password against a stored Argon2id hash.
///
/// Returns `Ok(false)` on mismatch and an error only when the stored
/// hash is malformed. The pepper must match the one used for hashing.
pub fn verify_admin_password(
    password: &str,
    hash: &str,
    pepper: Option<&str>,
) -> Result<bool, DbError> {
    use argon2::PasswordVerifier;

    let peppered: String;
    let input = match pepper {
        Some(p) => {
            peppered = format!("{p}{password}");
            peppered.as_bytes()
        }
        None => password.as_bytes(),
    };

    let parsed_hash = argon2::PasswordHash::new(hash)
        .map_err(|e| DbError::Crypto(format!("invalid hash format: {e}")))?;

    // Parameters are read back from the PHC string.
    match Argon2::default().verify_password(input, &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(DbError::Crypto(format!("verify: {e}"))),
    }
}

/// Required-field checks that must pass before anything is written.
fn check_required(input: &CreateInstance) -> SparooResult<()> {
    let missing = if input.name.is_empty() {
        Some("instance_name")
    } else if input.admin_password.is_empty() {
        Some("admin_password")
    } else if input.owner_id.is_empty() {
        Some("owner_id")
    } else if input.allow_cidrs.is_empty() {
        Some("allow_cidrs")
    } else {
        None
    };

    match missing {
        Some(field) => Err(SparooError::validation(field, "is required")),
        None => Ok(()),
    }
}

/// SurrealDB implementation of the Instance repository.
#[derive(Clone)]
pub struct SurrealInstanceRepository<C: Connection> {
    db: Surreal<C>,
    /// Optional server-side pepper for password hashing.
    pepper: Option<String>,
}

impl<C: Connection> SurrealInstanceRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db, pepper: None }
    }

    pub fn with_pepper(db: Surreal<C>, pepper: String) -> Self {
        Self {
            db,
            pepper: Some(pepper),
        }
    }

    /// Shared owner-scoped listing; `filter` is a static WHERE fragment
    /// whose parameters are supplied through `binds`.
    async fn list_where(
        &self,
        filter: &'static str,
        binds: Vec<(&'static str, String)>,
        pagination: Pagination,
    ) -> SparooResult<PaginatedResult<Instance>> {
        let count_query = format!("SELECT count() AS total FROM instance WHERE {filter} GROUP ALL");
        let mut count_builder = self.db.query(count_query);
        for bind in binds.iter().cloned() {
            count_builder = count_builder.bind(bind);
        }
        let mut count_result = count_builder.await.map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let list_query = format!(
            "SELECT meta::id(id) AS record_id, * FROM instance \
             WHERE {filter} \
             ORDER BY created_at ASC \
             LIMIT $limit START $offset"
        );
        let mut builder = self
            .db
            .query(list_query)
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset));
        for bind in binds {
            builder = builder.bind(bind);
        }
        let mut result = builder.await.map_err(DbError::from)?;

        let rows: Vec<InstanceRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(InstanceRowWithId::try_into_instance)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}

impl<C: Connection> InstanceRepository for SurrealInstanceRepository<C> {
    async fn create(&self, input: CreateInstance) -> SparooResult<Instance> {
        check_required(&input)?;

        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let password_hash = hash_admin_password(&input.admin_password, self.pepper.as_deref())?;

        let result = self
            .db
            .query(
                "CREATE type::record('instance', $id) SET \
                 organization_id = $org_id, project_id = $project_id, \
                 name = $name, engine = $engine, \
                 enable_backups = $enable_backups, \
                 admin_password_hash = $password_hash, \
                 allow_cidrs = $allow_cidrs, \
                 owner_id = $owner_id, status = $status",
            )
            .bind(("id", id_str.clone()))
            .bind(("org_id", input.organization_id.to_string()))
            .bind(("project_id", input.project_id.to_string()))
            .bind(("name", input.name))
            .bind(("engine", input.engine.as_str().to_string()))
            .bind(("enable_backups", input.enable_backups))
            .bind(("password_hash", password_hash))
            .bind(("allow_cidrs", input.allow_cidrs))
            .bind(("owner_id", input.owner_id))
            .bind(("status", InstanceStatus::Pending.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<InstanceRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "instance".into(),
            id: id_str,
        })?;

        debug!(instance_id = %id, "Instance record created");
        Ok(row.into_instance(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> SparooResult<Instance> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('instance', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<InstanceRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "instance".into(),
            id: id_str,
        })?;

        Ok(row.into_instance(id)?)
    }

    async fn update_status(&self, id: Uuid, status: InstanceStatus) -> SparooResult<Instance> {
        let id_str = id.to_string();

        // UPDATE on a missing record id yields no rows; it never creates one.
        let result = self
            .db
            .query(
                "UPDATE type::record('instance', $id) SET \
                 status = $status, updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("status", status.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<InstanceRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "instance".into(),
            id: id_str,
        })?;

        Ok(row.into_instance(id)?)
    }

    async fn find_by_name(&self, project_id: Uuid, name: &str) -> SparooResult<Option<Instance>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM instance \
                 WHERE project_id = $project_id AND name = $name \
                 LIMIT 1",
            )
            .bind(("project_id", project_id.to_string()))
            .bind(("name", name.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<InstanceRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_instance()?)),
            None => Ok(None),
        }
    }

    async fn list_by_project(
        &self,
        owner_id: &str,
        project_id: Uuid,
        pagination: Pagination,
    ) -> SparooResult<PaginatedResult<Instance>> {
        self.list_where(
            "project_id = $project_id AND owner_id = $owner_id",
            vec![
                ("project_id", project_id.to_string()),
                ("owner_id", owner_id.to_string()),
            ],
            pagination,
        )
        .await
    }

    async fn list_by_organization(
        &self,
        owner_id: &str,
        organization_id: Uuid,
        pagination: Pagination,
    ) -> SparooResult<PaginatedResult<Instance>> {
        self.list_where(
            "organization_id = $org_id AND owner_id = $owner_id",
            vec![
                ("org_id", organization_id.to_string()),
                ("owner_id", owner_id.to_string()),
            ],
            pagination,
        )
        .await
    }

    async fn list_by_owner(
        &self,
        owner_id: &str,
        pagination: Pagination,
    ) -> SparooResult<PaginatedResult<Instance>> {
        self.list_where(
            "owner_id = $owner_id",
            vec![("owner_id", owner_id.to_string())],
            pagination,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_salted_per_call() {
        let first = hash_admin_password("s3cret-pw", None).unwrap();
        let second = hash_admin_password("s3cret-pw", None).unwrap();
        assert_ne!(first, second);
        assert!(first.starts_with("$argon2id$"));
    }

    #[test]
    fn correct_password_matches() {
        let hash = hash_admin_password("s3cret-pw", None).unwrap();
        assert!(verify_admin_password("s3cret-pw", &hash, None).unwrap());
        assert!(!verify_admin_password("wrong", &hash, None).unwrap());
    }

    #[test]
    fn pepper_is_applied() {
        let hash = hash_admin_password("s3cret-pw", Some("pepper!")).unwrap();
        assert!(verify_admin_password("s3cret-pw", &hash, Some("pepper!")).unwrap());
        assert!(!verify_admin_password("s3cret-pw", &hash, None).unwrap());
    }

    #[test]
    fn malformed_hash_returns_error() {
        assert!(verify_admin_password("pw", "not-a-hash", None).is_err());
    }

    #[test]
    fn missing_cidrs_rejected_before_persistence() {
        let input = CreateInstance {
            organization_id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            owner_id: "auth0|alice".into(),
            name: "orders".into(),
            engine: DatabaseEngine::Mysql,
            enable_backups: false,
            admin_password: "hunter22".into(),
            allow_cidrs: vec![],
        };
        let err = check_required(&input).unwrap_err();
        assert!(matches!(err, SparooError::Validation { ref field, .. } if field == "allow_cidrs"));
    }
}

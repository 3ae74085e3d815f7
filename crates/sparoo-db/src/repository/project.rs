//! SurrealDB implementation of [`ProjectRepository`].

use chrono::{DateTime, Utc};
use sparoo_core::error::SparooResult;
use sparoo_core::models::project::{CreateProject, Project};
use sparoo_core::repository::{PaginatedResult, Pagination, ProjectRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ProjectRow {
    organization_id: String,
    name: String,
    description: String,
    owner_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProjectRow {
    fn into_project(self, id: Uuid) -> Result<Project, DbError> {
        Ok(Project {
            id,
            organization_id: parse_uuid(&self.organization_id, "organization")?,
            name: self.name,
            description: self.description,
            owner_id: self.owner_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct ProjectRowWithId {
    record_id: String,
    organization_id: String,
    name: String,
    description: String,
    owner_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProjectRowWithId {
    fn try_into_project(self) -> Result<Project, DbError> {
        let id = parse_uuid(&self.record_id, "project")?;
        ProjectRow {
            organization_id: self.organization_id,
            name: self.name,
            description: self.description,
            owner_id: self.owner_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_project(id)
    }
}

/// SurrealDB implementation of the Project repository.
#[derive(Clone)]
pub struct SurrealProjectRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealProjectRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ProjectRepository for SurrealProjectRepository<C> {
    async fn create(&self, input: CreateProject) -> SparooResult<Project> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let org_id_str = input.organization_id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('project', $id) SET \
                 organization_id = $org_id, \
                 name = $name, description = $description, \
                 owner_id = $owner_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("org_id", org_id_str))
            .bind(("name", input.name))
            .bind(("description", input.description))
            .bind(("owner_id", input.owner_id))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ProjectRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "project".into(),
            id: id_str,
        })?;

        Ok(row.into_project(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> SparooResult<Project> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('project', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProjectRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "project".into(),
            id: id_str,
        })?;

        Ok(row.into_project(id)?)
    }

    async fn list_by_organization(
        &self,
        owner_id: &str,
        organization_id: Uuid,
        pagination: Pagination,
    ) -> SparooResult<PaginatedResult<Project>> {
        let org_id_str = organization_id.to_string();
        let owner = owner_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM project \
                 WHERE organization_id = $org_id AND owner_id = $owner_id \
                 GROUP ALL",
            )
            .bind(("org_id", org_id_str.clone()))
            .bind(("owner_id", owner.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM project \
                 WHERE organization_id = $org_id AND owner_id = $owner_id \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("org_id", org_id_str))
            .bind(("owner_id", owner))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProjectRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(ProjectRowWithId::try_into_project)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}

//! Router and request handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sparoo_core::error::SparooError;
use sparoo_core::models::instance::Instance;
use sparoo_core::models::organization::Organization;
use sparoo_core::models::project::Project;
use sparoo_core::repository::{PaginatedResult, Pagination};
use sparoo_db::repository::{
    SurrealInstanceRepository, SurrealOrganizationRepository, SurrealProjectRepository,
};
use sparoo_provision::{
    ClusterClient, CreateInstanceRequest, CreateOrganizationRequest, CreateProjectRequest,
    HierarchyService, OwnershipValidator, ProvisionConfig, ProvisioningService, WorkloadCatalog,
};
use surrealdb::{Connection, Surreal};
use tracing::info;
use uuid::Uuid;

use crate::auth::Actor;
use crate::error::ApiError;

const MAX_PAGE_SIZE: u64 = 100;

pub type Hierarchy<C> =
    HierarchyService<SurrealOrganizationRepository<C>, SurrealProjectRepository<C>>;

pub type Provisioning<C, K> = ProvisioningService<
    SurrealOrganizationRepository<C>,
    SurrealProjectRepository<C>,
    SurrealInstanceRepository<C>,
    K,
>;

/// Shared handler state.
pub struct AppState<C: Connection, K: ClusterClient> {
    pub hierarchy: Arc<Hierarchy<C>>,
    pub provisioning: Arc<Provisioning<C, K>>,
}

impl<C: Connection, K: ClusterClient> Clone for AppState<C, K> {
    fn clone(&self) -> Self {
        Self {
            hierarchy: Arc::clone(&self.hierarchy),
            provisioning: Arc::clone(&self.provisioning),
        }
    }
}

impl<C: Connection, K: ClusterClient> AppState<C, K> {
    /// Wire the services over one database handle.
    pub fn new(
        db: Surreal<C>,
        cluster: K,
        workloads: WorkloadCatalog,
        config: ProvisionConfig,
        pepper: Option<String>,
    ) -> Self {
        let instances = match pepper {
            Some(pepper) => SurrealInstanceRepository::with_pepper(db.clone(), pepper),
            None => SurrealInstanceRepository::new(db.clone()),
        };

        Self {
            hierarchy: Arc::new(HierarchyService::new(
                SurrealOrganizationRepository::new(db.clone()),
                SurrealProjectRepository::new(db.clone()),
            )),
            provisioning: Arc::new(ProvisioningService::new(
                OwnershipValidator::new(
                    SurrealOrganizationRepository::new(db.clone()),
                    SurrealProjectRepository::new(db),
                ),
                instances,
                cluster,
                workloads,
                config,
            )),
        }
    }
}

pub fn router<C, K>(state: AppState<C, K>) -> Router
where
    C: Connection,
    K: ClusterClient + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route(
            "/organizations",
            get(list_organizations::<C, K>).post(create_organization::<C, K>),
        )
        .route(
            "/organizations/{org_id}/projects",
            get(list_projects::<C, K>).post(create_project::<C, K>),
        )
        .route(
            "/organizations/{org_id}/instances",
            get(list_organization_instances::<C, K>),
        )
        .route(
            "/projects/{project_id}/instances",
            get(list_project_instances::<C, K>),
        )
        .route(
            "/instances",
            get(list_owned_instances::<C, K>).post(create_instance::<C, K>),
        )
        .route("/instances/{instance_id}", get(get_instance::<C, K>))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

impl From<PageQuery> for Pagination {
    fn from(query: PageQuery) -> Self {
        let defaults = Pagination::default();
        Pagination {
            offset: query.offset.unwrap_or(defaults.offset),
            limit: query.limit.unwrap_or(defaults.limit).clamp(1, MAX_PAGE_SIZE),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

impl<T> From<PaginatedResult<T>> for ListResponse<T> {
    fn from(page: PaginatedResult<T>) -> Self {
        Self {
            items: page.items,
            total: page.total,
            offset: page.offset,
            limit: page.limit,
        }
    }
}

type Created = (StatusCode, Json<Value>);

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(inner)| inner)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn create_organization<C: Connection, K: ClusterClient + 'static>(
    State(state): State<AppState<C, K>>,
    Actor(actor): Actor,
    payload: Result<Json<CreateOrganizationRequest>, JsonRejection>,
) -> Result<Created, ApiError> {
    let org = state
        .hierarchy
        .create_organization(&actor, body(payload)?)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "id": org.id })),
    ))
}

async fn list_organizations<C: Connection, K: ClusterClient + 'static>(
    State(state): State<AppState<C, K>>,
    Actor(actor): Actor,
    Query(page): Query<PageQuery>,
) -> Result<Json<ListResponse<Organization>>, ApiError> {
    let page = state
        .hierarchy
        .list_organizations(&actor, page.into())
        .await?;
    Ok(Json(page.into()))
}

async fn create_project<C: Connection, K: ClusterClient + 'static>(
    State(state): State<AppState<C, K>>,
    Actor(actor): Actor,
    Path(org_id): Path<Uuid>,
    payload: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> Result<Created, ApiError> {
    let project = state
        .hierarchy
        .create_project(&actor, org_id, body(payload)?)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "id": project.id })),
    ))
}

async fn list_projects<C: Connection, K: ClusterClient + 'static>(
    State(state): State<AppState<C, K>>,
    Actor(actor): Actor,
    Path(org_id): Path<Uuid>,
    Query(page): Query<PageQuery>,
) -> Result<Json<ListResponse<Project>>, ApiError> {
    let page = state
        .hierarchy
        .list_projects(&actor, org_id, page.into())
        .await?;
    Ok(Json(page.into()))
}

/// Run the provisioning pipeline.
///
/// The pipeline runs on its own task so a client disconnect cannot
/// abandon an instance between submission and the status update.
async fn create_instance<C: Connection, K: ClusterClient + 'static>(
    State(state): State<AppState<C, K>>,
    Actor(actor): Actor,
    payload: Result<Json<CreateInstanceRequest>, JsonRejection>,
) -> Result<Created, ApiError> {
    let request = body(payload)?;
    let provisioning = Arc::clone(&state.provisioning);
    let instance = tokio::spawn(async move { provisioning.provision(&actor, request).await })
        .await
        .map_err(|e| SparooError::Internal(format!("provisioning task aborted: {e}")))??;

    info!(instance_id = %instance.id, status = %instance.status, "Instance request completed");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "id": instance.id,
            "status": instance.status,
        })),
    ))
}

async fn get_instance<C: Connection, K: ClusterClient + 'static>(
    State(state): State<AppState<C, K>>,
    Actor(actor): Actor,
    Path(instance_id): Path<Uuid>,
) -> Result<Json<Instance>, ApiError> {
    let instance = state
        .provisioning
        .get_instance(&actor, instance_id)
        .await?;
    Ok(Json(instance))
}

async fn list_project_instances<C: Connection, K: ClusterClient + 'static>(
    State(state): State<AppState<C, K>>,
    Actor(actor): Actor,
    Path(project_id): Path<Uuid>,
    Query(page): Query<PageQuery>,
) -> Result<Json<ListResponse<Instance>>, ApiError> {
    let page = state
        .provisioning
        .list_instances(&actor, project_id, page.into())
        .await?;
    Ok(Json(page.into()))
}

async fn list_organization_instances<C: Connection, K: ClusterClient + 'static>(
    State(state): State<AppState<C, K>>,
    Actor(actor): Actor,
    Path(org_id): Path<Uuid>,
    Query(page): Query<PageQuery>,
) -> Result<Json<ListResponse<Instance>>, ApiError> {
    let page = state
        .provisioning
        .list_organization_instances(&actor, org_id, page.into())
        .await?;
    Ok(Json(page.into()))
}

async fn list_owned_instances<C: Connection, K: ClusterClient + 'static>(
    State(state): State<AppState<C, K>>,
    Actor(actor): Actor,
    Query(page): Query<PageQuery>,
) -> Result<Json<ListResponse<Instance>>, ApiError> {
    let page = state
        .provisioning
        .list_owned_instances(&actor, page.into())
        .await?;
    Ok(Json(page.into()))
}

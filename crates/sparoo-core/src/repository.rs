//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Reads that serve a tenant take
//! the actor identifier so that another actor's records are reported
//! as missing rather than leaked.

use uuid::Uuid;

use crate::error::SparooResult;
use crate::models::{
    instance::{CreateInstance, Instance, InstanceStatus},
    organization::{CreateOrganization, Organization},
    project::{CreateProject, Project},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Organizations & Projects
// ---------------------------------------------------------------------------

pub trait OrganizationRepository: Send + Sync {
    fn create(
        &self,
        input: CreateOrganization,
    ) -> impl Future<Output = SparooResult<Organization>> + Send;
    /// Fetch an organization only if `owner_id` owns it.
    fn get_owned(
        &self,
        owner_id: &str,
        id: Uuid,
    ) -> impl Future<Output = SparooResult<Organization>> + Send;
    fn list_by_owner(
        &self,
        owner_id: &str,
        pagination: Pagination,
    ) -> impl Future<Output = SparooResult<PaginatedResult<Organization>>> + Send;
}

pub trait ProjectRepository: Send + Sync {
    fn create(&self, input: CreateProject) -> impl Future<Output = SparooResult<Project>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = SparooResult<Project>> + Send;
    fn list_by_organization(
        &self,
        owner_id: &str,
        organization_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = SparooResult<PaginatedResult<Project>>> + Send;
}

// ---------------------------------------------------------------------------
// Instances
// ---------------------------------------------------------------------------

pub trait InstanceRepository: Send + Sync {
    /// Persist a new instance with status `Pending`.
    ///
    /// The admin password is hashed before it reaches the store.
    fn create(&self, input: CreateInstance)
    -> impl Future<Output = SparooResult<Instance>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = SparooResult<Instance>> + Send;
    /// The only post-creation mutation: move an instance to `status`.
    fn update_status(
        &self,
        id: Uuid,
        status: InstanceStatus,
    ) -> impl Future<Output = SparooResult<Instance>> + Send;
    /// Case-sensitive name lookup within a project.
    fn find_by_name(
        &self,
        project_id: Uuid,
        name: &str,
    ) -> impl Future<Output = SparooResult<Option<Instance>>> + Send;
    fn list_by_project(
        &self,
        owner_id: &str,
        project_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = SparooResult<PaginatedResult<Instance>>> + Send;
    fn list_by_organization(
        &self,
        owner_id: &str,
        organization_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = SparooResult<PaginatedResult<Instance>>> + Send;
    fn list_by_owner(
        &self,
        owner_id: &str,
        pagination: Pagination,
    ) -> impl Future<Output = SparooResult<PaginatedResult<Instance>>> + Send;
}

//! Organization and project management.

use sparoo_core::error::{SparooError, SparooResult};
use sparoo_core::models::organization::{CreateOrganization, Organization};
use sparoo_core::models::project::{CreateProject, Project};
use sparoo_core::repository::{
    OrganizationRepository, PaginatedResult, Pagination, ProjectRepository,
};
use tracing::info;
use uuid::Uuid;

use crate::request::{CreateOrganizationRequest, CreateProjectRequest};

pub struct HierarchyService<O: OrganizationRepository, P: ProjectRepository> {
    organizations: O,
    projects: P,
}

impl<O: OrganizationRepository, P: ProjectRepository> HierarchyService<O, P> {
    pub fn new(organizations: O, projects: P) -> Self {
        Self {
            organizations,
            projects,
        }
    }

    pub async fn create_organization(
        &self,
        actor: &str,
        request: CreateOrganizationRequest,
    ) -> SparooResult<Organization> {
        require_actor(actor)?;
        let (name, location) = request.validate()?;
        let organization = self
            .organizations
            .create(CreateOrganization {
                name,
                location,
                owner_id: actor.to_string(),
            })
            .await?;
        info!(organization_id = %organization.id, "Organization created");
        Ok(organization)
    }

    pub async fn list_organizations(
        &self,
        actor: &str,
        pagination: Pagination,
    ) -> SparooResult<PaginatedResult<Organization>> {
        require_actor(actor)?;
        self.organizations.list_by_owner(actor, pagination).await
    }

    /// Create a project under an organization the actor owns.
    pub async fn create_project(
        &self,
        actor: &str,
        organization_id: Uuid,
        request: CreateProjectRequest,
    ) -> SparooResult<Project> {
        require_actor(actor)?;
        let (name, description) = request.validate()?;
        self.organizations.get_owned(actor, organization_id).await?;

        let project = self
            .projects
            .create(CreateProject {
                organization_id,
                name,
                description,
                owner_id: actor.to_string(),
            })
            .await?;
        info!(project_id = %project.id, %organization_id, "Project created");
        Ok(project)
    }

    pub async fn list_projects(
        &self,
        actor: &str,
        organization_id: Uuid,
        pagination: Pagination,
    ) -> SparooResult<PaginatedResult<Project>> {
        require_actor(actor)?;
        self.organizations.get_owned(actor, organization_id).await?;
        self.projects
            .list_by_organization(actor, organization_id, pagination)
            .await
    }
}

pub(crate) fn require_actor(actor: &str) -> SparooResult<()> {
    if actor.is_empty() {
        return Err(SparooError::AuthorizationDenied {
            reason: "no authenticated actor".into(),
        });
    }
    Ok(())
}

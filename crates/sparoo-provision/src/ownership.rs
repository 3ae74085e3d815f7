//! Ownership validation for the Organization → Project hierarchy.

use sparoo_core::error::{SparooError, SparooResult};
use sparoo_core::models::organization::Organization;
use sparoo_core::models::project::Project;
use sparoo_core::repository::{OrganizationRepository, ProjectRepository};
use tracing::debug;
use uuid::Uuid;

use crate::hierarchy::require_actor;

/// Confirms an actor may act on a project.
///
/// The organization must be owned by the actor and the project must
/// belong to that organization. A missing record and a record owned by
/// someone else are indistinguishable to the caller.
#[derive(Clone)]
pub struct OwnershipValidator<O: OrganizationRepository, P: ProjectRepository> {
    organizations: O,
    projects: P,
}

impl<O: OrganizationRepository, P: ProjectRepository> OwnershipValidator<O, P> {
    pub fn new(organizations: O, projects: P) -> Self {
        Self {
            organizations,
            projects,
        }
    }

    pub async fn validate(
        &self,
        actor: &str,
        organization_id: Uuid,
        project_id: Uuid,
    ) -> SparooResult<(Organization, Project)> {
        let organization = self.validate_organization(actor, organization_id).await?;

        let project = match self.projects.get_by_id(project_id).await {
            Ok(project) if project.organization_id == organization.id => project,
            Ok(_) | Err(SparooError::NotFound { .. }) => {
                debug!(%project_id, %organization_id, "project missing or outside organization");
                return Err(SparooError::AuthorizationDenied {
                    reason: format!(
                        "project {project_id} is not accessible in organization {organization_id}"
                    ),
                });
            }
            Err(e) => return Err(e),
        };

        Ok((organization, project))
    }

    /// The organization alone must be owned by the actor.
    pub async fn validate_organization(
        &self,
        actor: &str,
        organization_id: Uuid,
    ) -> SparooResult<Organization> {
        require_actor(actor)?;
        match self.organizations.get_owned(actor, organization_id).await {
            Ok(org) => Ok(org),
            Err(SparooError::NotFound { .. }) => {
                debug!(%organization_id, "organization missing or not owned by actor");
                Err(SparooError::AuthorizationDenied {
                    reason: format!("organization {organization_id} is not accessible"),
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Resolve a project by id alone, then apply [`Self::validate`]
    /// with its recorded organization.
    pub async fn validate_project(
        &self,
        actor: &str,
        project_id: Uuid,
    ) -> SparooResult<(Organization, Project)> {
        require_actor(actor)?;
        let organization_id = match self.projects.get_by_id(project_id).await {
            Ok(project) => project.organization_id,
            Err(SparooError::NotFound { .. }) => {
                return Err(SparooError::AuthorizationDenied {
                    reason: format!("project {project_id} is not accessible"),
                });
            }
            Err(e) => return Err(e),
        };
        self.validate(actor, organization_id, project_id).await
    }
}

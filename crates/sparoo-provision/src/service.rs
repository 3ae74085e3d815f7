//! Provisioning orchestration.

use sparoo_core::error::{SparooError, SparooResult};
use sparoo_core::models::instance::{CreateInstance, Instance, InstanceStatus};
use sparoo_core::repository::{
    InstanceRepository, OrganizationRepository, PaginatedResult, Pagination, ProjectRepository,
};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::cluster::ClusterClient;
use crate::config::ProvisionConfig;
use crate::hierarchy::require_actor;
use crate::manifest::ManifestParameters;
use crate::ownership::OwnershipValidator;
use crate::request::CreateInstanceRequest;
use crate::workload::{WorkloadCatalog, WorkloadDefinition};

/// Runs instance creation end to end and serves instance reads.
///
/// Generic over repositories and the cluster client so the pipeline has
/// no dependency on the database crate or a live cluster.
pub struct ProvisioningService<O, P, I, K>
where
    O: OrganizationRepository,
    P: ProjectRepository,
    I: InstanceRepository,
    K: ClusterClient,
{
    ownership: OwnershipValidator<O, P>,
    instances: I,
    cluster: K,
    workloads: WorkloadCatalog,
    config: ProvisionConfig,
}

impl<O, P, I, K> ProvisioningService<O, P, I, K>
where
    O: OrganizationRepository,
    P: ProjectRepository,
    I: InstanceRepository,
    K: ClusterClient,
{
    pub fn new(
        ownership: OwnershipValidator<O, P>,
        instances: I,
        cluster: K,
        workloads: WorkloadCatalog,
        config: ProvisionConfig,
    ) -> Self {
        Self {
            ownership,
            instances,
            cluster,
            workloads,
            config,
        }
    }

    /// Create an instance and, when its engine is backed by a cluster
    /// workload, submit that workload.
    ///
    /// Nothing is persisted unless validation and ownership both pass.
    /// Once the record exists it is never removed: a rendering or
    /// submission failure marks it `failed` and the error is returned.
    pub async fn provision(
        &self,
        actor: &str,
        request: CreateInstanceRequest,
    ) -> SparooResult<Instance> {
        // 1. Schema rules.
        let request = request.validate(self.config.min_password_length)?;

        // 2. The actor must own the organization the project belongs to.
        self.ownership
            .validate(actor, request.organization_id, request.project_id)
            .await?;

        // 3. Best-effort duplicate name check within the project.
        if self.config.reject_duplicate_names
            && self
                .instances
                .find_by_name(request.project_id, &request.name)
                .await?
                .is_some()
        {
            return Err(SparooError::Conflict {
                entity: "instance".into(),
                reason: format!(
                    "an instance named `{}` already exists in project {}",
                    request.name, request.project_id
                ),
            });
        }

        // 4. Persist as pending.
        let instance = self
            .instances
            .create(CreateInstance {
                organization_id: request.organization_id,
                project_id: request.project_id,
                owner_id: actor.to_string(),
                name: request.name,
                engine: request.engine,
                enable_backups: request.enable_backups,
                admin_password: request.admin_password,
                allow_cidrs: request.allow_cidrs,
            })
            .await?;
        info!(
            instance_id = %instance.id,
            project_id = %instance.project_id,
            engine = %instance.engine,
            "Instance recorded as pending"
        );

        // 5. Engines without a workload stop here.
        let Some(definition) = self.workloads.get(instance.engine) else {
            info!(instance_id = %instance.id, "No cluster workload for engine; left pending");
            return Ok(instance);
        };

        // 6. Render, submit and reconcile the stored status.
        match self.submit(&instance, definition).await {
            Ok(()) => {
                let instance = self
                    .instances
                    .update_status(instance.id, InstanceStatus::Running)
                    .await
                    .inspect_err(|update_err| {
                        error!(
                            instance_id = %instance.id,
                            error = %update_err,
                            "Workload accepted but instance could not be marked running"
                        );
                    })?;
                info!(instance_id = %instance.id, "Instance running");
                Ok(instance)
            }
            Err(e) => {
                warn!(instance_id = %instance.id, error = %e, "Provisioning failed");
                if let Err(update_err) = self
                    .instances
                    .update_status(instance.id, InstanceStatus::Failed)
                    .await
                {
                    error!(
                        instance_id = %instance.id,
                        error = %update_err,
                        "Could not mark instance failed"
                    );
                }
                Err(e)
            }
        }
    }

    async fn submit(&self, instance: &Instance, definition: &WorkloadDefinition) -> SparooResult<()> {
        let params = self.workload_parameters(instance);
        let body = definition.build(&params)?;
        self.cluster
            .submit_workload(&definition.kind, &self.config.namespace, body)
            .await?;
        Ok(())
    }

    /// Values exposed to workload templates. The admin credential is
    /// only available as its stored hash.
    fn workload_parameters(&self, instance: &Instance) -> ManifestParameters {
        let pg_hba_rules: Vec<String> = instance
            .allow_cidrs
            .iter()
            .map(|cidr| format!("hostssl all all {cidr} scram-sha-256"))
            .collect();
        let backup_policy = if instance.enable_backups {
            "enabled"
        } else {
            "disabled"
        };

        ManifestParameters::new()
            .with("RESOURCE_NAME", format!("sparoo-{}", instance.id))
            .with("NAMESPACE", self.config.namespace.as_str())
            .with("INSTANCE_ID", instance.id.to_string())
            .with("INSTANCE_NAME", instance.name.as_str())
            .with("ORGANIZATION_ID", instance.organization_id.to_string())
            .with("PROJECT_ID", instance.project_id.to_string())
            .with("ENGINE", instance.engine.as_str())
            .with("ENABLE_BACKUPS", instance.enable_backups)
            .with("BACKUP_POLICY", backup_policy)
            .with("ALLOW_CIDRS", instance.allow_cidrs.clone())
            .with("PG_HBA_RULES", pg_hba_rules)
            .with("ADMIN_PASSWORD_HASH", instance.admin_password_hash.as_str())
    }

    /// Fetch an instance owned by `actor`. Another actor's instance is
    /// reported as missing.
    pub async fn get_instance(&self, actor: &str, id: Uuid) -> SparooResult<Instance> {
        require_actor(actor)?;
        let instance = self.instances.get_by_id(id).await?;
        if instance.owner_id != actor {
            return Err(SparooError::NotFound {
                entity: "instance".into(),
                id: id.to_string(),
            });
        }
        Ok(instance)
    }

    pub async fn list_instances(
        &self,
        actor: &str,
        project_id: Uuid,
        pagination: Pagination,
    ) -> SparooResult<PaginatedResult<Instance>> {
        self.ownership.validate_project(actor, project_id).await?;
        self.instances
            .list_by_project(actor, project_id, pagination)
            .await
    }

    pub async fn list_organization_instances(
        &self,
        actor: &str,
        organization_id: Uuid,
        pagination: Pagination,
    ) -> SparooResult<PaginatedResult<Instance>> {
        self.ownership
            .validate_organization(actor, organization_id)
            .await?;
        self.instances
            .list_by_organization(actor, organization_id, pagination)
            .await
    }

    pub async fn list_owned_instances(
        &self,
        actor: &str,
        pagination: Pagination,
    ) -> SparooResult<PaginatedResult<Instance>> {
        require_actor(actor)?;
        self.instances.list_by_owner(actor, pagination).await
    }
}

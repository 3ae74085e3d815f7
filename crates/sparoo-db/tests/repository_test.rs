//! Integration tests for Organization and Project repository
//! implementations using in-memory SurrealDB.

use sparoo_core::error::SparooError;
use sparoo_core::models::organization::CreateOrganization;
use sparoo_core::models::project::CreateProject;
use sparoo_core::repository::{OrganizationRepository, Pagination, ProjectRepository};
use sparoo_db::repository::{SurrealOrganizationRepository, SurrealProjectRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    sparoo_db::run_migrations(&db).await.unwrap();
    db
}

fn org(name: &str, owner: &str) -> CreateOrganization {
    CreateOrganization {
        name: name.into(),
        location: "eu-west".into(),
        owner_id: owner.into(),
    }
}

// -----------------------------------------------------------------------
// Organization tests
// -----------------------------------------------------------------------

#[tokio::test]
async fn create_and_get_owned_organization() {
    let db = setup().await;
    let repo = SurrealOrganizationRepository::new(db);

    let created = repo.create(org("ACME Corp", "auth0|alice")).await.unwrap();
    assert_eq!(created.name, "ACME Corp");
    assert_eq!(created.location, "eu-west");
    assert_eq!(created.owner_id, "auth0|alice");

    let fetched = repo.get_owned("auth0|alice", created.id).await.unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.name, created.name);
}

#[tokio::test]
async fn organization_hidden_from_other_actor() {
    let db = setup().await;
    let repo = SurrealOrganizationRepository::new(db);

    let created = repo.create(org("ACME Corp", "auth0|alice")).await.unwrap();

    let result = repo.get_owned("auth0|mallory", created.id).await;
    assert!(matches!(result, Err(SparooError::NotFound { .. })));
}

#[tokio::test]
async fn owner_cannot_be_rewritten() {
    let db = setup().await;
    let repo = SurrealOrganizationRepository::new(db.clone());

    let created = repo.create(org("ACME Corp", "auth0|alice")).await.unwrap();

    let result = db
        .query("UPDATE type::record('organization', $id) SET owner_id = 'auth0|mallory'")
        .bind(("id", created.id.to_string()))
        .await
        .unwrap()
        .check();
    assert!(result.is_err(), "owner_id is READONLY");

    let fetched = repo.get_owned("auth0|alice", created.id).await.unwrap();
    assert_eq!(fetched.owner_id, "auth0|alice");
}

#[tokio::test]
async fn list_organizations_by_owner_with_pagination() {
    let db = setup().await;
    let repo = SurrealOrganizationRepository::new(db);

    for i in 0..5 {
        repo.create(org(&format!("Org {i}"), "auth0|alice"))
            .await
            .unwrap();
    }
    repo.create(org("Elsewhere", "auth0|bob")).await.unwrap();

    let page1 = repo
        .list_by_owner(
            "auth0|alice",
            Pagination {
                offset: 0,
                limit: 3,
            },
        )
        .await
        .unwrap();
    assert_eq!(page1.items.len(), 3);
    assert_eq!(page1.total, 5);

    let page2 = repo
        .list_by_owner(
            "auth0|alice",
            Pagination {
                offset: 3,
                limit: 3,
            },
        )
        .await
        .unwrap();
    assert_eq!(page2.items.len(), 2);
    assert!(page2.items.iter().all(|o| o.owner_id == "auth0|alice"));
}

// -----------------------------------------------------------------------
// Project tests
// -----------------------------------------------------------------------

#[tokio::test]
async fn create_and_get_project() {
    let db = setup().await;
    let org_repo = SurrealOrganizationRepository::new(db.clone());
    let project_repo = SurrealProjectRepository::new(db);

    let organization = org_repo.create(org("ACME", "auth0|alice")).await.unwrap();

    let project = project_repo
        .create(CreateProject {
            organization_id: organization.id,
            name: "billing".into(),
            description: String::new(),
            owner_id: "auth0|alice".into(),
        })
        .await
        .unwrap();

    assert_eq!(project.organization_id, organization.id);
    assert_eq!(project.description, "");

    let fetched = project_repo.get_by_id(project.id).await.unwrap();
    assert_eq!(fetched.id, project.id);
    assert_eq!(fetched.organization_id, organization.id);
}

#[tokio::test]
async fn missing_project_is_not_found() {
    let db = setup().await;
    let project_repo = SurrealProjectRepository::new(db);

    let result = project_repo.get_by_id(uuid::Uuid::new_v4()).await;
    assert!(matches!(result, Err(SparooError::NotFound { .. })));
}

#[tokio::test]
async fn list_projects_by_organization() {
    let db = setup().await;
    let org_repo = SurrealOrganizationRepository::new(db.clone());
    let project_repo = SurrealProjectRepository::new(db);

    let org1 = org_repo.create(org("One", "auth0|alice")).await.unwrap();
    let org2 = org_repo.create(org("Two", "auth0|alice")).await.unwrap();

    for i in 0..3 {
        project_repo
            .create(CreateProject {
                organization_id: org1.id,
                name: format!("project-{i}"),
                description: "test".into(),
                owner_id: "auth0|alice".into(),
            })
            .await
            .unwrap();
    }
    project_repo
        .create(CreateProject {
            organization_id: org2.id,
            name: "other".into(),
            description: String::new(),
            owner_id: "auth0|alice".into(),
        })
        .await
        .unwrap();

    let list = project_repo
        .list_by_organization("auth0|alice", org1.id, Pagination::default())
        .await
        .unwrap();
    assert_eq!(list.total, 3);
    assert_eq!(list.items.len(), 3);

    let foreign = project_repo
        .list_by_organization("auth0|bob", org1.id, Pagination::default())
        .await
        .unwrap();
    assert_eq!(foreign.total, 0);
}

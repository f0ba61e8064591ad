//! Integration tests for the service catalog repository.

use helpdesk_core::error::HelpdeskError;
use helpdesk_core::models::catalog::{CreateServiceCatalogItem, UpdateServiceCatalogItem};
use helpdesk_core::models::ticket::TicketCategory;
use helpdesk_core::models::user::Department;
use helpdesk_core::repository::{Pagination, ServiceCatalogRepository};
use helpdesk_db::repository::SurrealServiceCatalogRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

async fn setup() -> SurrealServiceCatalogRepository<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    helpdesk_db::run_migrations(&db).await.unwrap();
    SurrealServiceCatalogRepository::new(db)
}

fn new_item(name: &str) -> CreateServiceCatalogItem {
    CreateServiceCatalogItem {
        name: name.into(),
        description: Some("Replacement laptop request".into()),
        category: TicketCategory::Hardware,
        required_fields: None,
        estimated_resolution_hours: Some(48),
        auto_assign_to_department: Some(Department::SystemNetwork),
    }
}

#[tokio::test]
async fn create_and_get_item() {
    let repo = setup().await;

    let item = repo.create(new_item("Laptop replacement")).await.unwrap();
    assert!(item.is_active);
    assert_eq!(item.category, TicketCategory::Hardware);
    assert_eq!(
        item.auto_assign_to_department,
        Some(Department::SystemNetwork)
    );

    let by_id = repo.get_by_id(item.id).await.unwrap();
    assert_eq!(by_id.name, "Laptop replacement");

    let by_name = repo.get_by_name("Laptop replacement").await.unwrap();
    assert_eq!(by_name.id, item.id);
}

#[tokio::test]
async fn duplicate_name_is_a_conflict() {
    let repo = setup().await;

    repo.create(new_item("Laptop replacement")).await.unwrap();
    let err = repo.create(new_item("Laptop replacement")).await.unwrap_err();

    match err {
        HelpdeskError::Conflict { field } => assert_eq!(field, "name"),
        other => panic!("expected Conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn update_clears_department_hint() {
    let repo = setup().await;
    let item = repo.create(new_item("Laptop replacement")).await.unwrap();

    let updated = repo
        .update(
            item.id,
            UpdateServiceCatalogItem {
                auto_assign_to_department: Some(None),
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(updated.auto_assign_to_department.is_none());
    assert!(!updated.is_active);
}

#[tokio::test]
async fn listing_and_category_filter() {
    let repo = setup().await;

    repo.create(new_item("Laptop replacement")).await.unwrap();
    repo.create(CreateServiceCatalogItem {
        category: TicketCategory::AccountManagement,
        auto_assign_to_department: None,
        ..new_item("New account")
    })
    .await
    .unwrap();
    let retired = repo.create(new_item("Retired offering")).await.unwrap();
    repo.update(
        retired.id,
        UpdateServiceCatalogItem {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let page = repo.list(Pagination::default()).await.unwrap();
    assert_eq!(page.total, 3);

    let active = repo.list_active().await.unwrap();
    assert_eq!(active.len(), 2);

    let hardware = repo
        .list_by_category(TicketCategory::Hardware)
        .await
        .unwrap();
    assert_eq!(hardware.len(), 2);
}

#[tokio::test]
async fn delete_removes_the_record() {
    let repo = setup().await;
    let item = repo.create(new_item("Laptop replacement")).await.unwrap();

    repo.delete(item.id).await.unwrap();

    let err = repo.get_by_id(item.id).await.unwrap_err();
    assert!(matches!(err, HelpdeskError::NotFound { .. }));
}

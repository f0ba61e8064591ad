//! Integration tests for the ticket lifecycle engine.

use helpdesk_core::error::HelpdeskError;
use helpdesk_core::models::catalog::CreateServiceCatalogItem;
use helpdesk_core::models::ticket::{CreateTicket, Priority, TicketCategory, TicketStatus};
use helpdesk_core::models::user::{CreateUser, Department, Role, Site, User};
use helpdesk_core::repository::{ServiceCatalogRepository, TicketRepository, UserRepository};
use helpdesk_db::repository::{
    SurrealServiceCatalogRepository, SurrealTicketRepository, SurrealUserRepository,
};
use helpdesk_tickets::{AutoAssignOutcome, TicketService};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

type Service = TicketService<
    SurrealTicketRepository<Db>,
    SurrealUserRepository<Db>,
    SurrealServiceCatalogRepository<Db>,
>;

struct Fixture {
    service: Service,
    tickets: SurrealTicketRepository<Db>,
    users: SurrealUserRepository<Db>,
    catalog: SurrealServiceCatalogRepository<Db>,
    admin: User,
    manager: User,
    technician: User,
    end_user: User,
}

fn new_user(email: &str, role: Option<Role>, department: Department) -> CreateUser {
    CreateUser {
        email: email.into(),
        password: "correct-horse-battery".into(),
        first_name: "Test".into(),
        last_name: "User".into(),
        department,
        site: Site::LagosOffice,
        role,
        employee_id: None,
    }
}

async fn setup() -> Fixture {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    helpdesk_db::run_migrations(&db).await.unwrap();

    let users = SurrealUserRepository::new(db.clone());
    let tickets = SurrealTicketRepository::new(db.clone());
    let catalog = SurrealServiceCatalogRepository::new(db);

    let admin = users
        .create(new_user(
            "admin@example.com",
            Some(Role::Admin),
            Department::SystemNetwork,
        ))
        .await
        .unwrap();
    let manager = users
        .create(new_user(
            "manager@example.com",
            Some(Role::Manager),
            Department::SystemNetwork,
        ))
        .await
        .unwrap();
    let technician = users
        .create(new_user(
            "tech@example.com",
            Some(Role::Technician),
            Department::SystemNetwork,
        ))
        .await
        .unwrap();
    let end_user = users
        .create(new_user("user@example.com", None, Department::Finance))
        .await
        .unwrap();

    let service = TicketService::new(tickets.clone(), users.clone(), catalog.clone());

    Fixture {
        service,
        tickets,
        users,
        catalog,
        admin,
        manager,
        technician,
        end_user,
    }
}

fn hardware_ticket(creator: Uuid) -> CreateTicket {
    CreateTicket {
        title: "Laptop will not boot".into(),
        description: Some("Black screen since this morning".into()),
        category: TicketCategory::Hardware,
        priority: None,
        created_by: creator,
        assigned_to: None,
        service_catalog_item: None,
        additional_data: None,
        cc_emails: None,
    }
}

// -----------------------------------------------------------------------
// Creation
// -----------------------------------------------------------------------

#[tokio::test]
async fn creation_defaults_to_open_and_medium() {
    let f = setup().await;

    let ticket = f
        .service
        .create_ticket(&f.manager, hardware_ticket(f.end_user.id))
        .await
        .unwrap();

    assert_eq!(ticket.status, TicketStatus::Open);
    assert_eq!(ticket.priority, Priority::Medium);
    assert_eq!(ticket.created_by, f.end_user.id);
    assert!(ticket.resolved_at.is_none());
}

#[tokio::test]
async fn creation_requires_elevated_role() {
    let f = setup().await;

    let err = f
        .service
        .create_ticket(&f.end_user, hardware_ticket(f.end_user.id))
        .await
        .unwrap_err();
    assert!(matches!(err, HelpdeskError::AuthorizationDenied { .. }));

    let err = f
        .service
        .create_ticket(&f.technician, hardware_ticket(f.end_user.id))
        .await
        .unwrap_err();
    assert!(matches!(err, HelpdeskError::AuthorizationDenied { .. }));
}

#[tokio::test]
async fn creation_rejects_unknown_creator() {
    let f = setup().await;

    let err = f
        .service
        .create_ticket(&f.manager, hardware_ticket(Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, HelpdeskError::NotFound { .. }));
}

#[tokio::test]
async fn creation_rejects_deactivated_creator() {
    let f = setup().await;
    f.users.set_active(f.end_user.id, false).await.unwrap();

    let err = f
        .service
        .create_ticket(&f.manager, hardware_ticket(f.end_user.id))
        .await
        .unwrap_err();
    assert!(matches!(err, HelpdeskError::NotFound { .. }));
}

#[tokio::test]
async fn creation_rejects_unknown_assignee_or_catalog_item() {
    let f = setup().await;

    let err = f
        .service
        .create_ticket(
            &f.manager,
            CreateTicket {
                assigned_to: Some(Uuid::new_v4()),
                ..hardware_ticket(f.end_user.id)
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, HelpdeskError::NotFound { .. }));

    let err = f
        .service
        .create_ticket(
            &f.manager,
            CreateTicket {
                service_catalog_item: Some(Uuid::new_v4()),
                ..hardware_ticket(f.end_user.id)
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, HelpdeskError::NotFound { .. }));
}

// -----------------------------------------------------------------------
// Assignment
// -----------------------------------------------------------------------

#[tokio::test]
async fn assignment_overwrites_and_unassignment_clears() {
    let f = setup().await;
    let ticket = f
        .service
        .create_ticket(&f.manager, hardware_ticket(f.end_user.id))
        .await
        .unwrap();

    let assigned = f
        .service
        .assign_ticket(&f.manager, ticket.id, f.technician.id)
        .await
        .unwrap();
    assert_eq!(assigned.assigned_to, Some(f.technician.id));

    // Re-assignment overwrites; no history is kept.
    let reassigned = f
        .service
        .assign_ticket(&f.manager, ticket.id, f.manager.id)
        .await
        .unwrap();
    assert_eq!(reassigned.assigned_to, Some(f.manager.id));

    let cleared = f
        .service
        .unassign_ticket(&f.manager, ticket.id)
        .await
        .unwrap();
    assert!(cleared.assigned_to.is_none());
    assert_eq!(cleared.status, TicketStatus::Open, "status untouched");
}

#[tokio::test]
async fn assigning_to_unknown_user_leaves_ticket_unmodified() {
    let f = setup().await;
    let ticket = f
        .service
        .create_ticket(&f.manager, hardware_ticket(f.end_user.id))
        .await
        .unwrap();

    let err = f
        .service
        .assign_ticket(&f.manager, ticket.id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, HelpdeskError::NotFound { .. }));

    let reloaded = f.tickets.get_by_id(ticket.id).await.unwrap();
    assert!(reloaded.assigned_to.is_none());
}

#[tokio::test]
async fn assigning_unknown_ticket_is_not_found() {
    let f = setup().await;

    let err = f
        .service
        .assign_ticket(&f.manager, Uuid::new_v4(), f.technician.id)
        .await
        .unwrap_err();
    assert!(matches!(err, HelpdeskError::NotFound { .. }));
}

// -----------------------------------------------------------------------
// Status transitions
// -----------------------------------------------------------------------

#[tokio::test]
async fn valid_transition_chain() {
    let f = setup().await;
    let ticket = f
        .service
        .create_ticket(&f.manager, hardware_ticket(f.end_user.id))
        .await
        .unwrap();

    for status in [
        TicketStatus::InProgress,
        TicketStatus::WaitingForUser,
        TicketStatus::InProgress,
        TicketStatus::Resolved,
    ] {
        f.service
            .update_ticket_status(&f.technician, ticket.id, status)
            .await
            .unwrap();
    }

    let resolved = f.tickets.get_by_id(ticket.id).await.unwrap();
    assert_eq!(resolved.status, TicketStatus::Resolved);
    assert!(resolved.resolved_at.is_some());
}

#[tokio::test]
async fn invalid_transition_is_rejected_not_coerced() {
    let f = setup().await;
    let ticket = f
        .service
        .create_ticket(&f.manager, hardware_ticket(f.end_user.id))
        .await
        .unwrap();

    // Open -> Resolved skips the graph.
    let err = f
        .service
        .update_ticket_status(&f.technician, ticket.id, TicketStatus::Resolved)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        HelpdeskError::InvalidTransition {
            from: TicketStatus::Open,
            to: TicketStatus::Resolved
        }
    ));

    let reloaded = f.tickets.get_by_id(ticket.id).await.unwrap();
    assert_eq!(reloaded.status, TicketStatus::Open, "nothing was written");
}

#[tokio::test]
async fn closed_tickets_reject_direct_status_updates() {
    let f = setup().await;
    let ticket = f
        .service
        .create_ticket(&f.manager, hardware_ticket(f.end_user.id))
        .await
        .unwrap();

    f.service
        .update_ticket_status(&f.technician, ticket.id, TicketStatus::InProgress)
        .await
        .unwrap();
    f.service.resolve_ticket(&f.technician, ticket.id).await.unwrap();
    f.service.close_ticket(&f.technician, ticket.id).await.unwrap();

    for target in [TicketStatus::Open, TicketStatus::InProgress] {
        let err = f
            .service
            .update_ticket_status(&f.technician, ticket.id, target)
            .await
            .unwrap_err();
        assert!(matches!(err, HelpdeskError::InvalidTransition { .. }));
    }
}

#[tokio::test]
async fn resolve_stamps_and_reopen_clears() {
    let f = setup().await;
    let ticket = f
        .service
        .create_ticket(&f.manager, hardware_ticket(f.end_user.id))
        .await
        .unwrap();

    f.service
        .update_ticket_status(&f.technician, ticket.id, TicketStatus::InProgress)
        .await
        .unwrap();
    let resolved = f.service.resolve_ticket(&f.technician, ticket.id).await.unwrap();
    assert!(resolved.resolved_at.is_some());

    let reopened = f.service.reopen_ticket(&f.technician, ticket.id).await.unwrap();
    assert_eq!(reopened.status, TicketStatus::Open);
    assert!(reopened.resolved_at.is_none());
}

#[tokio::test]
async fn reopen_works_from_closed_but_not_from_open() {
    let f = setup().await;
    let ticket = f
        .service
        .create_ticket(&f.manager, hardware_ticket(f.end_user.id))
        .await
        .unwrap();

    // Not yet resolved or closed: reopen is meaningless.
    let err = f
        .service
        .reopen_ticket(&f.technician, ticket.id)
        .await
        .unwrap_err();
    assert!(matches!(err, HelpdeskError::InvalidTransition { .. }));

    f.service
        .update_ticket_status(&f.technician, ticket.id, TicketStatus::InProgress)
        .await
        .unwrap();
    f.service.resolve_ticket(&f.technician, ticket.id).await.unwrap();
    f.service.close_ticket(&f.technician, ticket.id).await.unwrap();

    let reopened = f.service.reopen_ticket(&f.technician, ticket.id).await.unwrap();
    assert_eq!(reopened.status, TicketStatus::Open);
    assert!(reopened.resolved_at.is_none());
}

#[tokio::test]
async fn cancel_is_terminal() {
    let f = setup().await;
    let ticket = f
        .service
        .create_ticket(&f.manager, hardware_ticket(f.end_user.id))
        .await
        .unwrap();

    let cancelled = f.service.cancel_ticket(&f.manager, ticket.id).await.unwrap();
    assert_eq!(cancelled.status, TicketStatus::Cancelled);

    let err = f
        .service
        .update_ticket_status(&f.manager, ticket.id, TicketStatus::Open)
        .await
        .unwrap_err();
    assert!(matches!(err, HelpdeskError::InvalidTransition { .. }));

    let err = f.service.reopen_ticket(&f.manager, ticket.id).await.unwrap_err();
    assert!(matches!(err, HelpdeskError::InvalidTransition { .. }));
}

#[tokio::test]
async fn priority_changes_in_any_state() {
    let f = setup().await;
    let ticket = f
        .service
        .create_ticket(&f.manager, hardware_ticket(f.end_user.id))
        .await
        .unwrap();

    f.service.cancel_ticket(&f.manager, ticket.id).await.unwrap();

    // Priority is independent of the lifecycle graph.
    let updated = f
        .service
        .update_ticket_priority(&f.manager, ticket.id, Priority::Urgent)
        .await
        .unwrap();
    assert_eq!(updated.priority, Priority::Urgent);
    assert_eq!(updated.status, TicketStatus::Cancelled);
}

/// The full walkthrough: a user files a hardware ticket, a manager
/// assigns it, the technician works it to resolution, it closes, and
/// a reopen returns it to Open with the resolution stamp cleared.
#[tokio::test]
async fn end_to_end_lifecycle_scenario() {
    let f = setup().await;

    let ticket = f
        .service
        .create_ticket(&f.manager, hardware_ticket(f.end_user.id))
        .await
        .unwrap();
    assert_eq!(ticket.category, TicketCategory::Hardware);

    f.service
        .assign_ticket(&f.manager, ticket.id, f.technician.id)
        .await
        .unwrap();

    f.service
        .update_ticket_status(&f.technician, ticket.id, TicketStatus::InProgress)
        .await
        .unwrap();
    let resolved = f.service.resolve_ticket(&f.technician, ticket.id).await.unwrap();
    assert!(resolved.resolved_at.is_some());

    let closed = f.service.close_ticket(&f.technician, ticket.id).await.unwrap();
    assert_eq!(closed.status, TicketStatus::Closed);

    let reopened = f.service.reopen_ticket(&f.technician, ticket.id).await.unwrap();
    assert_eq!(reopened.status, TicketStatus::Open);
    assert!(reopened.resolved_at.is_none());
    assert_eq!(
        reopened.assigned_to,
        Some(f.technician.id),
        "reopening does not unassign"
    );
}

// -----------------------------------------------------------------------
// Auto-assignment
// -----------------------------------------------------------------------

async fn catalog_item(
    f: &Fixture,
    name: &str,
    department: Option<Department>,
) -> helpdesk_core::models::catalog::ServiceCatalogItem {
    f.catalog
        .create(CreateServiceCatalogItem {
            name: name.into(),
            description: None,
            category: TicketCategory::Hardware,
            required_fields: None,
            estimated_resolution_hours: Some(24),
            auto_assign_to_department: department,
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn auto_assign_picks_least_loaded_technician() {
    let f = setup().await;
    let item = catalog_item(&f, "Laptop replacement", Some(Department::SystemNetwork)).await;

    // A second technician, later in email order.
    let other_tech = f
        .users
        .create(new_user(
            "zz-tech@example.com",
            Some(Role::Technician),
            Department::SystemNetwork,
        ))
        .await
        .unwrap();

    // Load the first technician with one active ticket.
    let busy = f
        .service
        .create_ticket(&f.manager, hardware_ticket(f.end_user.id))
        .await
        .unwrap();
    f.service
        .assign_ticket(&f.manager, busy.id, f.technician.id)
        .await
        .unwrap();

    let ticket = f
        .service
        .create_ticket(
            &f.manager,
            CreateTicket {
                service_catalog_item: Some(item.id),
                ..hardware_ticket(f.end_user.id)
            },
        )
        .await
        .unwrap();

    match f.service.auto_assign_ticket(&f.manager, ticket.id).await.unwrap() {
        AutoAssignOutcome::Assigned(assigned) => {
            assert_eq!(assigned.assigned_to, Some(other_tech.id));
        }
        other => panic!("expected assignment, got {other:?}"),
    }
}

#[tokio::test]
async fn auto_assign_breaks_ties_by_email_and_is_idempotent() {
    let f = setup().await;
    let item = catalog_item(&f, "Laptop replacement", Some(Department::SystemNetwork)).await;

    // Equal load (zero each); "tech@example.com" sorts before
    // "zz-tech@example.com".
    f.users
        .create(new_user(
            "zz-tech@example.com",
            Some(Role::Technician),
            Department::SystemNetwork,
        ))
        .await
        .unwrap();

    let ticket = f
        .service
        .create_ticket(
            &f.manager,
            CreateTicket {
                service_catalog_item: Some(item.id),
                ..hardware_ticket(f.end_user.id)
            },
        )
        .await
        .unwrap();

    for _ in 0..2 {
        match f.service.auto_assign_ticket(&f.manager, ticket.id).await.unwrap() {
            AutoAssignOutcome::Assigned(assigned) => {
                assert_eq!(assigned.assigned_to, Some(f.technician.id));
            }
            other => panic!("expected assignment, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn auto_assign_without_catalog_item_reports_ineligibility() {
    let f = setup().await;

    let ticket = f
        .service
        .create_ticket(&f.manager, hardware_ticket(f.end_user.id))
        .await
        .unwrap();

    match f.service.auto_assign_ticket(&f.manager, ticket.id).await.unwrap() {
        AutoAssignOutcome::NoEligibleAssignee { reason } => {
            assert!(reason.contains("no service catalog item"));
        }
        other => panic!("expected ineligibility, got {other:?}"),
    }

    let reloaded = f.tickets.get_by_id(ticket.id).await.unwrap();
    assert!(reloaded.assigned_to.is_none(), "no-op leaves the ticket");
}

#[tokio::test]
async fn auto_assign_without_department_hint_reports_ineligibility() {
    let f = setup().await;
    let item = catalog_item(&f, "Generic request", None).await;

    let ticket = f
        .service
        .create_ticket(
            &f.manager,
            CreateTicket {
                service_catalog_item: Some(item.id),
                ..hardware_ticket(f.end_user.id)
            },
        )
        .await
        .unwrap();

    match f.service.auto_assign_ticket(&f.manager, ticket.id).await.unwrap() {
        AutoAssignOutcome::NoEligibleAssignee { reason } => {
            assert!(reason.contains("no department hint"));
        }
        other => panic!("expected ineligibility, got {other:?}"),
    }
}

#[tokio::test]
async fn auto_assign_with_no_active_technician_reports_ineligibility() {
    let f = setup().await;
    // Marketing has no technicians at all.
    let item = catalog_item(&f, "Campaign asset", Some(Department::Marketing)).await;

    let ticket = f
        .service
        .create_ticket(
            &f.manager,
            CreateTicket {
                service_catalog_item: Some(item.id),
                ..hardware_ticket(f.end_user.id)
            },
        )
        .await
        .unwrap();

    match f.service.auto_assign_ticket(&f.manager, ticket.id).await.unwrap() {
        AutoAssignOutcome::NoEligibleAssignee { reason } => {
            assert!(reason.contains("no active technician"));
        }
        other => panic!("expected ineligibility, got {other:?}"),
    }
}

// -----------------------------------------------------------------------
// Deletion and queries
// -----------------------------------------------------------------------

#[tokio::test]
async fn deletion_is_admin_only() {
    let f = setup().await;
    let ticket = f
        .service
        .create_ticket(&f.manager, hardware_ticket(f.end_user.id))
        .await
        .unwrap();

    let err = f
        .service
        .delete_ticket(&f.manager, ticket.id)
        .await
        .unwrap_err();
    assert!(matches!(err, HelpdeskError::AuthorizationDenied { .. }));

    f.service.delete_ticket(&f.admin, ticket.id).await.unwrap();
    assert!(matches!(
        f.tickets.get_by_id(ticket.id).await.unwrap_err(),
        HelpdeskError::NotFound { .. }
    ));
}

#[tokio::test]
async fn query_projections_pass_through() {
    let f = setup().await;

    let a = f
        .service
        .create_ticket(
            &f.manager,
            CreateTicket {
                priority: Some(Priority::Urgent),
                ..hardware_ticket(f.end_user.id)
            },
        )
        .await
        .unwrap();
    f.service
        .create_ticket(&f.manager, hardware_ticket(f.end_user.id))
        .await
        .unwrap();

    assert_eq!(
        f.service
            .find_by_status(TicketStatus::Open)
            .await
            .unwrap()
            .len(),
        2
    );
    assert_eq!(
        f.service
            .find_by_category(TicketCategory::Hardware)
            .await
            .unwrap()
            .len(),
        2
    );
    assert_eq!(f.service.unassigned_open().await.unwrap().len(), 2);

    let urgent = f.service.urgent_active().await.unwrap();
    assert_eq!(urgent.len(), 1);
    assert_eq!(urgent[0].id, a.id);

    assert_eq!(
        f.service.count_by_status(TicketStatus::Open).await.unwrap(),
        2
    );
}

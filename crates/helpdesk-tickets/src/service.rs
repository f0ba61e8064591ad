//! Ticket lifecycle service — creation, assignment, status
//! transitions, and auto-assignment orchestration.

use chrono::{DateTime, Utc};
use helpdesk_core::authz::{self, Capability};
use helpdesk_core::error::{HelpdeskError, HelpdeskResult};
use helpdesk_core::models::ticket::{
    CreateTicket, Priority, Ticket, TicketCategory, TicketStatus, UpdateTicket,
};
use helpdesk_core::models::user::User;
use helpdesk_core::repository::{
    PaginatedResult, Pagination, ServiceCatalogRepository, TicketRepository, UserRepository,
};
use tracing::info;
use uuid::Uuid;

use crate::transition;

/// Result of an auto-assignment attempt.
///
/// A ticket without a usable department hint is not an error; the
/// engine reports ineligibility and leaves the ticket untouched.
#[derive(Debug)]
pub enum AutoAssignOutcome {
    Assigned(Ticket),
    NoEligibleAssignee { reason: String },
}

/// Statuses that count towards a technician's current workload.
const ACTIVE_STATUSES: [TicketStatus; 2] = [TicketStatus::Open, TicketStatus::InProgress];

/// Ticket lifecycle engine.
///
/// Generic over the three repository traits; holds no mutable state
/// of its own, so concurrent calls synchronize only through the
/// store.
pub struct TicketService<T, U, C>
where
    T: TicketRepository,
    U: UserRepository,
    C: ServiceCatalogRepository,
{
    tickets: T,
    users: U,
    catalog: C,
}

impl<T, U, C> TicketService<T, U, C>
where
    T: TicketRepository,
    U: UserRepository,
    C: ServiceCatalogRepository,
{
    pub fn new(tickets: T, users: U, catalog: C) -> Self {
        Self {
            tickets,
            users,
            catalog,
        }
    }

    /// Create a ticket.
    ///
    /// The creator must resolve to an existing, active user; an
    /// optional assignee or catalog item reference must also resolve.
    /// Status starts at Open, priority defaults to Medium.
    pub async fn create_ticket(&self, caller: &User, input: CreateTicket) -> HelpdeskResult<Ticket> {
        authz::authorize(caller, Capability::CreateTicket, None)?;

        let creator = self.users.get_by_id(input.created_by).await?;
        if !creator.is_active {
            return Err(HelpdeskError::NotFound {
                entity: "active user".into(),
                id: creator.id.to_string(),
            });
        }

        if let Some(assignee_id) = input.assigned_to {
            self.users.get_by_id(assignee_id).await?;
        }
        if let Some(item_id) = input.service_catalog_item {
            self.catalog.get_by_id(item_id).await?;
        }

        let ticket = self.tickets.create(input).await?;
        info!(ticket_id = %ticket.id, creator = %creator.id, "Ticket created");
        Ok(ticket)
    }

    /// Assign a ticket to a user, overwriting any previous assignee.
    ///
    /// Both the ticket and the user must exist; a missing user leaves
    /// the ticket unmodified.
    pub async fn assign_ticket(
        &self,
        caller: &User,
        ticket_id: Uuid,
        user_id: Uuid,
    ) -> HelpdeskResult<Ticket> {
        self.tickets.get_by_id(ticket_id).await?;
        let assignee = self.users.get_by_id(user_id).await?;

        let ticket = self
            .tickets
            .update(
                ticket_id,
                UpdateTicket {
                    assigned_to: Some(Some(assignee.id)),
                    ..Default::default()
                },
            )
            .await?;

        info!(
            ticket_id = %ticket.id,
            assignee = %assignee.id,
            caller = %caller.id,
            "Ticket assigned"
        );
        Ok(ticket)
    }

    /// Clear a ticket's assignee without changing its status.
    pub async fn unassign_ticket(&self, caller: &User, ticket_id: Uuid) -> HelpdeskResult<Ticket> {
        self.tickets.get_by_id(ticket_id).await?;

        let ticket = self
            .tickets
            .update(
                ticket_id,
                UpdateTicket {
                    assigned_to: Some(None),
                    ..Default::default()
                },
            )
            .await?;

        info!(ticket_id = %ticket.id, caller = %caller.id, "Ticket unassigned");
        Ok(ticket)
    }

    /// Move a ticket along an edge of the transition graph.
    ///
    /// Entering Resolved stamps `resolved_at`; Resolved -> Open
    /// clears it. The status and timestamp land in one store update.
    pub async fn update_ticket_status(
        &self,
        caller: &User,
        ticket_id: Uuid,
        new_status: TicketStatus,
    ) -> HelpdeskResult<Ticket> {
        let ticket = self.tickets.get_by_id(ticket_id).await?;
        transition::check(ticket.status, new_status)?;

        let resolved_at = resolved_at_effect(ticket.status, new_status);
        let updated = self
            .tickets
            .update(
                ticket_id,
                UpdateTicket {
                    status: Some(new_status),
                    resolved_at,
                    ..Default::default()
                },
            )
            .await?;

        info!(
            ticket_id = %updated.id,
            from = %ticket.status,
            to = %new_status,
            caller = %caller.id,
            "Ticket status updated"
        );
        Ok(updated)
    }

    /// Shortcut: transition into Resolved, stamping `resolved_at`.
    pub async fn resolve_ticket(&self, caller: &User, ticket_id: Uuid) -> HelpdeskResult<Ticket> {
        self.update_ticket_status(caller, ticket_id, TicketStatus::Resolved)
            .await
    }

    /// Shortcut: transition into Closed.
    pub async fn close_ticket(&self, caller: &User, ticket_id: Uuid) -> HelpdeskResult<Ticket> {
        self.update_ticket_status(caller, ticket_id, TicketStatus::Closed)
            .await
    }

    /// Shortcut: transition into Cancelled from any non-terminal
    /// state.
    pub async fn cancel_ticket(&self, caller: &User, ticket_id: Uuid) -> HelpdeskResult<Ticket> {
        self.update_ticket_status(caller, ticket_id, TicketStatus::Cancelled)
            .await
    }

    /// Reopen a resolved or closed ticket.
    ///
    /// This is the policy carve-out from the raw graph: Closed has no
    /// outgoing edges under `update_ticket_status`, but a reopen
    /// returns either state to Open and clears `resolved_at`.
    pub async fn reopen_ticket(&self, caller: &User, ticket_id: Uuid) -> HelpdeskResult<Ticket> {
        let ticket = self.tickets.get_by_id(ticket_id).await?;

        if !matches!(
            ticket.status,
            TicketStatus::Resolved | TicketStatus::Closed
        ) {
            return Err(HelpdeskError::InvalidTransition {
                from: ticket.status,
                to: TicketStatus::Open,
            });
        }

        let updated = self
            .tickets
            .update(
                ticket_id,
                UpdateTicket {
                    status: Some(TicketStatus::Open),
                    resolved_at: Some(None),
                    ..Default::default()
                },
            )
            .await?;

        info!(ticket_id = %updated.id, caller = %caller.id, "Ticket reopened");
        Ok(updated)
    }

    /// Set a ticket's priority. Independent of the lifecycle graph:
    /// any priority may be set in any state.
    pub async fn update_ticket_priority(
        &self,
        caller: &User,
        ticket_id: Uuid,
        priority: Priority,
    ) -> HelpdeskResult<Ticket> {
        self.tickets.get_by_id(ticket_id).await?;

        let ticket = self
            .tickets
            .update(
                ticket_id,
                UpdateTicket {
                    priority: Some(priority),
                    ..Default::default()
                },
            )
            .await?;

        info!(ticket_id = %ticket.id, caller = %caller.id, "Ticket priority updated");
        Ok(ticket)
    }

    /// Auto-assign a ticket from its catalog item's department hint.
    ///
    /// Selection rule: among active technicians of the hinted
    /// department, the one with the fewest Open/InProgress assigned
    /// tickets wins; ties break to the lexicographically smallest
    /// email. The choice is deterministic, so repeating the call
    /// against an unchanged store picks the same technician.
    pub async fn auto_assign_ticket(
        &self,
        caller: &User,
        ticket_id: Uuid,
    ) -> HelpdeskResult<AutoAssignOutcome> {
        let ticket = self.tickets.get_by_id(ticket_id).await?;

        let Some(item_id) = ticket.service_catalog_item else {
            return Ok(AutoAssignOutcome::NoEligibleAssignee {
                reason: "ticket has no service catalog item".into(),
            });
        };

        let item = self.catalog.get_by_id(item_id).await?;
        if !item.is_active {
            return Ok(AutoAssignOutcome::NoEligibleAssignee {
                reason: format!("catalog item '{}' is inactive", item.name),
            });
        }

        let Some(department) = item.auto_assign_to_department else {
            return Ok(AutoAssignOutcome::NoEligibleAssignee {
                reason: format!("catalog item '{}' has no department hint", item.name),
            });
        };

        let technicians = self.users.list_active_technicians(department).await?;

        // Candidates arrive ordered by email; strict less-than keeps
        // the earliest candidate on ties.
        let mut best: Option<(u64, &User)> = None;
        for technician in &technicians {
            let load = self
                .tickets
                .count_assigned_in_statuses(technician.id, &ACTIVE_STATUSES)
                .await?;
            if best.as_ref().is_none_or(|(min, _)| load < *min) {
                best = Some((load, technician));
            }
        }
        let Some((_, chosen)) = best else {
            return Ok(AutoAssignOutcome::NoEligibleAssignee {
                reason: format!("no active technician in {department:?}"),
            });
        };

        let updated = self
            .tickets
            .update(
                ticket_id,
                UpdateTicket {
                    assigned_to: Some(Some(chosen.id)),
                    ..Default::default()
                },
            )
            .await?;

        info!(
            ticket_id = %updated.id,
            assignee = %chosen.id,
            caller = %caller.id,
            "Ticket auto-assigned"
        );
        Ok(AutoAssignOutcome::Assigned(updated))
    }

    /// Hard delete a ticket. Admin-only administrative bypass, not a
    /// lifecycle transition.
    pub async fn delete_ticket(&self, caller: &User, ticket_id: Uuid) -> HelpdeskResult<()> {
        authz::authorize(caller, Capability::DeleteTicket, None)?;

        self.tickets.get_by_id(ticket_id).await?;
        self.tickets.delete(ticket_id).await?;
        info!(ticket_id = %ticket_id, caller = %caller.id, "Ticket deleted");
        Ok(())
    }

    // -------------------------------------------------------------------
    // Read-only projections
    // -------------------------------------------------------------------

    pub async fn get_ticket(&self, ticket_id: Uuid) -> HelpdeskResult<Ticket> {
        self.tickets.get_by_id(ticket_id).await
    }

    pub async fn find_by_status(&self, status: TicketStatus) -> HelpdeskResult<Vec<Ticket>> {
        self.tickets.list_by_status(status).await
    }

    pub async fn find_by_category(&self, category: TicketCategory) -> HelpdeskResult<Vec<Ticket>> {
        self.tickets.list_by_category(category).await
    }

    pub async fn find_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> HelpdeskResult<Vec<Ticket>> {
        self.tickets.list_created_between(start, end).await
    }

    pub async fn search(
        &self,
        keyword: &str,
        pagination: Pagination,
    ) -> HelpdeskResult<PaginatedResult<Ticket>> {
        self.tickets.search_by_keyword(keyword, pagination).await
    }

    /// Open tickets nobody is assigned to.
    pub async fn unassigned_open(&self) -> HelpdeskResult<Vec<Ticket>> {
        self.tickets.list_unassigned_open().await
    }

    /// Urgent-priority tickets still in Open or InProgress.
    pub async fn urgent_active(&self) -> HelpdeskResult<Vec<Ticket>> {
        self.tickets.list_urgent_active().await
    }

    pub async fn count_by_status(&self, status: TicketStatus) -> HelpdeskResult<u64> {
        self.tickets.count_by_status(status).await
    }
}

/// The `resolved_at` side effect of a status edge: entering Resolved
/// stamps it, leaving Resolved for Open clears it, anything else
/// leaves it alone.
fn resolved_at_effect(
    from: TicketStatus,
    to: TicketStatus,
) -> Option<Option<DateTime<Utc>>> {
    if to == TicketStatus::Resolved {
        Some(Some(Utc::now()))
    } else if from == TicketStatus::Resolved && to == TicketStatus::Open {
        Some(None)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entering_resolved_stamps_timestamp() {
        let effect = resolved_at_effect(TicketStatus::InProgress, TicketStatus::Resolved);
        assert!(matches!(effect, Some(Some(_))));
    }

    #[test]
    fn reopening_clears_timestamp() {
        let effect = resolved_at_effect(TicketStatus::Resolved, TicketStatus::Open);
        assert!(matches!(effect, Some(None)));
    }

    #[test]
    fn other_edges_leave_timestamp_alone() {
        assert!(resolved_at_effect(TicketStatus::Open, TicketStatus::InProgress).is_none());
        assert!(resolved_at_effect(TicketStatus::Resolved, TicketStatus::Closed).is_none());
    }
}

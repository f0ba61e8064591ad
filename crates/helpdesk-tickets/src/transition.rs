//! The ticket status transition graph.
//!
//! Closed and Cancelled are terminal under direct status updates;
//! reopening a closed ticket is a separate policy operation on
//! [`crate::TicketService`].

use helpdesk_core::error::{HelpdeskError, HelpdeskResult};
use helpdesk_core::models::ticket::TicketStatus;

/// The states directly reachable from `from`.
pub fn allowed_transitions(from: TicketStatus) -> &'static [TicketStatus] {
    use TicketStatus::*;
    match from {
        Open => &[InProgress, Cancelled],
        InProgress => &[WaitingForApproval, WaitingForUser, Resolved, Cancelled],
        WaitingForApproval => &[InProgress, Resolved, Cancelled],
        WaitingForUser => &[InProgress, Resolved, Cancelled],
        Resolved => &[Closed, Open, Cancelled],
        Closed | Cancelled => &[],
    }
}

/// Whether `from -> to` is an edge of the graph.
pub fn is_allowed(from: TicketStatus, to: TicketStatus) -> bool {
    allowed_transitions(from).contains(&to)
}

/// Validate an edge, returning [`HelpdeskError::InvalidTransition`]
/// when it is not in the graph. The requested state is never coerced
/// to a nearby valid one.
pub fn check(from: TicketStatus, to: TicketStatus) -> HelpdeskResult<()> {
    if is_allowed(from, to) {
        Ok(())
    } else {
        Err(HelpdeskError::InvalidTransition { from, to })
    }
}

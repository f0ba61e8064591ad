//! Helpdesk Tickets — the ticket lifecycle engine.
//!
//! Owns the status transition graph, assignment and auto-assignment,
//! priority changes, and the read-only query projections. Durable
//! state lives behind the `helpdesk-core` repository traits.

pub mod service;
pub mod transition;

pub use service::{AutoAssignOutcome, TicketService};

//! Ticket domain model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a ticket.
///
/// [`TicketStatus::Closed`] and [`TicketStatus::Cancelled`] are
/// terminal: no further transition leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketStatus {
    Open,
    InProgress,
    WaitingForApproval,
    WaitingForUser,
    Resolved,
    Closed,
    Cancelled,
}

impl TicketStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TicketStatus::Closed | TicketStatus::Cancelled)
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TicketStatus::Open => "Open",
            TicketStatus::InProgress => "In Progress",
            TicketStatus::WaitingForApproval => "Waiting for Approval",
            TicketStatus::WaitingForUser => "Waiting for User Response",
            TicketStatus::Resolved => "Resolved",
            TicketStatus::Closed => "Closed",
            TicketStatus::Cancelled => "Cancelled",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketCategory {
    AccountManagement,
    Applications,
    Facilities,
    Finance,
    Hardware,
    HumanResources,
    Networking,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TicketStatus,
    pub priority: Priority,
    pub category: TicketCategory,
    /// Creating user; immutable after creation.
    pub created_by: Uuid,
    pub assigned_to: Option<Uuid>,
    pub service_catalog_item: Option<Uuid>,
    /// JSON payload for request-type specific fields.
    pub additional_data: Option<String>,
    /// Comma-separated email list for notifications.
    pub cc_emails: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set when the ticket enters Resolved; cleared on reopen.
    pub resolved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTicket {
    pub title: String,
    pub description: Option<String>,
    pub category: TicketCategory,
    /// Defaults to [`Priority::Medium`] when unset.
    pub priority: Option<Priority>,
    pub created_by: Uuid,
    pub assigned_to: Option<Uuid>,
    pub service_catalog_item: Option<Uuid>,
    pub additional_data: Option<String>,
    pub cc_emails: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateTicket {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TicketStatus>,
    pub priority: Option<Priority>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    pub assigned_to: Option<Option<Uuid>>,
    /// Same set/clear/no-change convention as `assigned_to`.
    pub resolved_at: Option<Option<DateTime<Utc>>>,
    pub additional_data: Option<String>,
    pub cc_emails: Option<String>,
}

//! SurrealDB repository implementations.

mod catalog;
mod ticket;
mod user;

pub use catalog::SurrealServiceCatalogRepository;
pub use ticket::SurrealTicketRepository;
pub use user::{SurrealUserRepository, hash_password, verify_password};

use helpdesk_core::models::ticket::{Priority, TicketCategory, TicketStatus};
use helpdesk_core::models::user::{Department, Role, Site};

use crate::error::DbError;

// Enum <-> string codecs. The stored strings match the ASSERT lists in
// the schema; an unknown value means the row predates (or postdates)
// this binary and is a decode failure, not a panic.

pub(crate) fn role_to_str(role: Role) -> &'static str {
    match role {
        Role::User => "User",
        Role::Technician => "Technician",
        Role::Manager => "Manager",
        Role::Admin => "Admin",
    }
}

pub(crate) fn parse_role(s: &str) -> Result<Role, DbError> {
    match s {
        "User" => Ok(Role::User),
        "Technician" => Ok(Role::Technician),
        "Manager" => Ok(Role::Manager),
        "Admin" => Ok(Role::Admin),
        other => Err(DbError::Decode(format!("unknown role: {other}"))),
    }
}

pub(crate) fn department_to_str(department: Department) -> &'static str {
    match department {
        Department::Finance => "Finance",
        Department::HrAdmin => "HrAdmin",
        Department::Marketing => "Marketing",
        Department::SystemNetwork => "SystemNetwork",
    }
}

pub(crate) fn parse_department(s: &str) -> Result<Department, DbError> {
    match s {
        "Finance" => Ok(Department::Finance),
        "HrAdmin" => Ok(Department::HrAdmin),
        "Marketing" => Ok(Department::Marketing),
        "SystemNetwork" => Ok(Department::SystemNetwork),
        other => Err(DbError::Decode(format!("unknown department: {other}"))),
    }
}

pub(crate) fn site_to_str(site: Site) -> &'static str {
    match site {
        Site::LagosOffice => "LagosOffice",
        Site::AbujaOffice => "AbujaOffice",
    }
}

pub(crate) fn parse_site(s: &str) -> Result<Site, DbError> {
    match s {
        "LagosOffice" => Ok(Site::LagosOffice),
        "AbujaOffice" => Ok(Site::AbujaOffice),
        other => Err(DbError::Decode(format!("unknown site: {other}"))),
    }
}

pub(crate) fn status_to_str(status: TicketStatus) -> &'static str {
    match status {
        TicketStatus::Open => "Open",
        TicketStatus::InProgress => "InProgress",
        TicketStatus::WaitingForApproval => "WaitingForApproval",
        TicketStatus::WaitingForUser => "WaitingForUser",
        TicketStatus::Resolved => "Resolved",
        TicketStatus::Closed => "Closed",
        TicketStatus::Cancelled => "Cancelled",
    }
}

pub(crate) fn parse_status(s: &str) -> Result<TicketStatus, DbError> {
    match s {
        "Open" => Ok(TicketStatus::Open),
        "InProgress" => Ok(TicketStatus::InProgress),
        "WaitingForApproval" => Ok(TicketStatus::WaitingForApproval),
        "WaitingForUser" => Ok(TicketStatus::WaitingForUser),
        "Resolved" => Ok(TicketStatus::Resolved),
        "Closed" => Ok(TicketStatus::Closed),
        "Cancelled" => Ok(TicketStatus::Cancelled),
        other => Err(DbError::Decode(format!("unknown ticket status: {other}"))),
    }
}

pub(crate) fn priority_to_str(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "Low",
        Priority::Medium => "Medium",
        Priority::High => "High",
        Priority::Urgent => "Urgent",
    }
}

pub(crate) fn parse_priority(s: &str) -> Result<Priority, DbError> {
    match s {
        "Low" => Ok(Priority::Low),
        "Medium" => Ok(Priority::Medium),
        "High" => Ok(Priority::High),
        "Urgent" => Ok(Priority::Urgent),
        other => Err(DbError::Decode(format!("unknown priority: {other}"))),
    }
}

pub(crate) fn category_to_str(category: TicketCategory) -> &'static str {
    match category {
        TicketCategory::AccountManagement => "AccountManagement",
        TicketCategory::Applications => "Applications",
        TicketCategory::Facilities => "Facilities",
        TicketCategory::Finance => "Finance",
        TicketCategory::Hardware => "Hardware",
        TicketCategory::HumanResources => "HumanResources",
        TicketCategory::Networking => "Networking",
    }
}

pub(crate) fn parse_category(s: &str) -> Result<TicketCategory, DbError> {
    match s {
        "AccountManagement" => Ok(TicketCategory::AccountManagement),
        "Applications" => Ok(TicketCategory::Applications),
        "Facilities" => Ok(TicketCategory::Facilities),
        "Finance" => Ok(TicketCategory::Finance),
        "Hardware" => Ok(TicketCategory::Hardware),
        "HumanResources" => Ok(TicketCategory::HumanResources),
        "Networking" => Ok(TicketCategory::Networking),
        other => Err(DbError::Decode(format!("unknown category: {other}"))),
    }
}

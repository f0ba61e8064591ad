//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Durable state lives entirely
//! behind these traits; the services above them hold nothing mutable.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::HelpdeskResult;
use crate::models::{
    catalog::{CreateServiceCatalogItem, ServiceCatalogItem, UpdateServiceCatalogItem},
    ticket::{CreateTicket, Ticket, TicketCategory, TicketStatus, UpdateTicket},
    user::{CreateUser, Department, Role, Site, UpdateUser, User},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Credential store
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    /// Persist a new user. The raw password in the input is hashed
    /// before storage; a duplicate email or employee id surfaces as a
    /// Conflict naming the offending field.
    fn create(&self, input: CreateUser) -> impl Future<Output = HelpdeskResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = HelpdeskResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = HelpdeskResult<User>> + Send;
    fn get_by_employee_id(
        &self,
        employee_id: &str,
    ) -> impl Future<Output = HelpdeskResult<User>> + Send;
    fn exists_by_email(&self, email: &str) -> impl Future<Output = HelpdeskResult<bool>> + Send;
    fn exists_by_employee_id(
        &self,
        employee_id: &str,
    ) -> impl Future<Output = HelpdeskResult<bool>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = HelpdeskResult<User>> + Send;
    /// Flip the activation flag without touching anything else.
    fn set_active(
        &self,
        id: Uuid,
        active: bool,
    ) -> impl Future<Output = HelpdeskResult<User>> + Send;
    /// Re-hash and store a new password.
    fn set_password(
        &self,
        id: Uuid,
        new_password: &str,
    ) -> impl Future<Output = HelpdeskResult<()>> + Send;
    /// Stamp `last_login` with the current time.
    fn touch_last_login(&self, id: Uuid) -> impl Future<Output = HelpdeskResult<()>> + Send;
    /// Hard delete. An administrative bypass, not a lifecycle operation.
    fn delete(&self, id: Uuid) -> impl Future<Output = HelpdeskResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = HelpdeskResult<PaginatedResult<User>>> + Send;
    fn list_by_department(
        &self,
        department: Department,
    ) -> impl Future<Output = HelpdeskResult<Vec<User>>> + Send;
    fn list_by_site(&self, site: Site) -> impl Future<Output = HelpdeskResult<Vec<User>>> + Send;
    fn list_by_role(&self, role: Role) -> impl Future<Output = HelpdeskResult<Vec<User>>> + Send;
    fn list_active(&self) -> impl Future<Output = HelpdeskResult<Vec<User>>> + Send;
    fn list_inactive(&self) -> impl Future<Output = HelpdeskResult<Vec<User>>> + Send;
    /// Active users with the Technician role in the given department,
    /// ordered by email for a stable auto-assignment scan.
    fn list_active_technicians(
        &self,
        department: Department,
    ) -> impl Future<Output = HelpdeskResult<Vec<User>>> + Send;
    /// Substring match over first name, last name, and email.
    fn search_by_name(
        &self,
        name: &str,
        pagination: Pagination,
    ) -> impl Future<Output = HelpdeskResult<PaginatedResult<User>>> + Send;
    fn count(&self) -> impl Future<Output = HelpdeskResult<u64>> + Send;
    fn count_active_by_department(
        &self,
        department: Department,
    ) -> impl Future<Output = HelpdeskResult<u64>> + Send;
    fn count_by_role(&self, role: Role) -> impl Future<Output = HelpdeskResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Ticket store
// ---------------------------------------------------------------------------

pub trait TicketRepository: Send + Sync {
    fn create(&self, input: CreateTicket) -> impl Future<Output = HelpdeskResult<Ticket>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = HelpdeskResult<Ticket>> + Send;
    /// Partial update. All named fields land in a single UPDATE so a
    /// status change and its timestamp side effect commit together.
    fn update(
        &self,
        id: Uuid,
        input: UpdateTicket,
    ) -> impl Future<Output = HelpdeskResult<Ticket>> + Send;
    /// Hard delete. An administrative bypass, not a lifecycle operation.
    fn delete(&self, id: Uuid) -> impl Future<Output = HelpdeskResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = HelpdeskResult<PaginatedResult<Ticket>>> + Send;
    fn list_by_creator(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = HelpdeskResult<Vec<Ticket>>> + Send;
    fn list_by_assignee(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = HelpdeskResult<Vec<Ticket>>> + Send;
    fn list_by_status(
        &self,
        status: TicketStatus,
    ) -> impl Future<Output = HelpdeskResult<Vec<Ticket>>> + Send;
    fn list_by_category(
        &self,
        category: TicketCategory,
    ) -> impl Future<Output = HelpdeskResult<Vec<Ticket>>> + Send;
    /// Tickets whose creator belongs to the given department.
    fn list_by_creator_department(
        &self,
        department: Department,
    ) -> impl Future<Output = HelpdeskResult<Vec<Ticket>>> + Send;
    fn list_by_status_in(
        &self,
        statuses: &[TicketStatus],
    ) -> impl Future<Output = HelpdeskResult<Vec<Ticket>>> + Send;
    /// Substring match over title and description.
    fn search_by_keyword(
        &self,
        keyword: &str,
        pagination: Pagination,
    ) -> impl Future<Output = HelpdeskResult<PaginatedResult<Ticket>>> + Send;
    fn list_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl Future<Output = HelpdeskResult<Vec<Ticket>>> + Send;
    /// No assignee AND status Open.
    fn list_unassigned_open(&self) -> impl Future<Output = HelpdeskResult<Vec<Ticket>>> + Send;
    /// Priority Urgent AND status in {Open, InProgress}.
    fn list_urgent_active(&self) -> impl Future<Output = HelpdeskResult<Vec<Ticket>>> + Send;
    fn count_by_status(
        &self,
        status: TicketStatus,
    ) -> impl Future<Output = HelpdeskResult<u64>> + Send;
    /// Tickets assigned to the user whose status is in the given set.
    fn count_assigned_in_statuses(
        &self,
        user_id: Uuid,
        statuses: &[TicketStatus],
    ) -> impl Future<Output = HelpdeskResult<u64>> + Send;
    fn count_created_by(&self, user_id: Uuid) -> impl Future<Output = HelpdeskResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Service catalog
// ---------------------------------------------------------------------------

pub trait ServiceCatalogRepository: Send + Sync {
    fn create(
        &self,
        input: CreateServiceCatalogItem,
    ) -> impl Future<Output = HelpdeskResult<ServiceCatalogItem>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = HelpdeskResult<ServiceCatalogItem>> + Send;
    fn get_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = HelpdeskResult<ServiceCatalogItem>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateServiceCatalogItem,
    ) -> impl Future<Output = HelpdeskResult<ServiceCatalogItem>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = HelpdeskResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = HelpdeskResult<PaginatedResult<ServiceCatalogItem>>> + Send;
    fn list_active(&self) -> impl Future<Output = HelpdeskResult<Vec<ServiceCatalogItem>>> + Send;
    fn list_by_category(
        &self,
        category: TicketCategory,
    ) -> impl Future<Output = HelpdeskResult<Vec<ServiceCatalogItem>>> + Send;
}

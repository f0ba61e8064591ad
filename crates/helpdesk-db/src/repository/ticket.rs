//! SurrealDB implementation of [`TicketRepository`].
//!
//! Status and timestamp side effects arrive together in a single
//! UPDATE statement, so a lifecycle transition and its `resolved_at`
//! stamp cannot be observed half-applied.

use chrono::{DateTime, Utc};
use helpdesk_core::error::HelpdeskResult;
use helpdesk_core::models::ticket::{CreateTicket, Ticket, TicketCategory, TicketStatus, UpdateTicket};
use helpdesk_core::models::user::Department;
use helpdesk_core::repository::{PaginatedResult, Pagination, TicketRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{
    category_to_str, department_to_str, parse_category, parse_priority, parse_status,
    priority_to_str, status_to_str,
};

#[derive(Debug, SurrealValue)]
struct TicketRow {
    title: String,
    description: Option<String>,
    status: String,
    priority: String,
    category: String,
    created_by: String,
    assigned_to: Option<String>,
    service_catalog_item: Option<String>,
    additional_data: Option<String>,
    cc_emails: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    resolved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, SurrealValue)]
struct TicketRowWithId {
    record_id: String,
    title: String,
    description: Option<String>,
    status: String,
    priority: String,
    category: String,
    created_by: String,
    assigned_to: Option<String>,
    service_catalog_item: Option<String>,
    additional_data: Option<String>,
    cc_emails: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    resolved_at: Option<DateTime<Utc>>,
}

fn parse_user_ref(s: &str, what: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::Decode(format!("invalid {what} UUID: {e}")))
}

fn parse_opt_ref(value: Option<String>, what: &str) -> Result<Option<Uuid>, DbError> {
    value.map(|s| parse_user_ref(&s, what)).transpose()
}

impl TicketRow {
    fn into_ticket(self, id: Uuid) -> Result<Ticket, DbError> {
        Ok(Ticket {
            id,
            title: self.title,
            description: self.description,
            status: parse_status(&self.status)?,
            priority: parse_priority(&self.priority)?,
            category: parse_category(&self.category)?,
            created_by: parse_user_ref(&self.created_by, "creator")?,
            assigned_to: parse_opt_ref(self.assigned_to, "assignee")?,
            service_catalog_item: parse_opt_ref(self.service_catalog_item, "catalog item")?,
            additional_data: self.additional_data,
            cc_emails: self.cc_emails,
            created_at: self.created_at,
            updated_at: self.updated_at,
            resolved_at: self.resolved_at,
        })
    }
}

impl TicketRowWithId {
    fn try_into_ticket(self) -> Result<Ticket, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        Ok(Ticket {
            id,
            title: self.title,
            description: self.description,
            status: parse_status(&self.status)?,
            priority: parse_priority(&self.priority)?,
            category: parse_category(&self.category)?,
            created_by: parse_user_ref(&self.created_by, "creator")?,
            assigned_to: parse_opt_ref(self.assigned_to, "assignee")?,
            service_catalog_item: parse_opt_ref(self.service_catalog_item, "catalog item")?,
            additional_data: self.additional_data,
            cc_emails: self.cc_emails,
            created_at: self.created_at,
            updated_at: self.updated_at,
            resolved_at: self.resolved_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the ticket store.
#[derive(Clone)]
pub struct SurrealTicketRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTicketRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn fetch_many(
        &self,
        query: &str,
        binds: Vec<(&'static str, String)>,
    ) -> HelpdeskResult<Vec<Ticket>> {
        let mut builder = self.db.query(query);
        for (key, value) in binds {
            builder = builder.bind((key, value));
        }
        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<TicketRowWithId> = result.take(0).map_err(DbError::from)?;
        let tickets = rows
            .into_iter()
            .map(|row| row.try_into_ticket())
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(tickets)
    }
}

impl<C: Connection> TicketRepository for SurrealTicketRepository<C> {
    async fn create(&self, input: CreateTicket) -> HelpdeskResult<Ticket> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        // Every ticket enters the lifecycle at Open; priority falls
        // back to Medium when the caller does not pick one.
        let priority = input.priority.unwrap_or_default();

        let result = self
            .db
            .query(
                "CREATE type::record('ticket', $id) SET \
                 title = $title, \
                 description = $description, \
                 status = 'Open', \
                 priority = $priority, \
                 category = $category, \
                 created_by = $created_by, \
                 assigned_to = $assigned_to, \
                 service_catalog_item = $service_catalog_item, \
                 additional_data = $additional_data, \
                 cc_emails = $cc_emails, \
                 resolved_at = NONE",
            )
            .bind(("id", id_str.clone()))
            .bind(("title", input.title))
            .bind(("description", input.description))
            .bind(("priority", priority_to_str(priority).to_string()))
            .bind(("category", category_to_str(input.category).to_string()))
            .bind(("created_by", input.created_by.to_string()))
            .bind(("assigned_to", input.assigned_to.map(|u| u.to_string())))
            .bind((
                "service_catalog_item",
                input.service_catalog_item.map(|c| c.to_string()),
            ))
            .bind(("additional_data", input.additional_data))
            .bind(("cc_emails", input.cc_emails))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(DbError::from)?;

        let rows: Vec<TicketRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "ticket".into(),
            id: id_str,
        })?;

        Ok(row.into_ticket(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> HelpdeskResult<Ticket> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('ticket', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TicketRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "ticket".into(),
            id: id_str,
        })?;

        Ok(row.into_ticket(id)?)
    }

    async fn update(&self, id: Uuid, input: UpdateTicket) -> HelpdeskResult<Ticket> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.title.is_some() {
            sets.push("title = $title");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        if input.priority.is_some() {
            sets.push("priority = $priority");
        }
        if input.assigned_to.is_some() {
            sets.push("assigned_to = $assigned_to");
        }
        if input.resolved_at.is_some() {
            sets.push("resolved_at = $resolved_at");
        }
        if input.additional_data.is_some() {
            sets.push("additional_data = $additional_data");
        }
        if input.cc_emails.is_some() {
            sets.push("cc_emails = $cc_emails");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('ticket', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(title) = input.title {
            builder = builder.bind(("title", title));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(status) = input.status {
            builder = builder.bind(("status", status_to_str(status).to_string()));
        }
        if let Some(priority) = input.priority {
            builder = builder.bind(("priority", priority_to_str(priority).to_string()));
        }
        if let Some(assigned_to) = input.assigned_to {
            // Option<Option<Uuid>>: Some(Some(v)) = set, Some(None) = clear
            builder = builder.bind(("assigned_to", assigned_to.map(|u| u.to_string())));
        }
        if let Some(resolved_at) = input.resolved_at {
            builder = builder.bind(("resolved_at", resolved_at));
        }
        if let Some(additional_data) = input.additional_data {
            builder = builder.bind(("additional_data", additional_data));
        }
        if let Some(cc_emails) = input.cc_emails {
            builder = builder.bind(("cc_emails", cc_emails));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(DbError::from)?;

        let rows: Vec<TicketRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "ticket".into(),
            id: id_str,
        })?;

        Ok(row.into_ticket(id)?)
    }

    async fn delete(&self, id: Uuid) -> HelpdeskResult<()> {
        self.db
            .query("DELETE type::record('ticket', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> HelpdeskResult<PaginatedResult<Ticket>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM ticket GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM ticket \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TicketRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_ticket())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn list_by_creator(&self, user_id: Uuid) -> HelpdeskResult<Vec<Ticket>> {
        self.fetch_many(
            "SELECT meta::id(id) AS record_id, * FROM ticket \
             WHERE created_by = $user ORDER BY created_at ASC",
            vec![("user", user_id.to_string())],
        )
        .await
    }

    async fn list_by_assignee(&self, user_id: Uuid) -> HelpdeskResult<Vec<Ticket>> {
        self.fetch_many(
            "SELECT meta::id(id) AS record_id, * FROM ticket \
             WHERE assigned_to = $user ORDER BY created_at ASC",
            vec![("user", user_id.to_string())],
        )
        .await
    }

    async fn list_by_status(&self, status: TicketStatus) -> HelpdeskResult<Vec<Ticket>> {
        self.fetch_many(
            "SELECT meta::id(id) AS record_id, * FROM ticket \
             WHERE status = $status ORDER BY created_at ASC",
            vec![("status", status_to_str(status).to_string())],
        )
        .await
    }

    async fn list_by_category(&self, category: TicketCategory) -> HelpdeskResult<Vec<Ticket>> {
        self.fetch_many(
            "SELECT meta::id(id) AS record_id, * FROM ticket \
             WHERE category = $category ORDER BY created_at ASC",
            vec![("category", category_to_str(category).to_string())],
        )
        .await
    }

    async fn list_by_creator_department(
        &self,
        department: Department,
    ) -> HelpdeskResult<Vec<Ticket>> {
        self.fetch_many(
            "SELECT meta::id(id) AS record_id, * FROM ticket \
             WHERE created_by IN (SELECT VALUE meta::id(id) FROM user \
             WHERE department = $department) \
             ORDER BY created_at ASC",
            vec![("department", department_to_str(department).to_string())],
        )
        .await
    }

    async fn list_by_status_in(&self, statuses: &[TicketStatus]) -> HelpdeskResult<Vec<Ticket>> {
        let status_strs: Vec<String> = statuses
            .iter()
            .map(|s| status_to_str(*s).to_string())
            .collect();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM ticket \
                 WHERE status IN $statuses ORDER BY created_at ASC",
            )
            .bind(("statuses", status_strs))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TicketRowWithId> = result.take(0).map_err(DbError::from)?;
        let tickets = rows
            .into_iter()
            .map(|row| row.try_into_ticket())
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(tickets)
    }

    async fn search_by_keyword(
        &self,
        keyword: &str,
        pagination: Pagination,
    ) -> HelpdeskResult<PaginatedResult<Ticket>> {
        let predicate = "string::contains(title, $keyword) \
             OR (description != NONE AND string::contains(description, $keyword))";

        let mut count_result = self
            .db
            .query(format!(
                "SELECT count() AS total FROM ticket WHERE {predicate} GROUP ALL"
            ))
            .bind(("keyword", keyword.to_string()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(format!(
                "SELECT meta::id(id) AS record_id, * FROM ticket \
                 WHERE {predicate} \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset"
            ))
            .bind(("keyword", keyword.to_string()))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TicketRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_ticket())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn list_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> HelpdeskResult<Vec<Ticket>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM ticket \
                 WHERE created_at >= $start AND created_at <= $end \
                 ORDER BY created_at ASC",
            )
            .bind(("start", start))
            .bind(("end", end))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TicketRowWithId> = result.take(0).map_err(DbError::from)?;
        let tickets = rows
            .into_iter()
            .map(|row| row.try_into_ticket())
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(tickets)
    }

    async fn list_unassigned_open(&self) -> HelpdeskResult<Vec<Ticket>> {
        self.fetch_many(
            "SELECT meta::id(id) AS record_id, * FROM ticket \
             WHERE assigned_to = NONE AND status = 'Open' \
             ORDER BY created_at ASC",
            vec![],
        )
        .await
    }

    async fn list_urgent_active(&self) -> HelpdeskResult<Vec<Ticket>> {
        self.fetch_many(
            "SELECT meta::id(id) AS record_id, * FROM ticket \
             WHERE priority = 'Urgent' \
             AND status IN ['Open', 'InProgress'] \
             ORDER BY created_at ASC",
            vec![],
        )
        .await
    }

    async fn count_by_status(&self, status: TicketStatus) -> HelpdeskResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM ticket \
                 WHERE status = $status GROUP ALL",
            )
            .bind(("status", status_to_str(status).to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }

    async fn count_assigned_in_statuses(
        &self,
        user_id: Uuid,
        statuses: &[TicketStatus],
    ) -> HelpdeskResult<u64> {
        let status_strs: Vec<String> = statuses
            .iter()
            .map(|s| status_to_str(*s).to_string())
            .collect();

        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM ticket \
                 WHERE assigned_to = $user AND status IN $statuses \
                 GROUP ALL",
            )
            .bind(("user", user_id.to_string()))
            .bind(("statuses", status_strs))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }

    async fn count_created_by(&self, user_id: Uuid) -> HelpdeskResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM ticket \
                 WHERE created_by = $user GROUP ALL",
            )
            .bind(("user", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}

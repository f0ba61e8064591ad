//! Service catalog domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::ticket::TicketCategory;
use crate::models::user::Department;

/// A requestable service type that tickets may reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceCatalogItem {
    pub id: Uuid,
    /// Unique catalog name.
    pub name: String,
    pub description: Option<String>,
    pub category: TicketCategory,
    /// JSON description of extra fields the request type expects.
    pub required_fields: Option<String>,
    pub is_active: bool,
    pub estimated_resolution_hours: Option<u32>,
    /// Department hint driving auto-assignment of referencing tickets.
    pub auto_assign_to_department: Option<Department>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateServiceCatalogItem {
    pub name: String,
    pub description: Option<String>,
    pub category: TicketCategory,
    pub required_fields: Option<String>,
    pub estimated_resolution_hours: Option<u32>,
    pub auto_assign_to_department: Option<Department>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateServiceCatalogItem {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<TicketCategory>,
    pub required_fields: Option<String>,
    pub is_active: Option<bool>,
    pub estimated_resolution_hours: Option<Option<u32>>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    pub auto_assign_to_department: Option<Option<Department>>,
}

//! SurrealDB implementation of [`ServiceCatalogRepository`].

use chrono::{DateTime, Utc};
use helpdesk_core::error::HelpdeskResult;
use helpdesk_core::models::catalog::{
    CreateServiceCatalogItem, ServiceCatalogItem, UpdateServiceCatalogItem,
};
use helpdesk_core::models::ticket::TicketCategory;
use helpdesk_core::repository::{PaginatedResult, Pagination, ServiceCatalogRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::{DbError, map_write_error};
use crate::repository::{category_to_str, department_to_str, parse_category, parse_department};

#[derive(Debug, SurrealValue)]
struct CatalogRow {
    name: String,
    description: Option<String>,
    category: String,
    required_fields: Option<String>,
    is_active: bool,
    estimated_resolution_hours: Option<u32>,
    auto_assign_to_department: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct CatalogRowWithId {
    record_id: String,
    name: String,
    description: Option<String>,
    category: String,
    required_fields: Option<String>,
    is_active: bool,
    estimated_resolution_hours: Option<u32>,
    auto_assign_to_department: Option<String>,
    created_at: DateTime<Utc>,
}

impl CatalogRow {
    fn into_item(self, id: Uuid) -> Result<ServiceCatalogItem, DbError> {
        Ok(ServiceCatalogItem {
            id,
            name: self.name,
            description: self.description,
            category: parse_category(&self.category)?,
            required_fields: self.required_fields,
            is_active: self.is_active,
            estimated_resolution_hours: self.estimated_resolution_hours,
            auto_assign_to_department: self
                .auto_assign_to_department
                .as_deref()
                .map(parse_department)
                .transpose()?,
            created_at: self.created_at,
        })
    }
}

impl CatalogRowWithId {
    fn try_into_item(self) -> Result<ServiceCatalogItem, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        Ok(ServiceCatalogItem {
            id,
            name: self.name,
            description: self.description,
            category: parse_category(&self.category)?,
            required_fields: self.required_fields,
            is_active: self.is_active,
            estimated_resolution_hours: self.estimated_resolution_hours,
            auto_assign_to_department: self
                .auto_assign_to_department
                .as_deref()
                .map(parse_department)
                .transpose()?,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the service catalog.
#[derive(Clone)]
pub struct SurrealServiceCatalogRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealServiceCatalogRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn fetch_many(
        &self,
        query: &str,
        binds: Vec<(&'static str, String)>,
    ) -> HelpdeskResult<Vec<ServiceCatalogItem>> {
        let mut builder = self.db.query(query);
        for (key, value) in binds {
            builder = builder.bind((key, value));
        }
        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<CatalogRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_item())
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(items)
    }
}

impl<C: Connection> ServiceCatalogRepository for SurrealServiceCatalogRepository<C> {
    async fn create(&self, input: CreateServiceCatalogItem) -> HelpdeskResult<ServiceCatalogItem> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('service_catalog_item', $id) SET \
                 name = $name, \
                 description = $description, \
                 category = $category, \
                 required_fields = $required_fields, \
                 is_active = true, \
                 estimated_resolution_hours = $estimated_resolution_hours, \
                 auto_assign_to_department = $auto_assign_to_department",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("description", input.description))
            .bind(("category", category_to_str(input.category).to_string()))
            .bind(("required_fields", input.required_fields))
            .bind((
                "estimated_resolution_hours",
                input.estimated_resolution_hours,
            ))
            .bind((
                "auto_assign_to_department",
                input
                    .auto_assign_to_department
                    .map(|d| department_to_str(d).to_string()),
            ))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(map_write_error)?;

        let rows: Vec<CatalogRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "service_catalog_item".into(),
            id: id_str,
        })?;

        Ok(row.into_item(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> HelpdeskResult<ServiceCatalogItem> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('service_catalog_item', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CatalogRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "service_catalog_item".into(),
            id: id_str,
        })?;

        Ok(row.into_item(id)?)
    }

    async fn get_by_name(&self, name: &str) -> HelpdeskResult<ServiceCatalogItem> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM service_catalog_item WHERE name = $name",
            )
            .bind(("name", name.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CatalogRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "service_catalog_item".into(),
            id: format!("name={name}"),
        })?;

        Ok(row.try_into_item()?)
    }

    async fn update(
        &self,
        id: Uuid,
        input: UpdateServiceCatalogItem,
    ) -> HelpdeskResult<ServiceCatalogItem> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.category.is_some() {
            sets.push("category = $category");
        }
        if input.required_fields.is_some() {
            sets.push("required_fields = $required_fields");
        }
        if input.is_active.is_some() {
            sets.push("is_active = $is_active");
        }
        if input.estimated_resolution_hours.is_some() {
            sets.push("estimated_resolution_hours = $estimated_resolution_hours");
        }
        if input.auto_assign_to_department.is_some() {
            sets.push("auto_assign_to_department = $auto_assign_to_department");
        }

        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        let query = format!(
            "UPDATE type::record('service_catalog_item', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(category) = input.category {
            builder = builder.bind(("category", category_to_str(category).to_string()));
        }
        if let Some(required_fields) = input.required_fields {
            builder = builder.bind(("required_fields", required_fields));
        }
        if let Some(is_active) = input.is_active {
            builder = builder.bind(("is_active", is_active));
        }
        if let Some(hours) = input.estimated_resolution_hours {
            // Option<Option<u32>>: Some(Some(v)) = set, Some(None) = clear
            builder = builder.bind(("estimated_resolution_hours", hours));
        }
        if let Some(department) = input.auto_assign_to_department {
            builder = builder.bind((
                "auto_assign_to_department",
                department.map(|d| department_to_str(d).to_string()),
            ));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(map_write_error)?;

        let rows: Vec<CatalogRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "service_catalog_item".into(),
            id: id_str,
        })?;

        Ok(row.into_item(id)?)
    }

    async fn delete(&self, id: Uuid) -> HelpdeskResult<()> {
        self.db
            .query("DELETE type::record('service_catalog_item', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(
        &self,
        pagination: Pagination,
    ) -> HelpdeskResult<PaginatedResult<ServiceCatalogItem>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM service_catalog_item GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM service_catalog_item \
                 ORDER BY name ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CatalogRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_item())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn list_active(&self) -> HelpdeskResult<Vec<ServiceCatalogItem>> {
        self.fetch_many(
            "SELECT meta::id(id) AS record_id, * FROM service_catalog_item \
             WHERE is_active = true ORDER BY name ASC",
            vec![],
        )
        .await
    }

    async fn list_by_category(
        &self,
        category: TicketCategory,
    ) -> HelpdeskResult<Vec<ServiceCatalogItem>> {
        self.fetch_many(
            "SELECT meta::id(id) AS record_id, * FROM service_catalog_item \
             WHERE category = $category ORDER BY name ASC",
            vec![("category", category_to_str(category).to_string())],
        )
        .await
    }
}

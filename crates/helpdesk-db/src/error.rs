//! Database-specific error types and conversions.

use helpdesk_core::error::HelpdeskError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Row decode failed: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Unique index violation on {field}")]
    Conflict { field: String },
}

impl From<DbError> for HelpdeskError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => HelpdeskError::NotFound { entity, id },
            DbError::Conflict { field } => HelpdeskError::Conflict { field },
            other => HelpdeskError::Database(other.to_string()),
        }
    }
}

/// Map a write-path error to [`DbError::Conflict`] when it names one
/// of the schema's unique indexes, so concurrent duplicate creations
/// surface as a client conflict rather than a generic store failure.
pub(crate) fn map_write_error(err: surrealdb::Error) -> DbError {
    let msg = err.to_string();
    for (index, field) in [
        ("idx_user_email", "email"),
        ("idx_user_employee_id", "employee_id"),
        ("idx_catalog_name", "name"),
    ] {
        if msg.contains(index) {
            return DbError::Conflict {
                field: field.into(),
            };
        }
    }
    DbError::Surreal(err)
}

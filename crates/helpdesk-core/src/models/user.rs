//! User domain model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access level of a user, in increasing order of capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Can create and view own tickets.
    User,
    /// Can be assigned and resolve tickets.
    Technician,
    /// Can approve and manage department tickets.
    Manager,
    /// Full system access.
    Admin,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::User, Role::Technician, Role::Manager, Role::Admin];
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::User => "User",
            Role::Technician => "Technician",
            Role::Manager => "Manager",
            Role::Admin => "Admin",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Department {
    /// Financial operations and requests.
    Finance,
    /// Human resources and administration.
    HrAdmin,
    /// Marketing and communications.
    Marketing,
    /// IT systems and network management.
    SystemNetwork,
}

impl Department {
    pub const ALL: [Department; 4] = [
        Department::Finance,
        Department::HrAdmin,
        Department::Marketing,
        Department::SystemNetwork,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Site {
    LagosOffice,
    AbujaOffice,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Unique login identifier; compared case-sensitively.
    pub email: String,
    /// Argon2id PHC-format hash.
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub department: Department,
    pub site: Site,
    pub role: Role,
    pub is_active: bool,
    /// Unique when present.
    pub employee_id: Option<String>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub email: String,
    /// Raw password (hashed with Argon2id before storage).
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub department: Department,
    pub site: Site,
    /// Defaults to [`Role::User`] when unset.
    pub role: Option<Role>,
    pub employee_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub department: Option<Department>,
    pub site: Option<Site>,
    pub role: Option<Role>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    pub employee_id: Option<Option<String>>,
}

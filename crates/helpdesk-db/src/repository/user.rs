//! SurrealDB implementation of [`UserRepository`].
//!
//! Password hashing uses Argon2id with OWASP-recommended parameters
//! (memory: 19 MiB, iterations: 2, parallelism: 1). Salt is randomly
//! generated per hash. An optional pepper (server-side secret) can be
//! provided at construction time.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};
use chrono::{DateTime, Utc};
use helpdesk_core::error::HelpdeskResult;
use helpdesk_core::models::user::{CreateUser, Department, Role, Site, UpdateUser, User};
use helpdesk_core::repository::{PaginatedResult, Pagination, UserRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::{DbError, map_write_error};
use crate::repository::{
    department_to_str, parse_department, parse_role, parse_site, role_to_str, site_to_str,
};

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct UserRow {
    email: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    department: String,
    site: String,
    role: String,
    is_active: bool,
    employee_id: Option<String>,
    last_login: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: String,
    email: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    department: String,
    site: String,
    role: String,
    is_active: bool,
    employee_id: Option<String>,
    last_login: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self, id: Uuid) -> Result<User, DbError> {
        Ok(User {
            id,
            email: self.email,
            password_hash: self.password_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            department: parse_department(&self.department)?,
            site: parse_site(&self.site)?,
            role: parse_role(&self.role)?,
            is_active: self.is_active,
            employee_id: self.employee_id,
            last_login: self.last_login,
            created_at: self.created_at,
        })
    }
}

impl UserRowWithId {
    fn try_into_user(self) -> Result<User, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        Ok(User {
            id,
            email: self.email,
            password_hash: self.password_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            department: parse_department(&self.department)?,
            site: parse_site(&self.site)?,
            role: parse_role(&self.role)?,
            is_active: self.is_active,
            employee_id: self.employee_id,
            last_login: self.last_login,
            created_at: self.created_at,
        })
    }
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// Hash a password with Argon2id using OWASP-recommended parameters.
///
/// If a pepper is provided, it is prepended to the password before
/// hashing. The salt is randomly generated for each call.
pub fn hash_password(password: &str, pepper: Option<&str>) -> Result<String, DbError> {
    // OWASP ASVS recommended: m=19456 (19 MiB), t=2, p=1
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| DbError::Decode(format!("argon2 params error: {e}")))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let peppered: String;
    let input = match pepper {
        Some(p) => {
            peppered = format!("{p}{password}");
            peppered.as_bytes()
        }
        None => password.as_bytes(),
    };

    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let hash = argon2
        .hash_password(input, &salt)
        .map_err(|e| DbError::Decode(format!("password hash error: {e}")))?;

    Ok(hash.to_string())
}

/// Verify a password against an Argon2id hash.
///
/// Public for use by the auth layer.
pub fn verify_password(password: &str, hash: &str, pepper: Option<&str>) -> Result<bool, DbError> {
    use argon2::PasswordVerifier;

    let peppered: String;
    let input = match pepper {
        Some(p) => {
            peppered = format!("{p}{password}");
            peppered.as_bytes()
        }
        None => password.as_bytes(),
    };

    let parsed_hash = argon2::PasswordHash::new(hash)
        .map_err(|e| DbError::Decode(format!("invalid hash format: {e}")))?;

    let argon2 = Argon2::default();
    match argon2.verify_password(input, &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(DbError::Decode(format!("verify error: {e}"))),
    }
}

/// SurrealDB implementation of the credential store.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
    /// Optional server-side pepper for password hashing.
    pepper: Option<String>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db, pepper: None }
    }

    pub fn with_pepper(db: Surreal<C>, pepper: String) -> Self {
        Self {
            db,
            pepper: Some(pepper),
        }
    }

    async fn fetch_many(&self, query: &str, binds: Vec<(&'static str, String)>) -> HelpdeskResult<Vec<User>> {
        let mut builder = self.db.query(query);
        for (key, value) in binds {
            builder = builder.bind((key, value));
        }
        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let users = rows
            .into_iter()
            .map(|row| row.try_into_user())
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(users)
    }

    async fn fetch_count(&self, query: &str, binds: Vec<(&'static str, String)>) -> HelpdeskResult<u64> {
        let mut builder = self.db.query(query);
        for (key, value) in binds {
            builder = builder.bind((key, value));
        }
        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> HelpdeskResult<User> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let password_hash = hash_password(&input.password, self.pepper.as_deref())?;
        let role = input.role.unwrap_or(Role::User);

        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 email = $email, \
                 password_hash = $password_hash, \
                 first_name = $first_name, last_name = $last_name, \
                 department = $department, site = $site, \
                 role = $role, \
                 is_active = true, \
                 employee_id = $employee_id, \
                 last_login = NONE",
            )
            .bind(("id", id_str.clone()))
            .bind(("email", input.email))
            .bind(("password_hash", password_hash))
            .bind(("first_name", input.first_name))
            .bind(("last_name", input.last_name))
            .bind(("department", department_to_str(input.department).to_string()))
            .bind(("site", site_to_str(input.site).to_string()))
            .bind(("role", role_to_str(role).to_string()))
            .bind(("employee_id", input.employee_id))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(map_write_error)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> HelpdeskResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('user', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn get_by_email(&self, email: &str) -> HelpdeskResult<User> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE email = $email",
            )
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: format!("email={email}"),
        })?;

        Ok(row.try_into_user()?)
    }

    async fn get_by_employee_id(&self, employee_id: &str) -> HelpdeskResult<User> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE employee_id = $employee_id",
            )
            .bind(("employee_id", employee_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: format!("employee_id={employee_id}"),
        })?;

        Ok(row.try_into_user()?)
    }

    async fn exists_by_email(&self, email: &str) -> HelpdeskResult<bool> {
        let total = self
            .fetch_count(
                "SELECT count() AS total FROM user \
                 WHERE email = $email GROUP ALL",
                vec![("email", email.to_string())],
            )
            .await?;
        Ok(total > 0)
    }

    async fn exists_by_employee_id(&self, employee_id: &str) -> HelpdeskResult<bool> {
        let total = self
            .fetch_count(
                "SELECT count() AS total FROM user \
                 WHERE employee_id = $employee_id GROUP ALL",
                vec![("employee_id", employee_id.to_string())],
            )
            .await?;
        Ok(total > 0)
    }

    async fn update(&self, id: Uuid, input: UpdateUser) -> HelpdeskResult<User> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.email.is_some() {
            sets.push("email = $email");
        }
        if input.first_name.is_some() {
            sets.push("first_name = $first_name");
        }
        if input.last_name.is_some() {
            sets.push("last_name = $last_name");
        }
        if input.department.is_some() {
            sets.push("department = $department");
        }
        if input.site.is_some() {
            sets.push("site = $site");
        }
        if input.role.is_some() {
            sets.push("role = $role");
        }
        if input.employee_id.is_some() {
            sets.push("employee_id = $employee_id");
        }

        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        let query = format!(
            "UPDATE type::record('user', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(email) = input.email {
            builder = builder.bind(("email", email));
        }
        if let Some(first_name) = input.first_name {
            builder = builder.bind(("first_name", first_name));
        }
        if let Some(last_name) = input.last_name {
            builder = builder.bind(("last_name", last_name));
        }
        if let Some(department) = input.department {
            builder = builder.bind(("department", department_to_str(department).to_string()));
        }
        if let Some(site) = input.site {
            builder = builder.bind(("site", site_to_str(site).to_string()));
        }
        if let Some(role) = input.role {
            builder = builder.bind(("role", role_to_str(role).to_string()));
        }
        if let Some(employee_id) = input.employee_id {
            // Option<Option<String>>: Some(Some(v)) = set, Some(None) = clear
            builder = builder.bind(("employee_id", employee_id));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(map_write_error)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn set_active(&self, id: Uuid, active: bool) -> HelpdeskResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("UPDATE type::record('user', $id) SET is_active = $active")
            .bind(("id", id_str.clone()))
            .bind(("active", active))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn set_password(&self, id: Uuid, new_password: &str) -> HelpdeskResult<()> {
        let id_str = id.to_string();
        let password_hash = hash_password(new_password, self.pepper.as_deref())?;

        let mut result = self
            .db
            .query("UPDATE type::record('user', $id) SET password_hash = $password_hash")
            .bind(("id", id_str.clone()))
            .bind(("password_hash", password_hash))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "user".into(),
                id: id_str,
            }
            .into());
        }

        Ok(())
    }

    async fn touch_last_login(&self, id: Uuid) -> HelpdeskResult<()> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("UPDATE type::record('user', $id) SET last_login = time::now()")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "user".into(),
                id: id_str,
            }
            .into());
        }

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> HelpdeskResult<()> {
        self.db
            .query("DELETE type::record('user', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> HelpdeskResult<PaginatedResult<User>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM user GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_user())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn list_by_department(&self, department: Department) -> HelpdeskResult<Vec<User>> {
        self.fetch_many(
            "SELECT meta::id(id) AS record_id, * FROM user \
             WHERE department = $department ORDER BY created_at ASC",
            vec![("department", department_to_str(department).to_string())],
        )
        .await
    }

    async fn list_by_site(&self, site: Site) -> HelpdeskResult<Vec<User>> {
        self.fetch_many(
            "SELECT meta::id(id) AS record_id, * FROM user \
             WHERE site = $site ORDER BY created_at ASC",
            vec![("site", site_to_str(site).to_string())],
        )
        .await
    }

    async fn list_by_role(&self, role: Role) -> HelpdeskResult<Vec<User>> {
        self.fetch_many(
            "SELECT meta::id(id) AS record_id, * FROM user \
             WHERE role = $role ORDER BY created_at ASC",
            vec![("role", role_to_str(role).to_string())],
        )
        .await
    }

    async fn list_active(&self) -> HelpdeskResult<Vec<User>> {
        self.fetch_many(
            "SELECT meta::id(id) AS record_id, * FROM user \
             WHERE is_active = true ORDER BY created_at ASC",
            vec![],
        )
        .await
    }

    async fn list_inactive(&self) -> HelpdeskResult<Vec<User>> {
        self.fetch_many(
            "SELECT meta::id(id) AS record_id, * FROM user \
             WHERE is_active = false ORDER BY created_at ASC",
            vec![],
        )
        .await
    }

    async fn list_active_technicians(&self, department: Department) -> HelpdeskResult<Vec<User>> {
        // Ordered by email so auto-assignment scans candidates in a
        // stable order.
        self.fetch_many(
            "SELECT meta::id(id) AS record_id, * FROM user \
             WHERE department = $department AND role = 'Technician' \
             AND is_active = true \
             ORDER BY email ASC",
            vec![("department", department_to_str(department).to_string())],
        )
        .await
    }

    async fn search_by_name(
        &self,
        name: &str,
        pagination: Pagination,
    ) -> HelpdeskResult<PaginatedResult<User>> {
        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM user \
                 WHERE string::contains(first_name, $name) \
                 OR string::contains(last_name, $name) \
                 OR string::contains(email, $name) GROUP ALL",
            )
            .bind(("name", name.to_string()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE string::contains(first_name, $name) \
                 OR string::contains(last_name, $name) \
                 OR string::contains(email, $name) \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("name", name.to_string()))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_user())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn count(&self) -> HelpdeskResult<u64> {
        self.fetch_count("SELECT count() AS total FROM user GROUP ALL", vec![])
            .await
    }

    async fn count_active_by_department(&self, department: Department) -> HelpdeskResult<u64> {
        self.fetch_count(
            "SELECT count() AS total FROM user \
             WHERE department = $department AND is_active = true \
             GROUP ALL",
            vec![("department", department_to_str(department).to_string())],
        )
        .await
    }

    async fn count_by_role(&self, role: Role) -> HelpdeskResult<u64> {
        self.fetch_count(
            "SELECT count() AS total FROM user \
             WHERE role = $role GROUP ALL",
            vec![("role", role_to_str(role).to_string())],
        )
        .await
    }
}

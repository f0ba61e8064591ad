//! User directory management — creation, profile updates, activation
//! toggles, password changes, and statistics.
//!
//! Every operation takes the authenticated caller explicitly and runs
//! the authorization guard before touching the credential store.
//! Conflict checks happen before any write is committed.

use std::collections::HashMap;

use helpdesk_core::authz::{self, Capability};
use helpdesk_core::error::{HelpdeskError, HelpdeskResult};
use helpdesk_core::models::user::{CreateUser, Department, Role, UpdateUser, User};
use helpdesk_core::repository::UserRepository;
use tracing::info;
use uuid::Uuid;

use crate::config::AuthConfig;

/// Aggregate user counts for dashboards.
#[derive(Debug, Clone)]
pub struct UserStatistics {
    pub total_users: u64,
    pub active_users: u64,
    pub inactive_users: u64,
    pub users_by_department: HashMap<Department, u64>,
    pub users_by_role: HashMap<Role, u64>,
}

/// User directory service over the credential store.
pub struct DirectoryService<U: UserRepository> {
    user_repo: U,
    config: AuthConfig,
}

impl<U: UserRepository> DirectoryService<U> {
    pub fn new(user_repo: U, config: AuthConfig) -> Self {
        Self { user_repo, config }
    }

    fn check_password_policy(&self, password: &str) -> HelpdeskResult<()> {
        if password.len() < self.config.min_password_length {
            return Err(HelpdeskError::Validation {
                message: format!(
                    "password must be at least {} characters",
                    self.config.min_password_length
                ),
            });
        }
        Ok(())
    }

    /// Create a user administratively.
    ///
    /// Email and employee id are conflict-checked before the write;
    /// the store's unique indexes back the same invariant under
    /// concurrent creation.
    async fn ensure_unique(&self, email: &str, employee_id: Option<&str>) -> HelpdeskResult<()> {
        if self.user_repo.exists_by_email(email).await? {
            return Err(HelpdeskError::Conflict {
                field: "email".into(),
            });
        }
        if let Some(employee_id) = employee_id {
            if self.user_repo.exists_by_employee_id(employee_id).await? {
                return Err(HelpdeskError::Conflict {
                    field: "employee_id".into(),
                });
            }
        }
        Ok(())
    }

    pub async fn create_user(&self, caller: &User, input: CreateUser) -> HelpdeskResult<User> {
        authz::authorize(caller, Capability::CreateUser, None)?;

        self.check_password_policy(&input.password)?;
        self.ensure_unique(&input.email, input.employee_id.as_deref())
            .await?;

        let user = self.user_repo.create(input).await?;
        info!(user_id = %user.id, email = %user.email, "User created");
        Ok(user)
    }

    /// Self-registration: anyone may create their own account; the
    /// role always starts at [`Role::User`].
    pub async fn register(&self, mut input: CreateUser) -> HelpdeskResult<User> {
        input.role = Some(Role::User);

        self.check_password_policy(&input.password)?;
        self.ensure_unique(&input.email, input.employee_id.as_deref())
            .await?;

        let user = self.user_repo.create(input).await?;
        info!(user_id = %user.id, email = %user.email, "User registered");
        Ok(user)
    }

    /// Fetch a user record; managers and admins may view anyone,
    /// others only themselves.
    pub async fn get_user(&self, caller: &User, id: Uuid) -> HelpdeskResult<User> {
        authz::authorize(caller, Capability::ViewUser, Some(id))?;
        self.user_repo.get_by_id(id).await
    }

    /// Update profile fields.
    ///
    /// A changed email or employee id is conflict-checked against the
    /// rest of the directory before the write.
    pub async fn update_user(
        &self,
        caller: &User,
        id: Uuid,
        input: UpdateUser,
    ) -> HelpdeskResult<User> {
        authz::authorize(caller, Capability::UpdateUser, Some(id))?;

        let existing = self.user_repo.get_by_id(id).await?;

        if let Some(email) = &input.email {
            if email != &existing.email && self.user_repo.exists_by_email(email).await? {
                return Err(HelpdeskError::Conflict {
                    field: "email".into(),
                });
            }
        }
        if let Some(Some(employee_id)) = &input.employee_id {
            if existing.employee_id.as_deref() != Some(employee_id.as_str())
                && self.user_repo.exists_by_employee_id(employee_id).await?
            {
                return Err(HelpdeskError::Conflict {
                    field: "employee_id".into(),
                });
            }
        }

        let updated = self.user_repo.update(id, input).await?;
        info!(user_id = %updated.id, "User updated");
        Ok(updated)
    }

    pub async fn activate_user(&self, caller: &User, id: Uuid) -> HelpdeskResult<User> {
        authz::authorize(caller, Capability::ToggleUserActivation, None)?;
        let user = self.user_repo.set_active(id, true).await?;
        info!(user_id = %user.id, "User activated");
        Ok(user)
    }

    pub async fn deactivate_user(&self, caller: &User, id: Uuid) -> HelpdeskResult<User> {
        authz::authorize(caller, Capability::ToggleUserActivation, None)?;
        let user = self.user_repo.set_active(id, false).await?;
        info!(user_id = %user.id, "User deactivated");
        Ok(user)
    }

    /// Replace a user's password. Admins may change anyone's; other
    /// roles only their own.
    pub async fn change_password(
        &self,
        caller: &User,
        id: Uuid,
        new_password: &str,
    ) -> HelpdeskResult<()> {
        authz::authorize(caller, Capability::ChangePassword, Some(id))?;
        self.check_password_policy(new_password)?;

        self.user_repo.set_password(id, new_password).await?;
        info!(user_id = %id, "Password changed");
        Ok(())
    }

    /// Hard delete a user record. Admin-only administrative bypass.
    pub async fn delete_user(&self, caller: &User, id: Uuid) -> HelpdeskResult<()> {
        authz::authorize(caller, Capability::DeleteUser, None)?;

        // Confirm existence so a bad id surfaces as NotFound.
        self.user_repo.get_by_id(id).await?;
        self.user_repo.delete(id).await?;
        info!(user_id = %id, "User deleted");
        Ok(())
    }

    /// Aggregate counts across the directory.
    pub async fn user_statistics(&self, caller: &User) -> HelpdeskResult<UserStatistics> {
        authz::authorize(caller, Capability::ViewUserStatistics, None)?;

        let total_users = self.user_repo.count().await?;
        let active_users = self.user_repo.list_active().await?.len() as u64;

        let mut users_by_department = HashMap::new();
        for department in Department::ALL {
            let count = self.user_repo.count_active_by_department(department).await?;
            users_by_department.insert(department, count);
        }

        let mut users_by_role = HashMap::new();
        for role in Role::ALL {
            users_by_role.insert(role, self.user_repo.count_by_role(role).await?);
        }

        Ok(UserStatistics {
            total_users,
            active_users,
            inactive_users: total_users - active_users,
            users_by_department,
            users_by_role,
        })
    }
}

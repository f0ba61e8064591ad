//! Role-based authorization guard.
//!
//! A pure decision function over (caller, required capability,
//! optional resource owner). No storage and no ambient caller state:
//! the authenticated user is always an explicit parameter, so every
//! rule is unit-testable in isolation.

use uuid::Uuid;

use crate::error::{HelpdeskError, HelpdeskResult};
use crate::models::user::{Role, User};

/// A guarded operation class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    CreateUser,
    ViewUser,
    UpdateUser,
    DeleteUser,
    ListUsers,
    ListUsersByRole,
    ListInactiveUsers,
    ToggleUserActivation,
    ChangePassword,
    ViewProfile,
    ListTechnicians,
    ViewUserStatistics,
    CreateTicket,
    DeleteTicket,
}

impl Capability {
    pub const ALL: [Capability; 14] = [
        Capability::CreateUser,
        Capability::ViewUser,
        Capability::UpdateUser,
        Capability::DeleteUser,
        Capability::ListUsers,
        Capability::ListUsersByRole,
        Capability::ListInactiveUsers,
        Capability::ToggleUserActivation,
        Capability::ChangePassword,
        Capability::ViewProfile,
        Capability::ListTechnicians,
        Capability::ViewUserStatistics,
        Capability::CreateTicket,
        Capability::DeleteTicket,
    ];

    /// Capabilities a caller may exercise on a resource they own,
    /// regardless of role.
    fn self_service(self) -> bool {
        matches!(
            self,
            Capability::ViewUser
                | Capability::UpdateUser
                | Capability::ChangePassword
                | Capability::ViewProfile
        )
    }
}

/// Whether a role is granted a capability by an explicit rule.
///
/// Admin holds every capability; the destructive and
/// security-sensitive ones (user deletion, activation toggles,
/// role/inactive listings, ticket deletion) are Admin-only.
pub fn role_allows(role: Role, capability: Capability) -> bool {
    match role {
        Role::Admin => true,
        Role::Manager => matches!(
            capability,
            Capability::CreateUser
                | Capability::ViewUser
                | Capability::UpdateUser
                | Capability::ListUsers
                | Capability::ListTechnicians
                | Capability::ViewUserStatistics
                | Capability::CreateTicket
                | Capability::ViewProfile
        ),
        Role::Technician => matches!(
            capability,
            Capability::ListTechnicians | Capability::ViewProfile
        ),
        Role::User => matches!(capability, Capability::ViewProfile),
    }
}

/// The capability set a role grants — the derived view of a user's
/// authorities.
pub fn role_capabilities(role: Role) -> Vec<Capability> {
    Capability::ALL
        .into_iter()
        .filter(|cap| role_allows(role, *cap))
        .collect()
}

/// Decide whether `caller` may exercise `capability`, optionally
/// against a resource owned by `resource_owner`.
///
/// The identity rule is evaluated first: a self-service capability on
/// the caller's own resource is allowed for any role. Only then do
/// role rules apply. Deny is the default.
pub fn authorize(
    caller: &User,
    capability: Capability,
    resource_owner: Option<Uuid>,
) -> HelpdeskResult<()> {
    if capability.self_service() && resource_owner == Some(caller.id) {
        return Ok(());
    }

    if role_allows(caller.role, capability) {
        return Ok(());
    }

    Err(HelpdeskError::AuthorizationDenied {
        reason: format!("role {} may not perform {capability:?}", caller.role),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::{Department, Site};
    use chrono::Utc;

    fn user_with_role(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            email: format!("{role}@example.com").to_lowercase(),
            password_hash: "$argon2id$stub".into(),
            first_name: "Test".into(),
            last_name: "User".into(),
            department: Department::SystemNetwork,
            site: Site::LagosOffice,
            role,
            is_active: true,
            employee_id: None,
            last_login: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn admin_holds_every_capability() {
        let admin = user_with_role(Role::Admin);
        for cap in Capability::ALL {
            assert!(authorize(&admin, cap, None).is_ok(), "admin denied {cap:?}");
        }
    }

    #[test]
    fn manager_cannot_delete_or_toggle_activation() {
        let manager = user_with_role(Role::Manager);
        assert!(authorize(&manager, Capability::DeleteUser, None).is_err());
        assert!(authorize(&manager, Capability::ToggleUserActivation, None).is_err());
        assert!(authorize(&manager, Capability::ListUsersByRole, None).is_err());
        assert!(authorize(&manager, Capability::DeleteTicket, None).is_err());
    }

    #[test]
    fn manager_manages_users_and_creates_tickets() {
        let manager = user_with_role(Role::Manager);
        assert!(authorize(&manager, Capability::CreateUser, None).is_ok());
        assert!(authorize(&manager, Capability::ListUsers, None).is_ok());
        assert!(authorize(&manager, Capability::CreateTicket, None).is_ok());
        assert!(authorize(&manager, Capability::ViewUserStatistics, None).is_ok());
    }

    #[test]
    fn technician_lists_technicians_but_not_users() {
        let tech = user_with_role(Role::Technician);
        assert!(authorize(&tech, Capability::ListTechnicians, None).is_ok());
        assert!(authorize(&tech, Capability::ListUsers, None).is_err());
        assert!(authorize(&tech, Capability::CreateTicket, None).is_err());
    }

    #[test]
    fn plain_user_is_denied_administrative_capabilities() {
        let user = user_with_role(Role::User);
        for cap in [
            Capability::CreateUser,
            Capability::DeleteUser,
            Capability::ListUsers,
            Capability::CreateTicket,
        ] {
            assert!(authorize(&user, cap, None).is_err(), "user allowed {cap:?}");
        }
    }

    #[test]
    fn self_service_allows_own_resource_for_any_role() {
        let user = user_with_role(Role::User);
        assert!(authorize(&user, Capability::ViewUser, Some(user.id)).is_ok());
        assert!(authorize(&user, Capability::UpdateUser, Some(user.id)).is_ok());
        assert!(authorize(&user, Capability::ChangePassword, Some(user.id)).is_ok());
    }

    #[test]
    fn self_service_does_not_extend_to_other_users() {
        let user = user_with_role(Role::User);
        let other = Uuid::new_v4();
        assert!(authorize(&user, Capability::ViewUser, Some(other)).is_err());
        assert!(authorize(&user, Capability::ChangePassword, Some(other)).is_err());
    }

    #[test]
    fn self_service_never_grants_non_self_service_capabilities() {
        // Owning the resource does not help for admin-only operations.
        let user = user_with_role(Role::User);
        assert!(authorize(&user, Capability::DeleteUser, Some(user.id)).is_err());
        assert!(authorize(&user, Capability::ToggleUserActivation, Some(user.id)).is_err());
    }

    #[test]
    fn capability_sets_grow_with_role() {
        let user = role_capabilities(Role::User).len();
        let tech = role_capabilities(Role::Technician).len();
        let manager = role_capabilities(Role::Manager).len();
        let admin = role_capabilities(Role::Admin).len();
        assert!(user < tech && tech < manager && manager < admin);
        assert_eq!(admin, Capability::ALL.len());
    }
}

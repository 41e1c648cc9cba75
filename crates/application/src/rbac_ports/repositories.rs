use std::fmt::{Display, Formatter};

use async_trait::async_trait;

use warden_core::AppResult;
use warden_domain::{Permission, PermissionId, Role, RoleId, UserId};

/// Owner side of a permission link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GrantOwner {
    /// Permission granted directly to a user.
    User(UserId),
    /// Permission granted to a role.
    Role(RoleId),
}

impl Display for GrantOwner {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User(user_id) => write!(formatter, "user:{user_id}"),
            Self::Role(role_id) => write!(formatter, "role:{role_id}"),
        }
    }
}

/// Repository port for the user-role link table.
#[async_trait]
pub trait RoleAssignmentRepository: Send + Sync {
    /// Links a role to a user. Linking an already linked role is a no-op.
    async fn attach_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<()>;

    /// Unlinks a role from a user. Unlinking a missing link is a no-op.
    async fn detach_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<()>;

    /// Replaces the user's role links with exactly `role_ids`.
    async fn sync_roles(&self, user_id: UserId, role_ids: &[RoleId]) -> AppResult<()>;

    /// Lists the roles currently linked to a user.
    async fn list_roles(&self, user_id: UserId) -> AppResult<Vec<Role>>;
}

/// Repository port for the role-permission and user-permission link tables.
#[async_trait]
pub trait PermissionGrantRepository: Send + Sync {
    /// Links a permission to an owner. Linking twice is a no-op.
    async fn attach_permission(
        &self,
        owner: GrantOwner,
        permission_id: PermissionId,
    ) -> AppResult<()>;

    /// Unlinks a permission from an owner. Unlinking a missing link is a no-op.
    async fn detach_permission(
        &self,
        owner: GrantOwner,
        permission_id: PermissionId,
    ) -> AppResult<()>;

    /// Replaces the owner's permission links with exactly `permission_ids`.
    async fn sync_permissions(
        &self,
        owner: GrantOwner,
        permission_ids: &[PermissionId],
    ) -> AppResult<()>;

    /// Lists the permissions currently linked to an owner.
    async fn list_permissions(&self, owner: GrantOwner) -> AppResult<Vec<Permission>>;
}

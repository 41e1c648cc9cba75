use std::sync::Arc;

use tracing::debug;

use warden_core::{AppResult, CacheSettings};
use warden_domain::{ModelRef, PermissionId, RoleId, User};

use crate::{
    CacheGateway, CacheKeys, GrantOwner, PermissionGrantRepository, RoleAssignmentRepository,
};


/// Application service attaching and detaching roles and permissions on users.
///
/// Every mutation forgets the user's cached role list and cached permission
/// list, whether or not the stored links actually changed. Each method hands
/// the user back so calls can be chained.
#[derive(Clone)]
pub struct MembershipService {
    role_assignments: Arc<dyn RoleAssignmentRepository>,
    permission_grants: Arc<dyn PermissionGrantRepository>,
    cache: Arc<dyn CacheGateway>,
    cache_keys: CacheKeys,
}

impl MembershipService {
    /// Creates a new membership service from its ports and cache settings.
    #[must_use]
    pub fn new(
        role_assignments: Arc<dyn RoleAssignmentRepository>,
        permission_grants: Arc<dyn PermissionGrantRepository>,
        cache: Arc<dyn CacheGateway>,
        settings: &CacheSettings,
    ) -> Self {
        Self {
            role_assignments,
            permission_grants,
            cache,
            cache_keys: CacheKeys::new(settings.key_prefix.as_str()),
        }
    }

    /// Links a role to the user.
    pub async fn attach_role<'u, 'r>(
        &self,
        user: &'u User,
        role: impl Into<ModelRef<'r>>,
    ) -> AppResult<&'u User> {
        let role_id = RoleId::new(role.into().resolve_key()?);
        self.role_assignments.attach_role(user.id(), role_id).await?;
        debug!(user_id = %user.id(), role_id = %role_id, "attached role");

        self.forget_cached_lookups(user).await?;
        Ok(user)
    }

    /// Unlinks a role from the user.
    pub async fn detach_role<'u, 'r>(
        &self,
        user: &'u User,
        role: impl Into<ModelRef<'r>>,
    ) -> AppResult<&'u User> {
        let role_id = RoleId::new(role.into().resolve_key()?);
        self.role_assignments.detach_role(user.id(), role_id).await?;
        debug!(user_id = %user.id(), role_id = %role_id, "detached role");

        self.forget_cached_lookups(user).await?;
        Ok(user)
    }

    /// Links each role in order.
    pub async fn attach_roles<'u, 'r, I>(&self, user: &'u User, roles: I) -> AppResult<&'u User>
    where
        I: IntoIterator,
        I::Item: Into<ModelRef<'r>>,
    {
        let roles: Vec<ModelRef<'r>> = roles.into_iter().map(Into::into).collect();
        for role in roles {
            self.attach_role(user, role).await?;
        }

        Ok(user)
    }

    /// Unlinks each role in order.
    pub async fn detach_roles<'u, 'r, I>(&self, user: &'u User, roles: I) -> AppResult<&'u User>
    where
        I: IntoIterator,
        I::Item: Into<ModelRef<'r>>,
    {
        let roles: Vec<ModelRef<'r>> = roles.into_iter().map(Into::into).collect();
        for role in roles {
            self.detach_role(user, role).await?;
        }

        Ok(user)
    }

    /// Unlinks every role the user currently holds.
    ///
    /// The current links are read from the repository before detaching.
    pub async fn detach_all_roles<'u>(&self, user: &'u User) -> AppResult<&'u User> {
        let roles = self.role_assignments.list_roles(user.id()).await?;
        for role in &roles {
            self.detach_role(user, role).await?;
        }

        Ok(user)
    }

    /// Replaces the user's roles with exactly `role_ids` in one storage call.
    pub async fn sync_roles<'u>(&self, user: &'u User, role_ids: &[RoleId]) -> AppResult<&'u User> {
        self.role_assignments.sync_roles(user.id(), role_ids).await?;
        debug!(user_id = %user.id(), role_count = role_ids.len(), "synced roles");

        self.forget_cached_lookups(user).await?;
        Ok(user)
    }

    /// Links a permission directly to the user.
    pub async fn attach_permission<'u, 'p>(
        &self,
        user: &'u User,
        permission: impl Into<ModelRef<'p>>,
    ) -> AppResult<&'u User> {
        let permission_id = PermissionId::new(permission.into().resolve_key()?);
        self.permission_grants
            .attach_permission(GrantOwner::User(user.id()), permission_id)
            .await?;
        debug!(
            user_id = %user.id(),
            permission_id = %permission_id,
            "attached user permission"
        );

        self.forget_cached_lookups(user).await?;
        Ok(user)
    }

    /// Unlinks a direct permission from the user.
    pub async fn detach_permission<'u, 'p>(
        &self,
        user: &'u User,
        permission: impl Into<ModelRef<'p>>,
    ) -> AppResult<&'u User> {
        let permission_id = PermissionId::new(permission.into().resolve_key()?);
        self.permission_grants
            .detach_permission(GrantOwner::User(user.id()), permission_id)
            .await?;
        debug!(
            user_id = %user.id(),
            permission_id = %permission_id,
            "detached user permission"
        );

        self.forget_cached_lookups(user).await?;
        Ok(user)
    }

    /// Links each permission in order.
    pub async fn attach_permissions<'u, 'p, I>(
        &self,
        user: &'u User,
        permissions: I,
    ) -> AppResult<&'u User>
    where
        I: IntoIterator,
        I::Item: Into<ModelRef<'p>>,
    {
        let permissions: Vec<ModelRef<'p>> = permissions.into_iter().map(Into::into).collect();
        for permission in permissions {
            self.attach_permission(user, permission).await?;
        }

        Ok(user)
    }

    /// Unlinks each permission in order.
    pub async fn detach_permissions<'u, 'p, I>(
        &self,
        user: &'u User,
        permissions: I,
    ) -> AppResult<&'u User>
    where
        I: IntoIterator,
        I::Item: Into<ModelRef<'p>>,
    {
        let permissions: Vec<ModelRef<'p>> = permissions.into_iter().map(Into::into).collect();
        for permission in permissions {
            self.detach_permission(user, permission).await?;
        }

        Ok(user)
    }

    /// Replaces the user's direct permissions with exactly `permission_ids`.
    pub async fn sync_permissions<'u>(
        &self,
        user: &'u User,
        permission_ids: &[PermissionId],
    ) -> AppResult<&'u User> {
        self.permission_grants
            .sync_permissions(GrantOwner::User(user.id()), permission_ids)
            .await?;
        debug!(
            user_id = %user.id(),
            permission_count = permission_ids.len(),
            "synced user permissions"
        );

        self.forget_cached_lookups(user).await?;
        Ok(user)
    }

    async fn forget_cached_lookups(&self, user: &User) -> AppResult<()> {
        for cache_key in [
            self.cache_keys.roles_for_user(user.id()),
            self.cache_keys.permissions_for_user(user.id()),
        ] {
            self.cache.forget(cache_key.as_str()).await?;
            debug!(cache_key = %cache_key, "forgot cached lookup");
        }

        Ok(())
    }
}

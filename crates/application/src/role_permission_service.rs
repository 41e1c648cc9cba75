use std::sync::Arc;

use tracing::debug;

use warden_core::{AppResult, CacheSettings};
use warden_domain::{ModelRef, PermissionId, Role};

use crate::{CacheGateway, CacheKeys, GrantOwner, PermissionGrantRepository};

/// Application service managing the permissions owned by roles.
///
/// Every mutation forgets the role's cached permission list.
#[derive(Clone)]
pub struct RolePermissionService {
    permission_grants: Arc<dyn PermissionGrantRepository>,
    cache: Arc<dyn CacheGateway>,
    cache_keys: CacheKeys,
}

impl RolePermissionService {
    /// Creates a new service from its ports and cache settings.
    #[must_use]
    pub fn new(
        permission_grants: Arc<dyn PermissionGrantRepository>,
        cache: Arc<dyn CacheGateway>,
        settings: &CacheSettings,
    ) -> Self {
        Self {
            permission_grants,
            cache,
            cache_keys: CacheKeys::new(settings.key_prefix.as_str()),
        }
    }

    /// Links a permission to the role.
    pub async fn attach_permission<'r, 'p>(
        &self,
        role: &'r Role,
        permission: impl Into<ModelRef<'p>>,
    ) -> AppResult<&'r Role> {
        let permission_id = PermissionId::new(permission.into().resolve_key()?);
        self.permission_grants
            .attach_permission(GrantOwner::Role(role.id()), permission_id)
            .await?;
        debug!(role_id = %role.id(), permission_id = %permission_id, "attached role permission");

        self.forget_cached_permissions(role).await?;
        Ok(role)
    }

    /// Unlinks a permission from the role.
    pub async fn detach_permission<'r, 'p>(
        &self,
        role: &'r Role,
        permission: impl Into<ModelRef<'p>>,
    ) -> AppResult<&'r Role> {
        let permission_id = PermissionId::new(permission.into().resolve_key()?);
        self.permission_grants
            .detach_permission(GrantOwner::Role(role.id()), permission_id)
            .await?;
        debug!(role_id = %role.id(), permission_id = %permission_id, "detached role permission");

        self.forget_cached_permissions(role).await?;
        Ok(role)
    }

    /// Links each permission in order.
    pub async fn attach_permissions<'r, 'p, I>(
        &self,
        role: &'r Role,
        permissions: I,
    ) -> AppResult<&'r Role>
    where
        I: IntoIterator,
        I::Item: Into<ModelRef<'p>>,
    {
        let permissions: Vec<ModelRef<'p>> = permissions.into_iter().map(Into::into).collect();
        for permission in permissions {
            self.attach_permission(role, permission).await?;
        }

        Ok(role)
    }

    /// Unlinks each permission in order.
    pub async fn detach_permissions<'r, 'p, I>(
        &self,
        role: &'r Role,
        permissions: I,
    ) -> AppResult<&'r Role>
    where
        I: IntoIterator,
        I::Item: Into<ModelRef<'p>>,
    {
        let permissions: Vec<ModelRef<'p>> = permissions.into_iter().map(Into::into).collect();
        for permission in permissions {
            self.detach_permission(role, permission).await?;
        }

        Ok(role)
    }

    /// Replaces the role's permissions with exactly `permission_ids`.
    pub async fn sync_permissions<'r>(
        &self,
        role: &'r Role,
        permission_ids: &[PermissionId],
    ) -> AppResult<&'r Role> {
        self.permission_grants
            .sync_permissions(GrantOwner::Role(role.id()), permission_ids)
            .await?;
        debug!(
            role_id = %role.id(),
            permission_count = permission_ids.len(),
            "synced role permissions"
        );

        self.forget_cached_permissions(role).await?;
        Ok(role)
    }

    async fn forget_cached_permissions(&self, role: &Role) -> AppResult<()> {
        let cache_key = self.cache_keys.permissions_for_role(role.id());
        self.cache.forget(cache_key.as_str()).await?;
        debug!(cache_key = %cache_key, "forgot cached lookup");
        Ok(())
    }
}

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use warden_application::{GrantOwner, PermissionGrantRepository, RoleAssignmentRepository};
use warden_core::AppResult;
use warden_domain::{Permission, PermissionId, Role, RoleId, UserId};

/// In-memory role and permission store.
///
/// Holds a catalog of roles and permissions plus the three link tables. Links
/// to ids missing from the catalog are kept but left out of listings, the same
/// way an inner join would drop them.
#[derive(Default)]
pub struct InMemoryRbacRepository {
    roles: RwLock<BTreeMap<RoleId, Role>>,
    permissions: RwLock<BTreeMap<PermissionId, Permission>>,
    role_links: RwLock<BTreeMap<UserId, Vec<RoleId>>>,
    permission_links: RwLock<BTreeMap<GrantOwner, Vec<PermissionId>>>,
}

impl InMemoryRbacRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a role in the catalog.
    pub async fn insert_role(&self, role: Role) {
        self.roles.write().await.insert(role.id(), role);
    }

    /// Adds or replaces a permission in the catalog.
    pub async fn insert_permission(&self, permission: Permission) {
        self.permissions
            .write()
            .await
            .insert(permission.id(), permission);
    }
}

fn push_unique<T: PartialEq + Copy>(linked: &mut Vec<T>, id: T) {
    if !linked.contains(&id) {
        linked.push(id);
    }
}

fn deduplicated<T: PartialEq + Copy>(ids: &[T]) -> Vec<T> {
    let mut unique = Vec::with_capacity(ids.len());
    for id in ids {
        push_unique(&mut unique, *id);
    }
    unique
}

#[async_trait]
impl RoleAssignmentRepository for InMemoryRbacRepository {
    async fn attach_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<()> {
        let mut role_links = self.role_links.write().await;
        push_unique(role_links.entry(user_id).or_default(), role_id);
        Ok(())
    }

    async fn detach_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<()> {
        if let Some(linked) = self.role_links.write().await.get_mut(&user_id) {
            linked.retain(|linked_id| linked_id != &role_id);
        }
        Ok(())
    }

    async fn sync_roles(&self, user_id: UserId, role_ids: &[RoleId]) -> AppResult<()> {
        self.role_links
            .write()
            .await
            .insert(user_id, deduplicated(role_ids));
        Ok(())
    }

    async fn list_roles(&self, user_id: UserId) -> AppResult<Vec<Role>> {
        let role_links = self.role_links.read().await;
        let roles = self.roles.read().await;

        Ok(role_links
            .get(&user_id)
            .map(|linked| {
                linked
                    .iter()
                    .filter_map(|role_id| roles.get(role_id).cloned())
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl PermissionGrantRepository for InMemoryRbacRepository {
    async fn attach_permission(
        &self,
        owner: GrantOwner,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        let mut permission_links = self.permission_links.write().await;
        push_unique(permission_links.entry(owner).or_default(), permission_id);
        Ok(())
    }

    async fn detach_permission(
        &self,
        owner: GrantOwner,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        if let Some(linked) = self.permission_links.write().await.get_mut(&owner) {
            linked.retain(|linked_id| linked_id != &permission_id);
        }
        Ok(())
    }

    async fn sync_permissions(
        &self,
        owner: GrantOwner,
        permission_ids: &[PermissionId],
    ) -> AppResult<()> {
        self.permission_links
            .write()
            .await
            .insert(owner, deduplicated(permission_ids));
        Ok(())
    }

    async fn list_permissions(&self, owner: GrantOwner) -> AppResult<Vec<Permission>> {
        let permission_links = self.permission_links.read().await;
        let permissions = self.permissions.read().await;

        Ok(permission_links
            .get(&owner)
            .map(|linked| {
                linked
                    .iter()
                    .filter_map(|permission_id| permissions.get(permission_id).cloned())
                    .collect()
            })
            .unwrap_or_default())
    }
}

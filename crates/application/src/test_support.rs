use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::Mutex;

use warden_core::AppResult;
use warden_domain::{Permission, PermissionId, Role, RoleId, UserId};

use crate::{CacheGateway, GrantOwner, PermissionGrantRepository, RoleAssignmentRepository};

pub(crate) fn role(id: i64, name: &str) -> Role {
    match Role::new(RoleId::new(id), name) {
        Ok(role) => role,
        Err(error) => panic!("invalid test role '{name}': {error}"),
    }
}

pub(crate) fn permission(id: i64, name: &str) -> Permission {
    match Permission::new(PermissionId::new(id), name) {
        Ok(permission) => permission,
        Err(error) => panic!("invalid test permission '{name}': {error}"),
    }
}

#[derive(Default)]
pub(crate) struct FakeCache {
    entries: Mutex<HashMap<String, String>>,
    gets: Mutex<Vec<String>>,
    puts: Mutex<Vec<(String, u32)>>,
    forgotten: Mutex<Vec<String>>,
}

impl FakeCache {
    pub(crate) async fn seed(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .await
            .insert(key.to_owned(), value.to_owned());
    }

    pub(crate) async fn stored(&self, key: &str) -> Option<String> {
        self.entries.lock().await.get(key).cloned()
    }

    pub(crate) async fn lookups(&self) -> Vec<String> {
        self.gets.lock().await.clone()
    }

    pub(crate) async fn puts(&self) -> usize {
        self.puts.lock().await.len()
    }

    /// Returns the TTL passed with each write, in write order.
    pub(crate) async fn put_ttls(&self) -> Vec<(String, u32)> {
        self.puts.lock().await.clone()
    }

    pub(crate) async fn forgotten(&self) -> Vec<String> {
        self.forgotten.lock().await.clone()
    }
}

#[async_trait]
impl CacheGateway for FakeCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.gets.lock().await.push(key.to_owned());
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: String, ttl_minutes: u32) -> AppResult<()> {
        self.puts.lock().await.push((key.to_owned(), ttl_minutes));
        self.entries.lock().await.insert(key.to_owned(), value);
        Ok(())
    }

    async fn forget(&self, key: &str) -> AppResult<()> {
        self.forgotten.lock().await.push(key.to_owned());
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RepositoryCall {
    AttachRole(UserId, RoleId),
    DetachRole(UserId, RoleId),
    SyncRoles(UserId, Vec<RoleId>),
    AttachPermission(GrantOwner, PermissionId),
    DetachPermission(GrantOwner, PermissionId),
    SyncPermissions(GrantOwner, Vec<PermissionId>),
}

/// Link tables kept in memory, recording every mutating call.
#[derive(Default)]
pub(crate) struct FakeRbacRepository {
    roles: Mutex<BTreeMap<RoleId, Role>>,
    permissions: Mutex<BTreeMap<PermissionId, Permission>>,
    user_roles: Mutex<BTreeMap<UserId, Vec<RoleId>>>,
    grants: Mutex<BTreeMap<GrantOwner, Vec<PermissionId>>>,
    calls: Mutex<Vec<RepositoryCall>>,
}

impl FakeRbacRepository {
    pub(crate) async fn add_role(&self, role: Role, permissions: Vec<Permission>) {
        let owner = GrantOwner::Role(role.id());
        self.roles.lock().await.insert(role.id(), role);
        self.add_grants(owner, permissions).await;
    }

    pub(crate) async fn add_grants(&self, owner: GrantOwner, permissions: Vec<Permission>) {
        let mut catalog = self.permissions.lock().await;
        let mut grants = self.grants.lock().await;
        let linked = grants.entry(owner).or_default();
        for permission in permissions {
            linked.push(permission.id());
            catalog.insert(permission.id(), permission);
        }
    }

    pub(crate) async fn link_role(&self, user_id: UserId, role_id: RoleId) {
        let mut user_roles = self.user_roles.lock().await;
        let linked = user_roles.entry(user_id).or_default();
        if !linked.contains(&role_id) {
            linked.push(role_id);
        }
    }

    pub(crate) async fn linked_role_ids(&self, user_id: UserId) -> Vec<RoleId> {
        self.user_roles
            .lock()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) async fn calls(&self) -> Vec<RepositoryCall> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl RoleAssignmentRepository for FakeRbacRepository {
    async fn attach_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<()> {
        self.calls
            .lock()
            .await
            .push(RepositoryCall::AttachRole(user_id, role_id));
        self.link_role(user_id, role_id).await;
        Ok(())
    }

    async fn detach_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<()> {
        self.calls
            .lock()
            .await
            .push(RepositoryCall::DetachRole(user_id, role_id));
        if let Some(linked) = self.user_roles.lock().await.get_mut(&user_id) {
            linked.retain(|stored_role_id| stored_role_id != &role_id);
        }
        Ok(())
    }

    async fn sync_roles(&self, user_id: UserId, role_ids: &[RoleId]) -> AppResult<()> {
        self.calls
            .lock()
            .await
            .push(RepositoryCall::SyncRoles(user_id, role_ids.to_vec()));
        let mut deduplicated = Vec::new();
        for role_id in role_ids {
            if !deduplicated.contains(role_id) {
                deduplicated.push(*role_id);
            }
        }
        self.user_roles.lock().await.insert(user_id, deduplicated);
        Ok(())
    }

    async fn list_roles(&self, user_id: UserId) -> AppResult<Vec<Role>> {
        let linked = self.linked_role_ids(user_id).await;
        let roles = self.roles.lock().await;
        Ok(linked
            .iter()
            .filter_map(|role_id| roles.get(role_id).cloned())
            .collect())
    }
}

#[async_trait]
impl PermissionGrantRepository for FakeRbacRepository {
    async fn attach_permission(
        &self,
        owner: GrantOwner,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        self.calls
            .lock()
            .await
            .push(RepositoryCall::AttachPermission(owner, permission_id));
        let mut grants = self.grants.lock().await;
        let linked = grants.entry(owner).or_default();
        if !linked.contains(&permission_id) {
            linked.push(permission_id);
        }
        Ok(())
    }

    async fn detach_permission(
        &self,
        owner: GrantOwner,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        self.calls
            .lock()
            .await
            .push(RepositoryCall::DetachPermission(owner, permission_id));
        if let Some(linked) = self.grants.lock().await.get_mut(&owner) {
            linked.retain(|stored_id| stored_id != &permission_id);
        }
        Ok(())
    }

    async fn sync_permissions(
        &self,
        owner: GrantOwner,
        permission_ids: &[PermissionId],
    ) -> AppResult<()> {
        self.calls
            .lock()
            .await
            .push(RepositoryCall::SyncPermissions(owner, permission_ids.to_vec()));
        self.grants
            .lock()
            .await
            .insert(owner, permission_ids.to_vec());
        Ok(())
    }

    async fn list_permissions(&self, owner: GrantOwner) -> AppResult<Vec<Permission>> {
        let linked = self
            .grants
            .lock()
            .await
            .get(&owner)
            .cloned()
            .unwrap_or_default();
        let catalog = self.permissions.lock().await;
        Ok(linked
            .iter()
            .filter_map(|permission_id| catalog.get(permission_id).cloned())
            .collect())
    }
}

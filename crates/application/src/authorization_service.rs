use std::sync::Arc;

use warden_core::{AppResult, CacheSettings};
use warden_domain::{Permission, Role, User};

use crate::{
    CacheGateway, CacheKeys, GrantOwner, NameQuery, PermissionGrantRepository,
    RoleAssignmentRepository, remember,
};

mod ability;
mod checks;


pub use ability::AbilityCheck;

/// Application service answering role and permission checks for users.
///
/// Role and permission lists are read through the cache gateway, each entry
/// living for the configured number of minutes.
#[derive(Clone)]
pub struct AuthorizationService {
    role_assignments: Arc<dyn RoleAssignmentRepository>,
    permission_grants: Arc<dyn PermissionGrantRepository>,
    cache: Arc<dyn CacheGateway>,
    settings: CacheSettings,
    cache_keys: CacheKeys,
}

impl AuthorizationService {
    /// Creates a new authorization service from its ports and cache settings.
    #[must_use]
    pub fn new(
        role_assignments: Arc<dyn RoleAssignmentRepository>,
        permission_grants: Arc<dyn PermissionGrantRepository>,
        cache: Arc<dyn CacheGateway>,
        settings: CacheSettings,
    ) -> Self {
        let cache_keys = CacheKeys::new(settings.key_prefix.as_str());
        Self {
            role_assignments,
            permission_grants,
            cache,
            settings,
            cache_keys,
        }
    }

    /// Returns the roles linked to a user, cached per user.
    pub async fn cached_roles(&self, user: &User) -> AppResult<Vec<Role>> {
        let user_id = user.id();
        remember(
            self.cache.as_ref(),
            self.cache_keys.roles_for_user(user_id).as_str(),
            self.settings.ttl_minutes,
            || self.role_assignments.list_roles(user_id),
        )
        .await
    }

    /// Returns the permissions linked to a role, cached per role.
    pub async fn cached_role_permissions(&self, role: &Role) -> AppResult<Vec<Permission>> {
        let role_id = role.id();
        remember(
            self.cache.as_ref(),
            self.cache_keys.permissions_for_role(role_id).as_str(),
            self.settings.ttl_minutes,
            || self.permission_grants.list_permissions(GrantOwner::Role(role_id)),
        )
        .await
    }

    /// Returns the permissions linked directly to a user, cached per user.
    pub async fn cached_user_permissions(&self, user: &User) -> AppResult<Vec<Permission>> {
        let user_id = user.id();
        remember(
            self.cache.as_ref(),
            self.cache_keys.permissions_for_user(user_id).as_str(),
            self.settings.ttl_minutes,
            || self.permission_grants.list_permissions(GrantOwner::User(user_id)),
        )
        .await
    }
}

/// Evaluates `check` for each name in order, stopping once the outcome is known.
///
/// Without `require_all` the first match wins; with it the first miss loses.
/// An empty list yields `require_all`.
async fn evaluate_names<'a, F, Fut>(
    names: &'a [String],
    require_all: bool,
    mut check: F,
) -> AppResult<bool>
where
    F: FnMut(&'a str) -> Fut,
    Fut: std::future::Future<Output = AppResult<bool>>,
{
    for name in names {
        let matched = check(name.as_str()).await?;
        if matched && !require_all {
            return Ok(true);
        }
        if !matched && require_all {
            return Ok(false);
        }
    }

    Ok(require_all)
}

fn names_of(query: NameQuery) -> Vec<String> {
    match query {
        NameQuery::Single(name) => vec![name],
        NameQuery::Many(names) => names,
    }
}

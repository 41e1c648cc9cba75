use warden_domain::{RoleId, UserId};

/// Cache key policy shared by the resolver and the mutation services.
///
/// Each key is unique per entity kind and identity, and the same builder is
/// used when populating and when invalidating an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKeys {
    prefix: String,
}

impl CacheKeys {
    /// Creates a key builder under the given namespace.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Key holding the roles linked to a user.
    #[must_use]
    pub fn roles_for_user(&self, user_id: UserId) -> String {
        format!("{}:roles_for_user:{user_id}", self.prefix)
    }

    /// Key holding the permissions linked directly to a user.
    #[must_use]
    pub fn permissions_for_user(&self, user_id: UserId) -> String {
        format!("{}:permissions_for_user:{user_id}", self.prefix)
    }

    /// Key holding the permissions linked to a role.
    #[must_use]
    pub fn permissions_for_role(&self, role_id: RoleId) -> String {
        format!("{}:permissions_for_role:{role_id}", self.prefix)
    }
}

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use warden_core::{AppResult, NonEmptyString};

use crate::ModelKey;

/// Trailing marker that turns a permission or query name into a prefix pattern.
const WILDCARD: char = '*';

/// Unique identifier for a role record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoleId(i64);

impl RoleId {
    /// Creates a role identifier from a stored key.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the underlying key.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for RoleId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Unique identifier for a permission record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PermissionId(i64);

impl PermissionId {
    /// Creates a permission identifier from a stored key.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the underlying key.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for PermissionId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Named capability that can be granted to roles or users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    id: PermissionId,
    name: String,
    display_name: Option<String>,
    description: Option<String>,
}

impl Permission {
    /// Creates a permission with a validated name.
    pub fn new(id: PermissionId, name: impl Into<String>) -> AppResult<Self> {
        let name = NonEmptyString::new(name)?;
        Ok(Self {
            id,
            name: name.into(),
            display_name: None,
            description: None,
        })
    }

    /// Sets the human-readable label.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Sets the free-form description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the permission identifier.
    #[must_use]
    pub fn id(&self) -> PermissionId {
        self.id
    }

    /// Returns the unique permission name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the label, if one was set.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Returns the description, if one was set.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns whether this permission satisfies the queried name.
    #[must_use]
    pub fn grants(&self, query: &str) -> bool {
        permission_matches(query, self.name.as_str())
    }
}

impl ModelKey for Permission {
    fn model_key(&self) -> i64 {
        self.id.as_i64()
    }
}

/// Named group of permissions assignable to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    id: RoleId,
    name: String,
    display_name: Option<String>,
    description: Option<String>,
}

impl Role {
    /// Creates a role with a validated name.
    pub fn new(id: RoleId, name: impl Into<String>) -> AppResult<Self> {
        let name = NonEmptyString::new(name)?;
        Ok(Self {
            id,
            name: name.into(),
            display_name: None,
            description: None,
        })
    }

    /// Sets the human-readable label.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Sets the free-form description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the role identifier.
    #[must_use]
    pub fn id(&self) -> RoleId {
        self.id
    }

    /// Returns the unique role name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the label, if one was set.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Returns the description, if one was set.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl ModelKey for Role {
    fn model_key(&self) -> i64 {
        self.id.as_i64()
    }
}

/// Returns whether a queried permission name is satisfied by a granted name.
///
/// Matching is literal, or by prefix when either side ends with `*`:
/// `admin.*` as a query matches a granted `admin.posts`, and a granted
/// `admin.*` satisfies a query for `admin.posts`.
#[must_use]
pub fn permission_matches(query: &str, granted: &str) -> bool {
    if query == granted {
        return true;
    }

    query
        .strip_suffix(WILDCARD)
        .is_some_and(|prefix| granted.starts_with(prefix))
        || granted
            .strip_suffix(WILDCARD)
            .is_some_and(|prefix| query.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{Permission, PermissionId, Role, RoleId, permission_matches};
    use crate::ModelKey;

    #[test]
    fn exact_names_match() {
        assert!(permission_matches("manage_a", "manage_a"));
        assert!(!permission_matches("manage_a", "manage_b"));
    }

    #[test]
    fn wildcard_query_matches_granted_prefix() {
        assert!(permission_matches("admin.*", "admin.posts"));
        assert!(permission_matches("admin.*", "admin.users"));
        assert!(!permission_matches("site.*", "admin.posts"));
    }

    #[test]
    fn wildcard_grant_satisfies_prefixed_query() {
        assert!(permission_matches("admin.posts", "admin.*"));
        assert!(!permission_matches("site.posts", "admin.*"));
    }

    #[test]
    fn wildcard_is_only_trailing() {
        assert!(!permission_matches("admin.posts", "*.posts"));
    }

    #[test]
    fn role_rejects_blank_name() {
        assert!(Role::new(RoleId::new(1), "  ").is_err());
    }

    #[test]
    fn entities_expose_model_keys() {
        let role = Role::new(RoleId::new(7), "editor");
        let permission = Permission::new(PermissionId::new(9), "posts.edit");
        assert_eq!(role.map(|role| role.model_key()).ok(), Some(7));
        assert_eq!(permission.map(|value| value.model_key()).ok(), Some(9));
    }

    #[test]
    fn permission_grants_uses_wildcard_matching() {
        let permission = Permission::new(PermissionId::new(1), "admin.*");
        assert!(permission.is_ok_and(|value| value.grants("admin.config")));
    }

    proptest! {
        #[test]
        fn query_wildcard_matches_any_suffix(prefix in "[a-z]{1,8}", suffix in "[a-z._]{0,8}") {
            let query = format!("{prefix}.*");
            let granted = format!("{prefix}.{suffix}");
            prop_assert!(permission_matches(&query, &granted));
        }

        #[test]
        fn granted_wildcard_matches_any_suffix(prefix in "[a-z]{1,8}", suffix in "[a-z._]{0,8}") {
            let granted = format!("{prefix}.*");
            let query = format!("{prefix}.{suffix}");
            prop_assert!(permission_matches(&query, &granted));
        }

        #[test]
        fn plain_names_match_only_themselves(left in "[a-z._]{1,10}", right in "[a-z._]{1,10}") {
            prop_assert_eq!(permission_matches(&left, &right), left == right);
        }
    }
}

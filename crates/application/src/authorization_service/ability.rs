use std::collections::BTreeMap;

use super::*;

/// Outcome of a combined role and permission check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbilityCheck {
    /// Overall decision.
    pub granted: bool,
    /// Per-role results keyed by role name.
    pub roles: BTreeMap<String, bool>,
    /// Per-permission results keyed by permission name.
    pub permissions: BTreeMap<String, bool>,
}

impl AuthorizationService {
    /// Checks roles and permissions together.
    ///
    /// Every name is evaluated. A single name containing commas is split into
    /// a list. With `validate_all` the check is granted only when every role
    /// and every permission is held; otherwise one held role or permission is
    /// enough.
    pub async fn ability(
        &self,
        user: &User,
        roles: impl Into<NameQuery>,
        permissions: impl Into<NameQuery>,
        validate_all: bool,
    ) -> AppResult<AbilityCheck> {
        let mut check = AbilityCheck::default();

        for name in roles.into().into_list() {
            let held = self.has_single_role(user, name.as_str()).await?;
            check.roles.insert(name, held);
        }

        for name in permissions.into().into_list() {
            let held = self.has_single_permission(user, name.as_str()).await?;
            check.permissions.insert(name, held);
        }

        let mut results = check.roles.values().chain(check.permissions.values());
        check.granted = if validate_all {
            results.all(|held| *held)
        } else {
            results.any(|held| *held)
        };

        Ok(check)
    }
}

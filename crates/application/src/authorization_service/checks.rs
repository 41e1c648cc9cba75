use super::*;

impl AuthorizationService {
    /// Returns whether the user holds the named role or roles.
    ///
    /// A list is combined with OR unless `require_all` is set, in which case
    /// every name must be held. Unknown names never match.
    pub async fn has_role(
        &self,
        user: &User,
        names: impl Into<NameQuery>,
        require_all: bool,
    ) -> AppResult<bool> {
        let names = names_of(names.into());
        evaluate_names(&names, require_all, |name| self.has_single_role(user, name)).await
    }

    /// Returns whether the user holds the named permission or permissions.
    ///
    /// Names match literally or through a trailing `*` on either side. A list
    /// is combined with OR unless `require_all` is set.
    pub async fn can(
        &self,
        user: &User,
        names: impl Into<NameQuery>,
        require_all: bool,
    ) -> AppResult<bool> {
        let names = names_of(names.into());
        evaluate_names(&names, require_all, |name| {
            self.has_single_permission(user, name)
        })
        .await
    }

    pub(super) async fn has_single_role(&self, user: &User, name: &str) -> AppResult<bool> {
        let roles = self.cached_roles(user).await?;
        Ok(roles.iter().any(|role| role.name() == name))
    }

    pub(super) async fn has_single_permission(&self, user: &User, name: &str) -> AppResult<bool> {
        for role in self.cached_roles(user).await? {
            let permissions = self.cached_role_permissions(&role).await?;
            if permissions.iter().any(|permission| permission.grants(name)) {
                return Ok(true);
            }
        }

        if !self.settings.include_direct_permissions {
            return Ok(false);
        }

        let permissions = self.cached_user_permissions(user).await?;
        Ok(permissions.iter().any(|permission| permission.grants(name)))
    }
}

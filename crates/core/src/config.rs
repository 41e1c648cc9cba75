use std::env;

use crate::{AppError, AppResult};

/// Default cache lifetime for role and permission lookups, in minutes.
pub const DEFAULT_CACHE_TTL_MINUTES: u32 = 60;

/// Default namespace for cache keys.
pub const DEFAULT_CACHE_KEY_PREFIX: &str = "warden";

/// Cache behaviour injected into the authorization and mutation services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    /// Lifetime of cached role and permission lists, in minutes. Zero disables storing.
    pub ttl_minutes: u32,
    /// Namespace prepended to every cache key.
    pub key_prefix: String,
    /// Whether permission checks also consult permissions attached directly to users.
    pub include_direct_permissions: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_minutes: DEFAULT_CACHE_TTL_MINUTES,
            key_prefix: DEFAULT_CACHE_KEY_PREFIX.to_owned(),
            include_direct_permissions: false,
        }
    }
}

impl CacheSettings {
    /// Loads cache settings from process environment variables.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads cache settings from an arbitrary name lookup.
    ///
    /// Recognised names are `WARDEN_CACHE_TTL`, `WARDEN_CACHE_PREFIX` and
    /// `WARDEN_DIRECT_PERMISSIONS`. Missing values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let ttl_minutes = parse_u32(&lookup, "WARDEN_CACHE_TTL", DEFAULT_CACHE_TTL_MINUTES)?;
        let key_prefix = lookup("WARDEN_CACHE_PREFIX")
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_CACHE_KEY_PREFIX.to_owned());
        let include_direct_permissions = lookup("WARDEN_DIRECT_PERMISSIONS")
            .unwrap_or_else(|| "false".to_owned())
            .trim()
            .eq_ignore_ascii_case("true");

        Ok(Self {
            ttl_minutes,
            key_prefix,
            include_direct_permissions,
        })
    }
}

/// Table and column names used by SQL association stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationTables {
    /// Role catalog table.
    pub roles_table: String,
    /// Permission catalog table.
    pub permissions_table: String,
    /// Link table between users and roles.
    pub role_user_table: String,
    /// Link table between roles and permissions.
    pub permission_role_table: String,
    /// Link table between users and directly granted permissions.
    pub permission_user_table: String,
    /// Column holding the user key in link tables.
    pub user_foreign_key: String,
    /// Column holding the role key in link tables.
    pub role_foreign_key: String,
    /// Column holding the permission key in link tables.
    pub permission_foreign_key: String,
}

impl Default for AssociationTables {
    fn default() -> Self {
        Self {
            roles_table: "roles".to_owned(),
            permissions_table: "permissions".to_owned(),
            role_user_table: "role_user".to_owned(),
            permission_role_table: "permission_role".to_owned(),
            permission_user_table: "permission_user".to_owned(),
            user_foreign_key: "user_id".to_owned(),
            role_foreign_key: "role_id".to_owned(),
            permission_foreign_key: "permission_id".to_owned(),
        }
    }
}

impl AssociationTables {
    /// Loads table names from process environment variables.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads table names from an arbitrary name lookup and validates them.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let tables = Self {
            roles_table: identifier(&lookup, "WARDEN_ROLES_TABLE", defaults.roles_table)?,
            permissions_table: identifier(
                &lookup,
                "WARDEN_PERMISSIONS_TABLE",
                defaults.permissions_table,
            )?,
            role_user_table: identifier(
                &lookup,
                "WARDEN_ROLE_USER_TABLE",
                defaults.role_user_table,
            )?,
            permission_role_table: identifier(
                &lookup,
                "WARDEN_PERMISSION_ROLE_TABLE",
                defaults.permission_role_table,
            )?,
            permission_user_table: identifier(
                &lookup,
                "WARDEN_PERMISSION_USER_TABLE",
                defaults.permission_user_table,
            )?,
            user_foreign_key: identifier(
                &lookup,
                "WARDEN_USER_FOREIGN_KEY",
                defaults.user_foreign_key,
            )?,
            role_foreign_key: identifier(
                &lookup,
                "WARDEN_ROLE_FOREIGN_KEY",
                defaults.role_foreign_key,
            )?,
            permission_foreign_key: identifier(
                &lookup,
                "WARDEN_PERMISSION_FOREIGN_KEY",
                defaults.permission_foreign_key,
            )?,
        };

        Ok(tables)
    }

    /// Checks that every configured name is a plain SQL identifier.
    pub fn validate(&self) -> AppResult<()> {
        for (name, value) in [
            ("roles_table", &self.roles_table),
            ("permissions_table", &self.permissions_table),
            ("role_user_table", &self.role_user_table),
            ("permission_role_table", &self.permission_role_table),
            ("permission_user_table", &self.permission_user_table),
            ("user_foreign_key", &self.user_foreign_key),
            ("role_foreign_key", &self.role_foreign_key),
            ("permission_foreign_key", &self.permission_foreign_key),
        ] {
            validate_identifier(name, value)?;
        }

        Ok(())
    }
}

/// Complete Warden configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WardenConfig {
    /// Cache behaviour.
    pub cache: CacheSettings,
    /// SQL association table layout.
    pub tables: AssociationTables,
}

impl WardenConfig {
    /// Loads the full configuration from process environment variables.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads the full configuration from an arbitrary name lookup.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            cache: CacheSettings::from_lookup(&lookup)?,
            tables: AssociationTables::from_lookup(&lookup)?,
        })
    }
}

fn parse_u32<F>(lookup: &F, name: &str, default: u32) -> AppResult<u32>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) => value.trim().parse::<u32>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        None => Ok(default),
    }
}

fn identifier<F>(lookup: &F, name: &str, default: String) -> AppResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(name)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .unwrap_or(default);
    validate_identifier(name, value.as_str())?;
    Ok(value)
}

fn validate_identifier(name: &str, value: &str) -> AppResult<()> {
    let mut chars = value.chars();
    let valid_start = chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_');
    if !valid_start || !chars.all(|next| next.is_ascii_alphanumeric() || next == '_') {
        return Err(AppError::Validation(format!(
            "{name} must be a plain SQL identifier, got '{value}'"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{AssociationTables, CacheSettings, DEFAULT_CACHE_TTL_MINUTES, WardenConfig};

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        move |name| values.get(name).cloned()
    }

    #[test]
    fn cache_settings_default_when_unset() {
        let settings = CacheSettings::from_lookup(lookup_from(&[]));
        assert!(settings.is_ok());

        let settings = settings.unwrap_or_default();
        assert_eq!(settings.ttl_minutes, DEFAULT_CACHE_TTL_MINUTES);
        assert_eq!(settings.key_prefix, "warden");
        assert!(!settings.include_direct_permissions);
    }

    #[test]
    fn cache_ttl_is_coerced_from_string() {
        let settings = CacheSettings::from_lookup(lookup_from(&[("WARDEN_CACHE_TTL", "1440")]));
        assert_eq!(settings.map(|value| value.ttl_minutes).ok(), Some(1440));
    }

    #[test]
    fn cache_ttl_rejects_non_numeric_value() {
        let settings = CacheSettings::from_lookup(lookup_from(&[("WARDEN_CACHE_TTL", "soon")]));
        assert!(settings.is_err());
    }

    #[test]
    fn direct_permissions_flag_is_case_insensitive() {
        let settings =
            CacheSettings::from_lookup(lookup_from(&[("WARDEN_DIRECT_PERMISSIONS", "TRUE")]));
        assert_eq!(
            settings.map(|value| value.include_direct_permissions).ok(),
            Some(true)
        );
    }

    #[test]
    fn association_tables_reject_unsafe_names() {
        let tables = AssociationTables::from_lookup(lookup_from(&[(
            "WARDEN_ROLE_USER_TABLE",
            "role_user; DROP TABLE roles",
        )]));
        assert!(tables.is_err());
    }

    #[test]
    fn warden_config_reads_custom_table_names() {
        let config = WardenConfig::from_lookup(lookup_from(&[
            ("WARDEN_ROLE_USER_TABLE", "assigned_roles"),
            ("WARDEN_USER_FOREIGN_KEY", "account_id"),
        ]));
        assert!(config.is_ok());

        let config = config.unwrap_or_default();
        assert_eq!(config.tables.role_user_table, "assigned_roles");
        assert_eq!(config.tables.user_foreign_key, "account_id");
        assert_eq!(config.tables.roles_table, "roles");
        assert!(config.tables.validate().is_ok());
    }
}

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::debug;

use warden_application::{GrantOwner, PermissionGrantRepository, RoleAssignmentRepository};
use warden_core::{AppError, AppResult, AssociationTables};
use warden_domain::{Permission, PermissionId, Role, RoleId, UserId};


/// PostgreSQL-backed role and permission store.
///
/// Table and foreign-key names come from [`AssociationTables`] and are checked
/// as plain identifiers before being spliced into SQL. The tables themselves
/// are expected to exist, each link table with a unique constraint over its
/// two key columns.
#[derive(Clone)]
pub struct PostgresRbacRepository {
    pool: PgPool,
    tables: AssociationTables,
}

impl PostgresRbacRepository {
    /// Creates a repository over the provided pool and table names.
    pub fn new(pool: PgPool, tables: AssociationTables) -> AppResult<Self> {
        tables.validate()?;
        Ok(Self { pool, tables })
    }

    /// Returns the table names this repository reads and writes.
    #[must_use]
    pub fn tables(&self) -> &AssociationTables {
        &self.tables
    }

    fn grant_link(&self, owner: GrantOwner) -> LinkTable<'_> {
        match owner {
            GrantOwner::User(user_id) => LinkTable {
                table: self.tables.permission_user_table.as_str(),
                owner_column: self.tables.user_foreign_key.as_str(),
                owner_id: user_id.as_i64(),
                target_column: self.tables.permission_foreign_key.as_str(),
            },
            GrantOwner::Role(role_id) => LinkTable {
                table: self.tables.permission_role_table.as_str(),
                owner_column: self.tables.role_foreign_key.as_str(),
                owner_id: role_id.as_i64(),
                target_column: self.tables.permission_foreign_key.as_str(),
            },
        }
    }

    fn role_link(&self, user_id: UserId) -> LinkTable<'_> {
        LinkTable {
            table: self.tables.role_user_table.as_str(),
            owner_column: self.tables.user_foreign_key.as_str(),
            owner_id: user_id.as_i64(),
            target_column: self.tables.role_foreign_key.as_str(),
        }
    }

    async fn insert_link(&self, link: LinkTable<'_>, target_id: i64) -> AppResult<()> {
        sqlx::query(link.insert_sql().as_str())
            .bind(link.owner_id)
            .bind(target_id)
            .execute(&self.pool)
            .await
            .map_err(|error| map_link_error(error, link.table, target_id))?;

        Ok(())
    }

    async fn delete_link(&self, link: LinkTable<'_>, target_id: i64) -> AppResult<()> {
        let sql = format!(
            "DELETE FROM {} WHERE {} = $1 AND {} = $2",
            link.table, link.owner_column, link.target_column
        );

        sqlx::query(sql.as_str())
            .bind(link.owner_id)
            .bind(target_id)
            .execute(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to delete link from {}: {error}", link.table))
            })?;

        Ok(())
    }

    async fn replace_links(&self, link: LinkTable<'_>, target_ids: &[i64]) -> AppResult<()> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let delete_sql = format!(
            "DELETE FROM {} WHERE {} = $1",
            link.table, link.owner_column
        );
        sqlx::query(delete_sql.as_str())
            .bind(link.owner_id)
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to clear links in {}: {error}", link.table))
            })?;

        insert_links(&mut transaction, link, target_ids).await?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit link sync: {error}"))
        })?;

        debug!(
            link_table = %link.table,
            owner_id = link.owner_id,
            link_count = target_ids.len(),
            "replaced links"
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct LinkTable<'a> {
    table: &'a str,
    owner_column: &'a str,
    owner_id: i64,
    target_column: &'a str,
}

impl LinkTable<'_> {
    fn insert_sql(&self) -> String {
        format!(
            r#"
            INSERT INTO {table} ({owner}, {target})
            VALUES ($1, $2)
            ON CONFLICT ({owner}, {target}) DO NOTHING
            "#,
            table = self.table,
            owner = self.owner_column,
            target = self.target_column,
        )
    }
}

async fn insert_links(
    transaction: &mut Transaction<'_, Postgres>,
    link: LinkTable<'_>,
    target_ids: &[i64],
) -> AppResult<()> {
    let sql = link.insert_sql();
    for target_id in target_ids {
        sqlx::query(sql.as_str())
            .bind(link.owner_id)
            .bind(*target_id)
            .execute(&mut **transaction)
            .await
            .map_err(|error| map_link_error(error, link.table, *target_id))?;
    }

    Ok(())
}

#[derive(Debug, FromRow)]
struct RecordRow {
    id: i64,
    name: String,
    display_name: Option<String>,
    description: Option<String>,
}

impl RecordRow {
    fn into_role(self) -> AppResult<Role> {
        let mut role = Role::new(RoleId::new(self.id), self.name)?;
        if let Some(display_name) = self.display_name {
            role = role.with_display_name(display_name);
        }
        if let Some(description) = self.description {
            role = role.with_description(description);
        }
        Ok(role)
    }

    fn into_permission(self) -> AppResult<Permission> {
        let mut permission = Permission::new(PermissionId::new(self.id), self.name)?;
        if let Some(display_name) = self.display_name {
            permission = permission.with_display_name(display_name);
        }
        if let Some(description) = self.description {
            permission = permission.with_description(description);
        }
        Ok(permission)
    }
}

fn linked_records_sql(records_table: &str, link: LinkTable<'_>) -> String {
    format!(
        r#"
        SELECT records.id, records.name, records.display_name, records.description
        FROM {records_table} AS records
        INNER JOIN {link_table} AS links
            ON links.{target} = records.id
        WHERE links.{owner} = $1
        ORDER BY records.id
        "#,
        link_table = link.table,
        target = link.target_column,
        owner = link.owner_column,
    )
}

fn map_link_error(error: sqlx::Error, table: &str, target_id: i64) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23503")
    {
        return AppError::NotFound(format!("record {target_id} referenced by {table} does not exist"));
    }

    AppError::Internal(format!("failed to insert link into {table}: {error}"))
}

fn deduplicated<T: PartialEq + Copy>(ids: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut unique = Vec::new();
    for id in ids {
        if !unique.contains(&id) {
            unique.push(id);
        }
    }
    unique
}

#[async_trait]
impl RoleAssignmentRepository for PostgresRbacRepository {
    async fn attach_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<()> {
        self.insert_link(self.role_link(user_id), role_id.as_i64()).await
    }

    async fn detach_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<()> {
        self.delete_link(self.role_link(user_id), role_id.as_i64()).await
    }

    async fn sync_roles(&self, user_id: UserId, role_ids: &[RoleId]) -> AppResult<()> {
        let target_ids = deduplicated(role_ids.iter().map(RoleId::as_i64));
        self.replace_links(self.role_link(user_id), target_ids.as_slice())
            .await
    }

    async fn list_roles(&self, user_id: UserId) -> AppResult<Vec<Role>> {
        let sql = linked_records_sql(self.tables.roles_table.as_str(), self.role_link(user_id));
        let rows = sqlx::query_as::<_, RecordRow>(sql.as_str())
            .bind(user_id.as_i64())
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to list roles for user {user_id}: {error}"))
            })?;

        rows.into_iter().map(RecordRow::into_role).collect()
    }
}

#[async_trait]
impl PermissionGrantRepository for PostgresRbacRepository {
    async fn attach_permission(
        &self,
        owner: GrantOwner,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        self.insert_link(self.grant_link(owner), permission_id.as_i64())
            .await
    }

    async fn detach_permission(
        &self,
        owner: GrantOwner,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        self.delete_link(self.grant_link(owner), permission_id.as_i64())
            .await
    }

    async fn sync_permissions(
        &self,
        owner: GrantOwner,
        permission_ids: &[PermissionId],
    ) -> AppResult<()> {
        let target_ids = deduplicated(permission_ids.iter().map(PermissionId::as_i64));
        self.replace_links(self.grant_link(owner), target_ids.as_slice())
            .await
    }

    async fn list_permissions(&self, owner: GrantOwner) -> AppResult<Vec<Permission>> {
        let link = self.grant_link(owner);
        let sql = linked_records_sql(self.tables.permissions_table.as_str(), link);
        let rows = sqlx::query_as::<_, RecordRow>(sql.as_str())
            .bind(link.owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to list permissions for {owner}: {error}"))
            })?;

        rows.into_iter().map(RecordRow::into_permission).collect()
    }
}

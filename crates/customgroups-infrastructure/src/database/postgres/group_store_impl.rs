// ============================================================================
// Custom Groups Infrastructure - PostgreSQL Group Store
// File: crates/customgroups-infrastructure/src/database/postgres/group_store_impl.rs
// ============================================================================

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::{error, info};
use uuid::Uuid;

use customgroups_core::domain::{removes_last_admin, CustomGroup, GroupId, GroupMembership, Principal, SearchFilter};
use customgroups_core::error::DomainError;
use customgroups_core::repositories::GroupStore;

pub struct PgGroupStore {
    pool: PgPool,
}

impl PgGroupStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lock the group row. Every membership change takes this lock first.
    async fn lock_group(
        tx: &mut Transaction<'_, Postgres>,
        group_id: GroupId,
    ) -> Result<CustomGroup, DomainError> {
        let group: Option<CustomGroupRow> = sqlx::query_as(
            r#"
            SELECT group_id, uri, display_name
            FROM custom_groups
            WHERE group_id = $1
            FOR UPDATE
            "#
        )
        .bind(group_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| db_error("locking group", e))?;

        group
            .map(Into::into)
            .ok_or_else(|| DomainError::NotFound(format!("Group {} not found", group_id)))
    }

    /// Lock the group row and check the actor may manage it.
    async fn lock_for_management(
        tx: &mut Transaction<'_, Postgres>,
        actor: &Principal,
        group_id: GroupId,
    ) -> Result<CustomGroup, DomainError> {
        let group = Self::lock_group(tx, group_id).await?;

        let membership: Option<MembershipRow> = sqlx::query_as(
            r#"
            SELECT group_id, user_id, is_admin
            FROM custom_group_members
            WHERE group_id = $1 AND user_id = $2
            "#
        )
        .bind(group_id)
        .bind(&actor.user_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| db_error("finding actor membership", e))?;

        let membership: Option<GroupMembership> = membership.map(Into::into);
        if !actor.can_manage(membership.as_ref()) {
            return Err(DomainError::Forbidden(format!(
                "{} is not an admin of group {}",
                actor.user_id, group.uri
            )));
        }

        Ok(group)
    }
}

// Internal row types for SQLx mapping
#[derive(Debug, FromRow)]
struct CustomGroupRow {
    pub group_id: Uuid,
    pub uri: String,
    pub display_name: String,
}

impl From<CustomGroupRow> for CustomGroup {
    fn from(row: CustomGroupRow) -> Self {
        CustomGroup::new(row.group_id, row.uri, row.display_name)
    }
}

#[derive(Debug, FromRow)]
struct MembershipRow {
    pub group_id: Uuid,
    pub user_id: String,
    pub is_admin: bool,
}

impl From<MembershipRow> for GroupMembership {
    fn from(row: MembershipRow) -> Self {
        GroupMembership::new(row.group_id, row.user_id, row.is_admin)
    }
}

fn db_error(action: &str, e: sqlx::Error) -> DomainError {
    error!("Database error {}: {}", action, e);
    DomainError::DatabaseError(e.to_string())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// `%pattern%` with LIKE metacharacters escaped
fn like_pattern(search: &SearchFilter) -> Option<String> {
    search.pattern.as_ref().map(|pattern| {
        let escaped = pattern
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        format!("%{}%", escaped)
    })
}

#[async_trait]
impl GroupStore for PgGroupStore {
    async fn create_group(&self, uri: &str, display_name: &str) -> Result<Option<GroupId>, DomainError> {
        let group_id: Option<Uuid> = sqlx::query_scalar(
            r#"
            INSERT INTO custom_groups (group_id, uri, display_name)
            VALUES ($1, $2, $3)
            ON CONFLICT (uri) DO NOTHING
            RETURNING group_id
            "#
        )
        .bind(Uuid::new_v4())
        .bind(uri)
        .bind(display_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("creating group", e))?;

        if let Some(id) = group_id {
            info!("Group row created: {} ({})", uri, id);
        }
        Ok(group_id)
    }

    async fn get_group_by_uri(&self, uri: &str) -> Result<Option<CustomGroup>, DomainError> {
        let row: Option<CustomGroupRow> = sqlx::query_as(
            r#"
            SELECT group_id, uri, display_name
            FROM custom_groups
            WHERE uri = $1
            "#
        )
        .bind(uri)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding group by uri", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn get_group(&self, group_id: GroupId) -> Result<Option<CustomGroup>, DomainError> {
        let row: Option<CustomGroupRow> = sqlx::query_as(
            r#"
            SELECT group_id, uri, display_name
            FROM custom_groups
            WHERE group_id = $1
            "#
        )
        .bind(group_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding group by id", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn get_groups(&self, search: &SearchFilter) -> Result<Vec<CustomGroup>, DomainError> {
        let rows: Vec<CustomGroupRow> = sqlx::query_as(
            r#"
            SELECT group_id, uri, display_name
            FROM custom_groups
            WHERE $1::TEXT IS NULL OR uri ILIKE $1 OR display_name ILIKE $1
            ORDER BY display_name, uri
            LIMIT $2 OFFSET $3
            "#
        )
        .bind(like_pattern(search))
        .bind(search.limit.map(i64::from))
        .bind(search.offset.map(i64::from))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("listing groups", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_user_memberships(
        &self,
        user_id: &str,
        search: &SearchFilter,
    ) -> Result<Vec<CustomGroup>, DomainError> {
        let rows: Vec<CustomGroupRow> = sqlx::query_as(
            r#"
            SELECT g.group_id, g.uri, g.display_name
            FROM custom_groups g
            JOIN custom_group_members m ON m.group_id = g.group_id
            WHERE m.user_id = $1
              AND ($2::TEXT IS NULL OR g.uri ILIKE $2 OR g.display_name ILIKE $2)
            ORDER BY g.display_name, g.uri
            LIMIT $3 OFFSET $4
            "#
        )
        .bind(user_id)
        .bind(like_pattern(search))
        .bind(search.limit.map(i64::from))
        .bind(search.offset.map(i64::from))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("listing user memberships", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_group_members(&self, group_id: GroupId) -> Result<Vec<GroupMembership>, DomainError> {
        let rows: Vec<MembershipRow> = sqlx::query_as(
            r#"
            SELECT group_id, user_id, is_admin
            FROM custom_group_members
            WHERE group_id = $1
            ORDER BY user_id
            "#
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("listing group members", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_group_member(
        &self,
        group_id: GroupId,
        user_id: &str,
    ) -> Result<Option<GroupMembership>, DomainError> {
        let row: Option<MembershipRow> = sqlx::query_as(
            r#"
            SELECT group_id, user_id, is_admin
            FROM custom_group_members
            WHERE group_id = $1 AND user_id = $2
            "#
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding group member", e))?;

        Ok(row.map(Into::into))
    }

    async fn add_first_admin(&self, user_id: &str, group_id: GroupId) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(|e| db_error("starting transaction", e))?;
        let group = Self::lock_group(&mut tx, group_id).await?;

        let has_members: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM custom_group_members WHERE group_id = $1)"
        )
        .bind(group_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| db_error("checking group members", e))?;

        if has_members {
            return Err(DomainError::AlreadyExists(format!("Group {} already has members", group.uri)));
        }

        sqlx::query("INSERT INTO custom_group_members (group_id, user_id, is_admin) VALUES ($1, $2, TRUE)")
            .bind(group_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("adding first admin", e))?;

        tx.commit().await.map_err(|e| db_error("committing first admin", e))
    }

    async fn add_to_group(
        &self,
        actor: &Principal,
        user_id: &str,
        group_id: GroupId,
        is_admin: bool,
    ) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(|e| db_error("starting transaction", e))?;
        Self::lock_for_management(&mut tx, actor, group_id).await?;

        let result = sqlx::query(
            r#"
            INSERT INTO custom_group_members (group_id, user_id, is_admin)
            VALUES ($1, $2, $3)
            ON CONFLICT (group_id, user_id) DO NOTHING
            "#
        )
        .bind(group_id)
        .bind(user_id)
        .bind(is_admin)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("adding group member", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::AlreadyExists(format!(
                "User \"{}\" is already a member of group {}",
                user_id, group_id
            )));
        }

        tx.commit().await.map_err(|e| db_error("committing member add", e))
    }

    async fn remove_from_group(&self, actor: &Principal, user_id: &str, group_id: GroupId) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(|e| db_error("starting transaction", e))?;
        let group = Self::lock_for_management(&mut tx, actor, group_id).await?;

        let rows: Vec<MembershipRow> = sqlx::query_as(
            r#"
            SELECT group_id, user_id, is_admin
            FROM custom_group_members
            WHERE group_id = $1
            "#
        )
        .bind(group_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| db_error("listing group members", e))?;

        let members: Vec<GroupMembership> = rows.into_iter().map(Into::into).collect();
        if !members.iter().any(|m| m.user_id == user_id) {
            return Err(DomainError::NotFound(format!(
                "User \"{}\" is not a member of group {}",
                user_id, group.uri
            )));
        }
        if removes_last_admin(&members, user_id) {
            return Err(DomainError::Conflict(format!(
                "User \"{}\" is the last admin of group {}",
                user_id, group.uri
            )));
        }

        sqlx::query("DELETE FROM custom_group_members WHERE group_id = $1 AND user_id = $2")
            .bind(group_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("removing group member", e))?;

        tx.commit().await.map_err(|e| db_error("committing member removal", e))
    }

    async fn rename_group(&self, actor: &Principal, group_id: GroupId, new_uri: &str) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(|e| db_error("starting transaction", e))?;
        Self::lock_for_management(&mut tx, actor, group_id).await?;

        sqlx::query("UPDATE custom_groups SET uri = $2 WHERE group_id = $1")
            .bind(group_id)
            .bind(new_uri)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DomainError::AlreadyExists(format!("Group with uri \"{}\" already exists", new_uri))
                } else {
                    db_error("renaming group", e)
                }
            })?;

        tx.commit().await.map_err(|e| db_error("committing rename", e))
    }

    async fn set_display_name(
        &self,
        actor: &Principal,
        group_id: GroupId,
        display_name: &str,
    ) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(|e| db_error("starting transaction", e))?;
        Self::lock_for_management(&mut tx, actor, group_id).await?;

        sqlx::query("UPDATE custom_groups SET display_name = $2 WHERE group_id = $1")
            .bind(group_id)
            .bind(display_name)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("updating display name", e))?;

        tx.commit().await.map_err(|e| db_error("committing display name", e))
    }

    async fn delete_group(&self, actor: &Principal, group_id: GroupId) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(|e| db_error("starting transaction", e))?;
        let group = Self::lock_for_management(&mut tx, actor, group_id).await?;

        sqlx::query("DELETE FROM custom_groups WHERE group_id = $1")
            .bind(group_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("deleting group", e))?;

        tx.commit().await.map_err(|e| db_error("committing delete", e))?;
        info!("Group row deleted: {} ({})", group.uri, group_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern(&SearchFilter::default()), None);
        assert_eq!(
            like_pattern(&SearchFilter::new(Some("gr".into()), None, None)).as_deref(),
            Some("%gr%")
        );
        assert_eq!(
            like_pattern(&SearchFilter::new(Some("50%_off".into()), None, None)).as_deref(),
            Some("%50\\%\\_off%")
        );
    }
}

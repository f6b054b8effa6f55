use sqlx::{PgConnection, PgPool};

use super::types::{Permission, PermissionFillData, PermissionSummary};

const SELECT_PERMISSION: &str = "\
    SELECT id, name, slug, description, model, \
           created_at::TEXT AS created_at, updated_at::TEXT AS updated_at \
    FROM permissions";

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Permission>, sqlx::Error> {
    sqlx::query_as::<_, Permission>(&format!("{SELECT_PERMISSION} WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Same as [`find_by_id`] but takes a row lock, for use inside a transaction.
pub async fn find_by_id_for_update(conn: &mut PgConnection, id: i64) -> Result<Option<Permission>, sqlx::Error> {
    sqlx::query_as::<_, Permission>(&format!("{SELECT_PERMISSION} WHERE id = $1 FOR UPDATE"))
        .bind(id)
        .fetch_optional(conn)
        .await
}

/// All permissions with role and direct-user counts, for the dashboard.
pub async fn find_all_summaries(pool: &PgPool) -> Result<Vec<PermissionSummary>, sqlx::Error> {
    sqlx::query_as::<_, PermissionSummary>(
        "SELECT p.id, p.name, p.slug, p.model, \
                (SELECT COUNT(*) FROM permission_role pr WHERE pr.permission_id = p.id) AS role_count, \
                (SELECT COUNT(*) FROM permission_user pu WHERE pu.permission_id = p.id) AS user_count \
         FROM permissions p \
         ORDER BY p.model, p.name",
    )
    .fetch_all(pool)
    .await
}

/// Distinct model names in use.
pub async fn find_models(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar("SELECT DISTINCT model FROM permissions ORDER BY model")
        .fetch_all(pool)
        .await
}

pub async fn name_exists(pool: &PgPool, name: &str, except_id: Option<i64>) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM permissions WHERE name = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
    )
    .bind(name)
    .bind(except_id)
    .fetch_one(pool)
    .await
}

pub async fn slug_exists(pool: &PgPool, slug: &str, except_id: Option<i64>) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM permissions WHERE slug = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
    )
    .bind(slug)
    .bind(except_id)
    .fetch_one(pool)
    .await
}

/// Insert a permission row, returning its id.
pub async fn create(conn: &mut PgConnection, data: &PermissionFillData) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO permissions (name, slug, description, model) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(&data.name)
    .bind(&data.slug)
    .bind(&data.description)
    .bind(&data.model)
    .fetch_one(conn)
    .await
}

/// Overwrite the attributes of an existing permission. Returns false if no row matched.
pub async fn update(conn: &mut PgConnection, id: i64, data: &PermissionFillData) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE permissions SET name = $1, slug = $2, description = $3, model = $4, updated_at = now() \
         WHERE id = $5",
    )
    .bind(&data.name)
    .bind(&data.slug)
    .bind(&data.description)
    .bind(&data.model)
    .bind(id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Replace the set of roles holding the permission.
pub async fn sync_roles(conn: &mut PgConnection, permission_id: i64, role_ids: &[i64]) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM permission_role WHERE permission_id = $1")
        .bind(permission_id)
        .execute(&mut *conn)
        .await?;

    if role_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        "INSERT INTO permission_role (permission_id, role_id) \
         SELECT $1, UNNEST($2::BIGINT[]) \
         ON CONFLICT DO NOTHING",
    )
    .bind(permission_id)
    .bind(role_ids)
    .execute(conn)
    .await?;
    Ok(())
}

/// Remove every role and user association for the permission.
pub async fn detach_associations(conn: &mut PgConnection, permission_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM permission_role WHERE permission_id = $1")
        .bind(permission_id)
        .execute(&mut *conn)
        .await?;
    sqlx::query("DELETE FROM permission_user WHERE permission_id = $1")
        .bind(permission_id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn delete(conn: &mut PgConnection, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM permissions WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Slugs of every permission the user holds, directly or through a role.
pub async fn find_slugs_by_user_id(pool: &PgPool, user_id: i64) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT p.slug FROM permissions p \
         JOIN permission_user pu ON pu.permission_id = p.id \
         WHERE pu.user_id = $1 \
         UNION \
         SELECT p.slug FROM permissions p \
         JOIN permission_role pr ON pr.permission_id = p.id \
         JOIN role_user ru ON ru.role_id = pr.role_id \
         WHERE ru.user_id = $1 \
         ORDER BY 1",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

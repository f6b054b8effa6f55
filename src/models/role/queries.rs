use sqlx::PgPool;

use super::types::{Role, RoleCheckbox, RoleSummary};

/// Find all roles with permission count and user count for the dashboard.
pub async fn find_all_summaries(pool: &PgPool) -> Result<Vec<RoleSummary>, sqlx::Error> {
    sqlx::query_as::<_, RoleSummary>(
        "SELECT r.id, r.name, r.slug, r.level, \
                (SELECT COUNT(*) FROM permission_role pr WHERE pr.role_id = r.id) AS permission_count, \
                (SELECT COUNT(*) FROM role_user ru WHERE ru.role_id = r.id) AS user_count \
         FROM roles r \
         ORDER BY r.level DESC, r.name",
    )
    .fetch_all(pool)
    .await
}

/// Roles that hold the given permission.
pub async fn find_by_permission(pool: &PgPool, permission_id: i64) -> Result<Vec<Role>, sqlx::Error> {
    sqlx::query_as::<_, Role>(
        "SELECT r.id, r.name, r.slug, r.description, r.level \
         FROM roles r \
         JOIN permission_role pr ON pr.role_id = r.id \
         WHERE pr.permission_id = $1 \
         ORDER BY r.level DESC, r.name",
    )
    .bind(permission_id)
    .fetch_all(pool)
    .await
}

/// All roles as checkboxes, checked where the role holds `permission_id`.
/// With `None` nothing is checked.
pub async fn find_checkboxes(pool: &PgPool, permission_id: Option<i64>) -> Result<Vec<RoleCheckbox>, sqlx::Error> {
    sqlx::query_as::<_, RoleCheckbox>(
        "SELECT r.id, r.name, r.slug, \
                EXISTS(SELECT 1 FROM permission_role pr \
                       WHERE pr.role_id = r.id AND pr.permission_id = $1) AS checked \
         FROM roles r \
         ORDER BY r.level DESC, r.name",
    )
    .bind(permission_id)
    .fetch_all(pool)
    .await
}

pub async fn find_slugs_by_user_id(pool: &PgPool, user_id: i64) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT r.slug FROM roles r \
         JOIN role_user ru ON ru.role_id = r.id \
         WHERE ru.user_id = $1 \
         ORDER BY r.slug",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Highest role level held by the user, 0 when the user has no roles.
pub async fn max_level_by_user_id(pool: &PgPool, user_id: i64) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT COALESCE(MAX(r.level), 0) FROM roles r \
         JOIN role_user ru ON ru.role_id = r.id \
         WHERE ru.user_id = $1",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
}

use sqlx::PgPool;

use super::types::UserDisplay;

/// Users holding the permission directly (not through a role).
pub async fn find_by_permission(pool: &PgPool, permission_id: i64) -> Result<Vec<UserDisplay>, sqlx::Error> {
    sqlx::query_as::<_, UserDisplay>(
        "SELECT u.id, u.name, u.email \
         FROM users u \
         JOIN permission_user pu ON pu.user_id = u.id \
         WHERE pu.permission_id = $1 \
         ORDER BY u.name, u.id",
    )
    .bind(permission_id)
    .fetch_all(pool)
    .await
}

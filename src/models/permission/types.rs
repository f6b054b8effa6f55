use sqlx::FromRow;

/// Model name used when a permission is not scoped to a specific entity.
pub const DEFAULT_MODEL: &str = "Permission";

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Permission {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub model: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Dashboard row: permission with association counts.
#[derive(Debug, Clone, FromRow)]
pub struct PermissionSummary {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub model: String,
    pub role_count: i64,
    pub user_count: i64,
}

/// Validated attributes ready for persistence.
/// `roles` is the full set of role ids that should hold the permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionFillData {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub model: String,
    pub roles: Vec<i64>,
}

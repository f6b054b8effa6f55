use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub level: i32,
}

/// Dashboard row: role with permission and user counts.
#[derive(Debug, Clone, FromRow)]
pub struct RoleSummary {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub level: i32,
    pub permission_count: i64,
    pub user_count: i64,
}

/// A role with its checked state for the permission form.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct RoleCheckbox {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub checked: bool,
}

use sqlx::FromRow;

/// Safe version for templates. Users are owned by the authentication
/// subsystem and only read here.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct UserDisplay {
    pub id: i64,
    pub name: String,
    pub email: String,
}

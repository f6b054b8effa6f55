//! Roles and permissions helpers.
//!
//! Handlers never touch storage directly; they go through [`RolesHelpers`],
//! shared as `web::Data<dyn RolesHelpers>`. Two bindings exist:
//! [`database::PgRolesHelpers`] and [`memory::MemoryRolesHelpers`].

pub mod database;
pub mod memory;
pub mod permission_form_fields;

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::permission::{Permission, PermissionFillData, PermissionSummary};
use crate::models::role::{Role, RoleCheckbox, RoleSummary};
use crate::models::user::UserDisplay;

pub use self::permission_form_fields::{PermissionFormData, PermissionFormFields};

/// Which dashboard page to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardView {
    Dashboard,
    /// Nothing has been created yet.
    Empty,
}

#[derive(Debug, Clone)]
pub struct DashboardData {
    pub view: DashboardView,
    pub roles: Vec<RoleSummary>,
    pub permissions: Vec<PermissionSummary>,
}

impl DashboardData {
    pub fn new(roles: Vec<RoleSummary>, permissions: Vec<PermissionSummary>) -> Self {
        let view = if roles.is_empty() && permissions.is_empty() {
            DashboardView::Empty
        } else {
            DashboardView::Dashboard
        };
        Self { view, roles, permissions }
    }
}

/// Everything the show page needs for one permission.
#[derive(Debug, Clone)]
pub struct PermissionItemData {
    pub permission: Permission,
    pub roles: Vec<Role>,
    pub users: Vec<UserDisplay>,
}

#[async_trait]
pub trait RolesHelpers: Send + Sync {
    async fn dashboard_data(&self) -> Result<DashboardData, AppError>;

    /// Fails with [`AppError::NotFound`] for an unknown id.
    async fn item_data(&self, id: i64) -> Result<PermissionItemData, AppError>;

    async fn find(&self, id: i64) -> Result<Option<Permission>, AppError>;

    /// Persist a new permission and grant it to `data.roles`.
    async fn create(&self, data: &PermissionFillData) -> Result<Permission, AppError>;

    /// Overwrite an existing permission and replace its role set.
    /// Fails with [`AppError::NotFound`] for an unknown id.
    async fn update(&self, id: i64, data: &PermissionFillData) -> Result<Permission, AppError>;

    /// Detach every role and user association of the permission, then
    /// delete it. Both steps succeed or neither does.
    /// Fails with [`AppError::NotFound`] for an unknown id.
    async fn destroy(&self, id: i64) -> Result<(), AppError>;

    async fn role_checkboxes(&self, permission_id: Option<i64>) -> Result<Vec<RoleCheckbox>, AppError>;

    /// Distinct model names already used by permissions.
    async fn permission_models(&self) -> Result<Vec<String>, AppError>;

    async fn name_taken(&self, name: &str, except_id: Option<i64>) -> Result<bool, AppError>;

    async fn slug_taken(&self, slug: &str, except_id: Option<i64>) -> Result<bool, AppError>;

    async fn user_role_slugs(&self, user_id: i64) -> Result<Vec<String>, AppError>;

    /// Direct and role-inherited permission slugs.
    async fn user_permission_slugs(&self, user_id: i64) -> Result<Vec<String>, AppError>;

    async fn user_level(&self, user_id: i64) -> Result<i32, AppError>;
}

use async_trait::async_trait;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::permission::{self, Permission, PermissionFillData};
use crate::models::role::{self, RoleCheckbox};
use crate::models::user;

use super::{DashboardData, PermissionItemData, RolesHelpers};

/// Postgres binding.
#[derive(Clone)]
pub struct PgRolesHelpers {
    pool: PgPool,
}

impl PgRolesHelpers {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load(&self, id: i64) -> Result<Permission, AppError> {
        permission::find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound)
    }
}

#[async_trait]
impl RolesHelpers for PgRolesHelpers {
    async fn dashboard_data(&self) -> Result<DashboardData, AppError> {
        let roles = role::find_all_summaries(&self.pool).await?;
        let permissions = permission::find_all_summaries(&self.pool).await?;
        Ok(DashboardData::new(roles, permissions))
    }

    async fn item_data(&self, id: i64) -> Result<PermissionItemData, AppError> {
        let permission = self.load(id).await?;
        let roles = role::find_by_permission(&self.pool, id).await?;
        let users = user::find_by_permission(&self.pool, id).await?;
        Ok(PermissionItemData { permission, roles, users })
    }

    async fn find(&self, id: i64) -> Result<Option<Permission>, AppError> {
        Ok(permission::find_by_id(&self.pool, id).await?)
    }

    async fn create(&self, data: &PermissionFillData) -> Result<Permission, AppError> {
        let mut tx = self.pool.begin().await?;
        let id = permission::create(&mut tx, data).await?;
        permission::sync_roles(&mut tx, id, &data.roles).await?;
        tx.commit().await?;
        self.load(id).await
    }

    async fn update(&self, id: i64, data: &PermissionFillData) -> Result<Permission, AppError> {
        let mut tx = self.pool.begin().await?;
        if !permission::update(&mut tx, id, data).await? {
            return Err(AppError::NotFound);
        }
        permission::sync_roles(&mut tx, id, &data.roles).await?;
        tx.commit().await?;
        self.load(id).await
    }

    /// Detach and delete in one transaction; a failure in either step
    /// leaves both the associations and the row in place.
    async fn destroy(&self, id: i64) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        if permission::find_by_id_for_update(&mut tx, id).await?.is_none() {
            return Err(AppError::NotFound);
        }
        permission::detach_associations(&mut tx, id).await?;
        permission::delete(&mut tx, id).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn role_checkboxes(&self, permission_id: Option<i64>) -> Result<Vec<RoleCheckbox>, AppError> {
        Ok(role::find_checkboxes(&self.pool, permission_id).await?)
    }

    async fn permission_models(&self) -> Result<Vec<String>, AppError> {
        Ok(permission::find_models(&self.pool).await?)
    }

    async fn name_taken(&self, name: &str, except_id: Option<i64>) -> Result<bool, AppError> {
        Ok(permission::name_exists(&self.pool, name, except_id).await?)
    }

    async fn slug_taken(&self, slug: &str, except_id: Option<i64>) -> Result<bool, AppError> {
        Ok(permission::slug_exists(&self.pool, slug, except_id).await?)
    }

    async fn user_role_slugs(&self, user_id: i64) -> Result<Vec<String>, AppError> {
        Ok(role::find_slugs_by_user_id(&self.pool, user_id).await?)
    }

    async fn user_permission_slugs(&self, user_id: i64) -> Result<Vec<String>, AppError> {
        Ok(permission::find_slugs_by_user_id(&self.pool, user_id).await?)
    }

    async fn user_level(&self, user_id: i64) -> Result<i32, AppError> {
        Ok(role::max_level_by_user_id(&self.pool, user_id).await?)
    }
}

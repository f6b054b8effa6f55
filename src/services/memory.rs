use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::permission::{Permission, PermissionFillData, PermissionSummary};
use crate::models::role::{Role, RoleCheckbox, RoleSummary};
use crate::models::user::UserDisplay;

use super::{DashboardData, PermissionItemData, RolesHelpers};

#[derive(Default)]
struct Tables {
    next_id: i64,
    permissions: BTreeMap<i64, Permission>,
    roles: BTreeMap<i64, Role>,
    users: BTreeMap<i64, UserDisplay>,
    /// (role_id, user_id)
    role_user: BTreeSet<(i64, i64)>,
    /// (permission_id, role_id)
    permission_role: BTreeSet<(i64, i64)>,
    /// (permission_id, user_id)
    permission_user: BTreeSet<(i64, i64)>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn sync_roles(&mut self, permission_id: i64, role_ids: &[i64]) {
        self.permission_role.retain(|(p, _)| *p != permission_id);
        for role_id in role_ids {
            if self.roles.contains_key(role_id) {
                self.permission_role.insert((permission_id, *role_id));
            }
        }
    }

    fn detach_associations(&mut self, permission_id: i64) {
        self.permission_role.retain(|(p, _)| *p != permission_id);
        self.permission_user.retain(|(p, _)| *p != permission_id);
    }

    fn role_ids_of_user(&self, user_id: i64) -> BTreeSet<i64> {
        self.role_user
            .iter()
            .filter(|(_, u)| *u == user_id)
            .map(|(r, _)| *r)
            .collect()
    }
}

fn now() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.6f+00").to_string()
}

fn sort_roles<T>(items: &mut [T], key: impl Fn(&T) -> (i32, &str)) {
    items.sort_by(|a, b| {
        let (la, na) = key(a);
        let (lb, nb) = key(b);
        lb.cmp(&la).then_with(|| na.cmp(nb))
    });
}

/// In-process binding. Data lives as long as the value does.
///
/// Each operation holds the lock for its whole body, so every call,
/// including [`RolesHelpers::destroy`], is atomic with respect to others.
#[derive(Default)]
pub struct MemoryRolesHelpers {
    tables: Mutex<Tables>,
}

impl MemoryRolesHelpers {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn insert_role(&self, name: &str, slug: &str, level: i32) -> i64 {
        let mut t = self.lock();
        let id = t.next_id();
        t.roles.insert(id, Role {
            id,
            name: name.to_string(),
            slug: slug.to_string(),
            description: String::new(),
            level,
        });
        id
    }

    pub fn insert_user(&self, name: &str, email: &str) -> i64 {
        let mut t = self.lock();
        let id = t.next_id();
        t.users.insert(id, UserDisplay {
            id,
            name: name.to_string(),
            email: email.to_string(),
        });
        id
    }

    pub fn assign_role(&self, user_id: i64, role_id: i64) {
        self.lock().role_user.insert((role_id, user_id));
    }

    pub fn grant_to_role(&self, permission_id: i64, role_id: i64) {
        self.lock().permission_role.insert((permission_id, role_id));
    }

    pub fn grant_to_user(&self, permission_id: i64, user_id: i64) {
        self.lock().permission_user.insert((permission_id, user_id));
    }

    pub fn permission_count(&self) -> usize {
        self.lock().permissions.len()
    }

    /// Number of role plus user associations that reference the permission.
    pub fn association_count(&self, permission_id: i64) -> usize {
        let t = self.lock();
        t.permission_role.iter().filter(|(p, _)| *p == permission_id).count()
            + t.permission_user.iter().filter(|(p, _)| *p == permission_id).count()
    }
}

#[async_trait]
impl RolesHelpers for MemoryRolesHelpers {
    async fn dashboard_data(&self) -> Result<DashboardData, AppError> {
        let t = self.lock();

        let mut roles: Vec<RoleSummary> = t
            .roles
            .values()
            .map(|r| RoleSummary {
                id: r.id,
                name: r.name.clone(),
                slug: r.slug.clone(),
                level: r.level,
                permission_count: t.permission_role.iter().filter(|(_, rid)| *rid == r.id).count() as i64,
                user_count: t.role_user.iter().filter(|(rid, _)| *rid == r.id).count() as i64,
            })
            .collect();
        sort_roles(&mut roles, |r| (r.level, r.name.as_str()));

        let mut permissions: Vec<PermissionSummary> = t
            .permissions
            .values()
            .map(|p| PermissionSummary {
                id: p.id,
                name: p.name.clone(),
                slug: p.slug.clone(),
                model: p.model.clone(),
                role_count: t.permission_role.iter().filter(|(pid, _)| *pid == p.id).count() as i64,
                user_count: t.permission_user.iter().filter(|(pid, _)| *pid == p.id).count() as i64,
            })
            .collect();
        permissions.sort_by(|a, b| a.model.cmp(&b.model).then_with(|| a.name.cmp(&b.name)));

        Ok(DashboardData::new(roles, permissions))
    }

    async fn item_data(&self, id: i64) -> Result<PermissionItemData, AppError> {
        let t = self.lock();
        let permission = t.permissions.get(&id).cloned().ok_or(AppError::NotFound)?;

        let mut roles: Vec<Role> = t
            .permission_role
            .iter()
            .filter(|(pid, _)| *pid == id)
            .filter_map(|(_, rid)| t.roles.get(rid).cloned())
            .collect();
        sort_roles(&mut roles, |r| (r.level, r.name.as_str()));

        let mut users: Vec<UserDisplay> = t
            .permission_user
            .iter()
            .filter(|(pid, _)| *pid == id)
            .filter_map(|(_, uid)| t.users.get(uid).cloned())
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

        Ok(PermissionItemData { permission, roles, users })
    }

    async fn find(&self, id: i64) -> Result<Option<Permission>, AppError> {
        Ok(self.lock().permissions.get(&id).cloned())
    }

    async fn create(&self, data: &PermissionFillData) -> Result<Permission, AppError> {
        let mut t = self.lock();
        if t.permissions.values().any(|p| p.name == data.name || p.slug == data.slug) {
            return Err(AppError::Storage(format!("duplicate permission {:?}", data.slug)));
        }
        let id = t.next_id();
        let stamp = now();
        let permission = Permission {
            id,
            name: data.name.clone(),
            slug: data.slug.clone(),
            description: data.description.clone(),
            model: data.model.clone(),
            created_at: stamp.clone(),
            updated_at: stamp,
        };
        t.permissions.insert(id, permission.clone());
        t.sync_roles(id, &data.roles);
        Ok(permission)
    }

    async fn update(&self, id: i64, data: &PermissionFillData) -> Result<Permission, AppError> {
        let mut t = self.lock();
        if t.permissions.values().any(|p| p.id != id && (p.name == data.name || p.slug == data.slug)) {
            return Err(AppError::Storage(format!("duplicate permission {:?}", data.slug)));
        }
        let permission = t.permissions.get_mut(&id).ok_or(AppError::NotFound)?;
        permission.name = data.name.clone();
        permission.slug = data.slug.clone();
        permission.description = data.description.clone();
        permission.model = data.model.clone();
        permission.updated_at = now();
        let updated = permission.clone();
        t.sync_roles(id, &data.roles);
        Ok(updated)
    }

    async fn destroy(&self, id: i64) -> Result<(), AppError> {
        let mut t = self.lock();
        if !t.permissions.contains_key(&id) {
            return Err(AppError::NotFound);
        }
        t.detach_associations(id);
        t.permissions.remove(&id);
        Ok(())
    }

    async fn role_checkboxes(&self, permission_id: Option<i64>) -> Result<Vec<RoleCheckbox>, AppError> {
        let t = self.lock();
        let mut roles: Vec<&Role> = t.roles.values().collect();
        sort_roles(&mut roles, |r| (r.level, r.name.as_str()));
        Ok(roles
            .into_iter()
            .map(|r| RoleCheckbox {
                id: r.id,
                name: r.name.clone(),
                slug: r.slug.clone(),
                checked: permission_id.is_some_and(|pid| t.permission_role.contains(&(pid, r.id))),
            })
            .collect())
    }

    async fn permission_models(&self) -> Result<Vec<String>, AppError> {
        let t = self.lock();
        let models: BTreeSet<String> = t.permissions.values().map(|p| p.model.clone()).collect();
        Ok(models.into_iter().collect())
    }

    async fn name_taken(&self, name: &str, except_id: Option<i64>) -> Result<bool, AppError> {
        Ok(self
            .lock()
            .permissions
            .values()
            .any(|p| p.name == name && Some(p.id) != except_id))
    }

    async fn slug_taken(&self, slug: &str, except_id: Option<i64>) -> Result<bool, AppError> {
        Ok(self
            .lock()
            .permissions
            .values()
            .any(|p| p.slug == slug && Some(p.id) != except_id))
    }

    async fn user_role_slugs(&self, user_id: i64) -> Result<Vec<String>, AppError> {
        let t = self.lock();
        let slugs: BTreeSet<String> = t
            .role_ids_of_user(user_id)
            .iter()
            .filter_map(|rid| t.roles.get(rid).map(|r| r.slug.clone()))
            .collect();
        Ok(slugs.into_iter().collect())
    }

    async fn user_permission_slugs(&self, user_id: i64) -> Result<Vec<String>, AppError> {
        let t = self.lock();
        let role_ids = t.role_ids_of_user(user_id);
        let direct = t.permission_user.iter().filter(|(_, u)| *u == user_id).map(|(p, _)| *p);
        let inherited = t.permission_role.iter().filter(|(_, r)| role_ids.contains(r)).map(|(p, _)| *p);
        let slugs: BTreeSet<String> = direct
            .chain(inherited)
            .filter_map(|pid| t.permissions.get(&pid).map(|p| p.slug.clone()))
            .collect();
        Ok(slugs.into_iter().collect())
    }

    async fn user_level(&self, user_id: i64) -> Result<i32, AppError> {
        let t = self.lock();
        Ok(t.role_ids_of_user(user_id)
            .iter()
            .filter_map(|rid| t.roles.get(rid).map(|r| r.level))
            .max()
            .unwrap_or(0))
    }
}

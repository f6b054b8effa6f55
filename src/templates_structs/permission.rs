use askama::Template;

use crate::services::{DashboardData, PermissionFormData, PermissionItemData};
use super::PageContext;

#[derive(Template)]
#[template(path = "permissions/dashboard.html")]
pub struct PermissionDashboardTemplate {
    pub ctx: PageContext,
    pub data: DashboardData,
}

#[derive(Template)]
#[template(path = "permissions/empty.html")]
pub struct PermissionEmptyTemplate {
    pub ctx: PageContext,
}

#[derive(Template)]
#[template(path = "permissions/create.html")]
pub struct PermissionCreateTemplate {
    pub ctx: PageContext,
    pub form: PermissionFormData,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "permissions/edit.html")]
pub struct PermissionEditTemplate {
    pub ctx: PageContext,
    pub form: PermissionFormData,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "permissions/show.html")]
pub struct PermissionShowTemplate {
    pub ctx: PageContext,
    pub item: PermissionItemData,
}

//! Template context structures for Askama templates.

use actix_session::Session;

use crate::auth::csrf;
use crate::auth::session::{get_username, take_flash};
use crate::config::RolesConfig;

mod permission;

pub use self::permission::{
    PermissionCreateTemplate, PermissionDashboardTemplate, PermissionEditTemplate,
    PermissionEmptyTemplate, PermissionShowTemplate,
};

/// Common context shared by all pages.
/// Templates access these as `ctx.username`, `ctx.flash`, etc.
pub struct PageContext {
    pub username: Option<String>,
    pub flash: Option<String>,
    pub csrf_token: String,
    /// Route prefix, prepended to every link.
    pub prefix: String,
}

impl PageContext {
    pub fn build(session: &Session, config: &RolesConfig) -> Self {
        Self {
            username: get_username(session),
            flash: take_flash(session),
            csrf_token: csrf::get_or_create_token(session),
            prefix: config.route_prefix.clone(),
        }
    }
}

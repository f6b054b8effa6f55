use actix_session::Session;
use actix_web::{web, HttpResponse};

use crate::config::RolesConfig;
use crate::errors::{AppError, render};
use crate::services::{DashboardView, RolesHelpers};
use crate::templates_structs::{PageContext, PermissionDashboardTemplate, PermissionEmptyTemplate};

/// Roles and permissions dashboard. Also serves the roles index.
pub async fn index(
    helpers: web::Data<dyn RolesHelpers>,
    config: web::Data<RolesConfig>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let data = helpers.dashboard_data().await?;
    let ctx = PageContext::build(&session, &config);

    match data.view {
        DashboardView::Dashboard => render(PermissionDashboardTemplate { ctx, data }),
        DashboardView::Empty => render(PermissionEmptyTemplate { ctx }),
    }
}

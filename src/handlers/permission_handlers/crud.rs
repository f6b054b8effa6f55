use actix_session::Session;
use actix_web::{http::StatusCode, web, HttpResponse};

use crate::config::RolesConfig;
use crate::errors::{AppError, render, render_with_status};
use crate::lang::trans;
use crate::requests::{get_field, PermissionInput, StorePermissionRequest, UpdatePermissionRequest};
use crate::services::{PermissionFormFields, RolesHelpers};
use crate::templates_structs::{
    PageContext, PermissionCreateTemplate, PermissionEditTemplate, PermissionShowTemplate,
};

use super::helpers::{parse_checked_form, redirect_with_flash};

pub async fn create(
    helpers: web::Data<dyn RolesHelpers>,
    config: web::Data<RolesConfig>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let form = PermissionFormFields::new(None).handle(helpers.get_ref()).await?;
    let ctx = PageContext::build(&session, &config);
    render(PermissionCreateTemplate { ctx, form, errors: vec![] })
}

pub async fn store(
    helpers: web::Data<dyn RolesHelpers>,
    config: web::Data<RolesConfig>,
    session: Session,
    body: String,
) -> Result<HttpResponse, AppError> {
    let params = parse_checked_form(&session, &body)?;
    let request = StorePermissionRequest::new(PermissionInput::from_params(&params));

    let data = match request.permission_fill_data(helpers.get_ref()).await {
        Ok(data) => data,
        Err(AppError::Validation(errors)) => {
            let mut form = PermissionFormFields::new(None).handle(helpers.get_ref()).await?;
            form.refill(request.input());
            let ctx = PageContext::build(&session, &config);
            return render_with_status(
                PermissionCreateTemplate { ctx, form, errors },
                StatusCode::UNPROCESSABLE_ENTITY,
            );
        }
        Err(e) => return Err(e),
    };

    let permission = helpers.create(&data).await?;
    log::info!("Created permission {} ({})", permission.slug, permission.id);

    let message = trans("permission-create", &[("permission", permission.name.as_str())]);
    Ok(redirect_with_flash(&session, &config.roles_index_path(), &message))
}

pub async fn show(
    helpers: web::Data<dyn RolesHelpers>,
    config: web::Data<RolesConfig>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let item = helpers.item_data(path.into_inner()).await?;
    let ctx = PageContext::build(&session, &config);
    render(PermissionShowTemplate { ctx, item })
}

pub async fn edit(
    helpers: web::Data<dyn RolesHelpers>,
    config: web::Data<RolesConfig>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let form = PermissionFormFields::new(Some(path.into_inner()))
        .handle(helpers.get_ref())
        .await?;
    let ctx = PageContext::build(&session, &config);
    render(PermissionEditTemplate { ctx, form, errors: vec![] })
}

pub async fn update(
    helpers: web::Data<dyn RolesHelpers>,
    config: web::Data<RolesConfig>,
    session: Session,
    path: web::Path<i64>,
    body: String,
) -> Result<HttpResponse, AppError> {
    let params = parse_checked_form(&session, &body)?;
    update_with_params(helpers.get_ref(), &config, &session, path.into_inner(), &params).await
}

pub async fn destroy(
    helpers: web::Data<dyn RolesHelpers>,
    config: web::Data<RolesConfig>,
    session: Session,
    path: web::Path<i64>,
    body: String,
) -> Result<HttpResponse, AppError> {
    parse_checked_form(&session, &body)?;
    destroy_by_id(helpers.get_ref(), &config, &session, path.into_inner()).await
}

/// `POST /permissions/{id}` carrying `_method=PUT|PATCH|DELETE`, for plain HTML forms.
pub async fn method_spoof(
    helpers: web::Data<dyn RolesHelpers>,
    config: web::Data<RolesConfig>,
    session: Session,
    path: web::Path<i64>,
    body: String,
) -> Result<HttpResponse, AppError> {
    let params = parse_checked_form(&session, &body)?;
    let id = path.into_inner();

    match get_field(&params, "_method").trim().to_ascii_uppercase().as_str() {
        "PUT" | "PATCH" => update_with_params(helpers.get_ref(), &config, &session, id, &params).await,
        "DELETE" => destroy_by_id(helpers.get_ref(), &config, &session, id).await,
        other => {
            log::warn!("Unsupported _method {:?} for permission {}", other, id);
            Ok(HttpResponse::MethodNotAllowed().finish())
        }
    }
}

async fn update_with_params(
    helpers: &dyn RolesHelpers,
    config: &RolesConfig,
    session: &Session,
    id: i64,
    params: &[(String, String)],
) -> Result<HttpResponse, AppError> {
    if helpers.find(id).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let request = UpdatePermissionRequest::new(PermissionInput::from_params(params));
    let data = match request.permission_fill_data(id, helpers).await {
        Ok(data) => data,
        Err(AppError::Validation(errors)) => {
            let mut form = PermissionFormFields::new(Some(id)).handle(helpers).await?;
            form.refill(request.input());
            let ctx = PageContext::build(session, config);
            return render_with_status(
                PermissionEditTemplate { ctx, form, errors },
                StatusCode::UNPROCESSABLE_ENTITY,
            );
        }
        Err(e) => return Err(e),
    };

    let permission = helpers.update(id, &data).await?;
    log::info!("Updated permission {} ({})", permission.slug, permission.id);

    let message = trans("permission-updated", &[("permission", permission.name.as_str())]);
    Ok(redirect_with_flash(session, &config.roles_index_path(), &message))
}

async fn destroy_by_id(
    helpers: &dyn RolesHelpers,
    config: &RolesConfig,
    session: &Session,
    id: i64,
) -> Result<HttpResponse, AppError> {
    let permission = helpers.find(id).await?.ok_or(AppError::NotFound)?;
    helpers.destroy(id).await?;
    log::info!("Deleted permission {} ({})", permission.slug, permission.id);

    let message = trans(
        "successDeletedItem",
        &[("type", "Permission"), ("item", permission.name.as_str())],
    );
    Ok(redirect_with_flash(session, &config.roles_index_path(), &message))
}

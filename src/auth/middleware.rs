use actix_session::SessionExt;
use actix_web::{
    Error, HttpResponse, ResponseError, web,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
};

use crate::config::RolesConfig;
use crate::errors::AppError;
use crate::services::RolesHelpers;
use super::gates::GateChain;
use super::session::get_user_id;

/// Middleware function that checks for an authenticated session.
/// Redirects to the configured login path if no user is found.
pub async fn require_auth(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let session = req.get_session();

    if get_user_id(&session).is_none() {
        let login_path = req
            .app_data::<web::Data<RolesConfig>>()
            .map(|c| c.login_path.clone())
            .unwrap_or_else(|| "/login".to_string());
        log::debug!("Unauthenticated request to {}, redirecting to {login_path}", req.path());
        let response = HttpResponse::SeeOther()
            .insert_header(("Location", login_path))
            .finish();
        return Ok(req.into_response(response).map_into_right_body());
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}

/// Middleware function that runs the configured gate chain.
/// Responds 403 on the first gate the session user does not pass.
pub async fn require_gates(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let chain = req.app_data::<web::Data<GateChain>>().cloned();
    let helpers = req.app_data::<web::Data<dyn RolesHelpers>>().cloned();
    let (Some(chain), Some(helpers)) = (chain, helpers) else {
        return Err(actix_web::error::ErrorInternalServerError("gate chain is not configured"));
    };

    let user_id = get_user_id(&req.get_session());
    for gate in chain.gates() {
        if !gate.allows(helpers.get_ref(), user_id).await? {
            log::warn!("Gate {gate} denied user {user_id:?} on {}", req.path());
            let response = AppError::Forbidden(format!("requires {gate}")).error_response();
            return Ok(req.into_response(response).map_into_right_body());
        }
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}

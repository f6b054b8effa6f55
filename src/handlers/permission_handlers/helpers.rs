use actix_session::Session;
use actix_web::HttpResponse;

use crate::auth::csrf;
use crate::auth::session::set_flash;
use crate::errors::AppError;
use crate::requests::{get_field, parse_form_body};

/// Parse a form body and check its CSRF token.
pub fn parse_checked_form(session: &Session, body: &str) -> Result<Vec<(String, String)>, AppError> {
    let params = parse_form_body(body)?;
    csrf::validate_csrf(session, get_field(&params, "csrf_token"))?;
    Ok(params)
}

/// 303 to `location`, leaving `message` for the next page.
pub fn redirect_with_flash(session: &Session, location: &str, message: &str) -> HttpResponse {
    set_flash(session, message);
    HttpResponse::SeeOther()
        .insert_header(("Location", location))
        .finish()
}

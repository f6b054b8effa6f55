use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{HttpResponse, cookie::Key, middleware::{Condition, from_fn}, web};

use crate::auth::gates::GateChain;
use crate::auth::middleware::{require_auth, require_gates};
use crate::config::RolesConfig;
use crate::errors::not_found_page;
use crate::handlers::permission_handlers;

/// Register the permissions GUI under `roles.route_prefix`.
///
/// Nothing is registered when `roles.gui_enabled` is off, so every
/// permissions path falls through to the 404 handler.
pub fn configure(cfg: &mut web::ServiceConfig, roles: &RolesConfig, gates: GateChain) {
    if !roles.gui_enabled {
        log::info!("Permissions GUI disabled, no routes registered");
        return;
    }

    cfg.app_data(web::Data::new(roles.clone()))
        .app_data(web::Data::new(gates))
        // Gates wrap only these two services, so other host routes and
        // unknown paths are left alone.
        .service(
            web::resource(roles.roles_index_path())
                // Registered first so it runs innermost, after auth.
                .wrap(Condition::new(roles.gui_middleware_enabled, from_fn(require_gates)))
                .wrap(Condition::new(roles.gui_auth_enabled, from_fn(require_auth)))
                .route(web::get().to(permission_handlers::index)),
        )
        .service(
            web::scope(&roles.path("/permissions"))
                .wrap(Condition::new(roles.gui_middleware_enabled, from_fn(require_gates)))
                .wrap(Condition::new(roles.gui_auth_enabled, from_fn(require_auth)))
                .route("", web::get().to(permission_handlers::index))
                .route("", web::post().to(permission_handlers::store))
                // /create BEFORE /{id}
                .route("/create", web::get().to(permission_handlers::create))
                .route("/{id}", web::get().to(permission_handlers::show))
                .route("/{id}/edit", web::get().to(permission_handlers::edit))
                .route("/{id}", web::put().to(permission_handlers::update))
                .route("/{id}", web::patch().to(permission_handlers::update))
                .route("/{id}", web::delete().to(permission_handlers::destroy))
                .route("/{id}", web::post().to(permission_handlers::method_spoof)),
        );
}

/// Cookie-backed session carrying the flash message and CSRF token.
pub fn session_middleware(key: Key) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_secure(false)
        .cookie_http_only(true)
        .build()
}

/// Default service: everything unmatched is a 404 page.
pub async fn not_found() -> HttpResponse {
    not_found_page()
}

//! Shared helpers for driving the permissions GUI through actix's test service.
//!
//! Storage is a [`MemoryRolesHelpers`], so no database is needed. The app gets
//! one extra public route, `GET /test-login/{user_id}`, which writes the
//! session keys the authentication subsystem would normally set.
//!
//! The Postgres binding is tested against `DATABASE_URL` when it is set;
//! see [`setup_test_pool`].

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use actix_session::Session;
use actix_web::{HttpResponse, body::MessageBody, cookie::Cookie, dev::ServiceResponse, test, web};
use regex::Regex;
use sqlx::PgPool;

use roles_gui::auth::session::{USER_ID_KEY, USERNAME_KEY};
use roles_gui::config::{DatabaseConfig, MiddlewareSpec, PermissionBinding, RolesConfig};
use roles_gui::models::permission::PermissionFillData;
use roles_gui::services::RolesHelpers;
use roles_gui::services::memory::MemoryRolesHelpers;

/// Fixed key so every test app can read its own cookies.
pub const SESSION_KEY: &[u8; 64] = b"0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

/// Roles config with auth and custom gates off and memory storage.
pub fn open_config() -> RolesConfig {
    let mut config = RolesConfig {
        gui_auth_enabled: false,
        gui_middleware_enabled: false,
        ..RolesConfig::default()
    };
    config.models.permission = PermissionBinding::Memory;
    config
}

pub fn gated_config(middleware: &[&str]) -> RolesConfig {
    RolesConfig {
        gui_auth_enabled: true,
        gui_middleware_enabled: true,
        gui_middleware: MiddlewareSpec::Many(middleware.iter().map(|m| m.to_string()).collect()),
        ..open_config()
    }
}

pub fn new_store() -> Arc<MemoryRolesHelpers> {
    Arc::new(MemoryRolesHelpers::new())
}

pub fn helpers_data(store: &Arc<MemoryRolesHelpers>) -> web::Data<dyn RolesHelpers> {
    web::Data::from(store.clone() as Arc<dyn RolesHelpers>)
}

pub async fn test_login(path: web::Path<i64>, session: Session) -> HttpResponse {
    let user_id = path.into_inner();
    session.insert(USER_ID_KEY, user_id).ok();
    session.insert(USERNAME_KEY, format!("user{user_id}")).ok();
    HttpResponse::Ok().finish()
}

/// Build and start a test service for `$config` backed by `$store`.
macro_rules! test_app {
    ($store:expr, $config:expr) => {{
        let config: roles_gui::config::RolesConfig = $config;
        let gates = roles_gui::auth::gates::GateChain::from_config(&config).unwrap();
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(roles_gui::routes::session_middleware(
                    actix_web::cookie::Key::from(common::SESSION_KEY),
                ))
                .app_data(common::helpers_data(&$store))
                .route("/test-login/{id}", actix_web::web::get().to(common::test_login))
                .configure(|cfg| roles_gui::routes::configure(cfg, &config, gates.clone()))
                .default_service(actix_web::web::to(roles_gui::routes::not_found)),
        )
        .await
    }};
}

/// Cookies carried from one request to the next, like a browser would.
#[derive(Default)]
pub struct Jar {
    cookies: HashMap<String, Cookie<'static>>,
}

impl Jar {
    pub fn apply(&self, mut req: test::TestRequest) -> test::TestRequest {
        for cookie in self.cookies.values() {
            req = req.cookie(cookie.clone());
        }
        req
    }

    pub fn absorb<B>(&mut self, resp: &ServiceResponse<B>) {
        for cookie in resp.response().cookies() {
            let cookie = cookie.into_owned();
            if cookie.value().is_empty() {
                self.cookies.remove(cookie.name());
            } else {
                self.cookies.insert(cookie.name().to_string(), cookie);
            }
        }
    }
}

/// Send `$req` with the jar's cookies and keep any cookies the response sets.
macro_rules! send {
    ($app:expr, $jar:expr, $req:expr) => {{
        let resp = actix_web::test::call_service(&$app, $jar.apply($req).to_request()).await;
        $jar.absorb(&resp);
        resp
    }};
}

pub async fn body_string<B: MessageBody>(resp: ServiceResponse<B>) -> String {
    let bytes = test::read_body(resp).await;
    String::from_utf8_lossy(&bytes).into_owned()
}

pub fn csrf_token(html: &str) -> String {
    let re = Regex::new(r#"name="csrf_token" value="([0-9a-f]+)""#).unwrap();
    re.captures(html)
        .map(|c| c[1].to_string())
        .expect("page has no csrf token")
}

pub fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get("Location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub fn form(pairs: &[(&str, &str)]) -> String {
    serde_urlencoded::to_string(pairs).unwrap()
}

pub async fn seed_permission(store: &MemoryRolesHelpers, name: &str, slug: &str, roles: Vec<i64>) -> i64 {
    store
        .create(&PermissionFillData {
            name: name.to_string(),
            slug: slug.to_string(),
            description: String::new(),
            model: "Permission".to_string(),
            roles,
        })
        .await
        .unwrap()
        .id
}

// ============================================================================
// POSTGRES
// ============================================================================

/// Pool on `DATABASE_URL` with migrations applied, or `None` when the
/// variable is unset so database tests can skip.
///
/// Tests share the database, so every fixture gets a [`unique`] name.
pub async fn setup_test_pool() -> Option<PgPool> {
    let url = std::env::var("DATABASE_URL").ok().filter(|url| !url.is_empty())?;
    let config = DatabaseConfig { url, max_connections: 2 };
    let pool = roles_gui::db::init_pool(&config)
        .await
        .expect("Failed to connect to DATABASE_URL");
    roles_gui::db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    Some(pool)
}

pub fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", hex::encode(rand::random::<[u8; 6]>()))
}

pub async fn pg_insert_role(pool: &PgPool, slug: &str, level: i32) -> i64 {
    sqlx::query_scalar("INSERT INTO roles (name, slug, level) VALUES ($1, $1, $2) RETURNING id")
        .bind(slug)
        .bind(level)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn pg_insert_user(pool: &PgPool, name: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO users (name, email) VALUES ($1, $2) RETURNING id")
        .bind(name)
        .bind(format!("{name}@example.com"))
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn pg_assign_role(pool: &PgPool, user_id: i64, role_id: i64) {
    sqlx::query("INSERT INTO role_user (role_id, user_id) VALUES ($1, $2)")
        .bind(role_id)
        .bind(user_id)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn pg_grant_to_user(pool: &PgPool, permission_id: i64, user_id: i64) {
    sqlx::query("INSERT INTO permission_user (permission_id, user_id) VALUES ($1, $2)")
        .bind(permission_id)
        .bind(user_id)
        .execute(pool)
        .await
        .unwrap();
}

/// Rows in both pivot tables that reference the permission.
pub async fn pg_association_count(pool: &PgPool, permission_id: i64) -> i64 {
    sqlx::query_scalar(
        "SELECT (SELECT COUNT(*) FROM permission_role WHERE permission_id = $1) \
              + (SELECT COUNT(*) FROM permission_user WHERE permission_id = $1)",
    )
    .bind(permission_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

use std::sync::Arc;

use actix_web::{App, HttpServer, cookie::Key, middleware, web};

use roles_gui::auth::gates::GateChain;
use roles_gui::config::{Config, PermissionBinding};
use roles_gui::services::RolesHelpers;
use roles_gui::services::database::PgRolesHelpers;
use roles_gui::services::memory::MemoryRolesHelpers;
use roles_gui::{db, routes};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::load()?;
    // Unknown middleware identifiers abort startup here.
    let gates = GateChain::from_config(&config.roles)?;

    let helpers: Arc<dyn RolesHelpers> = match config.roles.models.permission {
        PermissionBinding::Database => {
            let pool = db::init_pool(&config.database).await?;
            db::run_migrations(&pool).await?;
            Arc::new(PgRolesHelpers::new(pool))
        }
        PermissionBinding::Memory => {
            log::warn!("Using in-memory permission storage, data is lost on restart");
            Arc::new(MemoryRolesHelpers::new())
        }
    };
    let helpers = web::Data::from(helpers);

    // Session encryption key, load from SESSION_KEY env var for persistent sessions across restarts
    let secret_key = match std::env::var("SESSION_KEY") {
        Ok(val) if val.len() >= 64 => {
            log::info!("Using SESSION_KEY from environment");
            Key::from(val.as_bytes())
        }
        Ok(val) => {
            log::warn!("SESSION_KEY too short ({} bytes, need 64+), generating random key", val.len());
            Key::generate()
        }
        Err(_) => {
            log::warn!("No SESSION_KEY set, generating random key (sessions lost on restart)");
            Key::generate()
        }
    };

    let host = config.server.host.clone();
    let port = config.server.port;
    log::info!(
        "Starting server at http://{host}:{port}{}",
        config.roles.path("/permissions")
    );

    let roles = config.roles.clone();
    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(routes::session_middleware(secret_key.clone()))
            .wrap(middleware::Logger::default())
            .app_data(helpers.clone())
            .configure(|cfg| routes::configure(cfg, &roles, gates.clone()))
            // Default 404 handler (must be registered last)
            .default_service(web::to(routes::not_found))
    });
    if let Some(workers) = config.server.workers {
        server = server.workers(workers);
    }

    server.bind((host.as_str(), port))?.run().await?;
    Ok(())
}

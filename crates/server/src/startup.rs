use std::net::SocketAddr;

use axum::Router;
use common::utils::logging::init_logging_default;
use configs::AppConfig;
use dotenvy::dotenv;
use migration::{Migrator, MigratorTrait};
use tracing::{info, warn};

use crate::routes;
use crate::state::{AuthSettings, ServerState};

/// Initialize logging via shared common utils
fn init_logging() {
    init_logging_default();
}

/// Load the full config, falling back to env-seeded defaults when no
/// config file is present.
fn load_config() -> anyhow::Result<AppConfig> {
    match AppConfig::load_and_validate() {
        Ok(cfg) => Ok(cfg),
        Err(e) => {
            warn!(error = %e, "no usable config file, using defaults and env");
            let mut cfg = AppConfig::default();
            cfg.normalize_and_validate()?;
            Ok(cfg)
        }
    }
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let cfg = load_config()?;

    // DB connection with pool settings from config
    let db = models::db::connect_with(&cfg.database).await?;

    // Schema is applied on boot; re-running is a no-op
    Migrator::up(&db, None).await?;
    info!("migrations applied");

    let state = ServerState::new(
        db,
        AuthSettings {
            jwt_secret: cfg.auth.jwt_secret.clone(),
            token_ttl_hours: cfg.auth.token_ttl_hours,
        },
    );

    // Build router
    let app: Router = routes::build_router(state);

    // Bind and serve
    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(%addr, "starting api server");
    println!("starting api server at {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

use std::{net::SocketAddr, sync::Arc};

use axum::http::HeaderValue;
use axum::Router;
use migration::MigratorTrait;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use configs::AppConfig;
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::repository::AuthRepository;
use service::vacation::repo::seaorm::SeaOrmVacationRepository;
use service::vacation::repository::VacationRepository;

use crate::errors::StartupError;
use crate::routes;
use crate::state::AppState;

/// Permissive when no origins are configured (local development).
pub fn build_cors(origins: &[String]) -> Result<CorsLayer, StartupError> {
    if origins.is_empty() {
        return Ok(CorsLayer::very_permissive());
    }
    let parsed = origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o.trim())
                .map_err(|_| StartupError::InvalidConfig(format!("invalid CORS origin: {o}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CorsLayer::very_permissive().allow_origin(AllowOrigin::list(parsed)))
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address: {e}")))
}

/// Connect, migrate, seed the bootstrap admin and assemble the router.
pub async fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    common::env::ensure_env(&cfg.uploads.images_dir).await?;

    let db = models::db::connect_with_config(&cfg.database).await?;
    if cfg.database.run_migrations {
        migration::Migrator::up(&db, None).await?;
        info!(event = "migrations_applied", "database schema up to date");
    }

    let auth_repo: Arc<dyn AuthRepository> = Arc::new(SeaOrmAuthRepository::new(db.clone()));
    let vacation_repo: Arc<dyn VacationRepository> = Arc::new(SeaOrmVacationRepository::new(db));
    let state = AppState::new(auth_repo, vacation_repo, cfg);

    if let Some(admin) = &cfg.auth.bootstrap_admin {
        if let Some(user) = state.auth.ensure_admin(admin).await? {
            info!(event = "bootstrap_admin", user_id = %user.id, email = %user.email, "admin account created");
        }
    }
    if cfg.auth.uses_dev_secret() {
        warn!(event = "dev_secret", "JWT_SECRET not set; using the development signing key");
    }

    let cors = build_cors(&cfg.server.cors_origins)?;
    Ok(routes::build_router(state, cors))
}

/// Public entry: build the app and serve until Ctrl+C
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let app = build_app(&cfg).await?;

    let addr = bind_addr(&cfg)?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| StartupError::Runtime(format!("cannot bind {addr}: {e}")))?;
    info!(%addr, event = "listening", "vacations api ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!(event = "shutdown_signal", "received Ctrl+C, draining connections");
            }
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_accepts_origin_list() {
        assert!(build_cors(&[]).is_ok());
        assert!(build_cors(&["http://localhost:5173".to_string()]).is_ok());
        assert!(build_cors(&["bad\norigin".to_string()]).is_err());
    }

    #[test]
    fn bind_addr_uses_server_section() {
        let cfg = AppConfig::default();
        assert_eq!(bind_addr(&cfg).unwrap().port(), 3030);
    }
}

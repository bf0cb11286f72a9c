//! Store Admin Server
//!
//! REST APIs for the store administration console:
//! - Session: current store context, store selection, sign-out
//! - Access: guard decisions and the role table
//! - Team: membership administration for the selected store, invitations
//! - Stores: store catalogue administration
//!
//! ## Configuration
//!
//! Read from a TOML file (`STOREADMIN_CONFIG` or the standard search paths)
//! with `STOREADMIN_*` environment overrides. See `sa_config::AppConfig`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{http::HeaderValue, routing::get, Json, Router};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use utoipa_axum::router::OpenApiRouter;

use sa_access::access::access_router;
use sa_access::directory::{MembershipDirectory, MemoryDirectory, MongoDirectory};
use sa_access::membership::{team_router, TeamState};
use sa_access::seed::DevDataSeeder;
use sa_access::session::{session_router, SessionManager, SessionState};
use sa_access::store::{stores_router, StoresState};
use sa_access::shared::health_api::{health_router, HealthState};
use sa_access::shared::indexes::initialize_indexes;
use sa_access::{AppState, AuthLayer, JwtIdentityProvider};
use sa_config::{AppConfig, StorageBackend};

const DEV_JWT_SECRET: &str = "storeadmin-dev-secret-change-me";

#[tokio::main]
async fn main() -> Result<()> {
    sa_common::logging::init_logging("sa-admin-server");

    info!("Starting Store Admin Server");

    let mut config = AppConfig::load()?;
    config.validate()?;

    if config.auth.jwt_secret.is_empty() {
        warn!("auth.jwt_secret not set, using the development secret");
        config.auth.jwt_secret = DEV_JWT_SECRET.to_string();
    }

    // Directory backend
    let (directory, db): (Arc<dyn MembershipDirectory>, Option<mongodb::Database>) =
        match config.storage.backend {
            StorageBackend::Mongodb => {
                info!("Connecting to MongoDB: {}/{}", config.mongodb.uri, config.mongodb.database);
                let client = mongodb::Client::with_uri_str(&config.mongodb.uri).await?;
                let db = client.database(&config.mongodb.database);
                initialize_indexes(&db).await?;
                let directory: Arc<dyn MembershipDirectory> = Arc::new(MongoDirectory::new(&db));
                (directory, Some(db))
            }
            StorageBackend::Memory => {
                warn!("Using in-memory directory, data is lost on shutdown");
                let directory: Arc<dyn MembershipDirectory> = Arc::new(MemoryDirectory::new());
                (directory, None)
            }
        };

    let identity_provider = Arc::new(JwtIdentityProvider::new(
        &config.auth.jwt_secret,
        config.auth.issuer.clone(),
        config.auth.audience.clone(),
    ));

    // Seed development data if in dev mode
    if config.dev_mode {
        let seeder = DevDataSeeder::new(directory.clone());
        match seeder.seed().await {
            Ok(identities) => {
                info!("Dev tokens (valid {}s):", config.auth.dev_token_expiry_secs);
                for identity in &identities {
                    match identity_provider.issue_token(identity, config.auth.dev_token_expiry_secs) {
                        Ok(token) => info!(email = %identity.email, "Bearer {}", token),
                        Err(e) => warn!(email = %identity.email, error = %e, "Failed to issue dev token"),
                    }
                }
            }
            Err(e) => warn!("Dev data seeding skipped: {}", e),
        }
    }

    let sessions = Arc::new(SessionManager::new(
        directory,
        Duration::from_millis(config.access.lookup_timeout_ms),
    ));
    let _sweeper = sessions.spawn_sweeper(
        Duration::from_secs(config.access.session_sweep_secs),
        Duration::from_secs(config.access.session_idle_secs),
    );

    let app_state = AppState {
        identity_provider,
        sessions: sessions.clone(),
        sign_in_url: config.auth.sign_in_url.clone(),
        session_cookie: config.auth.session_cookie.clone(),
    };

    let health_state = HealthState::new(db, Some(env!("CARGO_PKG_VERSION").to_string()));

    let (router, mut openapi) = OpenApiRouter::new()
        .nest("/api/session", session_router(SessionState { sessions: sessions.clone() }))
        .nest("/api/access", access_router())
        .nest("/api/team", team_router(TeamState { sessions: sessions.clone() }))
        .nest("/api/stores", stores_router(StoresState { sessions }))
        .split_for_parts();

    openapi.info.title = "Store Admin API".to_string();
    openapi.info.version = env!("CARGO_PKG_VERSION").to_string();
    openapi.info.description = Some("Store context, access checks, team and store administration".to_string());

    let app = Router::new()
        .merge(router)
        .nest("/health", health_router(health_state.clone()))
        .route("/api-docs/openapi.json", get(move || async move { Json(openapi) }))
        .layer(AuthLayer::new(app_state))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.http.cors_origins));

    let addr = format!("{}:{}", config.http.host, config.http.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("API server listening on http://{}", addr);

    health_state.set_ready();

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Store Admin Server shutdown complete");
    Ok(())
}

/// Permissive when no origins are configured or `*` is listed
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received...");
}

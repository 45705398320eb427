//! Heroledger Engine - Main entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::header::HeaderName;
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use heroledger_engine::api::{self, websocket::WsState, ConnectionManager};
use heroledger_engine::infrastructure::{
    clock::SystemClock,
    ports::ClockPort,
    sqlite::{self, SqliteEventLog, SqliteSettingsRepo},
};
use heroledger_engine::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "heroledger_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Heroledger Engine");

    // Load configuration
    let server_host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let server_port: u16 = std::env::var("SERVER_PORT")
        .or_else(|_| std::env::var("PORT"))
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .unwrap_or(3000);
    let ledger_db = std::env::var("LEDGER_DB").unwrap_or_else(|_| "ledger.db".into());

    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock);

    tracing::info!("Opening ledger database at {}", ledger_db);
    let pool = sqlite::connect(&ledger_db).await?;
    let event_log = Arc::new(SqliteEventLog::new(pool.clone()).await?);
    let settings_repo = Arc::new(SqliteSettingsRepo::new(pool, clock.clone()).await?);

    // Create application
    let app = Arc::new(App::new(event_log, settings_repo, clock));

    // Create WebSocket state
    let ws_state = Arc::new(WsState {
        app: app.clone(),
        connections: Arc::new(ConnectionManager::new()),
    });

    // Spawn expired-reservation sweeper
    let sweep_app = app.clone();
    tokio::spawn(async move {
        loop {
            let expired = sweep_app.use_cases.spend.sweep_expired();
            for hold in &expired {
                tracing::info!(
                    reservation_id = %hold.id,
                    actor_id = %hold.actor_id,
                    "Expired spend reservation released"
                );
            }
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
    });

    // Build router; HTTP routes share the WebSocket state for broadcasts
    let mut router = api::http::routes()
        .route("/ws", get(api::websocket::ws_handler))
        .with_state(ws_state)
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = build_cors_layer_from_env() {
        router = router.layer(cors);
    }

    // Start server
    let addr: SocketAddr = format!("{server_host}:{server_port}").parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

fn build_cors_layer_from_env() -> Option<CorsLayer> {
    let allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let allowed_origins = allowed_origins?;

    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            HeaderName::from_static("x-user-id"),
            axum::http::header::CONTENT_TYPE,
        ]);

    if allowed_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        if origins.is_empty() {
            return None;
        }

        cors = cors.allow_origin(origins);
    }

    Some(cors)
}

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use attendance::AttendanceModule;
use axum::routing::get;
use axum::{Json, Router};
use campus_auth::{Guard, StaticIdentityProvider};
use http::{HeaderName, StatusCode};
use org_resolver::OrgResolverModule;
use org_resolver::infra::storage::SeaOrmUserDirectory;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::{Value, json};
use tokio::signal;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::{AppConfig, DatabaseConfig};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Open the shared connection pool.
///
/// # Errors
/// Returns an error if the database cannot be reached.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(config.url.clone());
    // Every pooled connection to an in-memory sqlite database is a new database.
    let max_connections = if config.url.contains(":memory:") {
        1
    } else {
        config.max_connections
    };
    options
        .max_connections(max_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .sqlx_logging(false);

    Database::connect(options)
        .await
        .with_context(|| format!("cannot connect to database '{}'", config.url))
}

/// Migrate, seed and wire every module into one router.
///
/// # Errors
/// Returns an error if migrations or seeding fail.
pub async fn build_app(config: &AppConfig, db: DatabaseConnection) -> Result<Router> {
    OrgResolverModule::migrate(&db).await?;
    AttendanceModule::migrate(&db).await?;

    let directory = SeaOrmUserDirectory::new(db.clone());
    for user in &config.users {
        directory
            .upsert_user(&user.id, &user.email, user.org_id.as_deref())
            .await
            .with_context(|| format!("cannot seed user '{}'", user.id))?;
    }
    tracing::info!(users = config.users.len(), "user records seeded");

    let provider = Arc::new(StaticIdentityProvider::from_config(&config.auth));
    let resolver = OrgResolverModule::new(
        config.modules.org_resolver.clone(),
        db.clone(),
        provider.clone(),
    );
    let attendance = AttendanceModule::new(config.modules.attendance.clone(), db);
    let guard = Guard::new(provider, resolver.client());

    let router = Router::new()
        .route("/health", get(health))
        .merge(resolver.router(&guard))
        .merge(attendance.router(&guard));
    Ok(apply_layers(router, config.server.request_timeout_secs))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Outermost first at runtime: `SetRequestId`, `PropagateRequestId`, Trace, Timeout.
fn apply_layers(router: Router, timeout_secs: u64) -> Router {
    let x_request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    router
        .layer(TimeoutLayer::with_status_code(
            StatusCode::GATEWAY_TIMEOUT,
            Duration::from_secs(timeout_secs),
        ))
        .layer(TraceLayer::new_for_http().make_span_with(
            |req: &axum::http::Request<axum::body::Body>| {
                let request_id = req
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("n/a");
                tracing::info_span!(
                    "http_request",
                    method = %req.method(),
                    uri = %req.uri().path(),
                    request_id = %request_id,
                )
            },
        ))
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid))
}

/// Bind, serve and stop on Ctrl+C or SIGTERM.
///
/// # Errors
/// Returns an error if startup fails or the server stops abnormally.
pub async fn run(config: AppConfig) -> Result<()> {
    let addr = config.bind_addr()?;
    let db = connect(&config.database).await?;
    let app = build_app(&config, db).await?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot bind {addr}"))?;
    tracing::info!(%addr, "HTTP server bound");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;
    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(%e, "Error handling Ctrl+C signal");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(%e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C signal"),
        () = terminate => tracing::info!("Received SIGTERM signal"),
    }
    tracing::info!("Shutdown signal received, initiating graceful shutdown");
}

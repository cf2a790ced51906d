//! LexForge API Gateway
//!
//! The HTTP entry point for the document store.
//! Handles:
//! - Caller identity resolution
//! - Rate limiting
//! - Request routing
//! - Observability (logging, metrics, tracing)

mod handlers;
mod middleware;

use anyhow::Context;
use axum::{
    extract::Request,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Extension, Router,
};
use lexforge_common::{
    auth::IdentitySettings,
    config::{AppConfig, ObservabilityConfig},
    db::{DbPool, Repository},
    editing::DocumentEditor,
    expiry::ExpiryExtractor,
    genai::{create_generator, Generator},
    metrics,
    query::{QueryEngine, QueryOptions},
    share::ShareLinks,
};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::{signal, sync::oneshot};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use middleware::rate_limit::{rate_limit_middleware, RateLimit};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub repo: Repository,
    pub engine: Arc<QueryEngine>,
    pub expiry: Arc<ExpiryExtractor>,
    pub editor: Arc<DocumentEditor>,
    pub share_links: ShareLinks,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Arc::new(AppConfig::load().context("Failed to load configuration")?);

    // Initialize tracing
    init_tracing(&config.observability);

    info!(
        service = %config.observability.service_name,
        "Starting LexForge API Gateway v{}",
        lexforge_common::VERSION
    );

    // Initialize metrics
    if config.observability.metrics_port != 0 {
        install_metrics_exporter(config.observability.metrics_port)?;
    }
    metrics::register_metrics();

    // Initialize database connection
    info!("Connecting to database...");
    let db = DbPool::new(&config.database).await?;
    if config.database.run_migrations {
        db.migrate().await?;
    }
    let repo = Repository::new(db);

    // Generation-backed services
    let generator = create_generator(&config.generation)?;
    info!(model = generator.model_name(), "Generator ready");

    let engine = QueryEngine::new(
        Arc::new(repo.clone()),
        generator.clone(),
        QueryOptions::from_config(&config.query, &config.generation),
    );
    let expiry = ExpiryExtractor::from_config(generator.clone(), &config.expiry);
    let editor = DocumentEditor::new(generator, &config.generation);

    // Create app state
    let state = AppState {
        config: config.clone(),
        repo,
        engine: Arc::new(engine),
        expiry: Arc::new(expiry),
        editor: Arc::new(editor),
        share_links: ShareLinks::new(&config.share),
    };

    // Build the router
    let app = create_router(state)?;

    // Start the server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                stop_rx.await.ok();
            })
            .into_future(),
    );

    shutdown_signal().await;
    stop_tx.send(()).ok();

    // In-flight requests get the configured grace period
    match tokio::time::timeout(config.shutdown_timeout(), server).await {
        Ok(result) => result??,
        Err(_) => tracing::warn!("Graceful shutdown timed out, exiting"),
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Install the tracing subscriber; `RUST_LOG` overrides the configured level
fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Serve Prometheus metrics on their own port
fn install_metrics_exporter(port: u16) -> anyhow::Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(SocketAddr::from(([0, 0, 0, 0], port)))
        .set_buckets_for_metric(
            Matcher::Full(format!("{}_request_duration_seconds", metrics::METRICS_PREFIX)),
            metrics::LATENCY_BUCKETS,
        )?
        .set_buckets_for_metric(
            Matcher::Suffix("query_duration_seconds".to_string()),
            metrics::GENERATION_BUCKETS,
        )?
        .set_buckets_for_metric(
            Matcher::Suffix("generation_duration_seconds".to_string()),
            metrics::GENERATION_BUCKETS,
        )?
        .install()
        .context("Failed to install Prometheus exporter")?;

    info!(port, "Metrics exporter listening");
    Ok(())
}

/// Create the main application router
fn create_router(state: AppState) -> anyhow::Result<Router> {
    let config = state.config.clone();

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    // Request spans carry the service name
    let service = config.observability.service_name.clone();
    let trace = TraceLayer::new_for_http().make_span_with(move |request: &Request| {
        tracing::info_span!(
            "request",
            service = %service,
            method = %request.method(),
            uri = %request.uri()
        )
    });

    let identity = IdentitySettings::from_config(&config.auth)?;
    if identity.verifies_tokens() {
        info!("Bearer token verification enabled");
    }

    // Expiry scans run one extraction per document and get their own deadline
    let expiry_routes = Router::new()
        .route(
            "/documents/expiry",
            post(handlers::expiry::scan_expiry).patch(handlers::expiry::refresh_expiry),
        )
        .layer(TimeoutLayer::new(config.expiry.scan_route_timeout()));

    // API routes
    let mut api_routes = Router::new()
        // Health endpoints
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))

        // Document endpoints
        .route(
            "/documents",
            get(handlers::documents::list_documents).post(handlers::documents::create_document),
        )
        .route(
            "/documents/share",
            get(handlers::share::get_shared_document).post(handlers::share::create_share),
        )
        .route("/documents/edit", post(handlers::edit::edit_document))
        .route(
            "/documents/{id}",
            get(handlers::documents::get_document)
                .patch(handlers::documents::update_document)
                .delete(handlers::documents::delete_document),
        )
        .route("/documents/{id}/download", post(handlers::documents::download_document))

        // Query endpoint
        .route("/query", post(handlers::query::query_documents))

        // Demo data
        .route("/seed", post(handlers::seed::seed_documents))
        .layer(TimeoutLayer::new(config.request_timeout()))
        .merge(expiry_routes)
        .route_layer(from_fn(middleware::metrics::track_requests));

    if config.rate_limit.enabled {
        let limit = RateLimit::new(config.rate_limit.requests_per_second, config.rate_limit.burst);
        api_routes = api_routes.layer(from_fn_with_state(limit, rate_limit_middleware));
    }

    // Compose the app
    Ok(Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(request_id)
                .layer(propagate_id)
                .layer(trace)
                .layer(cors)
                .layer(Extension(identity)),
        )
        .with_state(state))
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}

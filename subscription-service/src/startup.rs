//! Application startup and lifecycle management.

use axum::middleware::from_fn;
use axum::{
    routing::{get, post},
    Router,
};
use mongodb::{options::ClientOptions, Client};
use secrecy::ExposeSecret;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::{Config, StoreBackend};
use crate::error::AppError;
use crate::handlers;
use crate::middleware::{metrics_middleware, request_id_middleware, REQUEST_ID_HEADER};
use crate::services::{InMemoryStore, MongoStore, SubscriptionService, SubscriptionStore};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub subscriptions: SubscriptionService,
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the store selected by the configuration.
    pub async fn build(config: Config) -> Result<Self, AppError> {
        let store: Arc<dyn SubscriptionStore> = match config.store.backend {
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory store - data is lost on restart");
                Arc::new(InMemoryStore::new())
            }
            StoreBackend::Mongo => Arc::new(connect_mongo(&config).await?),
        };

        Self::build_with_store(config, store).await
    }

    /// Build the application on top of an existing store.
    pub async fn build_with_store(
        config: Config,
        store: Arc<dyn SubscriptionStore>,
    ) -> Result<Self, AppError> {
        let subscriptions = SubscriptionService::new(
            store,
            config.cache.ttl(),
            config.features.beta_testing_enabled,
        );

        let state = AppState {
            config: config.clone(),
            subscriptions,
        };

        // Port 0 binds a random port for testing
        let host: std::net::IpAddr = config.server.host.parse().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!(
                "Invalid server.host '{}': {}",
                config.server.host,
                e
            ))
        })?;
        let addr = SocketAddr::new(host, config.server.port);
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Subscription service: HTTP on port {}", port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = router(self.state);
        tracing::info!("Listening on {}", self.listener.local_addr()?);
        axum::serve(self.listener, router).await
    }
}

/// HTTP routes with the tracing, metrics and request id layers.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route(
            "/api/subscription/calculate/:batch_id",
            get(handlers::subscription::calculate),
        )
        .route(
            "/api/subscription/preview",
            post(handlers::subscription::preview),
        )
        .route(
            "/api/subscription/reconcile",
            post(handlers::subscription::reconcile_view),
        )
        .route(
            "/api/teacher/subscription/recalculate/:batch_id",
            post(handlers::subscription::recalculate),
        )
        .route(
            "/api/teacher/subscription/status",
            get(handlers::subscription::status),
        )
        .route(
            "/api/teacher/subscription/metrics",
            get(handlers::subscription::metrics),
        )
        .route("/api/payments/classify", post(handlers::payments::classify))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                    user_id = tracing::field::Empty,
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

async fn connect_mongo(config: &Config) -> Result<MongoStore, AppError> {
    let uri = config.store.mongodb_uri.as_ref().ok_or_else(|| {
        AppError::ConfigError(anyhow::anyhow!("store.mongodb_uri is not configured"))
    })?;

    let mut client_options = ClientOptions::parse(uri.expose_secret())
        .await
        .map_err(|e| {
            tracing::error!("Failed to parse MongoDB connection string: {}", e);
            AppError::from(e)
        })?;
    client_options.app_name = Some(config.service_name.clone());

    let client = Client::with_options(client_options).map_err(|e| {
        tracing::error!("Failed to create MongoDB client: {}", e);
        AppError::from(e)
    })?;
    let db = client.database(&config.store.mongodb_database);

    let store = MongoStore::new(&db);
    store.init_indexes().await.map_err(|e| {
        tracing::error!("Failed to initialize database indexes: {}", e);
        AppError::DatabaseError(e)
    })?;

    Ok(store)
}

//! Quadrangle Server - Campus Resource Booking System
//!
//! REST API server for conflict-safe booking of shared campus resources.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quadrangle_server::{
    api,
    config::AppConfig,
    repository::{client::StoreClient, Repository},
    scheduling::ConflictIndex,
    services::Services,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            format!("quadrangle_server={},tower_http=debug", config.logging.level).into()
        });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Quadrangle Server v{}", env!("CARGO_PKG_VERSION"));

    // Connect to the document store
    let client = StoreClient::new(&config.store).expect("Failed to create store client");
    let repository = Repository::new(client);

    // Seed the conflict index with the active occurrences of every resource
    let index = Arc::new(ConflictIndex::new());
    let resources = repository
        .resources
        .list(&Default::default())
        .await
        .expect("Failed to list resources from the document store");
    let mut seeded = 0usize;
    for resource in &resources {
        let occurrences = repository
            .occurrences
            .list_active(&resource.id)
            .await
            .expect("Failed to load active occurrences");
        seeded += occurrences.len();
        index.preload(occurrences).await;
    }
    tracing::info!(
        resources = resources.len(),
        occurrences = seeded,
        "Conflict index seeded from the document store"
    );

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create services and application state
    let services = Services::new(repository, index);
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authenticated user
        .route("/auth/me", get(api::users::me))
        .route("/auth/profile", put(api::users::update_my_profile))
        // Users
        .route("/users", get(api::users::list_users))
        .route("/users/:uid", get(api::users::get_user))
        .route("/users/:uid/role", put(api::users::update_role))
        // Resources
        .route("/resources", get(api::resources::list_resources))
        .route("/resources", post(api::resources::create_resource))
        .route("/resources/:id", get(api::resources::get_resource))
        .route("/resources/:id", put(api::resources::update_resource))
        .route("/resources/:id", delete(api::resources::delete_resource))
        .route(
            "/resources/:id/availability",
            get(api::resources::resource_availability),
        )
        // Bookings
        .route("/bookings", post(api::bookings::create_booking))
        .route("/bookings", get(api::bookings::list_bookings))
        .route("/bookings/:group_id", get(api::bookings::get_booking_group))
        .route(
            "/bookings/occurrences/:id/approve",
            post(api::bookings::approve_occurrence),
        )
        .route(
            "/bookings/occurrences/:id/reject",
            post(api::bookings::reject_occurrence),
        )
        .route(
            "/bookings/occurrences/:id/cancel",
            post(api::bookings::cancel_occurrence),
        )
        // Notifications
        .route("/notifications", get(api::notifications::list_notifications))
        .route(
            "/notifications/:id/read",
            put(api::notifications::mark_notification_read),
        )
        .route(
            "/notifications/stream",
            get(api::notifications::stream_notifications),
        )
        // Statistics
        .route("/stats", get(api::stats::get_stats))
        .with_state(state.clone());

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}

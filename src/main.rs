//! LordSMP Community Backend
//!
//! REST backend for the LordSMP Minecraft community site: public pages read
//! members, rules and the live server status; the admin dashboard manages
//! them behind session authentication.

mod api;
mod auth;
mod config;
mod errors;
mod models;
mod status;
mod store;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use auth::Sessions;
use config::Config;
use status::StatusSync;
use store::{Repository, SqliteStore};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub status: Arc<StatusSync>,
    pub sessions: Arc<Sessions>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting LordSMP Community Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Warn if admin credentials are not configured
    if config.admin_email.is_none() || config.admin_password.is_none() {
        tracing::warn!(
            "No admin credentials configured (LORDSMP_ADMIN_EMAIL / LORDSMP_ADMIN_PASSWORD). Admin login is disabled!"
        );
    }

    // Initialize the document store
    let store = Arc::new(SqliteStore::open(&config.db_path).await?);
    let repo = Arc::new(Repository::new(store.clone()));

    // Bring the server-status cache up (seeding the store if empty)
    let status = Arc::new(StatusSync::start(store).await);

    // Session registry for the admin dashboard
    let sessions = Arc::new(Sessions::new(
        config.admin_email.clone(),
        config.admin_password.clone(),
    ));

    // Create application state
    let state = AppState {
        repo,
        status,
        sessions,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone the session registry for the guard layer
    let sessions = state.sessions.clone();

    // Admin routes, gated at the request boundary
    let admin_routes = Router::new()
        // Members
        .route("/members", post(api::create_member))
        .route("/members/{id}", delete(api::delete_member))
        // Rules
        .route("/rules", post(api::create_rule))
        .route("/rules/{id}", delete(api::delete_rule))
        // Server status
        .route("/status/toggle", post(api::toggle_status))
        .route("/status/players", put(api::set_player_count))
        // Setup
        .route("/setup/state", get(api::setup_state))
        .route("/setup/database", post(api::seed_database))
        .route("/setup/admin", post(api::provision_admin))
        // Apply the session guard
        .layer(middleware::from_fn(move |req, next| {
            auth::session_auth_layer(sessions.clone(), req, next)
        }));

    // Public routes (readable by anyone)
    let public_routes = Router::new()
        .route("/status", get(api::get_status))
        .route("/members", get(api::list_members))
        .route("/members/{id}", get(api::get_member))
        .route("/rules", get(api::list_rules))
        .route("/applications", post(api::submit_application))
        .route("/auth/login", post(api::login))
        .route("/auth/logout", post(api::logout));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api/admin", admin_routes)
        .nest("/api", public_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

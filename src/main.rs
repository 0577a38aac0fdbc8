use std::sync::Arc;

use soccer_api::api::{self, AppState};
use soccer_api::auth::CredentialStore;
use soccer_api::config::AppConfig;
use soccer_api::infrastructure::database;
use soccer_api::infrastructure::repositories::PostgresTeamRepository;
use soccer_api::services::TeamService;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv::dotenv().ok();

    let config = AppConfig::from_env().expect("Invalid configuration");
    tracing::info!(profile = ?config.profile, "Configuration loaded");

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = database::connect(&config.database_url, config.database_max_connections)
        .await
        .expect("Failed to connect to database");

    database::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database connected successfully");

    let credentials = CredentialStore::new()
        .with_user(
            config.admin_username.as_str(),
            &config.admin_password,
            config.bcrypt_cost,
        )
        .expect("Failed to build credential store");

    let repository = Arc::new(PostgresTeamRepository::new(pool));
    let state = AppState::new(TeamService::new(repository), credentials);

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = api::router(state)
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(cors);

    // Start server
    tracing::info!("Server listening on {}", config.listen_addr);

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app)
        .await
        .expect("Server failed");
}

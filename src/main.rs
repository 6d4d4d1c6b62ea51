use asis_watch::{ Config, Result };
use axum::{ Router, routing::{ delete, get, post } };
use migration::MigratorTrait;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{ layer::SubscriberExt, util::SubscriberInitExt };

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber
        ::registry()
        .with(
            tracing_subscriber::EnvFilter
                ::try_from_default_env()
                .unwrap_or_else(|_| "asis_watch=debug,tower_http=debug".into())
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| asis_watch::AppError::Config(e.to_string()))?;

    tracing::info!("Starting asis-watch");

    // Initialize database connection
    let db = sea_orm::Database
        ::connect(&config.database_url).await
        .map_err(asis_watch::AppError::Database)?;

    tracing::info!("Database connected successfully");

    // Run migrations
    migration::Migrator::up(&db, None).await.map_err(asis_watch::AppError::Database)?;

    tracing::info!("Migrations completed successfully");

    let config = Arc::new(config);

    // Initialize services
    let watch_service = asis_watch::services::WatchService::new(db.clone());
    let notification_service = asis_watch::services::NotificationService::new(db.clone());
    let profile_service = asis_watch::services::ProfileService::new(db.clone());

    let catalog_service = Arc::new(
        asis_watch::services::CatalogService::new(
            config.catalog_api_base.clone(),
            config.catalog_language.clone()
        )
    );
    let geo_service = Arc::new(
        asis_watch::services::GeoService::new(
            config.routing_api_base.clone(),
            config.geocoding_api_base.clone()
        )
    );
    let mailer = Arc::new(
        asis_watch::services::MailerService::new(
            config.mail_api_base.clone(),
            config.mail_api_key.clone(),
            config.mail_from.clone(),
            config.site_url.clone()
        )
    );
    let auth_service = Arc::new(
        asis_watch::services::AuthService::new(
            config.identity_api_url.clone(),
            config.identity_api_key.clone()
        )
    );

    let checker = Arc::new(
        asis_watch::checker::WatchChecker::new(
            watch_service.clone(),
            notification_service,
            profile_service.clone(),
            catalog_service,
            geo_service.clone(),
            mailer
        )
    );

    // Start the background polling loop
    if config.check_disabled {
        tracing::warn!("Background watch checking is disabled by configuration");
    } else {
        let background_checker = checker.clone();
        let interval_secs = config.check_interval_secs;
        tokio::spawn(async move {
            background_checker.start(interval_secs).await;
        });
        tracing::info!("Background watch checker started (every {}s)", config.check_interval_secs);
    }

    // Create app state
    let app_state = asis_watch::api::AppState::new(
        config.clone(),
        watch_service,
        profile_service,
        auth_service,
        geo_service,
        checker
    );

    // Build application router
    let app = Router::new()
        .route("/health", get(health_check))
        .route(
            "/api/watches",
            post(asis_watch::api::watches::create_watch).get(asis_watch::api::watches::list_watches)
        )
        .route("/api/watches/{id}", delete(asis_watch::api::watches::delete_watch))
        .route("/api/watches/{id}/check", post(asis_watch::api::watches::check_watch))
        .route(
            "/api/account",
            get(asis_watch::api::account::get_account).put(asis_watch::api::account::update_account)
        )
        .route("/api/check", post(asis_watch::api::check::run_check))
        .route("/api/check/{store_id}", post(asis_watch::api::check::run_store_check))
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = format!("{}:{}", config.server_host, config.server_port);
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener
        ::bind(&addr).await
        .map_err(|e| asis_watch::AppError::Internal(e.to_string()))?;

    axum::serve(listener, app).await.map_err(|e| asis_watch::AppError::Internal(e.to_string()))?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
